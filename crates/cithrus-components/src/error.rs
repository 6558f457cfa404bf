//! Errors raised while instantiating components by name.

use std::path::PathBuf;

use cithrus_core::PipelineError;
use thiserror::Error;

/// Failure to create a component from the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No component is registered under this id.
    #[error("unknown component: {0}")]
    UnknownComponent(String),

    /// A required parameter was not supplied.
    #[error("component '{component}' requires parameter '{param}'")]
    MissingParameter {
        /// Component id.
        component: String,
        /// Name of the missing parameter.
        param: String,
    },

    /// A parameter was supplied but is not usable.
    #[error("invalid parameter '{param}' for component '{component}': {reason}")]
    InvalidParameter {
        /// Component id.
        component: String,
        /// Name of the parameter.
        param: String,
        /// Why the value was refused.
        reason: String,
    },

    /// A file the component needs could not be opened.
    #[error("component '{component}' cannot open '{path}': {source}")]
    Io {
        /// Component id.
        component: String,
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The component's constructor refused the configuration.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Result alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn messages_name_component_and_param() {
        let err = RegistryError::InvalidParameter {
            component: "blinker".into(),
            param: "frequency".into(),
            reason: "must be positive".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid parameter 'frequency' for component 'blinker': must be positive"
        );
        assert_eq!(
            RegistryError::UnknownComponent("warp".into()).to_string(),
            "unknown component: warp"
        );
    }

    #[test]
    fn io_exposes_source() {
        let err = RegistryError::Io {
            component: "file_sink".into(),
            path: "/nope".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "mock"),
        };
        assert!(err.source().is_some());
    }
}
