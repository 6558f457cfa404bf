//! Error types for configuration operations.

use std::path::PathBuf;

use cithrus_components::RegistryError;
use cithrus_core::PipelineError;
use thiserror::Error;

use crate::validation::ValidationError;

/// Errors that can occur while loading, saving or building a pipeline
/// configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// The configuration describes an impossible pipeline
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A stage could not be created
    #[error("stage {index} ({kind}): {source}")]
    Stage {
        /// Position of the stage in the configuration.
        index: usize,
        /// Component id of the stage.
        kind: String,
        /// Why creation failed.
        #[source]
        source: RegistryError,
    },

    /// The created stages could not be wired together
    #[error("failed to wire pipeline: {0}")]
    Pipeline(#[from] PipelineError),
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    fn mock_io_err() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::NotFound, "mock")
    }

    #[test]
    fn read_file_display() {
        let err = ConfigError::read_file("/a/b.toml", mock_io_err());
        let msg = err.to_string();
        assert!(msg.contains("failed to read file"), "got: {msg}");
        assert!(msg.contains("/a/b.toml"), "got: {msg}");
        assert!(err.source().is_some());
    }

    #[test]
    fn stage_display_names_position_and_kind() {
        let err = ConfigError::Stage {
            index: 2,
            kind: "warp".into(),
            source: RegistryError::UnknownComponent("warp".into()),
        };
        assert_eq!(err.to_string(), "stage 2 (warp): unknown component: warp");
        assert!(err.source().is_some());
    }

    #[test]
    fn pipeline_errors_convert() {
        let err: ConfigError = PipelineError::invalid_argument("nope").into();
        assert!(matches!(err, ConfigError::Pipeline(_)));
    }
}
