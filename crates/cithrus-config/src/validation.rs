//! Static checks on a pipeline configuration.
//!
//! Everything here is decided from registry descriptors alone: no component
//! is constructed and no file is touched, so validation is cheap enough to
//! run on every edit. Problems are collected rather than reported one at a
//! time.
//!
//! # Example
//!
//! ```rust
//! use cithrus_config::{PipelineConfig, StageConfig, ValidationError};
//! use cithrus_components::ComponentRegistry;
//!
//! let config = PipelineConfig::new("broken")
//!     .with_stage(StageConfig::new("duplicator_2"))
//!     .with_stage(StageConfig::new("null_sink"));
//!
//! let err = config.validate(&ComponentRegistry::new()).unwrap_err();
//! assert!(matches!(err, ValidationError::Multiple(_)));
//! ```

use cithrus_components::{ComponentRegistry, ComponentRole};
use thiserror::Error;

use crate::pipeline_config::PipelineConfig;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Fewer than two stages.
    #[error("a pipeline needs a source and a sink, got {0} stage(s)")]
    TooFewStages(usize),

    /// Stage kind not in the registry.
    #[error("stage {index}: unknown component '{kind}'")]
    UnknownComponent {
        /// Position of the stage.
        index: usize,
        /// The unrecognized id.
        kind: String,
    },

    /// A component sits where its role does not fit.
    #[error("stage {index} ({kind}) is a {actual} but this position needs a {expected}")]
    MisplacedRole {
        /// Position of the stage.
        index: usize,
        /// Component id.
        kind: String,
        /// Role this position requires.
        expected: &'static str,
        /// Role of the component.
        actual: &'static str,
    },

    /// A parameter the component does not understand.
    #[error("stage {index} ({kind}): unknown parameter '{param}'")]
    UnknownParameter {
        /// Position of the stage.
        index: usize,
        /// Component id.
        kind: String,
        /// Name of the unrecognized parameter.
        param: String,
    },

    /// A required parameter is absent.
    #[error("stage {index} ({kind}): missing required parameter '{param}'")]
    MissingParameter {
        /// Position of the stage.
        index: usize,
        /// Component id.
        kind: String,
        /// Name of the missing parameter.
        param: String,
    },

    /// Adjacent stages disagree on the number of ports between them.
    #[error(
        "stage {index} ({upstream}) has {outputs} output(s) but the next stage ({downstream}) has {inputs} input(s)"
    )]
    ArityMismatch {
        /// Position of the upstream stage.
        index: usize,
        /// Upstream component id.
        upstream: String,
        /// Downstream component id.
        downstream: String,
        /// Upstream output count.
        outputs: usize,
        /// Downstream input count.
        inputs: usize,
    },

    /// `tick_interval_ms = 0`.
    #[error("tick_interval_ms must be positive; omit it to tick as fast as possible")]
    ZeroTickInterval,

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

impl ValidationError {
    /// Flattens into individual errors.
    pub fn into_vec(self) -> Vec<ValidationError> {
        match self {
            ValidationError::Multiple(errors) => errors,
            other => vec![other],
        }
    }
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Checks `config` against the components in `registry`.
///
/// Verifies that every stage exists, that the first is a source, the last a
/// sink and everything between a filter, that parameter names are known and
/// required ones present, and that adjacent port counts agree.
pub fn validate_pipeline(config: &PipelineConfig, registry: &ComponentRegistry) -> ValidationResult<()> {
    let mut errors = Vec::new();

    if config.tick_interval_ms == Some(0) {
        errors.push(ValidationError::ZeroTickInterval);
    }

    let stages = &config.stages;
    if stages.len() < 2 {
        errors.push(ValidationError::TooFewStages(stages.len()));
    }

    let last = stages.len().saturating_sub(1);
    let descriptors: Vec<_> = stages.iter().map(|s| registry.get(&s.kind)).collect();

    for (index, (stage, descriptor)) in stages.iter().zip(&descriptors).enumerate() {
        let Some(descriptor) = descriptor else {
            errors.push(ValidationError::UnknownComponent {
                index,
                kind: stage.kind.clone(),
            });
            continue;
        };

        let expected = match index {
            0 => ComponentRole::Source,
            i if i == last => ComponentRole::Sink,
            _ => ComponentRole::Filter,
        };
        if stages.len() >= 2 && descriptor.role != expected {
            errors.push(ValidationError::MisplacedRole {
                index,
                kind: stage.kind.clone(),
                expected: expected.name(),
                actual: descriptor.role.name(),
            });
        }

        for param in stage.params.keys() {
            if descriptor.param(param).is_none() {
                errors.push(ValidationError::UnknownParameter {
                    index,
                    kind: stage.kind.clone(),
                    param: param.clone(),
                });
            }
        }
        for spec in descriptor.params.iter().filter(|p| p.required) {
            if !stage.params.contains_key(spec.name) {
                errors.push(ValidationError::MissingParameter {
                    index,
                    kind: stage.kind.clone(),
                    param: spec.name.to_owned(),
                });
            }
        }
    }

    for (index, pair) in descriptors.windows(2).enumerate() {
        if let [Some(up), Some(down)] = pair
            && up.outputs != down.inputs
        {
            errors.push(ValidationError::ArityMismatch {
                index,
                upstream: up.id.to_owned(),
                downstream: down.id.to_owned(),
                outputs: up.outputs,
                inputs: down.inputs,
            });
        }
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}
