//! Configuration for cithrus pipelines.
//!
//! Describes a linear pipeline in TOML, checks it against the component
//! registry, and builds a runnable [`Pipeline`](cithrus_core::Pipeline).
//!
//! # Features
//!
//! - **Pipeline files**: load and save [`PipelineConfig`] as TOML
//! - **Validation**: roles, parameters and port counts checked from registry
//!   descriptors, with every problem reported at once
//! - **Construction**: stages created by name and wired through
//!   `Pipeline::from_components`
//!
//! # Example
//!
//! ```rust
//! use cithrus_config::{PipelineConfig, StageConfig};
//! use cithrus_components::ComponentRegistry;
//!
//! let config = PipelineConfig::new("preview")
//!     .with_stage(StageConfig::new("solid_color").with_param("width", 64).with_param("height", 48))
//!     .with_stage(StageConfig::new("rgba_to_yuv").with_param("width", 64).with_param("height", 48))
//!     .with_stage(StageConfig::new("frame_counter"));
//!
//! let registry = ComponentRegistry::new();
//! config.validate(&registry).unwrap();
//! let mut pipeline = config.build(&registry).unwrap();
//! pipeline.run().unwrap();
//! ```

mod error;
mod pipeline_config;
mod stage;

/// Pipeline validation.
pub mod validation;

pub use error::ConfigError;
pub use pipeline_config::PipelineConfig;
pub use stage::{ParamValue, StageConfig};
pub use validation::{ValidationError, ValidationResult, validate_pipeline};

/// Re-export commonly used types from cithrus-components
pub use cithrus_components::{ComponentDescriptor, ComponentRegistry, ComponentRole};
