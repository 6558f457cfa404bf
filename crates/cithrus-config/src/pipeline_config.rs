//! Pipeline file format and operations.

use std::path::Path;
use std::time::Duration;

use cithrus_components::ComponentRegistry;
use cithrus_core::{Pipeline, RunnerConfig};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::stage::StageConfig;
use crate::validation::{ValidationResult, validate_pipeline};

/// A linear pipeline: one source, any number of filters, one sink.
///
/// # TOML Format
///
/// ```toml
/// name = "latency-probe"
/// description = "Blinker converted to yuv420 and written to disk"
/// tick_interval_ms = 16
///
/// [[stages]]
/// kind = "blinker"
/// params = { width = 640, height = 480, frequency = 2 }
///
/// [[stages]]
/// kind = "rgba_to_yuv"
/// params = { width = 640, height = 480 }
///
/// [[stages]]
/// kind = "file_sink"
/// params = { path = "probe.yuv" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    /// Name of the pipeline; also names the runner thread.
    pub name: String,

    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Minimum time between ticks. Absent means as fast as possible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tick_interval_ms: Option<u64>,

    /// Stages in tick order.
    #[serde(default)]
    pub stages: Vec<StageConfig>,
}

impl PipelineConfig {
    /// Create a new empty pipeline configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            tick_interval_ms: None,
            stages: Vec::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the tick interval.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval_ms = Some(interval.as_millis() as u64);
        self
    }

    /// Append a stage.
    pub fn with_stage(mut self, stage: StageConfig) -> Self {
        self.stages.push(stage);
        self
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns `true` if there are no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Configured tick interval.
    pub fn tick_interval(&self) -> Option<Duration> {
        self.tick_interval_ms.map(Duration::from_millis)
    }

    /// Runner settings for this pipeline.
    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            tick_interval: self.tick_interval(),
            thread_name: format!("cithrus-{}", self.name),
        }
    }

    /// Check the configuration against `registry` without building anything.
    pub fn validate(&self, registry: &ComponentRegistry) -> ValidationResult<()> {
        validate_pipeline(self, registry)
    }

    /// Validate, create every stage through `registry`, and wire them.
    ///
    /// Stages are created in order; if one fails, the ones already created
    /// are dropped before the error is returned.
    pub fn build(&self, registry: &ComponentRegistry) -> Result<Pipeline, ConfigError> {
        self.validate(registry)?;

        let components = self
            .stages
            .iter()
            .enumerate()
            .map(|(index, stage)| {
                registry
                    .create(&stage.kind, &stage.params())
                    .map_err(|source| ConfigError::Stage {
                        index,
                        kind: stage.kind.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let pipeline = Pipeline::from_components(components)?;
        tracing::info!(
            "config: built '{}' with {} stages",
            self.name,
            pipeline.len()
        );
        Ok(pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROBE: &str = r#"
name = "probe"
tick_interval_ms = 20

[[stages]]
kind = "solid_color"
params = { width = 4, height = 2, color = "255,0,0,255" }

[[stages]]
kind = "rgba_to_yuv"
params = { width = 4, height = 2 }

[[stages]]
kind = "frame_counter"
"#;

    #[test]
    fn parses_toml() {
        let config = PipelineConfig::from_toml(PROBE).unwrap();
        assert_eq!(config.name, "probe");
        assert_eq!(config.len(), 3);
        assert_eq!(config.tick_interval(), Some(Duration::from_millis(20)));
        assert_eq!(config.runner_config().thread_name, "cithrus-probe");
    }

    #[test]
    fn toml_round_trip() {
        let config = PipelineConfig::from_toml(PROBE).unwrap().with_description("red");
        let again = PipelineConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(again, config);
    }

    #[test]
    fn builds_a_runnable_pipeline() {
        let config = PipelineConfig::from_toml(PROBE).unwrap();
        let mut pipeline = config.build(&ComponentRegistry::new()).unwrap();
        pipeline.run().unwrap();
        assert_eq!(
            pipeline.component_names(),
            ["SolidColorSource", "RgbaToYuvConverter", "FrameCounter"]
        );
    }

    #[test]
    fn invalid_config_is_not_built() {
        let config = PipelineConfig::new("bad").with_stage(StageConfig::new("null_sink"));
        let err = config.build(&ComponentRegistry::new()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)), "got {err}");
    }

    #[test]
    fn constructor_failures_name_the_stage() {
        let config = PipelineConfig::new("odd")
            .with_stage(StageConfig::new("solid_color").with_param("width", 3).with_param("height", 3))
            .with_stage(StageConfig::new("rgba_to_yuv").with_param("width", 3).with_param("height", 3))
            .with_stage(StageConfig::new("null_sink"));
        let err = config.build(&ComponentRegistry::new()).unwrap_err();
        assert!(matches!(err, ConfigError::Stage { index: 1, .. }), "got {err}");
    }

    #[test]
    fn format_mismatch_surfaces_as_pipeline_error() {
        let config = PipelineConfig::new("mismatch")
            .with_stage(
                StageConfig::new("solid_color")
                    .with_param("width", 2)
                    .with_param("height", 2)
                    .with_param("format", "yuv420"),
            )
            .with_stage(StageConfig::new("bgra_to_rgba"))
            .with_stage(StageConfig::new("null_sink"));
        assert!(config.validate(&ComponentRegistry::new()).is_ok());
        let err = config.build(&ComponentRegistry::new()).unwrap_err();
        assert!(matches!(err, ConfigError::Pipeline(_)), "got {err}");
    }
}
