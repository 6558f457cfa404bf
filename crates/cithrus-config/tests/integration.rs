//! Integration tests for cithrus-config.
//!
//! These tests go from a TOML file on disk to a running pipeline.

use std::time::Duration;

use cithrus_components::ComponentRegistry;
use cithrus_config::{ConfigError, PipelineConfig, StageConfig, ValidationError};
use cithrus_core::AsyncPipelineRunner;
use tempfile::TempDir;

fn yuv_file_config(out: &std::path::Path) -> PipelineConfig {
    PipelineConfig::new("to-disk")
        .with_description("solid blue, converted and written out")
        .with_tick_interval(Duration::from_millis(1))
        .with_stage(
            StageConfig::new("solid_color")
                .with_param("width", 4)
                .with_param("height", 4)
                .with_param("format", "bgra")
                .with_param("color", "0,0,255,255"),
        )
        .with_stage(StageConfig::new("bgra_to_rgba"))
        .with_stage(StageConfig::new("rgba_to_yuv").with_param("width", 4).with_param("height", 4))
        .with_stage(StageConfig::new("file_sink").with_param("path", out.to_string_lossy().into_owned()))
}

#[test]
fn saved_config_loads_identically() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pipeline.toml");
    let config = yuv_file_config(&dir.path().join("out.yuv"));

    config.save(&path).unwrap();
    let loaded = PipelineConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn loaded_config_runs_on_a_runner() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.yuv");
    let path = dir.path().join("pipeline.toml");
    yuv_file_config(&out).save(&path).unwrap();

    let config = PipelineConfig::load(&path).unwrap();
    let pipeline = config.build(&ComponentRegistry::new()).unwrap();
    let runner = AsyncPipelineRunner::spawn_with(pipeline, config.runner_config()).unwrap();
    while runner.ticks() < 3 {
        std::thread::sleep(Duration::from_millis(1));
    }
    let report = runner.stop();
    assert!(report.is_clean());

    let written = std::fs::metadata(&out).unwrap().len();
    assert_eq!(written, report.ticks * 24);
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = TempDir::new().unwrap();
    let err = PipelineConfig::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = PipelineConfig::from_toml("name = \n[[stages]]").unwrap_err();
    assert!(matches!(err, ConfigError::TomlParse(_)));
}

#[test]
fn validation_reports_before_any_file_is_created() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("never.yuv");
    let config = PipelineConfig::new("bad")
        .with_stage(StageConfig::new("solid_color").with_param("width", 2).with_param("height", 2))
        .with_stage(StageConfig::new("duplicator_2"))
        .with_stage(StageConfig::new("file_sink").with_param("path", out.to_string_lossy().into_owned()));

    let err = config.build(&ComponentRegistry::new()).unwrap_err();
    match err {
        ConfigError::Validation(ValidationError::ArityMismatch { outputs, inputs, .. }) => {
            assert_eq!((outputs, inputs), (2, 1));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!out.exists());
}
