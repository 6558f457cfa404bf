//! One stage of a configured pipeline.

use std::collections::BTreeMap;
use std::fmt;

use cithrus_components::Params;
use serde::{Deserialize, Serialize};

/// A parameter value as written in TOML.
///
/// Components parse parameters from text, so every variant is handed over in
/// its display form: `width = 64` and `width = "64"` mean the same thing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Boolean literal.
    Bool(bool),
    /// Integer literal.
    Integer(i64),
    /// Float literal.
    Float(f64),
    /// String literal.
    Text(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Integer(i) => write!(f, "{i}"),
            ParamValue::Float(x) => write!(f, "{x}"),
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

macro_rules! integer_values {
    ($($t:ty),*) => {
        $(
            impl From<$t> for ParamValue {
                fn from(value: $t) -> Self {
                    ParamValue::Integer(i64::from(value))
                }
            }
        )*
    };
}

integer_values!(i32, i64, u16, u32);

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

/// Configuration for one stage: a registered component id and its
/// parameters.
///
/// # Example
///
/// ```rust
/// use cithrus_config::StageConfig;
///
/// let stage = StageConfig::new("rgba_to_yuv")
///     .with_param("width", 1280)
///     .with_param("height", 720);
///
/// assert_eq!(stage.kind, "rgba_to_yuv");
/// assert_eq!(stage.params().get("width"), Some("1280"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    /// Registered component id (e.g. `"solid_color"`).
    pub kind: String,

    /// Component parameters.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, ParamValue>,
}

impl StageConfig {
    /// Create a stage with no parameters.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            params: BTreeMap::new(),
        }
    }

    /// Add a parameter to the stage.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Parameters in the textual form the registry consumes.
    pub fn params(&self) -> Params {
        self.params
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_render_as_text() {
        let stage = StageConfig::new("blinker")
            .with_param("width", 64)
            .with_param("frequency", 2.5)
            .with_param("format", "bgra");
        let params = stage.params();
        assert_eq!(params.get("width"), Some("64"));
        assert_eq!(params.get("frequency"), Some("2.5"));
        assert_eq!(params.get("format"), Some("bgra"));
    }

    #[test]
    fn toml_literals_of_any_type_deserialize() {
        let stage: StageConfig = toml::from_str(
            r#"
            kind = "blinker"
            params = { width = 64, height = "48", frequency = 0.5, format = "rgba" }
            "#,
        )
        .unwrap();
        assert_eq!(stage.params["width"], ParamValue::Integer(64));
        assert_eq!(stage.params["height"], ParamValue::Text("48".into()));
        assert_eq!(stage.params["frequency"], ParamValue::Float(0.5));
    }

    #[test]
    fn empty_params_are_omitted_when_serialized() {
        let text = toml::to_string(&StageConfig::new("null_sink")).unwrap();
        assert_eq!(text.trim(), "kind = \"null_sink\"");
    }
}
