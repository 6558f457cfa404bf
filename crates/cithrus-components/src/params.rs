//! String-keyed component parameters.
//!
//! Parameters arrive as text (from TOML, the command line, a UI) and are
//! parsed by the component factory that consumes them, which knows their
//! types.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use cithrus_core::Format;
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, RegistryResult};

/// Parameter values keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    /// An empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets `key`, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Raw value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Parameter names in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no parameters are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Typed access to one component's parameters.
///
/// Errors name the component id so they make sense out of context.
#[derive(Debug, Clone, Copy)]
pub struct ParamReader<'a> {
    component: &'a str,
    params: &'a Params,
}

impl<'a> ParamReader<'a> {
    /// Reads `params` on behalf of `component`.
    pub fn new(component: &'a str, params: &'a Params) -> Self {
        Self { component, params }
    }

    /// The component id.
    pub fn component(&self) -> &'a str {
        self.component
    }

    /// Raw value of `key`, if present.
    pub fn raw(&self, key: &str) -> Option<&'a str> {
        self.params.get(key).map(str::trim)
    }

    /// Parses `key` if present.
    pub fn parse<T>(&self, key: &str) -> RegistryResult<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.raw(key)
            .map(|raw| raw.parse().map_err(|e| self.invalid(key, format!("'{raw}': {e}"))))
            .transpose()
    }

    /// Parses `key`, which must be present.
    pub fn require<T>(&self, key: &str) -> RegistryResult<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.parse(key)?.ok_or_else(|| RegistryError::MissingParameter {
            component: self.component.to_owned(),
            param: key.to_owned(),
        })
    }

    /// Parses `key`, falling back to `default` when absent.
    pub fn or<T>(&self, key: &str, default: T) -> RegistryResult<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        Ok(self.parse(key)?.unwrap_or(default))
    }

    /// Reads a format tag, falling back to `default` when absent.
    pub fn format(&self, key: &str, default: Format) -> Format {
        self.raw(key)
            .map_or(default, |tag| Format::new(tag.to_ascii_lowercase()))
    }

    /// Reads a comma-separated list of exactly `N` bytes, e.g. `"255, 0, 0, 255"`.
    pub fn bytes<const N: usize>(&self, key: &str, default: [u8; N]) -> RegistryResult<[u8; N]> {
        let Some(raw) = self.raw(key) else {
            return Ok(default);
        };
        let values = raw
            .split(',')
            .map(|part| part.trim().parse::<u8>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| self.invalid(key, format!("'{raw}': {e}")))?;
        values
            .try_into()
            .map_err(|v: Vec<u8>| self.invalid(key, format!("expected {N} values, got {}", v.len())))
    }

    /// Builds an [`RegistryError::InvalidParameter`] for `key`.
    pub fn invalid(&self, key: &str, reason: impl Into<String>) -> RegistryError {
        RegistryError::InvalidParameter {
            component: self.component.to_owned(),
            param: key.to_owned(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> Params {
        [("width", " 64 "), ("color", "1, 2,3"), ("bad", "x"), ("format", "BGRA")]
            .into_iter()
            .collect()
    }

    #[test]
    fn typed_reads() {
        let p = params();
        let r = ParamReader::new("solid_color", &p);
        assert_eq!(r.require::<u16>("width").unwrap(), 64);
        assert_eq!(r.or::<u16>("height", 48).unwrap(), 48);
        assert_eq!(r.bytes("color", [0; 3]).unwrap(), [1, 2, 3]);
        assert_eq!(r.format("format", Format::RGBA), Format::BGRA);
        assert_eq!(r.format("missing", Format::RGBA), Format::RGBA);
    }

    #[test]
    fn missing_and_invalid_are_distinguished() {
        let p = params();
        let r = ParamReader::new("solid_color", &p);
        assert!(matches!(
            r.require::<u16>("height"),
            Err(RegistryError::MissingParameter { ref param, .. }) if param == "height"
        ));
        assert!(matches!(
            r.require::<u16>("bad"),
            Err(RegistryError::InvalidParameter { ref param, .. }) if param == "bad"
        ));
        let err = r.bytes("color", [0; 4]).unwrap_err();
        assert!(err.to_string().contains("expected 4 values, got 3"), "got: {err}");
    }

    #[test]
    fn deserializes_from_toml_table() {
        let p: Params = toml::from_str("width = \"8\"\nformat = \"yuv420\"").unwrap();
        assert_eq!(p.len(), 2);
        assert_eq!(p.keys().collect::<Vec<_>>(), ["format", "width"]);
    }
}
