//! Format tags and input acceptance sets.
//!
//! A [`Format`] names the semantic type of a buffer's payload. The set of tags
//! is open: components may invent their own, but the constants below cover the
//! payloads the bundled stages exchange.

use std::borrow::Cow;
use std::fmt;

/// A string tag naming a buffer's payload semantics (e.g. `"rgba"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Format(Cow<'static, str>);

impl Format {
    /// 8-bit RGBA, four bytes per pixel.
    pub const RGBA: Format = Format::from_static("rgba");
    /// 8-bit BGRA, four bytes per pixel.
    pub const BGRA: Format = Format::from_static("bgra");
    /// Planar YUV 4:2:0, 12 bits per pixel.
    pub const YUV420: Format = Format::from_static("yuv420");
    /// HEVC elementary stream.
    pub const HEVC: Format = Format::from_static("hevc");
    /// Single-channel 32-bit float.
    pub const GRAY32F: Format = Format::from_static("gray32f");
    /// Four-channel 32-bit float.
    pub const RGBA32F: Format = Format::from_static("rgba32f");
    /// Opaque bytes.
    pub const BINARY: Format = Format::from_static("binary");
    /// Comma-separated text.
    pub const CSV: Format = Format::from_static("csv");

    /// Creates a format from a static string.
    pub const fn from_static(tag: &'static str) -> Self {
        Self(Cow::Borrowed(tag))
    }

    /// Creates a format from an owned or borrowed string.
    pub fn new(tag: impl Into<Cow<'static, str>>) -> Self {
        Self(tag.into())
    }

    /// Returns the tag.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Format {
    fn from(tag: &'static str) -> Self {
        Self::from_static(tag)
    }
}

impl From<String> for Format {
    fn from(tag: String) -> Self {
        Self(Cow::Owned(tag))
    }
}

impl PartialEq<str> for Format {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Format {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// The formats an input port is willing to bind to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accepts {
    /// Wildcard: any upstream format is acceptable.
    Any,
    /// Only the listed formats are acceptable.
    Formats(Vec<Format>),
}

impl Accepts {
    /// Accepts exactly one format.
    pub fn one(format: Format) -> Self {
        Self::Formats(vec![format])
    }

    /// Accepts any of the given formats.
    pub fn any_of(formats: impl IntoIterator<Item = Format>) -> Self {
        Self::Formats(formats.into_iter().collect())
    }

    /// Returns `true` if `format` may be bound.
    pub fn accepts(&self, format: &Format) -> bool {
        match self {
            Self::Any => true,
            Self::Formats(formats) => formats.contains(format),
        }
    }

    /// Returns `true` for the wildcard set.
    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }
}

impl From<Format> for Accepts {
    fn from(format: Format) -> Self {
        Self::one(format)
    }
}

impl fmt::Display for Accepts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::Formats(formats) => {
                for (i, format) in formats.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{format}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_and_owned_formats_compare_equal() {
        assert_eq!(Format::RGBA, Format::from(String::from("rgba")));
        assert_eq!(Format::YUV420, "yuv420");
    }

    #[test]
    fn acceptance() {
        let set = Accepts::any_of([Format::RGBA, Format::BGRA]);
        assert!(set.accepts(&Format::BGRA));
        assert!(!set.accepts(&Format::HEVC));
        assert!(Accepts::Any.accepts(&Format::new("anything")));
        assert_eq!(set.to_string(), "rgba, bgra");
    }
}
