//! Paths into a JSON tree.
//!
//! Rendering rules:
//! - the empty path renders as [`ROOT_MARKER`]
//! - key segments join with `.`
//! - index segments render as `[n]` attached to the previous segment
//!
//! `servers[0].host` is key `servers`, index `0`, key `host`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// Literal shown for the empty path.
pub const ROOT_MARKER: &str = "(root)";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonPath(Vec<PathSegment>);

impl JsonPath {
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Single-key path, the common case for top-level settings.
    #[must_use]
    pub fn key(key: impl Into<String>) -> Self {
        Self(vec![PathSegment::Key(key.into())])
    }

    #[must_use]
    pub fn child_key(&self, key: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.into()));
        Self(segments)
    }

    #[must_use]
    pub fn child_index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Split into parent path and last segment. `None` for the root.
    #[must_use]
    pub fn split_last(&self) -> Option<(Self, &PathSegment)> {
        let (last, parent) = self.0.split_last()?;
        Some((Self(parent.to_vec()), last))
    }

    /// First key segment, i.e. the top-level setting this path lives under.
    #[must_use]
    pub fn top_level_key(&self) -> Option<&str> {
        match self.0.first() {
            Some(PathSegment::Key(key)) => Some(key),
            _ => None,
        }
    }
}

impl From<Vec<PathSegment>> for JsonPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str(ROOT_MARKER);
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Index(index) => write!(f, "[{index}]")?,
                PathSegment::Key(key) if i == 0 => f.write_str(key)?,
                PathSegment::Key(key) => write!(f, ".{key}")?,
            }
        }
        Ok(())
    }
}

impl FromStr for JsonPath {
    type Err = CoreError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        if text.is_empty() || text == ROOT_MARKER {
            return Ok(Self::root());
        }

        let invalid = || CoreError::InvalidPath(text.to_string());
        let mut segments = Vec::new();
        let mut key = String::new();
        let mut chars = text.chars().peekable();
        // A key is expected after a '.' or at the very start unless an index follows.
        let mut expect_key = true;

        while let Some(c) = chars.next() {
            match c {
                '.' => {
                    if key.is_empty() && expect_key {
                        return Err(invalid());
                    }
                    if !key.is_empty() {
                        segments.push(PathSegment::Key(std::mem::take(&mut key)));
                    }
                    expect_key = true;
                }
                '[' => {
                    if !key.is_empty() {
                        segments.push(PathSegment::Key(std::mem::take(&mut key)));
                    } else if expect_key && !segments.is_empty() {
                        return Err(invalid());
                    }
                    let mut digits = String::new();
                    loop {
                        match chars.next() {
                            Some(']') => break,
                            Some(d) if d.is_ascii_digit() => digits.push(d),
                            _ => return Err(invalid()),
                        }
                    }
                    let index = digits.parse::<usize>().map_err(|_| invalid())?;
                    segments.push(PathSegment::Index(index));
                    expect_key = false;
                    if matches!(chars.peek(), Some(next) if *next != '.' && *next != '[') {
                        return Err(invalid());
                    }
                }
                ']' => return Err(invalid()),
                other => {
                    key.push(other);
                    expect_key = false;
                }
            }
        }

        if !key.is_empty() {
            segments.push(PathSegment::Key(key));
        } else if expect_key {
            return Err(invalid());
        }

        Ok(Self(segments))
    }
}

impl Serialize for JsonPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for JsonPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn root_renders_marker() {
        assert_eq!(JsonPath::root().to_string(), "(root)");
    }

    #[test]
    fn indices_attach_to_previous_segment() {
        let path = JsonPath::key("servers").child_index(0).child_key("host");
        assert_eq!(path.to_string(), "servers[0].host");
    }

    #[test]
    fn leading_index_has_no_dot() {
        let path = JsonPath::root().child_index(2).child_key("name");
        assert_eq!(path.to_string(), "[2].name");
    }

    #[test]
    fn numeric_looking_keys_stay_keys() {
        let path = JsonPath::key("ports").child_key("0");
        assert_eq!(path.to_string(), "ports.0");
    }

    #[rstest]
    #[case("timeout")]
    #[case("servers[0].host")]
    #[case("matrix[1][2]")]
    #[case("[3]")]
    #[case("env.API_KEY")]
    fn display_and_parse_agree(#[case] text: &str) {
        let path: JsonPath = text.parse().expect("path should parse");
        assert_eq!(path.to_string(), text);
    }

    #[rstest]
    #[case("a..b")]
    #[case(".a")]
    #[case("a.")]
    #[case("a[x]")]
    #[case("a[1")]
    #[case("a]")]
    #[case("a[0]b")]
    fn malformed_paths_are_rejected(#[case] text: &str) {
        assert!(matches!(
            text.parse::<JsonPath>(),
            Err(CoreError::InvalidPath(_))
        ));
    }

    #[test]
    fn marker_parses_to_root() {
        assert!("(root)".parse::<JsonPath>().unwrap().is_root());
        assert!("".parse::<JsonPath>().unwrap().is_root());
    }

    #[test]
    fn top_level_key_and_split() {
        let path: JsonPath = "retry.max".parse().unwrap();
        assert_eq!(path.top_level_key(), Some("retry"));
        let (parent, last) = path.split_last().unwrap();
        assert_eq!(parent, JsonPath::key("retry"));
        assert_eq!(last, &PathSegment::Key("max".into()));
    }

    #[test]
    fn serializes_as_string() {
        let path = JsonPath::key("a").child_index(1);
        assert_eq!(serde_json::to_value(&path).unwrap(), "a[1]");
        let back: JsonPath = serde_json::from_value(serde_json::json!("a[1]")).unwrap();
        assert_eq!(back, path);
    }
}
