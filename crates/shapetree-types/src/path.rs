//! Instance paths.
//!
//! An instance path locates a container inside a planted ShapeTree instance,
//! relative to the instance root. The root itself is `"."`; nested
//! containers are `/`-joined names such as `"repos/alice"`.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::IdError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InstancePath(String);

impl InstancePath {
    pub const ROOT: &'static str = ".";

    /// The instance root.
    pub fn root() -> Self {
        Self(Self::ROOT.to_string())
    }

    /// Parse a path, normalizing surrounding separators and `.` segments.
    pub fn parse(text: &str) -> Result<Self, IdError> {
        let mut segments = Vec::new();
        for segment in text.trim_matches('/').split('/') {
            match segment {
                "" if text.trim_matches('/').is_empty() => {}
                "" => {
                    return Err(IdError::InvalidInstancePath {
                        path: text.to_string(),
                        reason: "empty segment",
                    })
                }
                "." => {}
                ".." => {
                    return Err(IdError::InvalidInstancePath {
                        path: text.to_string(),
                        reason: "parent segments are not allowed",
                    })
                }
                name => segments.push(name),
            }
        }
        if segments.is_empty() {
            Ok(Self::root())
        } else {
            Ok(Self(segments.join("/")))
        }
    }

    pub fn is_root(&self) -> bool {
        self.0 == Self::ROOT
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path segments below the root; empty for the root itself.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| *s != Self::ROOT)
    }

    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Extend the path by one container name.
    pub fn join(&self, name: &str) -> Result<Self, IdError> {
        let name = name.trim_end_matches('/');
        if name.is_empty() || name.contains('/') || name == "." || name == ".." {
            return Err(IdError::InvalidInstancePath {
                path: format!("{}/{}", self.0, name),
                reason: "child name must be a single segment",
            });
        }
        if self.is_root() {
            Ok(Self(name.to_string()))
        } else {
            Ok(Self(format!("{}/{}", self.0, name)))
        }
    }

    /// Walk upward from `container` by one level per segment.
    pub fn instance_root(&self, container: &Url) -> Result<Url, IdError> {
        let depth = self.depth();
        if depth == 0 {
            return Ok(container.clone());
        }
        container
            .join(&"../".repeat(depth))
            .map_err(|e| IdError::InvalidId {
                id: container.to_string(),
                reason: e.to_string(),
            })
    }
}

impl Default for InstancePath {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for InstancePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for InstancePath {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<InstancePath> for String {
    fn from(value: InstancePath) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_forms() {
        for text in [".", "", "/", "./", "./."] {
            assert!(InstancePath::parse(text).unwrap().is_root(), "{text:?}");
        }
    }

    #[test]
    fn normalizes_dots_and_slashes() {
        assert_eq!(InstancePath::parse("./repos/alice/").unwrap().as_str(), "repos/alice");
    }

    #[test]
    fn rejects_parent_and_empty_segments() {
        assert!(InstancePath::parse("a/../b").is_err());
        assert!(InstancePath::parse("a//b").is_err());
    }

    #[test]
    fn join_from_root() {
        let p = InstancePath::root().join("repos/").unwrap();
        assert_eq!(p.as_str(), "repos");
        assert_eq!(p.join("alice").unwrap().as_str(), "repos/alice");
        assert!(p.join("a/b").is_err());
    }

    #[test]
    fn instance_root_walks_upward() {
        let container = Url::parse("http://h/Apps/proj1/repos/alice/").unwrap();
        let path = InstancePath::parse("repos/alice").unwrap();
        assert_eq!(path.instance_root(&container).unwrap().as_str(), "http://h/Apps/proj1/");
        assert_eq!(InstancePath::root().instance_root(&container).unwrap(), container);
    }

    #[test]
    fn string_conversion_normalizes() {
        let p = InstancePath::try_from("./a/".to_string()).unwrap();
        assert_eq!(String::from(p), "a");
    }
}
