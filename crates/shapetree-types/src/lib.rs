//! Foundation types for ShapeTrees.
//!
//! This crate provides the identifier rules, instance-path arithmetic, and
//! RDF vocabularies shared by every other ShapeTree crate.
//!
//! # Key Items
//!
//! - [`check_container_id`]: the trailing-separator rule for container identifiers
//! - [`InstancePath`]: a position inside a planted ShapeTree instance
//! - [`vocab`]: LDP, ShapeTree, SHACL and ecosystem namespaces

pub mod error;
pub mod id;
pub mod path;
pub mod vocab;

pub use error::IdError;
pub use id::{
    check_container_id, ensure_trailing_slash, last_segment, parent_container, parse_container_id,
    strip_fragment,
};
pub use path::InstancePath;
