//! ShapeTree schemas.
//!
//! A [`RemoteShapeTree`] is a fetched schema document plus a cursor into its
//! `tree:contents` forest. It answers three questions for the protocol:
//!
//! - which schema node a request lands on ([`RemoteShapeTree::resolve_root_node`],
//!   [`RemoteShapeTree::match_step`]),
//! - what must exist beneath a new container ([`RemoteShapeTree::instantiate_static`]),
//! - whether a payload satisfies its shape ([`RemoteShapeTree::validate`]).
//!
//! Errors that the protocol recognizes carry their HTTP status; see
//! [`SchemaError::is_managed`].

pub mod error;
pub mod instantiate;
pub mod step;
pub mod template;
pub mod tree;
pub mod validate;

pub use error::{SchemaError, SchemaResult};
pub use step::{ExpectedType, ShapeTreeStep};
pub use template::UriTemplate;
pub use tree::{fetch_graph, RemoteShapeTree};
pub use validate::{
    validate_payload, ShaclLite, ShaclLiteFactory, ShapeValidator, ValidationIssue,
    ValidationReport, ValidatorFactory,
};
