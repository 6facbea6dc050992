//! RDF primitives for ShapeTrees.
//!
//! A small RDF 1.1 model (terms, triples, a deduplicated ordered [`Graph`],
//! prefix maps) with Turtle and JSON-LD syntax handled by the sophia crates.
//!
//! # Design Rules
//!
//! 1. Graphs are sets: inserting a present triple is a no-op.
//! 2. Blank node labels are freshened on every parse, so merging parsed
//!    graphs never conflates blank nodes from different documents.
//! 3. Relative IRIs are always resolved against the base given to the parser.

mod bridge;
pub mod error;
pub mod format;
pub mod graph;
pub mod jsonld;
pub mod prefixes;
pub mod term;
pub mod turtle;

pub use error::{RdfError, RdfResult};
pub use format::{parse, RdfFormat};
pub use graph::Graph;
pub use prefixes::Prefixes;
pub use term::{Literal, Term, Triple};
pub use turtle::{parse_turtle, serialize_turtle};
