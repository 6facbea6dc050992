//! Container model for ShapeTrees.
//!
//! A [`Container`] is the in-memory view of one LDP container: its
//! statements, its prefixes, the members it knows about, and, once bound,
//! its [`ShapeTreeBinding`]. All mutation goes through the container's
//! [`SequentialLock`], which admits critical sections strictly in the order
//! they were requested.
//!
//! # Modules
//!
//! - [`lock`] -- FIFO lock with scoped guards
//! - [`binding`] -- the three statements that make a container managed
//! - [`container`] -- open, merge, membership, persistence and promotion

pub mod binding;
pub mod container;
pub mod error;
pub mod lock;

pub use binding::{BindingOrigin, ShapeTreeBinding};
pub use container::{Container, ContainerKind, Payload};
pub use error::{ContainerError, ContainerResult};
pub use lock::{SequenceGuard, SequentialLock};
