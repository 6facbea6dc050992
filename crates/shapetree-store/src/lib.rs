//! LDP storage for ShapeTrees.
//!
//! A [`Storage`] holds containers, non-container resources and per-resource
//! metadata graphs, all addressed by absolute URL.
//!
//! # Backends
//!
//! - [`InMemoryStorage`] -- ordered map behind a `RwLock`, for tests and ephemeral servers
//! - [`FsStorage`] -- directories and files under a local root
//!
//! [`StorageRegistry`] hands out one shared backend per [`StorageConfig`].
//!
//! # Rules
//!
//! 1. Containment (`ldp:contains`) is derived from what exists, never stored.
//! 2. Writes require the parent container; `ensure_container` creates ancestors.
//! 3. Fresh names always come from [`first_available_name`], whichever caller needs one.
//! 4. Metadata for `X` lives at `X.meta` and never appears as a child.

pub mod error;
pub mod fs;
pub mod ldp;
pub mod memory;
pub mod naming;
pub mod registry;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FsStorage;
pub use memory::InMemoryStorage;
pub use naming::{candidate_name, first_available_name, validate_segment, MAX_NAME_ATTEMPTS};
pub use registry::{StorageConfig, StorageRegistry};
pub use traits::{
    is_metadata, metadata_location, Representation, ResourceStat, Storage, METADATA_SUFFIX,
};
