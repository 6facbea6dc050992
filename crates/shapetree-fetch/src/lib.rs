//! Remote retrieval for ShapeTrees.
//!
//! Schemas are fetched through the [`Fetch`] trait. [`HttpFetcher`] talks to
//! the network, [`MemoryFetcher`] serves a fixed table, and
//! [`CachingFetcher`] wraps either so repeated resolution of the same schema
//! costs one real request and keeps working offline afterwards.

pub mod cache;
pub mod error;
pub mod http;
pub mod memory;
pub mod response;
pub mod traits;

pub use cache::{cache_key, decode_entry, encode_entry, CachingFetcher};
pub use error::{FetchError, FetchResult};
pub use http::{HttpFetcher, ACCEPT};
pub use memory::MemoryFetcher;
pub use response::FetchResponse;
pub use traits::Fetch;
