use async_trait::async_trait;
use bytes::Bytes;
use shapetree_rdf::{Graph, Prefixes};
use url::Url;

use crate::error::{StoreError, StoreResult};
use crate::naming::first_available_name;

/// Result of [`Storage::rstat`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceStat {
    pub is_container: bool,
    pub is_metadata: bool,
    pub metadata_location: Url,
    pub size: Option<u64>,
}

/// A stored body and its media type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Representation {
    pub media_type: String,
    pub body: Bytes,
}

impl Representation {
    pub fn new(media_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            media_type: media_type.into(),
            body: body.into(),
        }
    }

    pub fn turtle(text: impl Into<String>) -> Self {
        Self::new("text/turtle", text.into())
    }
}

/// Suffix appended to an identifier to name its metadata resource.
pub const METADATA_SUFFIX: &str = ".meta";

/// Where the metadata for `id` lives.
///
/// Containers keep it as a `.meta` child; resources as a `<name>.meta` sibling.
pub fn metadata_location(id: &Url) -> Url {
    let mut meta = id.clone();
    meta.set_fragment(None);
    meta.set_path(&format!("{}{METADATA_SUFFIX}", id.path()));
    meta
}

/// Whether `id` names a metadata resource.
pub fn is_metadata(id: &Url) -> bool {
    id.path().ends_with(METADATA_SUFFIX)
}

/// Durable LDP storage.
///
/// Implementations must satisfy these invariants:
/// - Container identifiers end in `/`; resource identifiers do not.
/// - `ldp:contains` is server-managed: `read_container` reports every direct
///   child that currently exists, and `write_container` never persists
///   containment statements of its own.
/// - Missing targets fail with [`StoreError::NotFound`].
/// - Writes require the parent container to exist.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Describe a resource; fails with `NotFound` if it does not exist.
    async fn rstat(&self, id: &Url) -> StoreResult<ResourceStat>;

    /// Read a non-container resource.
    async fn read(&self, id: &Url) -> StoreResult<Representation>;

    /// Create or replace a non-container resource.
    async fn write(&self, id: &Url, representation: Representation) -> StoreResult<()>;

    /// Delete a non-container resource and its metadata.
    async fn remove(&self, id: &Url) -> StoreResult<()>;

    /// Read a container's statements as Turtle, containment included.
    async fn read_container(&self, id: &Url, prefixes: &Prefixes) -> StoreResult<String>;

    /// Replace a container's statements.
    async fn write_container(&self, id: &Url, graph: &Graph, prefixes: &Prefixes) -> StoreResult<()>;

    /// Delete a container together with everything below it.
    async fn remove_container(&self, id: &Url) -> StoreResult<()>;

    /// Create the container if missing, then return it as [`Storage::read_container`] would.
    async fn ensure_container(
        &self,
        id: &Url,
        prefixes: &Prefixes,
        title: Option<&str>,
    ) -> StoreResult<String>;

    async fn read_metadata(&self, id: &Url) -> StoreResult<Graph>;

    async fn write_metadata(&self, id: &Url, graph: &Graph, prefixes: &Prefixes) -> StoreResult<()>;

    async fn exists(&self, id: &Url) -> StoreResult<bool> {
        match self.rstat(id).await {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Create a new container under `parent` at the first free name derived from `base`.
    async fn invent_container(
        &self,
        parent: &Url,
        base: &str,
        prefixes: &Prefixes,
        title: Option<&str>,
    ) -> StoreResult<Url> {
        let id = first_available_name(self, parent, base, true).await?;
        self.ensure_container(&id, prefixes, title).await?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_locations() {
        let c = Url::parse("http://h/a/").unwrap();
        assert_eq!(metadata_location(&c).as_str(), "http://h/a/.meta");
        let r = Url::parse("http://h/a/x.ttl").unwrap();
        assert_eq!(metadata_location(&r).as_str(), "http://h/a/x.ttl.meta");
        assert!(is_metadata(&metadata_location(&r)));
        assert!(!is_metadata(&r));
    }

    #[test]
    fn turtle_representation() {
        let r = Representation::turtle("<a> <b> <c> .");
        assert_eq!(r.media_type, "text/turtle");
        assert_eq!(&r.body[..], b"<a> <b> <c> .");
    }
}
