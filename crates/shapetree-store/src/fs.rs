//! Filesystem storage.
//!
//! Identifiers below `base` map onto paths below `root`. Containers are
//! directories whose own statements live in a hidden `.container.ttl` file;
//! resources are plain files whose media type is recorded in their metadata
//! under `dcterms:format`.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use shapetree_rdf::{parse_turtle, serialize_turtle, Graph, Prefixes, Term};
use shapetree_types::vocab::dcterms;
use shapetree_types::{check_container_id, parent_container, strip_fragment};
use url::Url;

use crate::error::{StoreError, StoreResult};
use crate::ldp::{add_containment, new_container_graph, strip_containment};
use crate::traits::{
    is_metadata, metadata_location, Representation, ResourceStat, Storage, METADATA_SUFFIX,
};

const CONTAINER_FILE: &str = ".container.ttl";
const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// Storage rooted at a directory on the local filesystem.
#[derive(Clone, Debug)]
pub struct FsStorage {
    root: PathBuf,
    base: Url,
}

fn map_io(id: &Url, err: io::Error) -> StoreError {
    if err.kind() == io::ErrorKind::NotFound {
        StoreError::NotFound(id.to_string())
    } else {
        StoreError::Io(err)
    }
}

impl FsStorage {
    /// Serve identifiers under `base` from the directory `root`.
    pub fn new(root: impl Into<PathBuf>, base: Url) -> StoreResult<Self> {
        check_container_id(&base)?;
        Ok(Self {
            root: root.into(),
            base,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn path_of(&self, id: &Url) -> StoreResult<PathBuf> {
        let id = strip_fragment(id);
        let relative = id
            .as_str()
            .strip_prefix(self.base.as_str())
            .ok_or_else(|| StoreError::OutsideRoot(id.to_string()))?;
        let mut path = self.root.clone();
        for segment in relative.split('/').filter(|s| !s.is_empty()) {
            if segment == ".." || segment == "." {
                return Err(StoreError::OutsideRoot(id.to_string()));
            }
            path.push(segment);
        }
        Ok(path)
    }

    fn is_base(&self, id: &Url) -> bool {
        strip_fragment(id).as_str() == self.base.as_str()
    }

    async fn require_parent(&self, id: &Url) -> StoreResult<()> {
        if self.is_base(id) {
            return Ok(());
        }
        let parent = parent_container(id).ok_or_else(|| StoreError::OutsideRoot(id.to_string()))?;
        let dir = self.path_of(&parent)?;
        match tokio::fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(StoreError::NotAContainer(parent.to_string())),
            Err(e) => Err(map_io(&parent, e)),
        }
    }

    async fn container_dir(&self, id: &Url) -> StoreResult<PathBuf> {
        let dir = self.path_of(id)?;
        if !id.path().ends_with('/') {
            return Err(StoreError::NotAContainer(id.to_string()));
        }
        match tokio::fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => Ok(dir),
            Ok(_) => Err(StoreError::NotAContainer(id.to_string())),
            Err(e) => Err(map_io(id, e)),
        }
    }

    async fn read_graph(&self, path: &Path, base: &Url) -> StoreResult<Option<Graph>> {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => Ok(Some(parse_turtle(&text, Some(base))?.0)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn write_graph(&self, path: &Path, graph: &Graph, prefixes: &Prefixes) -> StoreResult<()> {
        tokio::fs::write(path, serialize_turtle(graph, prefixes)?).await?;
        Ok(())
    }

    async fn children(&self, id: &Url, dir: &Path) -> StoreResult<Vec<Url>> {
        let mut children = Vec::new();
        let mut listing = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = listing.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == CONTAINER_FILE || name.ends_with(METADATA_SUFFIX) {
                continue;
            }
            let segment = if entry.file_type().await?.is_dir() {
                format!("{name}/")
            } else {
                name
            };
            children.push(id.join(&segment)?);
        }
        children.sort();
        Ok(children)
    }
}

#[async_trait]
impl Storage for FsStorage {
    async fn rstat(&self, id: &Url) -> StoreResult<ResourceStat> {
        let path = self.path_of(id)?;
        let meta = tokio::fs::metadata(&path).await.map_err(|e| map_io(id, e))?;
        let wants_container = id.path().ends_with('/');
        if meta.is_dir() != wants_container {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(ResourceStat {
            is_container: meta.is_dir(),
            is_metadata: is_metadata(id),
            metadata_location: metadata_location(id),
            size: (!meta.is_dir()).then(|| meta.len()),
        })
    }

    async fn read(&self, id: &Url) -> StoreResult<Representation> {
        if id.path().ends_with('/') {
            return Err(StoreError::IsAContainer(id.to_string()));
        }
        let path = self.path_of(id)?;
        let body = tokio::fs::read(&path).await.map_err(|e| map_io(id, e))?;
        let media_type = if is_metadata(id) {
            "text/turtle".to_string()
        } else {
            let meta = self.read_metadata(id).await?;
            let format = meta
                .zero_or_one(&Term::from(id), dcterms::FORMAT)?
                .and_then(|t| t.value_str())
                .unwrap_or(DEFAULT_MEDIA_TYPE)
                .to_string();
            format
        };
        Ok(Representation::new(media_type, Bytes::from(body)))
    }

    async fn write(&self, id: &Url, representation: Representation) -> StoreResult<()> {
        if id.path().ends_with('/') {
            return Err(StoreError::IsAContainer(id.to_string()));
        }
        if is_metadata(id) {
            return Err(StoreError::InvalidName {
                name: id.to_string(),
                reason: "reserved for metadata",
            });
        }
        self.require_parent(id).await?;
        let path = self.path_of(id)?;
        if tokio::fs::metadata(&path).await.map(|m| m.is_dir()).unwrap_or(false) {
            return Err(StoreError::IsAContainer(format!("{id}/")));
        }
        tracing::debug!(path = %path.display(), media_type = %representation.media_type, "write resource");
        tokio::fs::write(&path, &representation.body).await?;

        let subject = Term::from(id);
        let mut meta = self.read_metadata(id).await?;
        meta.remove_matching(Some(&subject), Some(dcterms::FORMAT), None);
        meta.add(subject, dcterms::FORMAT, Term::literal(representation.media_type));
        self.write_metadata(id, &meta, &Prefixes::with_defaults()).await
    }

    async fn remove(&self, id: &Url) -> StoreResult<()> {
        if id.path().ends_with('/') {
            return Err(StoreError::IsAContainer(id.to_string()));
        }
        let path = self.path_of(id)?;
        tokio::fs::remove_file(&path).await.map_err(|e| map_io(id, e))?;
        match tokio::fs::remove_file(self.path_of(&metadata_location(id))?).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(StoreError::Io(e)),
            _ => Ok(()),
        }
    }

    async fn read_container(&self, id: &Url, prefixes: &Prefixes) -> StoreResult<String> {
        let dir = self.container_dir(id).await?;
        let mut graph = self
            .read_graph(&dir.join(CONTAINER_FILE), id)
            .await?
            .unwrap_or_else(|| new_container_graph(id, None));
        let children = self.children(id, &dir).await?;
        add_containment(&mut graph, id, &children);
        Ok(serialize_turtle(&graph, prefixes)?)
    }

    async fn write_container(&self, id: &Url, graph: &Graph, prefixes: &Prefixes) -> StoreResult<()> {
        check_container_id(id)?;
        self.require_parent(id).await?;
        let dir = self.path_of(id)?;
        match tokio::fs::metadata(&dir).await {
            Ok(meta) if !meta.is_dir() => return Err(StoreError::NotAContainer(id.to_string())),
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => tokio::fs::create_dir(&dir).await?,
            Err(e) => return Err(StoreError::Io(e)),
        }
        self.write_graph(&dir.join(CONTAINER_FILE), &strip_containment(id, graph), prefixes)
            .await
    }

    async fn remove_container(&self, id: &Url) -> StoreResult<()> {
        let dir = self.container_dir(id).await?;
        if self.is_base(id) {
            return Err(StoreError::OutsideRoot(id.to_string()));
        }
        tracing::debug!(path = %dir.display(), "remove container");
        tokio::fs::remove_dir_all(&dir).await?;
        Ok(())
    }

    async fn ensure_container(
        &self,
        id: &Url,
        prefixes: &Prefixes,
        title: Option<&str>,
    ) -> StoreResult<String> {
        check_container_id(id)?;
        let mut missing = Vec::new();
        let mut cursor = strip_fragment(id);
        loop {
            let dir = self.path_of(&cursor)?;
            match tokio::fs::metadata(&dir).await {
                Ok(meta) if meta.is_dir() => break,
                Ok(_) => return Err(StoreError::NotAContainer(cursor.to_string())),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(StoreError::Io(e)),
            }
            let at_base = self.is_base(&cursor);
            let parent = parent_container(&cursor);
            missing.push((cursor, dir));
            match parent {
                Some(parent) if !at_base => cursor = parent,
                _ => break,
            }
        }
        for (created, dir) in missing.iter().rev() {
            let title = if created == id { title } else { None };
            tracing::debug!(path = %dir.display(), "create container");
            tokio::fs::create_dir(dir).await?;
            self.write_graph(&dir.join(CONTAINER_FILE), &new_container_graph(created, title), prefixes)
                .await?;
        }
        self.read_container(id, prefixes).await
    }

    async fn read_metadata(&self, id: &Url) -> StoreResult<Graph> {
        let path = self.path_of(&metadata_location(id))?;
        Ok(self.read_graph(&path, id).await?.unwrap_or_default())
    }

    async fn write_metadata(&self, id: &Url, graph: &Graph, prefixes: &Prefixes) -> StoreResult<()> {
        tokio::fs::metadata(self.path_of(id)?)
            .await
            .map_err(|e| map_io(id, e))?;
        let path = self.path_of(&metadata_location(id))?;
        self.write_graph(&path, graph, prefixes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapetree_types::vocab::ldp;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn storage(dir: &tempfile::TempDir) -> FsStorage {
        FsStorage::new(dir.path().join("data"), url("http://localhost:12345/")).unwrap()
    }

    #[tokio::test]
    async fn containers_are_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let s = storage(&tmp);
        let p = Prefixes::with_defaults();
        s.ensure_container(&url("http://localhost:12345/Apps/repos/"), &p, Some("Repos"))
            .await
            .unwrap();
        assert!(tmp.path().join("data/Apps/repos").is_dir());
        assert!(tmp.path().join("data/Apps/repos/.container.ttl").is_file());
        let text = s
            .read_container(&url("http://localhost:12345/Apps/"), &p)
            .await
            .unwrap();
        let (g, _) = parse_turtle(&text, None).unwrap();
        let kids: Vec<_> = g
            .objects(&Term::iri("http://localhost:12345/Apps/"), ldp::CONTAINS)
            .collect();
        assert_eq!(kids, vec![&Term::iri("http://localhost:12345/Apps/repos/")]);
    }

    #[tokio::test]
    async fn resources_keep_their_media_type() {
        let tmp = tempfile::tempdir().unwrap();
        let s = storage(&tmp);
        let p = Prefixes::with_defaults();
        let parent = url("http://localhost:12345/docs/");
        s.ensure_container(&parent, &p, None).await.unwrap();
        let id = parent.join("note.json").unwrap();
        s.write(&id, Representation::new("application/ld+json", "{}"))
            .await
            .unwrap();
        let got = s.read(&id).await.unwrap();
        assert_eq!(got.media_type, "application/ld+json");
        assert_eq!(&got.body[..], b"{}");

        let listing = s.read_container(&parent, &p).await.unwrap();
        assert!(!listing.contains(".meta"));
        s.remove(&id).await.unwrap();
        assert!(!tmp.path().join("data/docs/note.json.meta").exists());
    }

    #[tokio::test]
    async fn outside_base_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let s = storage(&tmp);
        let err = s
            .ensure_container(&url("http://elsewhere/x/"), &Prefixes::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::OutsideRoot(_)));
    }

    #[tokio::test]
    async fn container_and_resource_ids_are_distinct() {
        let tmp = tempfile::tempdir().unwrap();
        let s = storage(&tmp);
        s.ensure_container(&url("http://localhost:12345/a/"), &Prefixes::new(), None)
            .await
            .unwrap();
        assert!(s.exists(&url("http://localhost:12345/a/")).await.unwrap());
        assert!(!s.exists(&url("http://localhost:12345/a")).await.unwrap());
    }

    #[tokio::test]
    async fn written_containment_is_not_persisted() {
        let tmp = tempfile::tempdir().unwrap();
        let s = storage(&tmp);
        let p = Prefixes::with_defaults();
        let id = url("http://localhost:12345/c/");
        s.ensure_container(&id, &p, None).await.unwrap();
        let mut g = new_container_graph(&id, None);
        g.add(Term::from(&id), ldp::CONTAINS, Term::iri("http://localhost:12345/c/ghost"));
        s.write_container(&id, &g, &p).await.unwrap();
        let text = s.read_container(&id, &p).await.unwrap();
        assert!(!text.contains("ghost"));
    }
}
