//! In-memory storage for tests and ephemeral servers.
//!
//! [`InMemoryStorage`] keeps every container, resource and metadata graph in
//! one ordered map behind a `RwLock`. Ordering by identifier makes subtree
//! removal and child listing simple prefix scans.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use shapetree_rdf::{serialize_turtle, Graph, Prefixes};
use shapetree_types::{check_container_id, parent_container, strip_fragment};
use url::Url;

use crate::error::{StoreError, StoreResult};
use crate::ldp::{add_containment, is_direct_child, new_container_graph, strip_containment};
use crate::traits::{is_metadata, metadata_location, Representation, ResourceStat, Storage};

#[derive(Clone, Debug)]
enum Entry {
    Container(Graph),
    Resource(Representation),
    Metadata(Graph),
}

/// An in-memory implementation of [`Storage`]. Data is lost on drop.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    entries: RwLock<BTreeMap<String, Entry>>,
}

fn key(id: &Url) -> String {
    strip_fragment(id).to_string()
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, metadata included.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_entries(&self) -> StoreResult<RwLockReadGuard<'_, BTreeMap<String, Entry>>> {
        self.entries
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn write_entries(&self) -> StoreResult<RwLockWriteGuard<'_, BTreeMap<String, Entry>>> {
        self.entries
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn render_container(
        entries: &BTreeMap<String, Entry>,
        id: &Url,
        prefixes: &Prefixes,
    ) -> StoreResult<String> {
        let k = key(id);
        let mut graph = match entries.get(&k) {
            Some(Entry::Container(graph)) => graph.clone(),
            Some(_) => return Err(StoreError::NotAContainer(k)),
            None => return Err(StoreError::NotFound(k)),
        };
        let children = entries
            .range(k.clone()..)
            .take_while(|(child, _)| child.starts_with(&k))
            .filter(|(child, _)| is_direct_child(&k, child))
            .map(|(child, _)| Url::parse(child))
            .collect::<Result<Vec<_>, _>>()?;
        add_containment(&mut graph, id, &children);
        Ok(serialize_turtle(&graph, prefixes)?)
    }
}

/// Fail unless the container holding `id` exists. Origin roots have no parent.
fn require_parent(entries: &BTreeMap<String, Entry>, id: &Url) -> StoreResult<()> {
    let Some(parent) = parent_container(id) else {
        return Ok(());
    };
    match entries.get(&key(&parent)) {
        Some(Entry::Container(_)) => Ok(()),
        Some(_) => Err(StoreError::NotAContainer(parent.to_string())),
        None => Err(StoreError::NotFound(parent.to_string())),
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn rstat(&self, id: &Url) -> StoreResult<ResourceStat> {
        let entries = self.read_entries()?;
        let k = key(id);
        let (is_container, size) = match entries.get(&k) {
            Some(Entry::Container(_)) => (true, None),
            Some(Entry::Resource(r)) => (false, Some(r.body.len() as u64)),
            Some(Entry::Metadata(g)) => (false, Some(g.len() as u64)),
            None => return Err(StoreError::NotFound(k)),
        };
        Ok(ResourceStat {
            is_container,
            is_metadata: is_metadata(id),
            metadata_location: metadata_location(id),
            size,
        })
    }

    async fn read(&self, id: &Url) -> StoreResult<Representation> {
        let entries = self.read_entries()?;
        let k = key(id);
        match entries.get(&k) {
            Some(Entry::Resource(r)) => Ok(r.clone()),
            Some(Entry::Metadata(g)) => Ok(Representation::turtle(serialize_turtle(
                g,
                &Prefixes::with_defaults(),
            )?)),
            Some(Entry::Container(_)) => Err(StoreError::IsAContainer(k)),
            None => Err(StoreError::NotFound(k)),
        }
    }

    async fn write(&self, id: &Url, representation: Representation) -> StoreResult<()> {
        let k = key(id);
        if k.ends_with('/') {
            return Err(StoreError::IsAContainer(k));
        }
        if is_metadata(id) {
            return Err(StoreError::InvalidName {
                name: k,
                reason: "reserved for metadata",
            });
        }
        let mut entries = self.write_entries()?;
        require_parent(&entries, id)?;
        if entries.contains_key(&format!("{k}/")) {
            return Err(StoreError::IsAContainer(format!("{k}/")));
        }
        tracing::debug!(id = %k, media_type = %representation.media_type, "write resource");
        entries.insert(k, Entry::Resource(representation));
        Ok(())
    }

    async fn remove(&self, id: &Url) -> StoreResult<()> {
        let mut entries = self.write_entries()?;
        let k = key(id);
        match entries.get(&k) {
            Some(Entry::Resource(_)) | Some(Entry::Metadata(_)) => {}
            Some(Entry::Container(_)) => return Err(StoreError::IsAContainer(k)),
            None => return Err(StoreError::NotFound(k)),
        }
        entries.remove(&k);
        entries.remove(&key(&metadata_location(id)));
        Ok(())
    }

    async fn read_container(&self, id: &Url, prefixes: &Prefixes) -> StoreResult<String> {
        let entries = self.read_entries()?;
        Self::render_container(&entries, id, prefixes)
    }

    async fn write_container(&self, id: &Url, graph: &Graph, _prefixes: &Prefixes) -> StoreResult<()> {
        check_container_id(id)?;
        let mut entries = self.write_entries()?;
        let k = key(id);
        match entries.get(&k) {
            Some(Entry::Container(_)) | None => {}
            Some(_) => return Err(StoreError::NotAContainer(k)),
        }
        require_parent(&entries, id)?;
        entries.insert(k, Entry::Container(strip_containment(id, graph)));
        Ok(())
    }

    async fn remove_container(&self, id: &Url) -> StoreResult<()> {
        let mut entries = self.write_entries()?;
        let k = key(id);
        match entries.get(&k) {
            Some(Entry::Container(_)) => {}
            Some(_) => return Err(StoreError::NotAContainer(k)),
            None => return Err(StoreError::NotFound(k)),
        }
        let doomed: Vec<String> = entries
            .range(k.clone()..)
            .take_while(|(child, _)| child.starts_with(&k))
            .map(|(child, _)| child.clone())
            .collect();
        tracing::debug!(id = %k, removed = doomed.len(), "remove container");
        for child in doomed {
            entries.remove(&child);
        }
        Ok(())
    }

    async fn ensure_container(
        &self,
        id: &Url,
        prefixes: &Prefixes,
        title: Option<&str>,
    ) -> StoreResult<String> {
        check_container_id(id)?;
        let mut entries = self.write_entries()?;

        // Collect missing ancestors up to the first one that exists.
        let mut missing = Vec::new();
        let mut cursor = Some(strip_fragment(id));
        while let Some(current) = cursor {
            match entries.get(&key(&current)) {
                Some(Entry::Container(_)) => break,
                Some(_) => return Err(StoreError::NotAContainer(current.to_string())),
                None => {
                    cursor = parent_container(&current);
                    missing.push(current);
                }
            }
        }
        for created in missing.iter().rev() {
            let title = if created == id { title } else { None };
            tracing::debug!(id = %created, "create container");
            entries.insert(key(created), Entry::Container(new_container_graph(created, title)));
        }
        Self::render_container(&entries, id, prefixes)
    }

    async fn read_metadata(&self, id: &Url) -> StoreResult<Graph> {
        let entries = self.read_entries()?;
        match entries.get(&key(&metadata_location(id))) {
            Some(Entry::Metadata(graph)) => Ok(graph.clone()),
            _ => Ok(Graph::new()),
        }
    }

    async fn write_metadata(&self, id: &Url, graph: &Graph, _prefixes: &Prefixes) -> StoreResult<()> {
        let mut entries = self.write_entries()?;
        let k = key(id);
        if !entries.contains_key(&k) {
            return Err(StoreError::NotFound(k));
        }
        entries.insert(key(&metadata_location(id)), Entry::Metadata(graph.clone()));
        Ok(())
    }
}
