//! One node of the LDP hierarchy, plain or bound to a ShapeTree.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use shapetree_rdf::{parse, parse_turtle, Graph, Prefixes, RdfFormat, Term};
use shapetree_store::Storage;
use shapetree_types::check_container_id;
use shapetree_types::vocab::ldp;
use url::Url;

use crate::binding::{BindingOrigin, ShapeTreeBinding};
use crate::error::{ContainerError, ContainerResult};
use crate::lock::SequentialLock;

/// Whether a container is bound to a ShapeTree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContainerKind {
    Plain,
    Managed(ShapeTreeBinding),
}

/// Input accepted by [`Container::merge`].
#[derive(Clone, Debug)]
pub enum Payload<'a> {
    /// Already parsed statements.
    Graph(Graph),
    /// A serialized body; `None` sniffs the format.
    Text {
        body: &'a str,
        format: Option<RdfFormat>,
    },
}

#[derive(Debug)]
struct State {
    graph: Graph,
    prefixes: Prefixes,
    members: BTreeSet<Url>,
    kind: ContainerKind,
}

/// An in-memory view of one container backed by [`Storage`].
///
/// Every mutating operation runs under the container's [`SequentialLock`], so
/// overlapping calls on the same instance take effect in issue order. Two
/// instances opened on the same identifier do not coordinate.
pub struct Container {
    id: Url,
    storage: Arc<dyn Storage>,
    lock: SequentialLock,
    state: Mutex<State>,
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("id", &self.id.as_str())
            .field("managed", &self.is_managed())
            .finish_non_exhaustive()
    }
}

fn members_of(graph: &Graph, id: &Url) -> BTreeSet<Url> {
    graph
        .objects(&Term::from(id), ldp::CONTAINS)
        .filter_map(|t| t.as_iri())
        .filter_map(|iri| Url::parse(iri).ok())
        .collect()
}

impl Container {
    /// Load the container at `id`, creating it in storage if it is missing.
    pub async fn open(
        storage: Arc<dyn Storage>,
        id: &Url,
        prefixes: &Prefixes,
    ) -> ContainerResult<Self> {
        check_container_id(id)?;
        let container = Self::from_parts(storage, id.clone(), Graph::new(), prefixes.clone())?;
        {
            let _guard = container.lock.acquire().await;
            let text = container.storage.ensure_container(id, prefixes, None).await?;
            let (graph, parsed) = parse_turtle(&text, Some(id))?;
            let mut state = container.state()?;
            state.prefixes.merge(&parsed);
            Self::absorb(&mut state, &container.id, graph)?;
        }
        tracing::debug!(id = %id, managed = container.is_managed(), "opened container");
        Ok(container)
    }

    /// Build a container from statements the caller already holds. No storage I/O.
    pub fn from_graph(
        storage: Arc<dyn Storage>,
        id: &Url,
        graph: Graph,
        prefixes: Prefixes,
    ) -> ContainerResult<Self> {
        check_container_id(id)?;
        Self::from_parts(storage, id.clone(), graph, prefixes)
    }

    fn from_parts(
        storage: Arc<dyn Storage>,
        id: Url,
        graph: Graph,
        prefixes: Prefixes,
    ) -> ContainerResult<Self> {
        let mut state = State {
            graph: Graph::new(),
            prefixes,
            members: BTreeSet::new(),
            kind: ContainerKind::Plain,
        };
        Self::absorb(&mut state, &id, graph)?;
        Ok(Self {
            id,
            storage,
            lock: SequentialLock::new(),
            state: Mutex::new(state),
        })
    }

    /// Union `graph` into the state and refresh what is derived from it.
    fn absorb(state: &mut State, id: &Url, graph: Graph) -> ContainerResult<()> {
        state.members.extend(members_of(&graph, id));
        state.graph.extend(graph);
        if let Some(binding) = ShapeTreeBinding::from_graph(&state.graph, id)? {
            state.kind = ContainerKind::Managed(binding);
        }
        Ok(())
    }

    fn state(&self) -> ContainerResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|e| ContainerError::Poisoned(e.to_string()))
    }

    pub fn id(&self) -> &Url {
        &self.id
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// A snapshot of the current statements.
    pub fn graph(&self) -> ContainerResult<Graph> {
        Ok(self.state()?.graph.clone())
    }

    pub fn prefixes(&self) -> ContainerResult<Prefixes> {
        Ok(self.state()?.prefixes.clone())
    }

    /// Children known through containment statements.
    pub fn members(&self) -> ContainerResult<Vec<Url>> {
        Ok(self.state()?.members.iter().cloned().collect())
    }

    pub fn kind(&self) -> ContainerResult<ContainerKind> {
        Ok(self.state()?.kind.clone())
    }

    pub fn is_managed(&self) -> bool {
        self.state
            .lock()
            .map(|s| matches!(s.kind, ContainerKind::Managed(_)))
            .unwrap_or(false)
    }

    pub fn binding(&self) -> ContainerResult<Option<ShapeTreeBinding>> {
        Ok(match &self.state()?.kind {
            ContainerKind::Managed(binding) => Some(binding.clone()),
            ContainerKind::Plain => None,
        })
    }

    /// Persist the current statements.
    pub async fn write(&self) -> ContainerResult<()> {
        let _guard = self.lock.acquire().await;
        self.persist().await
    }

    /// Write the current statements; the caller holds the lock.
    async fn persist(&self) -> ContainerResult<()> {
        let (graph, prefixes) = {
            let state = self.state()?;
            (state.graph.clone(), state.prefixes.clone())
        };
        self.storage.write_container(&self.id, &graph, &prefixes).await?;
        tracing::debug!(id = %self.id, triples = graph.len(), "wrote container");
        Ok(())
    }

    /// Delete the backing container and everything below it.
    pub async fn remove(&self) -> ContainerResult<()> {
        let _guard = self.lock.acquire().await;
        self.storage.remove_container(&self.id).await?;
        tracing::debug!(id = %self.id, "removed container");
        Ok(())
    }

    /// Parse `payload` relative to `base` (unless already a graph) and union it in.
    pub async fn merge(&self, payload: Payload<'_>, base: &Url) -> ContainerResult<()> {
        let _guard = self.lock.acquire().await;
        let (graph, prefixes) = match payload {
            Payload::Graph(graph) => (graph, Prefixes::new()),
            Payload::Text { body, format } => parse(body, format, Some(base))?,
        };
        let mut state = self.state()?;
        state.prefixes.merge(&prefixes);
        Self::absorb(&mut state, &self.id, graph)
    }

    /// Record `child` as a member. Call [`Container::write`] to persist.
    pub async fn add_member(&self, child: &Url) -> ContainerResult<()> {
        let _guard = self.lock.acquire().await;
        let mut state = self.state()?;
        state
            .graph
            .add(Term::from(&self.id), ldp::CONTAINS, Term::from(child));
        state.members.insert(child.clone());
        Ok(())
    }

    /// Exact inverse of [`Container::add_member`].
    pub async fn remove_member(&self, child: &Url) -> ContainerResult<()> {
        let _guard = self.lock.acquire().await;
        let mut state = self.state()?;
        state.graph.remove_matching(
            Some(&Term::from(&self.id)),
            Some(ldp::CONTAINS),
            Some(&Term::from(child)),
        );
        state.members.remove(child);
        Ok(())
    }

    /// Bind this container to a ShapeTree.
    ///
    /// A [`BindingOrigin::Planted`] container gets the binding synthesized from
    /// `schema_root` and `instance_path` and persisted immediately. An
    /// [`BindingOrigin::Existing`] one must already carry binding statements,
    /// which win over the arguments.
    pub async fn into_managed(
        self,
        schema_root: &Url,
        instance_path: shapetree_types::InstancePath,
        origin: BindingOrigin,
    ) -> ContainerResult<Self> {
        match origin {
            BindingOrigin::Planted => {
                let binding = ShapeTreeBinding::derive(&self.id, schema_root.clone(), instance_path)?;
                let guard = self.lock.acquire().await;
                {
                    let mut state = self.state()?;
                    binding.apply(&mut state.graph, &self.id);
                    state.kind = ContainerKind::Managed(binding.clone());
                }
                self.persist().await?;
                drop(guard);
                tracing::info!(
                    id = %self.id,
                    schema = %binding.schema_root,
                    path = %binding.instance_path,
                    "bound container to shape tree"
                );
            }
            BindingOrigin::Existing => {
                let _guard = self.lock.acquire().await;
                let mut state = self.state()?;
                let binding = ShapeTreeBinding::from_graph(&state.graph, &self.id)?
                    .ok_or_else(|| ContainerError::MissingBinding(self.id.to_string()))?;
                state.kind = ContainerKind::Managed(binding);
            }
        }
        Ok(self)
    }

    /// The binding statements read back from the current graph.
    pub fn bound_schema(&self) -> ContainerResult<ShapeTreeBinding> {
        let state = self.state()?;
        ShapeTreeBinding::from_graph(&state.graph, &self.id)?
            .ok_or_else(|| ContainerError::MissingBinding(self.id.to_string()))
    }
}
