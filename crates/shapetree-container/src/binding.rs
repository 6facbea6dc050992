//! The statements tying a managed container to its ShapeTree.

use shapetree_rdf::{Graph, Term};
use shapetree_types::vocab::tree;
use shapetree_types::InstancePath;
use url::Url;

use crate::error::{ContainerError, ContainerResult};

/// Where a managed container sits inside a planted ShapeTree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShapeTreeBinding {
    /// The schema node the instance was planted from, fragment included.
    pub schema_root: Url,
    /// Position of this container relative to the instance root.
    pub instance_path: InstancePath,
    /// The container the instance was planted at.
    pub instance_root: Url,
}

/// How [`crate::Container::into_managed`] obtains the binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingOrigin {
    /// The container was just created: synthesize the binding and persist it.
    Planted,
    /// The container already existed: read the binding from its statements.
    Existing,
}

impl ShapeTreeBinding {
    /// Derive the binding for the container `id`.
    pub fn derive(id: &Url, schema_root: Url, instance_path: InstancePath) -> ContainerResult<Self> {
        let instance_root = instance_path.instance_root(id)?;
        Ok(Self {
            schema_root,
            instance_path,
            instance_root,
        })
    }

    /// Read the binding off `id`'s statements, if it has one.
    pub fn from_graph(graph: &Graph, id: &Url) -> ContainerResult<Option<Self>> {
        let subject = Term::from(id);
        let Some(root) = graph.zero_or_one(&subject, tree::SHAPE_TREE_ROOT)? else {
            return Ok(None);
        };
        let schema_root = iri(root, id)?;
        let instance_path = match graph.zero_or_one(&subject, tree::SHAPE_TREE_INSTANCE_PATH)? {
            Some(term) => InstancePath::parse(term.value_str().unwrap_or_default())?,
            None => InstancePath::root(),
        };
        let binding = Self::derive(id, schema_root, instance_path)?;
        if let Some(stored) = graph.zero_or_one(&subject, tree::SHAPE_TREE_INSTANCE_ROOT)? {
            let stored = iri(stored, id)?;
            if stored != binding.instance_root {
                return Err(ContainerError::InconsistentBinding {
                    id: id.to_string(),
                    expected: binding.instance_root.to_string(),
                    found: stored.to_string(),
                });
            }
        }
        Ok(Some(binding))
    }

    /// Replace any binding statements about `id` in `graph` with this binding.
    pub fn apply(&self, graph: &mut Graph, id: &Url) {
        let subject = Term::from(id);
        Self::clear(graph, id);
        graph.add(subject.clone(), tree::SHAPE_TREE_ROOT, Term::from(&self.schema_root));
        graph.add(
            subject.clone(),
            tree::SHAPE_TREE_INSTANCE_PATH,
            Term::literal(self.instance_path.as_str()),
        );
        graph.add(subject, tree::SHAPE_TREE_INSTANCE_ROOT, Term::from(&self.instance_root));
    }

    /// Drop every binding statement about `id`.
    pub fn clear(graph: &mut Graph, id: &Url) {
        let subject = Term::from(id);
        for predicate in [
            tree::SHAPE_TREE_ROOT,
            tree::SHAPE_TREE_INSTANCE_PATH,
            tree::SHAPE_TREE_INSTANCE_ROOT,
        ] {
            graph.remove_matching(Some(&subject), Some(predicate), None);
        }
    }
}

fn iri(term: &Term, id: &Url) -> ContainerResult<Url> {
    let text = term
        .as_iri()
        .ok_or_else(|| ContainerError::MissingBinding(id.to_string()))?;
    Url::parse(text).map_err(|e| {
        ContainerError::Rdf(shapetree_rdf::RdfError::BadIri {
            iri: text.to_string(),
            reason: e.to_string(),
        })
    })
}
