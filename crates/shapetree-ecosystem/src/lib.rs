//! Application-level hooks around planting.
//!
//! The protocol asks an [`Ecosystem`] whether an instance of a schema can be
//! reused under a parent, tells it about instances it creates or rolls back,
//! and lets it describe a freshly planted instance to the client.
//! [`MetadataEcosystem`] keeps all of that in storage metadata.

use std::sync::Arc;

use async_trait::async_trait;
use shapetree_container::Container;
use shapetree_rdf::{Graph, Prefixes, RdfError, Term};
use shapetree_store::{Storage, StoreError};
use shapetree_types::vocab::{eco, rdf};
use url::Url;

/// Errors from ecosystem hooks.
#[derive(Debug, thiserror::Error)]
pub enum EcosystemError {
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("rdf error: {0}")]
    Rdf(#[from] RdfError),

    /// The plant request body does not describe an application.
    #[error("bad instantiation payload: {0}")]
    BadPayload(String),
}

pub type EcosystemResult<T> = Result<T, EcosystemError>;

/// What a plant request body says about the application being planted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InstantiationPayload {
    /// The request statements as parsed.
    pub planted: Graph,
    /// Suggested instance name (`eco:name`), if any.
    pub name: Option<String>,
}

#[async_trait]
pub trait Ecosystem: Send + Sync {
    /// An existing instance of `schema` under `parent` that a new plant may reuse.
    async fn reuse_shape_tree(&self, parent: &Container, schema: &Url) -> EcosystemResult<Option<Url>>;

    async fn index_installed_shape_tree(
        &self,
        parent: &Container,
        instance: &Url,
        schema: &Url,
    ) -> EcosystemResult<()>;

    async fn unindex_installed_shape_tree(
        &self,
        parent: &Container,
        instance: &Url,
        schema: &Url,
    ) -> EcosystemResult<()>;

    /// Record the application behind `instance` and describe it for the response.
    async fn register_instance(
        &self,
        app: &InstantiationPayload,
        schema: &Url,
        instance: &Url,
    ) -> EcosystemResult<(Graph, Prefixes)>;

    fn parse_instantiation_payload(&self, graph: Graph) -> EcosystemResult<InstantiationPayload>;
}

/// Keeps the instance index in the parent container's metadata:
/// `<parent> eco:hasShapeTreeInstance <instance>` and
/// `<instance> eco:shapeTreeRoot <schema>`.
#[derive(Clone)]
pub struct MetadataEcosystem {
    storage: Arc<dyn Storage>,
}

impl std::fmt::Debug for MetadataEcosystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataEcosystem").finish_non_exhaustive()
    }
}

impl MetadataEcosystem {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Instances of `schema` recorded under `parent`.
    pub async fn installed(&self, parent: &Url, schema: &Url) -> EcosystemResult<Vec<Url>> {
        let meta = self.storage.read_metadata(parent).await?;
        let schema = Term::from(schema);
        let mut found = Vec::new();
        for instance in meta.objects(&Term::from(parent), eco::HAS_SHAPE_TREE_INSTANCE) {
            let matches = meta
                .objects(instance, eco::SHAPE_TREE_ROOT)
                .any(|root| *root == schema);
            if let (true, Some(iri)) = (matches, instance.as_iri()) {
                if let Ok(url) = Url::parse(iri) {
                    found.push(url);
                }
            }
        }
        Ok(found)
    }
}

#[async_trait]
impl Ecosystem for MetadataEcosystem {
    async fn reuse_shape_tree(&self, parent: &Container, schema: &Url) -> EcosystemResult<Option<Url>> {
        for instance in self.installed(parent.id(), schema).await? {
            if self.storage.exists(&instance).await? {
                tracing::debug!(parent = %parent.id(), instance = %instance, "reusing installed shape tree");
                return Ok(Some(instance));
            }
            tracing::warn!(instance = %instance, "index names a missing instance");
        }
        Ok(None)
    }

    async fn index_installed_shape_tree(
        &self,
        parent: &Container,
        instance: &Url,
        schema: &Url,
    ) -> EcosystemResult<()> {
        let mut meta = self.storage.read_metadata(parent.id()).await?;
        meta.add(
            Term::from(parent.id()),
            eco::HAS_SHAPE_TREE_INSTANCE,
            Term::from(instance),
        );
        meta.add(Term::from(instance), eco::SHAPE_TREE_ROOT, Term::from(schema));
        self.storage
            .write_metadata(parent.id(), &meta, &Prefixes::with_defaults())
            .await?;
        tracing::info!(parent = %parent.id(), instance = %instance, schema = %schema, "indexed shape tree instance");
        Ok(())
    }

    async fn unindex_installed_shape_tree(
        &self,
        parent: &Container,
        instance: &Url,
        schema: &Url,
    ) -> EcosystemResult<()> {
        let mut meta = self.storage.read_metadata(parent.id()).await?;
        let instance = Term::from(instance);
        meta.remove_matching(
            Some(&Term::from(parent.id())),
            Some(eco::HAS_SHAPE_TREE_INSTANCE),
            Some(&instance),
        );
        meta.remove_matching(Some(&instance), Some(eco::SHAPE_TREE_ROOT), Some(&Term::from(schema)));
        self.storage
            .write_metadata(parent.id(), &meta, &Prefixes::with_defaults())
            .await?;
        Ok(())
    }

    async fn register_instance(
        &self,
        app: &InstantiationPayload,
        schema: &Url,
        instance: &Url,
    ) -> EcosystemResult<(Graph, Prefixes)> {
        let subject = Term::from(instance);
        let mut graph = Graph::new();
        graph.add(subject.clone(), rdf::TYPE, Term::iri(eco::SHAPE_TREE_INSTANCE));
        graph.add(subject.clone(), eco::SHAPE_TREE_ROOT, Term::from(schema));
        graph.add(subject.clone(), eco::SHAPE_TREE_INSTANCE_ROOT, subject.clone());
        if let Some(name) = &app.name {
            graph.add(subject, eco::NAME, Term::literal(name.as_str()));
        }
        let prefixes = Prefixes::with_defaults();
        let mut meta = self.storage.read_metadata(instance).await?;
        meta.extend(graph.clone());
        self.storage.write_metadata(instance, &meta, &prefixes).await?;
        Ok((graph, prefixes))
    }

    fn parse_instantiation_payload(&self, graph: Graph) -> EcosystemResult<InstantiationPayload> {
        let mut names = graph
            .matching(None, Some(eco::NAME), None)
            .map(|t| {
                t.object
                    .value_str()
                    .map(str::to_string)
                    .ok_or_else(|| EcosystemError::BadPayload("eco:name must be a literal".into()))
            })
            .collect::<EcosystemResult<Vec<_>>>()?;
        names.sort();
        names.dedup();
        let name = match names.len() {
            0 => None,
            1 => names.pop(),
            n => {
                return Err(EcosystemError::BadPayload(format!(
                    "{n} different names given"
                )))
            }
        };
        Ok(InstantiationPayload {
            planted: graph,
            name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapetree_rdf::parse_turtle;
    use shapetree_store::InMemoryStorage;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    async fn setup() -> (Arc<dyn Storage>, MetadataEcosystem, Container) {
        let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
        let eco = MetadataEcosystem::new(Arc::clone(&storage));
        let parent = Container::open(Arc::clone(&storage), &url("http://h/Apps/"), &Prefixes::new())
            .await
            .unwrap();
        (storage, eco, parent)
    }

    #[tokio::test]
    async fn index_then_reuse_then_unindex() {
        let (storage, eco, parent) = setup().await;
        let schema = url("http://schema.example/s.ttl#root");
        let instance = url("http://h/Apps/proj1/");
        assert_eq!(eco.reuse_shape_tree(&parent, &schema).await.unwrap(), None);

        storage.ensure_container(&instance, &Prefixes::new(), None).await.unwrap();
        eco.index_installed_shape_tree(&parent, &instance, &schema).await.unwrap();
        assert_eq!(
            eco.reuse_shape_tree(&parent, &schema).await.unwrap(),
            Some(instance.clone())
        );
        let other = url("http://schema.example/other.ttl#root");
        assert_eq!(eco.reuse_shape_tree(&parent, &other).await.unwrap(), None);

        eco.unindex_installed_shape_tree(&parent, &instance, &schema).await.unwrap();
        assert_eq!(eco.reuse_shape_tree(&parent, &schema).await.unwrap(), None);
    }

    #[tokio::test]
    async fn stale_index_entries_are_not_reused() {
        let (_storage, eco, parent) = setup().await;
        let schema = url("http://schema.example/s.ttl#root");
        eco.index_installed_shape_tree(&parent, &url("http://h/Apps/gone/"), &schema)
            .await
            .unwrap();
        assert_eq!(eco.reuse_shape_tree(&parent, &schema).await.unwrap(), None);
    }

    #[tokio::test]
    async fn payload_name_and_registration() {
        let (storage, eco, _parent) = setup().await;
        let (graph, _) = parse_turtle(
            "<#app> <http://www.w3.org/ns/shapetree/ecosystem#name> \"Tracker\" .",
            Some(&url("http://h/Apps/")),
        )
        .unwrap();
        let payload = eco.parse_instantiation_payload(graph).unwrap();
        assert_eq!(payload.name.as_deref(), Some("Tracker"));

        let instance = url("http://h/Apps/Tracker/");
        storage.ensure_container(&instance, &Prefixes::new(), None).await.unwrap();
        let schema = url("http://schema.example/s.ttl#root");
        let (response, _) = eco.register_instance(&payload, &schema, &instance).await.unwrap();
        let subject = Term::from(&instance);
        assert_eq!(
            response.one(&subject, eco::SHAPE_TREE_ROOT).unwrap(),
            &Term::from(&schema)
        );
        assert_eq!(response.one(&subject, eco::NAME).unwrap().value_str(), Some("Tracker"));
        assert_eq!(storage.read_metadata(&instance).await.unwrap(), response);
    }

    #[test]
    fn conflicting_names_are_rejected() {
        let eco = MetadataEcosystem::new(Arc::new(InMemoryStorage::new()));
        let (graph, _) = parse_turtle(
            "<a:x> <http://www.w3.org/ns/shapetree/ecosystem#name> \"One\", \"Two\" .",
            None,
        )
        .unwrap();
        assert!(matches!(
            eco.parse_instantiation_payload(graph),
            Err(EcosystemError::BadPayload(_))
        ));
        let empty = eco.parse_instantiation_payload(Graph::new()).unwrap();
        assert_eq!(empty.name, None);
    }
}
