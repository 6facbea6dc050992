//! The verb-level state machine.
//!
//! | Verb | Behavior |
//! |---|---|
//! | GET, HEAD, DELETE | Served straight from storage. |
//! | POST with `rel="shapeTree"` | Plant: reuse or instantiate, index, register. |
//! | POST, PUT under a managed container | Match a step, validate, write, instantiate. |
//! | POST, PUT elsewhere | Written as-is. |
//! | anything else | `405` with a warning. |
//!
//! Every branch reports failure through [`Dispatcher::handle`], which turns
//! errors into `{message, error, stack}` bodies.

use std::sync::Arc;

use bytes::Bytes;
use shapetree_container::{Container, Payload, ShapeTreeBinding};
use shapetree_ecosystem::Ecosystem;
use shapetree_fetch::Fetch;
use shapetree_protocol::{
    interaction_model, media, shape_tree, ErrorBody, InteractionModel, LdpRequest, LdpResponse,
    Method,
};
use shapetree_rdf::{parse, serialize_turtle, Graph, Prefixes, RdfFormat};
use shapetree_schema::{
    RemoteShapeTree, SchemaError, ShaclLiteFactory, ShapeTreeStep, ValidatorFactory,
};
use shapetree_store::ldp::strip_containment;
use shapetree_store::{first_available_name, validate_segment, Representation, ResourceStat, Storage};
use shapetree_types::{check_container_id, last_segment, parent_container, InstancePath};
use url::Url;

use crate::error::{DispatchError, DispatchResult};

const ALLOW: &str = "GET, HEAD, POST, PUT, DELETE";

/// Drives plant, create and validate flows over the storage, fetch and
/// ecosystem collaborators.
pub struct Dispatcher {
    storage: Arc<dyn Storage>,
    fetcher: Arc<dyn Fetch>,
    ecosystem: Arc<dyn Ecosystem>,
    validators: Arc<dyn ValidatorFactory>,
    prefixes: Prefixes,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(
        storage: Arc<dyn Storage>,
        fetcher: Arc<dyn Fetch>,
        ecosystem: Arc<dyn Ecosystem>,
    ) -> Self {
        Self {
            storage,
            fetcher,
            ecosystem,
            validators: Arc::new(ShaclLiteFactory),
            prefixes: Prefixes::with_defaults(),
        }
    }

    /// Replace the shape validator.
    pub fn with_validators(mut self, validators: Arc<dyn ValidatorFactory>) -> Self {
        self.validators = validators;
        self
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Create the root container if it does not exist yet.
    pub async fn ensure_root(&self, root: &Url) -> DispatchResult<()> {
        check_container_id(root)?;
        self.storage.ensure_container(root, &self.prefixes, None).await?;
        Ok(())
    }

    /// Answer `request`, turning any failure into an error response.
    pub async fn handle(&self, request: LdpRequest) -> LdpResponse {
        let method = request.method.clone();
        let target = request.target.clone();
        match self.dispatch(request).await {
            Ok(response) => response,
            Err(e) => error_response(&method, &target, &e),
        }
    }

    async fn dispatch(&self, request: LdpRequest) -> DispatchResult<LdpResponse> {
        match &request.method {
            Method::Get => self.get(&request.target, true).await,
            Method::Head => self.get(&request.target, false).await,
            Method::Delete => self.delete(&request.target).await,
            Method::Post => self.post(&request).await,
            Method::Put => self.put(&request).await,
            Method::Other(method) => {
                tracing::warn!(%method, target = %request.target, "method has no ShapeTree semantics");
                Ok(LdpResponse::new(405).with_header("allow", ALLOW))
            }
        }
    }

    async fn stat(&self, target: &Url) -> DispatchResult<ResourceStat> {
        match self.storage.rstat(target).await {
            Err(e) if e.is_not_found() => Err(SchemaError::NotFound(target.to_string()).into()),
            other => Ok(other?),
        }
    }

    async fn get(&self, target: &Url, with_body: bool) -> DispatchResult<LdpResponse> {
        let stat = self.stat(target).await?;
        let response = if stat.is_container {
            let text = self.storage.read_container(target, &self.prefixes).await?;
            LdpResponse::ok(media::TURTLE, text)
        } else {
            let representation = self.storage.read(target).await?;
            LdpResponse::ok(&representation.media_type, representation.body)
        };
        Ok(if with_body {
            response
        } else {
            LdpResponse {
                body: Bytes::new(),
                ..response
            }
        })
    }

    async fn delete(&self, target: &Url) -> DispatchResult<LdpResponse> {
        if self.stat(target).await?.is_container {
            self.storage.remove_container(target).await?;
        } else {
            self.storage.remove(target).await?;
        }
        tracing::info!(target = %target, "deleted");
        Ok(LdpResponse::no_content())
    }

    async fn post(&self, request: &LdpRequest) -> DispatchResult<LdpResponse> {
        let parent_id = &request.target;
        check_container_id(parent_id)?;
        self.stat(parent_id).await?;
        let links = request.links()?;
        let parent = Container::open(Arc::clone(&self.storage), parent_id, &self.prefixes).await?;

        if let Some(schema) = shape_tree(&links) {
            let schema = parent_id.join(schema)?;
            let model = interaction_model(&links).unwrap_or(InteractionModel::Container);
            return self.plant(request, &parent, &schema, model).await;
        }

        let model = interaction_model(&links).unwrap_or(InteractionModel::Resource);
        let base = request.slug().unwrap_or(model.local_name());
        let id = first_available_name(self.storage.as_ref(), parent_id, base, model.is_container())
            .await?;
        self.create(request, &parent, &id, model.is_container()).await?;
        Ok(LdpResponse::created(&id))
    }

    async fn put(&self, request: &LdpRequest) -> DispatchResult<LdpResponse> {
        let target = &request.target;
        let is_container = target.path().ends_with('/');
        if is_container {
            check_container_id(target)?;
        }
        let name = last_segment(target)
            .ok_or_else(|| DispatchError::BadRequest(format!("cannot replace {target}")))?;
        validate_segment(name)?;
        let parent_id = parent_container(target)
            .ok_or_else(|| DispatchError::BadRequest(format!("{target} has no parent container")))?;
        self.stat(&parent_id).await?;

        let existed = self.storage.exists(target).await?;
        let parent = Container::open(Arc::clone(&self.storage), &parent_id, &self.prefixes).await?;
        self.create(request, &parent, target, is_container).await?;
        Ok(if existed {
            LdpResponse::no_content()
        } else {
            LdpResponse::created(target)
        })
    }

    /// Plant the schema `schema` under `parent`, or reuse an existing instance of it.
    async fn plant(
        &self,
        request: &LdpRequest,
        parent: &Container,
        schema: &Url,
        model: InteractionModel,
    ) -> DispatchResult<LdpResponse> {
        let graph = self.payload_graph(request, parent.id())?;
        let app = self.ecosystem.parse_instantiation_payload(graph)?;

        let (instance, fresh) = match self.ecosystem.reuse_shape_tree(parent, schema).await? {
            Some(existing) => {
                tracing::info!(instance = %existing, schema = %schema, "reusing planted instance");
                (existing, false)
            }
            None => {
                let base = request.slug().unwrap_or(model.local_name());
                (self.plant_fresh(parent, schema, base).await?, true)
            }
        };

        let (description, prefixes) = match self
            .ecosystem
            .register_instance(&app, schema, &instance)
            .await
        {
            Ok(registered) => registered,
            Err(e) => {
                if fresh {
                    if let Err(unindex) = self
                        .ecosystem
                        .unindex_installed_shape_tree(parent, &instance, schema)
                        .await
                    {
                        tracing::warn!(instance = %instance, error = %unindex, "rollback: could not unindex instance");
                    }
                    self.discard(parent, &instance).await;
                }
                return Err(e.into());
            }
        };

        let body = serialize_turtle(&description, &prefixes).map_err(DispatchError::Render)?;
        tracing::info!(instance = %instance, schema = %schema, fresh, "planted shape tree");
        Ok(LdpResponse::created(&instance).with_body(media::TURTLE, body))
    }

    async fn plant_fresh(&self, parent: &Container, schema: &Url, base: &str) -> DispatchResult<Url> {
        let tree = RemoteShapeTree::fetch(self.fetcher.as_ref(), schema, InstancePath::root()).await?;
        let node = tree.resolve_root_node()?;
        let id = first_available_name(self.storage.as_ref(), parent.id(), base, true).await?;
        tree.instantiate_static(&node, &id, InstancePath::root(), parent)
            .await?;
        if let Err(e) = self
            .ecosystem
            .index_installed_shape_tree(parent, &id, schema)
            .await
        {
            self.discard(parent, &id).await;
            return Err(e.into());
        }
        Ok(id)
    }

    /// Write `id` as a child of `parent`, applying the parent's ShapeTree if it has one.
    async fn create(
        &self,
        request: &LdpRequest,
        parent: &Container,
        id: &Url,
        is_container: bool,
    ) -> DispatchResult<()> {
        let Some(binding) = parent.binding()? else {
            return self.forward(request, id, is_container).await;
        };
        let name = last_segment(id)
            .ok_or_else(|| DispatchError::BadRequest(format!("{id} has no name")))?
            .to_string();

        let tree = RemoteShapeTree::fetch(
            self.fetcher.as_ref(),
            &binding.schema_root,
            binding.instance_path.clone(),
        )
        .await?;
        let node = tree.resolve_root_node()?;
        let step = tree.match_step(&node, Some(&name))?;
        check_type(&step, id, is_container)?;

        let graph = match (is_container, &step.shape) {
            (false, None) => None,
            _ => Some(self.payload_graph(request, id)?),
        };
        if let (Some(shape), Some(graph)) = (&step.shape, &graph) {
            tree.validate(self.fetcher.as_ref(), self.validators.as_ref(), shape, graph, id)
                .await?;
        }

        if !is_container {
            return self.forward(request, id, false).await;
        }
        let graph = graph.unwrap_or_default();
        if self.storage.exists(id).await? {
            let container = Container::open(Arc::clone(&self.storage), id, &self.prefixes).await?;
            return self.fill(&container, graph).await;
        }

        let path = binding.instance_path.join(&name)?;
        let container = tree.instantiate_static(&step.node, id, path, parent).await?;
        if let Err(e) = self.fill(&container, graph).await {
            self.discard(parent, id).await;
            return Err(e);
        }
        Ok(())
    }

    /// Write without any ShapeTree involvement.
    async fn forward(&self, request: &LdpRequest, id: &Url, is_container: bool) -> DispatchResult<()> {
        if is_container {
            let graph = self.payload_graph(request, id)?;
            let container = Container::open(Arc::clone(&self.storage), id, &self.prefixes).await?;
            self.fill(&container, graph).await?;
        } else {
            let media_type = request.content_type().unwrap_or(media::OCTET_STREAM);
            self.storage
                .write(id, Representation::new(media_type, request.body.clone()))
                .await?;
        }
        tracing::debug!(id = %id, is_container, "wrote resource");
        Ok(())
    }

    /// Union client statements into `container` and persist it. Containment
    /// and binding statements are server-managed and dropped.
    async fn fill(&self, container: &Container, graph: Graph) -> DispatchResult<()> {
        if graph.is_empty() {
            return Ok(());
        }
        let mut graph = strip_containment(container.id(), &graph);
        ShapeTreeBinding::clear(&mut graph, container.id());
        container.merge(Payload::Graph(graph), container.id()).await?;
        container.write().await?;
        Ok(())
    }

    /// Parse the request body relative to `base`. An empty body is an empty graph.
    fn payload_graph(&self, request: &LdpRequest, base: &Url) -> DispatchResult<Graph> {
        if request.body.is_empty() {
            return Ok(Graph::new());
        }
        let format = request.content_type().and_then(RdfFormat::from_media_type);
        let (graph, _) =
            parse(&request.body_text(), format, Some(base)).map_err(DispatchError::Payload)?;
        Ok(graph)
    }

    /// Remove container `id` and its link from `parent`, logging anything that fails.
    async fn discard(&self, parent: &Container, id: &Url) {
        if let Err(e) = self.storage.remove_container(id).await {
            tracing::warn!(id = %id, error = %e, "rollback: could not remove container");
        }
        let unlinked = async {
            parent.remove_member(id).await?;
            parent.write().await
        };
        if let Err(e) = unlinked.await {
            tracing::warn!(id = %id, parent = %parent.id(), error = %e, "rollback: could not unlink container");
        }
    }
}

/// A step that declares a type only accepts that kind of resource.
fn check_type(step: &ShapeTreeStep, id: &Url, is_container: bool) -> DispatchResult<()> {
    match step.expects_type {
        Some(expected) if expected.is_container() != is_container => Err(SchemaError::Validation {
            target: id.to_string(),
            shape: step.node.to_string(),
            summary: format!("expects {}", expected.iri()),
        }
        .into()),
        _ => Ok(()),
    }
}

fn error_response(method: &Method, target: &Url, error: &DispatchError) -> LdpResponse {
    let status = error.status();
    if error.is_managed() {
        tracing::info!(%method, %target, status, error = %error, "request rejected");
    } else {
        tracing::error!(%method, %target, error = ?error, "request failed");
    }
    let body = ErrorBody::from_error(error.kind(), error);
    LdpResponse::error(status, &body).unwrap_or_else(|_| LdpResponse::new(status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shapetree_ecosystem::{EcosystemError, EcosystemResult, InstantiationPayload, MetadataEcosystem};
    use shapetree_fetch::MemoryFetcher;
    use shapetree_rdf::{RdfError, Term};
    use shapetree_schema::{SchemaResult, ShapeValidator, ValidationIssue, ValidationReport};
    use shapetree_store::InMemoryStorage;

    const SCHEMA: &str = "http://schema.example/t.ttl#root";

    const TREE: &str = r#"
@prefix tree: <http://www.w3.org/ns/shapetree#> .
@prefix ldp: <http://www.w3.org/ns/ldp#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .

<#root> tree:expectsType ldp:Container ;
    tree:contents <#docs>, <#note> .
<#docs> tree:expectsType ldp:Container ;
    rdfs:label "docs" .
<#note> tree:expectsType ldp:Resource ;
    tree:matchesUriTemplate "{n}.ttl" ;
    tree:validatedBy <http://schema.example/shapes.ttl#Open> .
"#;

    const SHAPES: &str = "@prefix sh: <http://www.w3.org/ns/shacl#> .\n<#Open> a sh:NodeShape .";

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    /// Delegates to [`MetadataEcosystem`] but can fail indexing or registration.
    struct Flaky {
        inner: MetadataEcosystem,
        fail_index: bool,
        fail_register: bool,
    }

    fn broken(hook: &str) -> EcosystemError {
        EcosystemError::Rdf(RdfError::Syntax(format!("{hook} unavailable")))
    }

    #[async_trait]
    impl Ecosystem for Flaky {
        async fn reuse_shape_tree(&self, parent: &Container, schema: &Url) -> EcosystemResult<Option<Url>> {
            self.inner.reuse_shape_tree(parent, schema).await
        }

        async fn index_installed_shape_tree(
            &self,
            parent: &Container,
            instance: &Url,
            schema: &Url,
        ) -> EcosystemResult<()> {
            if self.fail_index {
                return Err(broken("index"));
            }
            self.inner.index_installed_shape_tree(parent, instance, schema).await
        }

        async fn unindex_installed_shape_tree(
            &self,
            parent: &Container,
            instance: &Url,
            schema: &Url,
        ) -> EcosystemResult<()> {
            self.inner.unindex_installed_shape_tree(parent, instance, schema).await
        }

        async fn register_instance(
            &self,
            app: &InstantiationPayload,
            schema: &Url,
            instance: &Url,
        ) -> EcosystemResult<(Graph, Prefixes)> {
            if self.fail_register {
                return Err(broken("registry"));
            }
            self.inner.register_instance(app, schema, instance).await
        }

        fn parse_instantiation_payload(&self, graph: Graph) -> EcosystemResult<InstantiationPayload> {
            self.inner.parse_instantiation_payload(graph)
        }
    }

    /// Rejects every focus node.
    struct RejectAll;

    impl ValidatorFactory for RejectAll {
        fn build(&self, _shapes: Graph) -> SchemaResult<Box<dyn ShapeValidator>> {
            Ok(Box::new(RejectAll))
        }
    }

    impl ShapeValidator for RejectAll {
        fn validate(&self, _data: &Graph, focus: &Term, _shape: &Term) -> SchemaResult<ValidationReport> {
            Ok(ValidationReport {
                errors: vec![ValidationIssue {
                    focus: focus.to_string(),
                    path: None,
                    message: "rejected".to_string(),
                }],
            })
        }
    }

    async fn managed(storage: &Arc<dyn Storage>, ecosystem: Arc<dyn Ecosystem>) -> Dispatcher {
        let fetcher = MemoryFetcher::new()
            .with(&url(SCHEMA), media::TURTLE, TREE)
            .unwrap()
            .with(&url("http://schema.example/shapes.ttl"), media::TURTLE, SHAPES)
            .unwrap();
        let d = Dispatcher::new(Arc::clone(storage), Arc::new(fetcher), ecosystem);
        d.ensure_root(&url("http://h/")).await.unwrap();
        d
    }

    fn plant_request() -> LdpRequest {
        LdpRequest::new(Method::Post, url("http://h/"))
            .with_header("link", "<http://www.w3.org/ns/ldp#Container>; rel=\"type\"")
            .with_header("link", format!("<{SCHEMA}>; rel=\"shapeTree\""))
            .with_header("slug", "app")
    }

    async fn dispatcher() -> Dispatcher {
        let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
        let ecosystem = Arc::new(MetadataEcosystem::new(Arc::clone(&storage)));
        let d = Dispatcher::new(storage, Arc::new(MemoryFetcher::new()), ecosystem);
        d.ensure_root(&url("http://h/")).await.unwrap();
        d
    }

    #[tokio::test]
    async fn unmanaged_post_get_delete() {
        let d = dispatcher().await;
        let post = LdpRequest::new(Method::Post, url("http://h/"))
            .with_header("slug", "note.txt")
            .with_header("content-type", "text/plain")
            .with_body("hello");
        let created = d.handle(post).await;
        assert_eq!(created.status, 201);
        assert_eq!(created.header("location"), Some("http://h/note.txt"));

        let got = d.handle(LdpRequest::new(Method::Get, url("http://h/note.txt"))).await;
        assert_eq!(got.status, 200);
        assert_eq!(got.header("content-type"), Some("text/plain"));
        assert_eq!(&got.body[..], b"hello");

        let head = d.handle(LdpRequest::new(Method::Head, url("http://h/note.txt"))).await;
        assert_eq!(head.status, 200);
        assert!(head.body.is_empty());

        let deleted = d.handle(LdpRequest::new(Method::Delete, url("http://h/note.txt"))).await;
        assert_eq!(deleted.status, 204);
        let gone = d.handle(LdpRequest::new(Method::Get, url("http://h/note.txt"))).await;
        assert_eq!(gone.status, 404);
        let body: ErrorBody = serde_json::from_slice(&gone.body).unwrap();
        assert_eq!(body.error, "NotFound");
    }

    #[tokio::test]
    async fn unnamed_posts_take_the_next_free_name() {
        let d = dispatcher().await;
        let container = || {
            LdpRequest::new(Method::Post, url("http://h/"))
                .with_header("link", "<http://www.w3.org/ns/ldp#Container>; rel=\"type\"")
        };
        let first = d.handle(container()).await;
        let second = d.handle(container()).await;
        assert_eq!(first.header("location"), Some("http://h/Container/"));
        assert_eq!(second.header("location"), Some("http://h/Container-1/"));
    }

    #[tokio::test]
    async fn post_to_missing_parent_is_not_found() {
        let d = dispatcher().await;
        let r = d
            .handle(LdpRequest::new(Method::Post, url("http://h/nowhere/")).with_body("x"))
            .await;
        assert_eq!(r.status, 404);
        assert!(!d.storage().exists(&url("http://h/nowhere/")).await.unwrap());
    }

    #[tokio::test]
    async fn put_creates_then_replaces() {
        let d = dispatcher().await;
        let put = || {
            LdpRequest::new(Method::Put, url("http://h/a.ttl"))
                .with_header("content-type", "text/turtle")
                .with_body("<> a <http://ex.example/T> .")
        };
        assert_eq!(d.handle(put()).await.status, 201);
        assert_eq!(d.handle(put()).await.status, 204);
    }

    #[tokio::test]
    async fn container_payload_cannot_forge_containment() {
        let d = dispatcher().await;
        let r = d
            .handle(
                LdpRequest::new(Method::Put, url("http://h/c/"))
                    .with_header("content-type", "text/turtle")
                    .with_body("<> <http://www.w3.org/ns/ldp#contains> <ghost> ; <http://purl.org/dc/terms/title> \"c\" ."),
            )
            .await;
        assert_eq!(r.status, 201);
        let got = d.handle(LdpRequest::new(Method::Get, url("http://h/c/"))).await;
        let text = String::from_utf8(got.body.to_vec()).unwrap();
        assert!(text.contains("\"c\""));
        assert!(!text.contains("ghost"));
    }

    #[tokio::test]
    async fn other_methods_are_refused() {
        let d = dispatcher().await;
        let r = d.handle(LdpRequest::new(Method::parse("PATCH"), url("http://h/"))).await;
        assert_eq!(r.status, 405);
        assert_eq!(r.header("allow"), Some(ALLOW));
    }

    #[tokio::test]
    async fn malformed_link_is_a_bad_request() {
        let d = dispatcher().await;
        let r = d
            .handle(LdpRequest::new(Method::Post, url("http://h/")).with_header("link", "nonsense"))
            .await;
        assert_eq!(r.status, 400);
    }

    #[tokio::test]
    async fn unreadable_container_payload() {
        let d = dispatcher().await;
        let r = d
            .handle(
                LdpRequest::new(Method::Put, url("http://h/c/"))
                    .with_header("content-type", "text/turtle")
                    .with_body("<unterminated"),
            )
            .await;
        assert_eq!(r.status, 400);
        let body: ErrorBody = serde_json::from_slice(&r.body).unwrap();
        assert_eq!(body.error, "BadRequest");
        assert!(!body.stack.is_empty());
    }

    #[tokio::test]
    async fn register_failure_rolls_back_the_plant() {
        let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
        let index = MetadataEcosystem::new(Arc::clone(&storage));
        let flaky = Flaky {
            inner: index.clone(),
            fail_index: false,
            fail_register: true,
        };
        let d = managed(&storage, Arc::new(flaky)).await;

        let r = d.handle(plant_request()).await;
        assert_eq!(r.status, 500);
        assert!(!storage.exists(&url("http://h/app/")).await.unwrap());
        assert!(!storage.exists(&url("http://h/app/docs/")).await.unwrap());
        assert!(index.installed(&url("http://h/"), &url(SCHEMA)).await.unwrap().is_empty());
        let listing = storage
            .read_container(&url("http://h/"), &Prefixes::with_defaults())
            .await
            .unwrap();
        assert!(!listing.contains("http://h/app/"), "{listing}");

        let healthy = managed(&storage, Arc::new(index)).await;
        let again = healthy.handle(plant_request()).await;
        assert_eq!(again.status, 201);
        assert_eq!(again.header("location"), Some("http://h/app/"));
    }

    #[tokio::test]
    async fn index_failure_discards_the_instance() {
        let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
        let index = MetadataEcosystem::new(Arc::clone(&storage));
        let flaky = Flaky {
            inner: index.clone(),
            fail_index: true,
            fail_register: false,
        };
        let d = managed(&storage, Arc::new(flaky)).await;

        let r = d.handle(plant_request()).await;
        assert_eq!(r.status, 500);
        assert!(!storage.exists(&url("http://h/app/")).await.unwrap());
        assert!(index.installed(&url("http://h/"), &url(SCHEMA)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn replacement_validator_decides_conformance() {
        let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
        let ecosystem = Arc::new(MetadataEcosystem::new(Arc::clone(&storage)));
        let strict = managed(&storage, ecosystem.clone())
            .await
            .with_validators(Arc::new(RejectAll));
        assert_eq!(strict.handle(plant_request()).await.status, 201);

        let note = || {
            LdpRequest::new(Method::Put, url("http://h/app/n.ttl"))
                .with_header("content-type", media::TURTLE)
                .with_body("<> <http://ex.example/p> \"v\" .")
        };
        let rejected = strict.handle(note()).await;
        assert_eq!(rejected.status, 422);
        let body: ErrorBody = serde_json::from_slice(&rejected.body).unwrap();
        assert!(body.message.contains("rejected"), "{}", body.message);
        assert!(!storage.exists(&url("http://h/app/n.ttl")).await.unwrap());

        let lenient = managed(&storage, ecosystem).await;
        assert_eq!(lenient.handle(note()).await.status, 201);
    }
}
