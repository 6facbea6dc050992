//! A fetched ShapeTree and navigation over its `tree:contents` forest.

use shapetree_fetch::Fetch;
use shapetree_rdf::{parse, Graph, Prefixes, RdfFormat, Term};
use shapetree_types::vocab::{rdfs, tree};
use shapetree_types::{strip_fragment, InstancePath};
use url::Url;

use crate::error::{SchemaError, SchemaResult};
use crate::step::{ExpectedType, ShapeTreeStep};
use crate::template::UriTemplate;

/// A parsed schema document plus a cursor into it.
///
/// `url` names the schema root node (fragment included); `path` is the
/// position below that root. Immutable once fetched.
#[derive(Clone, Debug)]
pub struct RemoteShapeTree {
    pub url: Url,
    pub path: InstancePath,
    pub graph: Graph,
    pub prefixes: Prefixes,
}

impl RemoteShapeTree {
    /// Fetch and parse the document holding `url`.
    pub async fn fetch(fetcher: &dyn Fetch, url: &Url, path: InstancePath) -> SchemaResult<Self> {
        let (graph, prefixes) = fetch_graph(fetcher, url).await?;
        let tree = Self::from_graph(url.clone(), path, graph, prefixes);
        if tree.graph.matching(Some(&tree.root_term()), None, None).next().is_none() {
            return Err(SchemaError::missing_shape(url, "schema root node is not described"));
        }
        tracing::debug!(schema = %url, path = %tree.path, triples = tree.graph.len(), "loaded shape tree");
        Ok(tree)
    }

    pub fn from_graph(url: Url, path: InstancePath, graph: Graph, prefixes: Prefixes) -> Self {
        Self {
            url,
            path,
            graph,
            prefixes,
        }
    }

    pub fn root_term(&self) -> Term {
        Term::from(&self.url)
    }

    /// Children declared under `node` via `tree:contents`.
    pub fn children(&self, node: &Term) -> Vec<Term> {
        self.graph.objects(node, tree::CONTENTS).cloned().collect()
    }

    /// Static name of `node`, if it has one.
    pub fn label(&self, node: &Term) -> SchemaResult<Option<String>> {
        Ok(self
            .graph
            .zero_or_one(node, rdfs::LABEL)?
            .and_then(|t| t.value_str())
            .map(str::to_string))
    }

    pub fn template(&self, node: &Term) -> SchemaResult<Option<UriTemplate>> {
        self.graph
            .zero_or_one(node, tree::MATCHES_URI_TEMPLATE)?
            .and_then(|t| t.value_str())
            .map(UriTemplate::parse)
            .transpose()
    }

    /// Walk the cursor path from the schema root. `.` segments do not move.
    pub fn resolve_root_node(&self) -> SchemaResult<Term> {
        let mut node = self.root_term();
        for segment in self.path.segments().filter(|s| *s != ".") {
            node = self.select_child(&node, segment)?;
        }
        Ok(node)
    }

    /// The child of `node` named `segment`: a label match if any child carries
    /// that label, otherwise the unique child whose template accepts it.
    fn select_child(&self, node: &Term, segment: &str) -> SchemaResult<Term> {
        let children = self.children(node);
        for child in &children {
            if self.label(child)?.as_deref() == Some(segment) {
                return Ok(child.clone());
            }
        }
        let mut templated = Vec::new();
        for child in children {
            if let Some(template) = self.template(&child)? {
                if template.matches(segment) {
                    templated.push(child);
                }
            }
        }
        one_of(node, Some(segment), templated)
    }

    /// Select the child of `node` that a resource named `requested` falls under.
    ///
    /// A child qualifies when no name was requested, when its template accepts
    /// the name, or when its label equals it.
    pub fn match_step(&self, node: &Term, requested: Option<&str>) -> SchemaResult<ShapeTreeStep> {
        let requested = requested.map(|n| n.strip_suffix('/').unwrap_or(n));
        let mut matched = Vec::new();
        for child in self.children(node) {
            let qualifies = match requested {
                None => true,
                Some(name) => {
                    self.template(&child)?.is_some_and(|t| t.matches(name))
                        || self.label(&child)?.as_deref() == Some(name)
                }
            };
            if qualifies {
                matched.push(child);
            }
        }
        let node = one_of(node, requested, matched)?;
        self.step(&node)
    }

    /// Describe `node` as a step.
    pub fn step(&self, node: &Term) -> SchemaResult<ShapeTreeStep> {
        let expects_type = self
            .graph
            .zero_or_one(node, tree::EXPECTS_TYPE)?
            .and_then(|t| t.as_iri())
            .and_then(ExpectedType::from_iri);
        let shape = self
            .graph
            .zero_or_one(node, tree::VALIDATED_BY)?
            .and_then(|t| t.as_iri())
            .map(Url::parse)
            .transpose()?;
        Ok(ShapeTreeStep {
            node: node.clone(),
            expects_type,
            name: self.label(node)?,
            uri_template: self.template(node)?,
            shape,
            contents: self.children(node),
        })
    }

    /// Children of `node` with a static name, ordered by node identifier.
    pub fn static_children(&self, node: &Term) -> SchemaResult<Vec<(Term, String)>> {
        let mut out = Vec::new();
        for child in self.children(node) {
            if let Some(label) = self.label(&child)? {
                out.push((child, label));
            }
        }
        Ok(out)
    }
}

fn one_of(node: &Term, name: Option<&str>, mut found: Vec<Term>) -> SchemaResult<Term> {
    match found.len() {
        0 => Err(SchemaError::NoMatch {
            node: node.to_string(),
            name: name.map(str::to_string),
        }),
        1 => Ok(found.remove(0)),
        _ => Err(SchemaError::AmbiguousMatch {
            node: node.to_string(),
            name: name.map(str::to_string),
            candidates: found.iter().map(Term::to_string).collect(),
        }),
    }
}

/// Fetch the document containing `url` and parse it relative to itself.
/// Any failure is reported as a missing shape.
pub async fn fetch_graph(fetcher: &dyn Fetch, url: &Url) -> SchemaResult<(Graph, Prefixes)> {
    let document = strip_fragment(url);
    let response = fetcher
        .get(&document)
        .await
        .map_err(|e| SchemaError::missing_shape(url, e))?;
    let format = response.content_type().and_then(RdfFormat::from_media_type);
    parse(&response.text(), format, Some(&document)).map_err(|e| SchemaError::missing_shape(url, e))
}
