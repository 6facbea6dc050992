use shapetree_rdf::Term;
use shapetree_types::vocab::ldp;
use url::Url;

use crate::template::UriTemplate;

/// What a schema node expects to find at its position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpectedType {
    Container,
    Resource,
    NonRdfSource,
}

impl ExpectedType {
    pub fn from_iri(iri: &str) -> Option<Self> {
        match iri {
            ldp::CONTAINER | ldp::BASIC_CONTAINER => Some(Self::Container),
            ldp::RESOURCE | ldp::RDF_SOURCE => Some(Self::Resource),
            ldp::NON_RDF_SOURCE => Some(Self::NonRdfSource),
            _ => None,
        }
    }

    pub fn iri(&self) -> &'static str {
        match self {
            Self::Container => ldp::CONTAINER,
            Self::Resource => ldp::RESOURCE,
            Self::NonRdfSource => ldp::NON_RDF_SOURCE,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Self::Container)
    }
}

/// One child of a schema node, matched against a requested name.
///
/// Recomputed for every request; never stored.
#[derive(Clone, Debug)]
pub struct ShapeTreeStep {
    pub node: Term,
    pub expects_type: Option<ExpectedType>,
    /// Static name from `rdfs:label`.
    pub name: Option<String>,
    pub uri_template: Option<UriTemplate>,
    /// Shape the resource content must satisfy (`tree:validatedBy`).
    pub shape: Option<Url>,
    pub contents: Vec<Term>,
}

impl ShapeTreeStep {
    pub fn is_container(&self) -> bool {
        self.expects_type.is_some_and(|t| t.is_container())
    }
}
