use shapetree_container::ContainerError;
use shapetree_fetch::FetchError;
use shapetree_rdf::RdfError;
use shapetree_store::StoreError;

/// Errors from schema resolution, instantiation and validation.
///
/// The first six variants are the protocol's recognized errors: they carry
/// their own HTTP status through to the client. Everything else is reported
/// as an internal failure.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The target of a request does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// No child of the schema node accepts the requested name.
    #[error("no step under {node} matches {}", name.as_deref().unwrap_or("<unnamed>"))]
    NoMatch { node: String, name: Option<String> },

    /// More than one child of the schema node accepts the requested name.
    #[error("{} steps under {node} match {}: {}", candidates.len(), name.as_deref().unwrap_or("<unnamed>"), candidates.join(", "))]
    AmbiguousMatch {
        node: String,
        name: Option<String>,
        candidates: Vec<String>,
    },

    /// A schema or shape document could not be fetched or parsed.
    #[error("shape {shape} unavailable: {reason}")]
    MissingShape { shape: String, reason: String },

    /// A payload does not conform to its shape.
    #[error("{target} does not conform to {shape}: {summary}")]
    Validation {
        target: String,
        shape: String,
        summary: String,
    },

    /// Static instantiation failed for a reason that was not already one of the above.
    #[error("failed to instantiate {root}: {message}")]
    Structure { root: String, message: String },

    /// A `tree:matchesUriTemplate` value is not a valid template.
    #[error("invalid URI template {template:?}: {reason}")]
    Template { template: String, reason: String },

    #[error("container error: {0}")]
    Container(#[from] ContainerError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("rdf error: {0}")]
    Rdf(#[from] RdfError),

    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("url error: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Id(#[from] shapetree_types::IdError),
}

impl SchemaError {
    /// Whether this is one of the protocol's recognized errors.
    pub fn is_managed(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::NoMatch { .. }
                | Self::AmbiguousMatch { .. }
                | Self::MissingShape { .. }
                | Self::Validation { .. }
                | Self::Structure { .. }
        )
    }

    /// HTTP status for this error; 500 for anything unrecognized.
    pub fn status(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::NoMatch { .. } | Self::AmbiguousMatch { .. } | Self::Validation { .. } => 422,
            Self::MissingShape { .. } => 424,
            _ => 500,
        }
    }

    /// Short machine-readable name used in error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NotFound",
            Self::NoMatch { .. } => "NoMatch",
            Self::AmbiguousMatch { .. } => "AmbiguousMatch",
            Self::MissingShape { .. } => "MissingShape",
            Self::Validation { .. } => "ValidationError",
            Self::Structure { .. } => "StructureError",
            _ => "InternalError",
        }
    }

    pub(crate) fn missing_shape(shape: impl ToString, reason: impl ToString) -> Self {
        Self::MissingShape {
            shape: shape.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result alias for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;
