use shapetree_rdf::RdfError;
use shapetree_types::IdError;

/// Errors from storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The resource or container does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A container operation targeted a plain resource.
    #[error("not a container: {0}")]
    NotAContainer(String),

    /// A resource operation targeted a container.
    #[error("is a container: {0}")]
    IsAContainer(String),

    /// A requested or generated name cannot be used as a path segment.
    #[error("invalid name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// Every candidate name was taken.
    #[error("no free name for {base:?} in {parent} after {tried} candidates")]
    NameExhausted {
        parent: String,
        base: String,
        tried: usize,
    },

    /// The identifier falls outside the backend's base URL.
    #[error("outside storage root: {0}")]
    OutsideRoot(String),

    #[error(transparent)]
    InvalidId(#[from] IdError),

    /// Stored statements could not be parsed.
    #[error("rdf error: {0}")]
    Rdf(#[from] RdfError),

    #[error("url error: {0}")]
    Url(#[from] url::ParseError),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal lock was poisoned by a panicking writer.
    #[error("storage lock poisoned: {0}")]
    Poisoned(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result alias for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;
