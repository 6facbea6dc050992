use shapetree_rdf::RdfError;
use shapetree_store::StoreError;
use shapetree_types::IdError;

/// Errors from the container model.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    /// The identifier is not a well-formed container identifier.
    #[error(transparent)]
    Id(#[from] IdError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("rdf error: {0}")]
    Rdf(#[from] RdfError),

    /// An existing container was expected to carry ShapeTree binding statements.
    #[error("container {0} has no ShapeTree binding")]
    MissingBinding(String),

    /// The stored instance root disagrees with the one derived from the instance path.
    #[error("container {id} records instance root {found} but its instance path implies {expected}")]
    InconsistentBinding {
        id: String,
        expected: String,
        found: String,
    },

    #[error("container state lock poisoned: {0}")]
    Poisoned(String),
}

/// Result alias for container operations.
pub type ContainerResult<T> = Result<T, ContainerError>;
