use shapetree_container::ContainerError;
use shapetree_ecosystem::EcosystemError;
use shapetree_fetch::FetchError;
use shapetree_protocol::ProtocolError;
use shapetree_rdf::RdfError;
use shapetree_schema::SchemaError;
use shapetree_store::StoreError;
use shapetree_types::IdError;
use thiserror::Error;

/// Errors starting or running the server process.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

pub type ServerResult<T> = Result<T, ServerError>;

/// Everything a single request can fail with.
///
/// Recognized errors carry their own status to the client; the rest become
/// `500` and are logged with full detail.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("bad request: {0}")]
    BadRequest(String),

    /// The request body could not be parsed as RDF.
    #[error("unreadable payload: {0}")]
    Payload(#[source] RdfError),

    /// A response body could not be rendered.
    #[error("could not render response: {0}")]
    Render(#[source] RdfError),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Id(#[from] IdError),

    #[error("container error: {0}")]
    Container(#[from] ContainerError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("ecosystem error: {0}")]
    Ecosystem(#[from] EcosystemError),

    #[error("url error: {0}")]
    Url(#[from] url::ParseError),
}

pub type DispatchResult<T> = Result<T, DispatchError>;

fn store_status(error: &StoreError) -> u16 {
    match error {
        StoreError::NotFound(_) => 404,
        StoreError::InvalidName { .. } | StoreError::InvalidId(_) | StoreError::OutsideRoot(_) => 400,
        StoreError::NotAContainer(_) | StoreError::IsAContainer(_) => 409,
        _ => 500,
    }
}

impl DispatchError {
    pub fn status(&self) -> u16 {
        match self {
            Self::Schema(e) => e.status(),
            Self::BadRequest(_) | Self::Payload(_) | Self::Protocol(_) | Self::Id(_) => 400,
            Self::Store(e) | Self::Container(ContainerError::Store(e)) => store_status(e),
            Self::Ecosystem(EcosystemError::BadPayload(_)) => 400,
            Self::Ecosystem(EcosystemError::Store(e)) => store_status(e),
            _ => 500,
        }
    }

    /// Whether the error is one the protocol recognizes and reports as-is.
    pub fn is_managed(&self) -> bool {
        match self {
            Self::Schema(e) => e.is_managed(),
            _ => self.status() != 500,
        }
    }

    /// The `error` field of the response body.
    pub fn kind(&self) -> &'static str {
        if let Self::Schema(e) = self {
            return e.kind();
        }
        match self.status() {
            400 => "BadRequest",
            404 => "NotFound",
            409 => "Conflict",
            _ => "InternalError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_errors_keep_their_status() {
        let e = DispatchError::from(SchemaError::Validation {
            target: "t".into(),
            shape: "s".into(),
            summary: "x".into(),
        });
        assert_eq!(e.status(), 422);
        assert_eq!(e.kind(), "ValidationError");
        assert!(e.is_managed());

        let e = DispatchError::from(SchemaError::Structure {
            root: "r".into(),
            message: "m".into(),
        });
        assert_eq!(e.status(), 500);
        assert!(e.is_managed());
    }

    #[test]
    fn storage_errors() {
        let e = DispatchError::from(StoreError::NotFound("x".into()));
        assert_eq!((e.status(), e.kind()), (404, "NotFound"));
        let e = DispatchError::from(ContainerError::Store(StoreError::IsAContainer("x".into())));
        assert_eq!(e.status(), 409);
        let e = DispatchError::from(StoreError::Io(std::io::Error::other("disk")));
        assert_eq!((e.status(), e.kind()), (500, "InternalError"));
        assert!(!e.is_managed());
    }
}
