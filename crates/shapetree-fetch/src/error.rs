/// Errors from fetchers and the fetch cache.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote answered with a non-success status.
    #[error("GET {url} returned {status}")]
    Status { url: String, status: u16 },

    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A cache entry could not be decoded.
    #[error("corrupt cache entry {key}: {reason}")]
    CorruptEntry { key: String, reason: String },

    #[error("fetcher lock poisoned: {0}")]
    Poisoned(String),
}

impl FetchError {
    /// The HTTP status behind this error, if the remote produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result alias for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;
