use thiserror::Error;

/// Errors from RDF parsing, serialization, and graph lookups.
#[derive(Debug, Error)]
pub enum RdfError {
    /// The document is not well-formed.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// An IRI could not be parsed or resolved against the base.
    #[error("bad IRI {iri:?}: {reason}")]
    BadIri { iri: String, reason: String },

    /// A lookup expected at most (or exactly) one value.
    #[error("expected one {predicate} for {subject}, found {found}")]
    Cardinality {
        subject: String,
        predicate: String,
        found: usize,
    },

    /// JSON-level failure while reading JSON-LD.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The media type or document feature is not supported.
    #[error("unsupported RDF format: {0}")]
    UnsupportedFormat(String),

    #[error("serialization failed: {0}")]
    Serialize(String),
}

/// Result alias for RDF operations.
pub type RdfResult<T> = Result<T, RdfError>;
