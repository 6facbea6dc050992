use thiserror::Error;

/// Errors produced by identifier and path operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    #[error("invalid container identifier {id}: {reason}")]
    InvalidContainerId { id: String, reason: &'static str },

    #[error("invalid identifier {id}: {reason}")]
    InvalidId { id: String, reason: String },

    #[error("invalid instance path {path:?}: {reason}")]
    InvalidInstancePath { path: String, reason: &'static str },
}
