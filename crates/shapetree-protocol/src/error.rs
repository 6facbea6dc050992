use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed Link header: {0}")]
    MalformedLink(String),

    #[error("bad {name} header: {reason}")]
    BadHeader { name: String, reason: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// JSON body sent with every error response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable description.
    pub message: String,
    /// Error kind, e.g. `ValidationError`.
    pub error: String,
    /// Messages of the error's causes, outermost first.
    pub stack: Vec<String>,
}

impl ErrorBody {
    /// Describe `error` and its `source()` chain.
    pub fn from_error(kind: &str, error: &(dyn std::error::Error + 'static)) -> Self {
        let mut stack = Vec::new();
        let mut cause = error.source();
        while let Some(e) = cause {
            stack.push(e.to_string());
            cause = e.source();
        }
        Self {
            message: error.to_string(),
            error: kind.to_string(),
            stack,
        }
    }

    pub fn to_json(&self) -> ProtocolResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("outer")]
    struct Outer(#[source] std::io::Error);

    #[test]
    fn body_carries_the_cause_chain() {
        let e = Outer(std::io::Error::other("inner"));
        let body = ErrorBody::from_error("InternalError", &e);
        assert_eq!(body.message, "outer");
        assert_eq!(body.stack, vec!["inner".to_string()]);
        let json: serde_json::Value = serde_json::from_slice(&body.to_json().unwrap()).unwrap();
        assert_eq!(json["error"], "InternalError");
    }
}
