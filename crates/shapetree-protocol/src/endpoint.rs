/// Paths the server answers itself instead of treating as LDP resources.
pub mod endpoints {
    pub const HEALTH: &str = "/.well-known/shapetree/health";
}

/// Health check response.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub storage: String,
}

impl HealthResponse {
    pub fn ok(storage: impl Into<String>) -> Self {
        Self {
            status: "ok".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            storage: storage.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_response() {
        let h = HealthResponse::ok("memory");
        assert_eq!(h.status, "ok");
        assert_eq!(h.storage, "memory");
        assert!(endpoints::HEALTH.starts_with("/.well-known/"));
    }
}
