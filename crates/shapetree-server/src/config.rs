use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shapetree_store::StorageConfig;
use url::Url;

use crate::error::{ServerError, ServerResult};

pub const DEFAULT_PORT: u16 = 12345;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Public URL of the root container; request paths resolve against it.
    /// Defaults to `http://localhost:<port>/`.
    pub base_url: Option<Url>,
    pub storage: StorageConfig,
    /// Where fetched schemas are cached.
    pub cache_dir: PathBuf,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_PORT),
            base_url: None,
            storage: StorageConfig::Memory,
            cache_dir: PathBuf::from("./.shapetree-cache"),
            max_body_bytes: 16 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Read a TOML file. Missing keys take their defaults.
    pub fn load(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml(text: &str) -> ServerResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    /// The root container URL.
    pub fn base_url(&self) -> ServerResult<Url> {
        let url = match &self.base_url {
            Some(url) => url.clone(),
            None => Url::parse(&format!("http://localhost:{}/", self.bind_addr.port()))
                .map_err(|e| ServerError::Config(format!("base_url: {e}")))?,
        };
        shapetree_types::check_container_id(&url)
            .map_err(|e| ServerError::Config(format!("base_url: {e}")))?;
        Ok(url)
    }

    fn check(&self) -> ServerResult<()> {
        self.base_url()?;
        if self.max_body_bytes == 0 {
            return Err(ServerError::Config("max_body_bytes must be positive".into()));
        }
        Ok(())
    }

    /// Short name of the configured backend, for health reports.
    pub fn storage_kind(&self) -> &'static str {
        match self.storage {
            StorageConfig::Memory => "memory",
            StorageConfig::Filesystem { .. } => "filesystem",
        }
    }
}
