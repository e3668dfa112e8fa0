//! HTTP runtime configuration

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use tabvault_store::StoreConfig;

/// Default request body limit (16MB)
pub const DEFAULT_MAX_BODY_SIZE: usize = 16 * 1024 * 1024;
pub const DEFAULT_BIND_ADDR: SocketAddr = SocketAddr::new(
    std::net::IpAddr::V4(Ipv4Addr::LOCALHOST),
    9000,
);

/// HTTP runtime configuration
#[derive(Debug, Clone)]
pub struct HttpRuntimeConfig {
    /// Address the server listens on
    pub bind_addr: SocketAddr,
    /// Directory holding backup artifacts
    pub backup_dir: PathBuf,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
    /// Enable CORS for cross-origin requests
    pub enable_cors: bool,
    /// How databases are resolved, opened and written
    pub store: StoreConfig,
}

impl Default for HttpRuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR,
            backup_dir: PathBuf::from("backups"),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            enable_cors: false,
            store: StoreConfig::default(),
        }
    }
}
