//! HTTP runtime state and server entry point

pub mod config;

pub use config::HttpRuntimeConfig;

use std::sync::Arc;
use std::time::Instant;
use tabvault_store::{ArtifactLocator, BackupDirectory, TableVault};

use crate::runtime::shutdown::shutdown_signal;

/// Shared state behind every route.
///
/// Cloning is cheap: the vault and locator are reference counted.
#[derive(Clone)]
pub struct HttpVaultRuntime {
    pub vault: Arc<TableVault>,
    pub locator: Arc<dyn ArtifactLocator>,
    pub(crate) started_at: Instant,
}

impl HttpVaultRuntime {
    pub fn new(vault: TableVault, locator: impl ArtifactLocator + 'static) -> Self {
        Self {
            vault: Arc::new(vault),
            locator: Arc::new(locator),
            started_at: Instant::now(),
        }
    }

    /// Runtime with a directory-backed locator at `config.backup_dir`.
    pub fn from_config(config: &HttpRuntimeConfig) -> Self {
        Self::new(
            TableVault::new(config.store.clone()),
            BackupDirectory::new(config.backup_dir.clone()),
        )
    }

    /// Bind `config.bind_addr` and serve until SIGINT or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound or the server fails.
    pub async fn serve(self, config: HttpRuntimeConfig) -> std::io::Result<()> {
        let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
        tracing::info!(
            addr = %listener.local_addr()?,
            backup_dir = %config.backup_dir.display(),
            "Tabvault HTTP runtime listening"
        );

        let app = self.router_with_config(&config);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Tabvault HTTP runtime stopped");
        Ok(())
    }
}

impl std::fmt::Debug for HttpVaultRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpVaultRuntime")
            .field("vault", &self.vault)
            .finish_non_exhaustive()
    }
}
