//! Web server for filedrop.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::{Config, StorageConfig};
use crate::file::FileStorage;
use crate::{FiledropError, Result};

use super::handlers::AppState;
use super::router::create_router;

/// Web server serving uploads, listings and static files.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Configuration the server was built from.
    config: Config,
}

impl WebServer {
    /// Create a new web server.
    ///
    /// When `storage.create_dir` is set the storage directory is created up
    /// front. If that fails the server still starts, and requests report the
    /// I/O error until the directory becomes usable.
    pub fn new(config: &Config) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| {
                FiledropError::Config(format!(
                    "invalid listen address {}:{}: {e}",
                    config.server.host, config.server.port
                ))
            })?;

        let storage = open_storage(&config.storage);
        let app_state = AppState::new(storage)
            .with_unsafe_filename_rejection(config.storage.reject_unsafe_filenames);

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
            config: config.clone(),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Build the router for this server.
    pub fn router(&self) -> Router {
        create_router(Arc::clone(&self.app_state), &self.config)
    }

    /// Run the web server.
    pub async fn run(self) -> Result<()> {
        let router = self.router();

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Web server listening on http://{}", local_addr);
        tracing::info!(
            "Storing uploads in {}",
            self.app_state.storage.base_path().display()
        );

        axum::serve(listener, router).await?;
        Ok(())
    }

    /// Run the server in the background and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> Result<SocketAddr> {
        let router = self.router();

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

fn open_storage(config: &StorageConfig) -> FileStorage {
    if config.create_dir {
        match FileStorage::new(&config.path) {
            Ok(storage) => {
                tracing::info!("File storage initialized at: {}", config.path);
                return storage;
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to create storage directory {}: {}. Uploads will fail until it exists.",
                    config.path,
                    e
                );
            }
        }
    }
    FileStorage::open(&config.path)
}
