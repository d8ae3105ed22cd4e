//! HTTP server for filestash.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::{FilesConfig, ServerConfig};
use crate::file::FileRegistry;
use crate::{Result, StashError};

use super::handlers::AppState;
use super::router::create_app;

/// HTTP server for the file API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Allowed CORS origins.
    cors_origins: Vec<String>,
}

impl WebServer {
    /// Create a new server over the given registry.
    pub fn new(server: &ServerConfig, files: &FilesConfig, registry: FileRegistry) -> Result<Self> {
        let addr = format!("{}:{}", server.host, server.port)
            .parse()
            .map_err(|e| {
                StashError::Config(format!(
                    "invalid server address {}:{}: {}",
                    server.host, server.port, e
                ))
            })?;

        let app_state =
            AppState::new(registry).with_max_upload_size(files.max_upload_size_bytes());

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
            cors_origins: server.cors_origins.clone(),
        })
    }

    /// Get the configured server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn router(&self) -> Router {
        create_app(self.app_state.clone(), &self.cors_origins)
    }

    /// Run the server until `shutdown` resolves.
    ///
    /// The listener stops accepting on shutdown; open connections are left to
    /// axum's graceful shutdown.
    pub async fn run<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.router();
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Listening on http://{}", local_addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
    }

    /// Run the server in the background and return the bound address.
    ///
    /// Useful for tests binding to port 0.
    pub async fn run_with_addr(self) -> std::io::Result<SocketAddr> {
        let router = self.router();
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

/// Resolve when the process receives Ctrl-C.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            // Without a signal handler there is nothing to wait for.
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::FileStorage;
    use crate::Database;
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    fn create_test_config() -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec![],
        }
    }

    async fn create_registry(temp: &TempDir) -> FileRegistry {
        let db = Database::open_in_memory().await.unwrap();
        let storage = FileStorage::new(temp.path()).unwrap();
        FileRegistry::with_database(&db, storage)
    }

    #[tokio::test]
    async fn test_web_server_new() {
        let temp = TempDir::new().unwrap();
        let registry = create_registry(&temp).await;

        let server =
            WebServer::new(&create_test_config(), &FilesConfig::default(), registry).unwrap();
        assert_eq!(server.addr().ip().to_string(), "127.0.0.1");
    }

    #[tokio::test]
    async fn test_web_server_invalid_host() {
        let temp = TempDir::new().unwrap();
        let registry = create_registry(&temp).await;
        let mut config = create_test_config();
        config.host = "not a host".to_string();

        let result = WebServer::new(&config, &FilesConfig::default(), registry);
        assert!(matches!(result, Err(StashError::Config(_))));
    }

    #[tokio::test]
    async fn test_web_server_run_serves_health() {
        let temp = TempDir::new().unwrap();
        let registry = create_registry(&temp).await;

        let server =
            WebServer::new(&create_test_config(), &FilesConfig::default(), registry).unwrap();
        let addr = server.run_with_addr().await.unwrap();

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();

        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.ends_with("OK"));
    }

    #[tokio::test]
    async fn test_web_server_stops_on_shutdown() {
        let temp = TempDir::new().unwrap();
        let registry = create_registry(&temp).await;

        let server =
            WebServer::new(&create_test_config(), &FilesConfig::default(), registry).unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let handle = tokio::spawn(server.run(async {
            let _ = rx.await;
        }));

        tx.send(()).unwrap();
        handle.await.unwrap().unwrap();
    }
}
