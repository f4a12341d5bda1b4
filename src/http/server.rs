//! HTTP server startup logic.

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;

use super::shutdown;

/// Server startup error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind server on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Start the HTTP server on `addr`.
///
/// This function blocks until the server shuts down.
pub async fn start_server(app: Router, addr: SocketAddr) -> Result<(), ServerError> {
    let listener = bind(addr).await?;
    serve(listener, app).await
}

/// Bind the listening socket.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener, ServerError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })
}

/// Serve `app` on an already bound listener until a shutdown signal arrives.
pub async fn serve(listener: TcpListener, app: Router) -> Result<(), ServerError> {
    let port = listener.local_addr().map_err(ServerError::Serve)?.port();
    tracing::info!(port, "Server starting on port {}", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::shutdown_signal())
        .await
        .map_err(ServerError::Serve)
}
