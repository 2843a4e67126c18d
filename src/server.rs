//! Static file server for the exported documents.
//!
//! Serves the output directory so a browser-based visualization can load
//! `flare.json` from another origin. Every response carries a wildcard
//! `Access-Control-Allow-Origin` header; plain static-file semantics
//! otherwise.

use std::net::SocketAddr;
use std::path::Path;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

/// Builds the router: static files from `dir` under all paths, with the
/// wildcard CORS layer applied to every response.
pub fn build_router(dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .fallback_service(ServeDir::new(dir))
        .layer(cors)
}

/// Serves `dir` on `0.0.0.0:<port>` until an interrupt signal arrives.
///
/// Blocks the calling task. On ctrl-c (or SIGTERM on Unix) the listening
/// socket closes and the function returns cleanly.
///
/// # Errors
///
/// Returns an error if the port cannot be bound or the server fails while
/// running.
pub async fn serve(port: u16, dir: &Path) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, dir = %dir.display(), "Serving files");

    axum::serve(listener, build_router(dir))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, closing listener");
}
