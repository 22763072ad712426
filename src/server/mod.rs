use std::net::SocketAddr;

use anyhow::Context;

pub mod routes;

pub use routes::{build_router, SharedSession};

/// Bind and serve the editor until the process is stopped.
pub async fn serve(bind_addr: SocketAddr, session: SharedSession) -> anyhow::Result<()> {
    let router = build_router(session);
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    log::info!("Editor listening on http://{}", bind_addr);
    axum::serve(listener, router)
        .await
        .context("Server stopped unexpectedly")?;
    Ok(())
}
