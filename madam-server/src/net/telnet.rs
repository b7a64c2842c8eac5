mod connection;

use crate::Registry;
use crate::error::{AppResult, InfraError};
use std::sync::Arc;
use tokio::net::TcpListener;

pub use connection::handle_connection;

/// Run the telnet server
pub async fn serve(addr: std::net::SocketAddr, registry: Arc<Registry>) -> AppResult<()> {
    let listener = TcpListener::bind(&addr).await.map_err(InfraError::from)?;
    tracing::info!(%addr, "telnet listening");
    serve_listener(listener, registry).await
}

pub async fn serve_listener(listener: TcpListener, registry: Arc<Registry>) -> AppResult<()> {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                tracing::info!(%peer, "client connected");

                let registry = registry.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, peer, registry).await {
                        tracing::error!(%peer, error=%e, "connection error");
                    }
                    tracing::info!(%peer, "client disconnected");
                });
            }
            Err(e) => {
                tracing::error!(error=%e, "failed to accept connection");
                tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            }
        }
    }
}
