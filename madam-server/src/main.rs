use madam_server::config::Config;
use madam_server::net::{http, telnet};
use madam_server::Registry;
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cfg = Arc::new(Config::from_env()?);
    let registry = Arc::new(Registry::new(cfg.clone()));

    // Warm the conversation asset; connections share the same single fetch.
    let preload = registry.clone();
    tokio::spawn(async move {
        preload.store.load().await;
    });

    let tcp_addr: SocketAddr = cfg.tcp_addr.parse()?;
    let http_addr: SocketAddr = cfg.http_addr.parse()?;

    let http_registry = registry.clone();
    let http_jh = tokio::spawn(async move {
        if let Err(e) = http::serve(http_addr, http_registry).await {
            tracing::error!(error=%e, "HTTP server error");
        }
    });

    let telnet_registry = registry.clone();
    let telnet_jh = tokio::spawn(async move {
        if let Err(e) = telnet::serve(tcp_addr, telnet_registry).await {
            tracing::error!(error=%e, "telnet server error");
        }
    });

    // Wait for both servers to finish (they won't, unless there's an error)
    if let Err(e) = tokio::try_join!(http_jh, telnet_jh) {
        tracing::error!(error=%e, "server task failed");
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, prelude::*};

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,madam_server=debug,madam_core=debug"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}
