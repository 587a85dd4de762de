use anyhow::Context;
use std::net::{IpAddr, SocketAddr};
use tracing::info;

use boarding_sequencer::{app, config::Config, logging, AppState};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("loading configuration")?;

    logging::init_tracing(&config.app);

    info!(
        "Starting boarding sequencer ({} environment)",
        config.app.environment
    );

    let ip: IpAddr = config
        .app
        .host
        .parse()
        .with_context(|| format!("HOST {:?} is not an IP address", config.app.host))?;
    let addr = SocketAddr::new(ip, config.app.port);

    let state = AppState::new(config);
    let router = app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
