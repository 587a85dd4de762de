use boarding_sequencer::{app, config::Config, AppState};
use std::net::SocketAddr;

/// Serves the router on an ephemeral port and returns its base URL.
pub async fn spawn_server(config: Config) -> String {
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");

    let router = app(AppState::new(config));
    tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .await
            .expect("server error");
    });

    format!("http://{addr}")
}

pub async fn spawn_default_server() -> String {
    spawn_server(Config::default()).await
}
