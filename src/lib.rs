pub mod config;
pub mod controllers;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod parser;
pub mod sequencer;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use error::{RecordIssue, SequenceError};
pub use models::{BookingRecord, RankedBooking, SeatLabel, SequenceReport};
pub use sequencer::{generate_boarding_sequence, Sequencer};

// Shared state for the whole application
#[derive(Clone)]
pub struct AppState {
    pub config: config::Config,
}

impl AppState {
    pub fn new(config: config::Config) -> Arc<Self> {
        Arc::new(Self { config })
    }
}

/// Builds the HTTP router: pages at `/`, the API under `/api`.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .merge(controllers::pages())
        .nest("/api", controllers::routes())
        .with_state(state.clone())
        .layer(middleware::body_limit(&state.config))
        .layer(middleware::cors_layer(&state.config.cors))
        .layer(TraceLayer::new_for_http())
}

/// Ranks a `Booking_ID,Seats` table in one call.
pub fn sequence_from_table(text: &str) -> Result<SequenceReport, SequenceError> {
    generate_boarding_sequence(parser::parse_table(text))
}
