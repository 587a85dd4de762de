use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

use crate::config::{Config, CorsConfig};

// CORS for browsers posting to /api from another origin.
pub fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    match cors {
        CorsConfig::AnyOrigin => layer.allow_origin(Any),
        CorsConfig::Origins(origins) => {
            let allowed: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!("ignoring invalid CORS origin {:?}", origin);
                        None
                    }
                })
                .collect();
            layer.allow_origin(AllowOrigin::list(allowed))
        }
    }
}

// Caps request bodies, uploads included.
pub fn body_limit(config: &Config) -> DefaultBodyLimit {
    DefaultBodyLimit::max(config.upload.max_upload_bytes)
}
