use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request, State},
    http::{header, StatusCode},
    routing::post,
    Json, Router,
};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::SequenceError;
use crate::models::{ParsedBookings, SequenceReport, SequenceRequest};
use crate::parser;
use crate::sequencer::generate_boarding_sequence;
use crate::AppState;

/// Name of the multipart part carrying the booking table.
pub const UPLOAD_FIELD: &str = "file";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/boarding-sequence", post(boarding_sequence))
}

/* ---------- BOARDING SEQUENCE ---------- */

// POST /api/boarding-sequence
//
// multipart/form-data with a `file` part, a text/csv body, or
// application/json `{ "bookings": [...] }`.
#[axum::debug_handler]
async fn boarding_sequence(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<SequenceReport>, SequenceError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let parsed = if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| SequenceError::Multipart(e.body_text()))?;
        read_upload(multipart, &state).await?
    } else if content_type.starts_with("application/json") {
        let body = read_body(request, &state).await?;
        let req: SequenceRequest =
            serde_json::from_slice(&body).map_err(|e| SequenceError::Json(e.to_string()))?;
        let bookings = req.bookings.ok_or(SequenceError::NoInput)?;
        debug!("json request with {} bookings", bookings.len());
        parser::parse_records(bookings)
    } else if content_type.is_empty() || content_type.starts_with("text/") {
        let body = read_body(request, &state).await?;
        if body.is_empty() {
            return Err(SequenceError::NoInput);
        }
        parser::parse_table(&decode_text(&body)?)
    } else {
        return Err(SequenceError::UnsupportedMediaType(content_type));
    };

    let report = generate_boarding_sequence(parsed)?;
    Ok(Json(report))
}

/* ---------- helpers ---------- */

async fn read_body(request: Request, state: &Arc<AppState>) -> Result<Bytes, SequenceError> {
    Bytes::from_request(request, state).await.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            SequenceError::PayloadTooLarge {
                limit: state.config.upload.max_upload_bytes,
            }
        } else {
            SequenceError::Body(rejection.body_text())
        }
    })
}

async fn read_upload(mut multipart: Multipart, state: &AppState) -> Result<ParsedBookings, SequenceError> {
    let too_large = |e: axum::extract::multipart::MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            SequenceError::PayloadTooLarge {
                limit: state.config.upload.max_upload_bytes,
            }
        } else {
            SequenceError::Multipart(e.body_text())
        }
    };

    while let Some(field) = multipart.next_field().await.map_err(too_large)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let data = field.bytes().await.map_err(too_large)?;
        info!("received booking file {:?} ({} bytes)", file_name, data.len());

        return Ok(parser::parse_table(&decode_text(&data)?));
    }

    Err(SequenceError::NoInput)
}

// Spreadsheet exports often start with a byte order mark.
fn decode_text(bytes: &[u8]) -> Result<String, SequenceError> {
    let text = std::str::from_utf8(bytes).map_err(|_| SequenceError::InvalidEncoding)?;
    Ok(text.trim_start_matches('\u{feff}').to_string())
}
