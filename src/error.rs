// RecordIssue: one bad line, record or seat, reported next to the order.
// SequenceError: the request as a whole cannot be ranked.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::{BookingId, Location, SeatLabel};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordIssue {
    #[error("Invalid format on {location}: expected \"Booking_ID,Seats\".")]
    InvalidFormat { location: Location },

    #[error("Unreadable record on {location}: {reason}.")]
    Unreadable { location: Location, reason: String },

    #[error("Missing Booking_ID on {location}.")]
    MissingBookingId { location: Location },

    #[error("Invalid Booking_ID \"{raw}\" on {location}.")]
    InvalidBookingId { raw: String, location: Location },

    #[error("No seats found for Booking {booking_id} on {location}.")]
    NoSeats { booking_id: BookingId, location: Location },

    #[error("Invalid seat \"{raw}\" in Booking {booking_id} ({location}). Allowed: A-D and 1-20.")]
    InvalidSeat {
        raw: String,
        booking_id: BookingId,
        location: Location,
    },

    #[error("Duplicate seat \"{seat}\" found in Booking {owner} and Booking {booking_id} ({location}).")]
    DuplicateSeat {
        seat: SeatLabel,
        owner: BookingId,
        booking_id: BookingId,
        location: Location,
    },

    #[error("No valid bookings found.")]
    NoValidBookings,
}

#[derive(Debug, Error)]
pub enum SequenceError {
    #[error("No file or bookings data provided")]
    NoInput,

    #[error("No valid bookings data")]
    NoValidData,

    #[error("Uploaded file is not valid UTF-8 text")]
    InvalidEncoding,

    #[error("Failed to read request body: {0}")]
    Body(String),

    #[error("Malformed upload: {0}")]
    Multipart(String),

    #[error("Malformed JSON body: {0}")]
    Json(String),

    #[error("Unsupported content type: {0}")]
    UnsupportedMediaType(String),

    #[error("Request body exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize },
}

impl SequenceError {
    pub fn status(&self) -> StatusCode {
        match self {
            SequenceError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            SequenceError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for SequenceError {
    fn into_response(self) -> Response {
        tracing::warn!("boarding sequence request rejected: {}", self);
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),

    #[error("invalid value {value:?} for {key}: {reason}")]
    Value {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}
