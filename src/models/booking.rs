use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::error::RecordIssue;
use crate::models::SeatLabel;

pub type BookingId = i64;

/// Where a record came from, for error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// 1-based physical line of an uploaded table.
    Line(usize),
    /// 1-based position in a JSON `bookings` list.
    Record(usize),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Line(n) => write!(f, "line {n}"),
            Location::Record(n) => write!(f, "record {n}"),
        }
    }
}

/// A structurally sound booking whose seats have not been validated yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRecord {
    pub booking_id: BookingId,
    pub seats: Vec<String>,
    pub location: Location,
}

// Output of the input parsers: the records to rank plus the structural
// problems found on the way.
#[derive(Debug, Default)]
pub struct ParsedBookings {
    pub records: Vec<BookingRecord>,
    pub issues: Vec<RecordIssue>,
    rows: usize,
}

impl ParsedBookings {
    /// Records the outcome of one data row.
    pub fn push_row(&mut self, row: Result<BookingRecord, RecordIssue>) {
        self.rows += 1;
        match row {
            Ok(record) => self.records.push(record),
            Err(issue) => self.issues.push(issue),
        }
    }

    /// Number of data rows seen, good or bad.
    pub fn rows_seen(&self) -> usize {
        self.rows
    }
}

impl FromIterator<Result<BookingRecord, RecordIssue>> for ParsedBookings {
    fn from_iter<I: IntoIterator<Item = Result<BookingRecord, RecordIssue>>>(rows: I) -> Self {
        let mut parsed = ParsedBookings::default();
        for row in rows {
            parsed.push_row(row);
        }
        parsed
    }
}

/// One slot in the boarding order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedBooking {
    #[serde(rename = "Seq")]
    pub seq: usize,
    #[serde(rename = "Booking_ID")]
    pub booking_id: BookingId,
    #[serde(rename = "Seats")]
    pub seats: Vec<SeatLabel>,
    pub max_distance: u32,
}

#[derive(Debug, Default, Serialize)]
pub struct SequenceReport {
    pub sequence: Vec<RankedBooking>,
    #[serde(serialize_with = "issues_as_strings")]
    pub errors: Vec<RecordIssue>,
}

impl SequenceReport {
    pub fn booking_order(&self) -> Vec<BookingId> {
        self.sequence.iter().map(|b| b.booking_id).collect()
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

fn issues_as_strings<S: Serializer>(issues: &[RecordIssue], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(issues.iter().map(ToString::to_string))
}

/* ---------- JSON input ---------- */

// { "bookings": [...] } as posted by API clients. Entries stay loose JSON
// so one malformed record cannot reject the whole request.
#[derive(Debug, Deserialize)]
pub struct SequenceRequest {
    pub bookings: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
pub struct RawBooking {
    #[serde(rename = "Booking_ID", alias = "bookingId", alias = "booking_id", alias = "id", default)]
    pub booking_id: Option<RawBookingId>,
    #[serde(rename = "Seats", alias = "seats", default)]
    pub seats: Option<RawSeats>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawBookingId {
    Number(serde_json::Number),
    Text(String),
    Other(serde_json::Value),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawSeats {
    List(Vec<serde_json::Value>),
    Cell(String),
    Other(serde_json::Value),
}
