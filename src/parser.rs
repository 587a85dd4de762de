// Raw input (delimited table or JSON list) into records for the sequencer.
// Seat labels are left as text here; the sequencer validates them.

use csv::{ReaderBuilder, StringRecord, Trim};
use std::borrow::Cow;
use tracing::debug;

use crate::error::RecordIssue;
use crate::models::{
    BookingId, BookingRecord, Location, ParsedBookings, RawBooking, RawBookingId, RawSeats,
};

const SEAT_SEPARATORS: [char; 2] = ['|', ','];

/* ---------- table input ---------- */

pub fn parse_table(text: &str) -> ParsedBookings {
    let text = normalize_newlines(text);
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut lines = LineCounter::new(&text);
    let mut parsed = ParsedBookings::default();
    let mut first_row = true;

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let line = lines.line_at(e.position().map_or(0, |p| p.byte()));
                parsed.push_row(Err(RecordIssue::Unreadable {
                    location: Location::Line(line),
                    reason: e.to_string(),
                }));
                first_row = false;
                continue;
            }
        };

        if is_blank(&record) {
            continue;
        }

        let line = lines.line_at(record.position().map_or(0, |p| p.byte()));

        if first_row {
            first_row = false;
            if looks_like_header(&record) {
                debug!("skipping header on line {}", line);
                continue;
            }
        }

        parsed.push_row(table_row(&record, Location::Line(line)));
    }

    parsed
}

fn table_row(record: &StringRecord, location: Location) -> Result<BookingRecord, RecordIssue> {
    if record.len() < 2 {
        return Err(RecordIssue::InvalidFormat { location });
    }

    let booking_id = parse_booking_id(&record[0], location)?;
    let seats: Vec<String> = record.iter().skip(1).flat_map(split_seat_cell).collect();

    if seats.is_empty() {
        return Err(RecordIssue::NoSeats { booking_id, location });
    }

    Ok(BookingRecord {
        booking_id,
        seats,
        location,
    })
}

fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

// Maps record byte offsets to 1-based line numbers. Offsets must be
// queried in increasing order.
struct LineCounter<'a> {
    text: &'a [u8],
    offset: usize,
    line: usize,
}

impl<'a> LineCounter<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text: text.as_bytes(),
            offset: 0,
            line: 1,
        }
    }

    // The csv reader reports the offset where it started looking, which is
    // before any blank lines it skipped.
    fn line_at(&mut self, byte: u64) -> usize {
        let mut target = usize::try_from(byte).unwrap_or(usize::MAX).min(self.text.len());
        while target < self.text.len() && self.text[target] == b'\n' {
            target += 1;
        }
        if target > self.offset {
            self.line += self.text[self.offset..target]
                .iter()
                .filter(|&&b| b == b'\n')
                .count();
            self.offset = target;
        }
        self.line
    }
}

// Only a whitespace-only line is blank. A line of bare separators such as
// `,` is a row with an empty Booking_ID.
fn is_blank(record: &StringRecord) -> bool {
    record.len() == 1 && record[0].is_empty()
}

fn looks_like_header(record: &StringRecord) -> bool {
    record
        .get(0)
        .is_some_and(|first| first.to_ascii_lowercase().contains("booking"))
}

/* ---------- JSON input ---------- */

// Each entry is decoded on its own, so a malformed one is reported
// against its position.
pub fn parse_records(bookings: Vec<serde_json::Value>) -> ParsedBookings {
    bookings
        .into_iter()
        .enumerate()
        .map(|(idx, value)| {
            let location = Location::Record(idx + 1);
            match serde_json::from_value::<RawBooking>(value) {
                Ok(raw) => json_record(raw, location),
                Err(e) => {
                    debug!("undecodable booking on {}: {}", location, e);
                    Err(RecordIssue::InvalidFormat { location })
                }
            }
        })
        .collect()
}

fn json_record(raw: RawBooking, location: Location) -> Result<BookingRecord, RecordIssue> {
    let booking_id = match raw.booking_id {
        None => return Err(RecordIssue::MissingBookingId { location }),
        Some(RawBookingId::Text(text)) => parse_booking_id(&text, location)?,
        Some(RawBookingId::Number(n)) => number_to_id(&n).ok_or_else(|| {
            RecordIssue::InvalidBookingId {
                raw: n.to_string(),
                location,
            }
        })?,
        Some(RawBookingId::Other(value)) => {
            return Err(RecordIssue::InvalidBookingId {
                raw: value.to_string(),
                location,
            })
        }
    };

    // Non-string seat values are kept as their JSON text so the sequencer
    // reports them as invalid seats.
    let seats: Vec<String> = match raw.seats {
        None => Vec::new(),
        Some(RawSeats::Cell(cell)) => split_seat_cell(&cell).collect(),
        Some(RawSeats::List(list)) => list.iter().filter_map(seat_token).collect(),
        Some(RawSeats::Other(value)) => seat_token(&value).into_iter().collect(),
    };

    if seats.is_empty() {
        return Err(RecordIssue::NoSeats { booking_id, location });
    }

    Ok(BookingRecord {
        booking_id,
        seats,
        location,
    })
}

fn seat_token(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.trim()).filter(|s| !s.is_empty()).map(str::to_owned),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

// 7 and 7.0 are the same identifier; 7.5 is not one.
fn number_to_id(n: &serde_json::Number) -> Option<BookingId> {
    if let Some(id) = n.as_i64() {
        return Some(id);
    }
    let f = n.as_f64()?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as BookingId)
    } else {
        None
    }
}

/* ---------- shared helpers ---------- */

fn parse_booking_id(raw: &str, location: Location) -> Result<BookingId, RecordIssue> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(RecordIssue::MissingBookingId { location });
    }
    raw.parse::<BookingId>()
        .map_err(|_| RecordIssue::InvalidBookingId {
            raw: raw.to_string(),
            location,
        })
}

// `A1|a2, B3` -> ["A1", "a2", "B3"]
pub fn split_seat_cell(cell: &str) -> impl Iterator<Item = String> + '_ {
    cell.split(SEAT_SEPARATORS)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
}
