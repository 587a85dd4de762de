use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Rows on the bus, front to back in label order.
pub const ROWS: std::ops::RangeInclusive<char> = 'A'..='D';
/// Seat numbers; the number doubles as the distance from the door.
pub const SEAT_NUMBERS: std::ops::RangeInclusive<u8> = 1..=20;

/// A validated seat such as `C20`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeatLabel {
    row: char,
    number: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("seat label must be a row A-D followed by a number 1-20")]
pub struct InvalidSeatLabel;

impl SeatLabel {
    pub fn new(row: char, number: u8) -> Result<Self, InvalidSeatLabel> {
        let row = row.to_ascii_uppercase();
        if !ROWS.contains(&row) || !SEAT_NUMBERS.contains(&number) {
            return Err(InvalidSeatLabel);
        }
        Ok(Self { row, number })
    }

    pub fn row(&self) -> char {
        self.row
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    /// Linear distance from the entry point.
    pub fn distance(&self) -> u32 {
        u32::from(self.number)
    }
}

impl FromStr for SeatLabel {
    type Err = InvalidSeatLabel;

    // Accepts `a7`, ` C20 `; rejects `A0`, `A01`, `A21`, `E5`, `A`, `5`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        let row = chars.next().ok_or(InvalidSeatLabel)?;
        let digits = chars.as_str();

        if digits.is_empty()
            || digits.len() > 2
            || digits.starts_with('0')
            || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(InvalidSeatLabel);
        }

        let number: u8 = digits.parse().map_err(|_| InvalidSeatLabel)?;
        Self::new(row, number)
    }
}

impl fmt::Display for SeatLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row, self.number)
    }
}

impl Serialize for SeatLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
