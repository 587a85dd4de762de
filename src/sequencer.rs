// Boarding order: the farthest seat from the door boards first.
// Ties on distance go to the lower booking id.

use std::collections::HashMap;
use tracing::{debug, info};

use crate::error::{RecordIssue, SequenceError};
use crate::models::{BookingId, BookingRecord, ParsedBookings, RankedBooking, SeatLabel, SequenceReport};

/// Fails only when the input had no data rows; every other problem ends up
/// in `SequenceReport::errors`.
pub fn generate_boarding_sequence(parsed: ParsedBookings) -> Result<SequenceReport, SequenceError> {
    if parsed.rows_seen() == 0 {
        return Err(SequenceError::NoValidData);
    }

    let supplied = parsed.rows_seen();
    let ParsedBookings { records, mut issues, .. } = parsed;

    let mut sequencer = Sequencer::default();
    let sequence = sequencer.rank(records, &mut issues);

    if sequence.is_empty() {
        issues.push(RecordIssue::NoValidBookings);
    }

    info!(
        "boarding sequence: {} rows, {} ranked, {} errors",
        supplied,
        sequence.len(),
        issues.len()
    );

    Ok(SequenceReport {
        sequence,
        errors: issues,
    })
}

#[derive(Debug, Default)]
pub struct Sequencer {
    seat_owners: HashMap<SeatLabel, BookingId>,
}

struct Candidate {
    booking_id: BookingId,
    seats: Vec<SeatLabel>,
    max_distance: u32,
}

impl Sequencer {
    /// Validates and orders `records`, appending seat problems to `issues`.
    pub fn rank(&mut self, records: Vec<BookingRecord>, issues: &mut Vec<RecordIssue>) -> Vec<RankedBooking> {
        let mut candidates: Vec<Candidate> = records
            .into_iter()
            .filter_map(|record| self.claim_seats(record, issues))
            .collect();

        // Stable, so equal keys keep input order.
        candidates.sort_by(|a, b| {
            b.max_distance
                .cmp(&a.max_distance)
                .then_with(|| a.booking_id.cmp(&b.booking_id))
        });

        candidates
            .into_iter()
            .enumerate()
            .map(|(idx, c)| RankedBooking {
                seq: idx + 1,
                booking_id: c.booking_id,
                seats: c.seats,
                max_distance: c.max_distance,
            })
            .collect()
    }

    pub fn owner_of(&self, seat: &SeatLabel) -> Option<BookingId> {
        self.seat_owners.get(seat).copied()
    }

    fn claim_seats(&mut self, record: BookingRecord, issues: &mut Vec<RecordIssue>) -> Option<Candidate> {
        let BookingRecord {
            booking_id,
            seats: raw_seats,
            location,
        } = record;

        let mut seats: Vec<SeatLabel> = Vec::with_capacity(raw_seats.len());

        for raw in raw_seats {
            let seat = match raw.parse::<SeatLabel>() {
                Ok(seat) => seat,
                Err(_) => {
                    debug!("booking {}: rejecting seat {:?} ({})", booking_id, raw, location);
                    issues.push(RecordIssue::InvalidSeat {
                        raw: raw.trim().to_string(),
                        booking_id,
                        location,
                    });
                    continue;
                }
            };

            if let Some(owner) = self.owner_of(&seat).filter(|&owner| owner != booking_id) {
                debug!("booking {}: seat {} already held by booking {}", booking_id, seat, owner);
                issues.push(RecordIssue::DuplicateSeat {
                    seat,
                    owner,
                    booking_id,
                    location,
                });
                continue;
            }

            if !seats.contains(&seat) {
                seats.push(seat);
                self.seat_owners.insert(seat, booking_id);
            }
        }

        let max_distance = seats.iter().map(SeatLabel::distance).max()?;

        Some(Candidate {
            booking_id,
            seats,
            max_distance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Location;

    fn booking(booking_id: BookingId, seats: &[&str]) -> BookingRecord {
        BookingRecord {
            booking_id,
            seats: seats.iter().map(|s| s.to_string()).collect(),
            location: Location::Record(booking_id as usize),
        }
    }

    fn run(records: Vec<BookingRecord>) -> SequenceReport {
        generate_boarding_sequence(records.into_iter().map(Ok).collect()).unwrap()
    }

    #[test]
    fn farthest_seat_boards_first() {
        let report = run(vec![booking(1, &["A1", "A2"]), booking(2, &["C20"])]);

        assert_eq!(report.booking_order(), vec![2, 1]);
        assert_eq!(report.sequence[0].seq, 1);
        assert_eq!(report.sequence[0].max_distance, 20);
        assert_eq!(report.sequence[1].seq, 2);
        assert_eq!(report.sequence[1].max_distance, 2);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn ties_go_to_lower_booking_id() {
        let report = run(vec![
            booking(30, &["B7"]),
            booking(10, &["A7"]),
            booking(20, &["D7", "D1"]),
            booking(5, &["C3"]),
        ]);

        assert_eq!(report.booking_order(), vec![10, 20, 30, 5]);
    }

    #[test]
    fn cross_booking_duplicate_stays_with_first_claimant() {
        let report = run(vec![booking(1, &["A5"]), booking(2, &["A5"])]);

        assert_eq!(report.booking_order(), vec![1]);
        assert_eq!(
            report.error_messages(),
            vec!["Duplicate seat \"A5\" found in Booking 1 and Booking 2 (record 2)."]
        );
    }

    #[test]
    fn partial_conflict_keeps_the_remaining_seats() {
        let report = run(vec![booking(1, &["A5", "B9"]), booking(2, &["b9", "C4"])]);

        assert_eq!(report.booking_order(), vec![1, 2]);
        assert_eq!(
            report.sequence[1].seats,
            vec!["C4".parse::<SeatLabel>().unwrap()]
        );
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn repeated_seat_in_one_booking_is_silently_merged() {
        let report = run(vec![booking(4, &["a3", "A3", " A3 "])]);

        assert!(report.errors.is_empty());
        assert_eq!(report.sequence[0].seats.len(), 1);
        assert_eq!(report.sequence[0].seats[0].to_string(), "A3");
    }

    #[test]
    fn invalid_only_seat_drops_the_booking() {
        let report = run(vec![booking(1, &["E5"]), booking(2, &["A2"])]);

        assert_eq!(report.booking_order(), vec![2]);
        assert_eq!(
            report.error_messages(),
            vec!["Invalid seat \"E5\" in Booking 1 (record 1). Allowed: A-D and 1-20."]
        );
    }

    #[test]
    fn invalid_seat_does_not_stop_the_rest_of_the_booking() {
        let report = run(vec![booking(1, &["Z9", "B12", "A0"])]);

        assert_eq!(report.booking_order(), vec![1]);
        assert_eq!(report.sequence[0].max_distance, 12);
        assert_eq!(report.errors.len(), 2);
    }

    #[test]
    fn nothing_valid_adds_informational_error() {
        let report = run(vec![booking(1, &["E5"]), booking(2, &["A21"])]);

        assert!(report.sequence.is_empty());
        assert_eq!(report.errors.len(), 3);
        assert_eq!(
            report.errors.last(),
            Some(&RecordIssue::NoValidBookings)
        );
    }

    #[test]
    fn structural_issues_are_kept_ahead_of_seat_issues() {
        let mut parsed = ParsedBookings::default();
        parsed.push_row(Err(RecordIssue::MissingBookingId {
            location: Location::Line(2),
        }));
        parsed.push_row(Ok(booking(3, &["Q1"])));
        parsed.push_row(Ok(booking(4, &["A1"])));

        let report = generate_boarding_sequence(parsed).unwrap();
        assert_eq!(report.booking_order(), vec![4]);
        assert_eq!(report.errors[0].to_string(), "Missing Booking_ID on line 2.");
        assert!(matches!(report.errors[1], RecordIssue::InvalidSeat { booking_id: 3, .. }));
    }

    #[test]
    fn empty_input_is_an_error_not_an_empty_success() {
        let result = generate_boarding_sequence(ParsedBookings::default());
        assert!(matches!(result, Err(SequenceError::NoValidData)));
    }

    #[test]
    fn rows_that_all_failed_parsing_still_produce_a_report() {
        let mut parsed = ParsedBookings::default();
        parsed.push_row(Err(RecordIssue::MissingBookingId {
            location: Location::Line(2),
        }));

        let report = generate_boarding_sequence(parsed).unwrap();
        assert!(report.sequence.is_empty());
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.errors.last(), Some(&RecordIssue::NoValidBookings));
    }

    #[test]
    fn ownership_map_is_scoped_to_one_sequencer() {
        let mut first = Sequencer::default();
        let mut issues = Vec::new();
        first.rank(vec![booking(1, &["A1"])], &mut issues);
        assert_eq!(first.owner_of(&"A1".parse().unwrap()), Some(1));

        let second = Sequencer::default();
        assert_eq!(second.owner_of(&"A1".parse().unwrap()), None);
    }

    mod proptest_sequencer {
        use super::*;
        use proptest::prelude::*;

        fn arb_seat() -> impl Strategy<Value = String> {
            // Mostly valid labels with some out-of-range rows and numbers.
            ("[A-Fa-f]", 0u8..=22).prop_map(|(row, number)| format!("{row}{number}"))
        }

        fn arb_bookings() -> impl Strategy<Value = Vec<BookingRecord>> {
            proptest::collection::vec(
                (0i64..50, proptest::collection::vec(arb_seat(), 1..6)),
                0..30,
            )
            .prop_map(|rows| {
                rows.into_iter()
                    .enumerate()
                    .map(|(idx, (booking_id, seats))| BookingRecord {
                        booking_id,
                        seats,
                        location: Location::Line(idx + 1),
                    })
                    .collect()
            })
        }

        proptest! {
            // Sequence numbers are exactly 1..=N.
            #[test]
            fn prop_sequence_numbers_are_dense(records in arb_bookings()) {
                let mut sequencer = Sequencer::default();
                let mut issues = Vec::new();
                let ranked = sequencer.rank(records, &mut issues);

                for (idx, entry) in ranked.iter().enumerate() {
                    prop_assert_eq!(entry.seq, idx + 1);
                    prop_assert!(!entry.seats.is_empty());
                }
            }

            // Order is by farthest seat descending, then id ascending.
            #[test]
            fn prop_ordering_is_deterministic(records in arb_bookings()) {
                let mut issues = Vec::new();
                let ranked = Sequencer::default().rank(records.clone(), &mut issues);
                let again = Sequencer::default().rank(records, &mut Vec::new());
                prop_assert_eq!(&ranked, &again);

                for pair in ranked.windows(2) {
                    let (a, b) = (&pair[0], &pair[1]);
                    prop_assert!(
                        a.max_distance > b.max_distance
                            || (a.max_distance == b.max_distance && a.booking_id <= b.booking_id)
                    );
                    prop_assert_eq!(
                        a.max_distance,
                        a.seats.iter().map(SeatLabel::distance).max().unwrap_or(0)
                    );
                }
            }

            // No seat is held by two different booking ids.
            #[test]
            fn prop_no_seat_has_two_owners(records in arb_bookings()) {
                let ranked = Sequencer::default().rank(records, &mut Vec::new());
                let mut owners: HashMap<SeatLabel, BookingId> = HashMap::new();

                for entry in &ranked {
                    for seat in &entry.seats {
                        if let Some(previous) = owners.insert(*seat, entry.booking_id) {
                            prop_assert_eq!(previous, entry.booking_id);
                        }
                    }
                }
            }
        }
    }
}
