pub mod booking;
pub mod seat;

pub use booking::{
    BookingId, BookingRecord, Location, ParsedBookings, RankedBooking, RawBooking, RawBookingId,
    RawSeats, SequenceReport, SequenceRequest,
};
pub use seat::SeatLabel;
