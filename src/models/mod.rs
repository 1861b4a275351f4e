pub mod barbershop;
pub mod booking;
pub mod slots;
pub mod user;

pub use barbershop::{Barbershop, BarbershopService, BarbershopSummary};
pub use booking::{Booking, BookingDetails, BookingStatus, StatusFilter};
pub use slots::TIME_SLOTS;
pub use user::User;

/// Storage and wire format for timestamps.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
