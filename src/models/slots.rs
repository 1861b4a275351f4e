use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::models::Booking;

/// Bookable times of day for every shop. Each service takes one slot.
pub const TIME_SLOTS: [&str; 19] = [
    "09:00", "09:30", "10:00", "10:30", "11:00", "11:30", "12:00", "12:30", "13:00", "13:30",
    "14:00", "14:30", "15:00", "15:30", "16:00", "16:30", "17:00", "17:30", "18:00",
];

const SLOT_FORMAT: &str = "%H:%M";

/// Catalog entries not taken by any of `bookings`, in catalog order.
///
/// Every booking passed in counts as occupied, whatever its `cancelled`
/// flag says: the caller is expected to fetch active bookings only.
pub fn available_time_slots(bookings: &[Booking]) -> Vec<&'static str> {
    let occupied: HashSet<String> = bookings
        .iter()
        .map(|b| b.date.format(SLOT_FORMAT).to_string())
        .collect();

    TIME_SLOTS
        .iter()
        .copied()
        .filter(|slot| !occupied.contains(*slot))
        .collect()
}

pub fn is_catalog_slot(time: &str) -> bool {
    TIME_SLOTS.contains(&time)
}

/// Timestamp of `time` on `day`, or `None` when `time` is not in the catalog.
pub fn slot_datetime(day: NaiveDate, time: &str) -> Option<NaiveDateTime> {
    if !is_catalog_slot(time) {
        return None;
    }
    let t = NaiveTime::parse_from_str(time, SLOT_FORMAT).ok()?;
    Some(day.and_time(t))
}

/// First and last second of `day`, both inclusive.
pub fn day_bounds(day: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = day.and_time(NaiveTime::MIN);
    let end = day.and_hms_opt(23, 59, 59).unwrap_or(start);
    (start, end)
}
