use chrono::NaiveDate;
use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::slots::{available_time_slots, day_bounds};

/// Free slots of one shop on `date`.
pub fn get_date_available_time_slots(
    conn: &Connection,
    barbershop_id: &str,
    date: NaiveDate,
) -> Result<Vec<&'static str>, AppError> {
    if queries::get_barbershop(conn, barbershop_id)?.is_none() {
        return Err(AppError::NotFound("barbershop not found".to_string()));
    }

    let (day_start, day_end) = day_bounds(date);
    let bookings = queries::get_active_bookings_in_range(conn, barbershop_id, &day_start, &day_end)?;

    Ok(available_time_slots(&bookings))
}
