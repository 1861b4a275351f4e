use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::slots::slot_datetime;
use crate::models::{Booking, BookingStatus, User};

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub service_id: String,
    pub date: NaiveDate,
    pub time: String,
}

/// Books a catalog slot for `user`. The slot check and the insert share the
/// caller's connection lock, so two requests cannot take the same slot.
pub fn create_booking(
    conn: &Connection,
    user: &User,
    request: &NewBooking,
    now: &NaiveDateTime,
) -> Result<Booking, AppError> {
    let service = queries::get_service(conn, &request.service_id)?
        .ok_or_else(|| AppError::NotFound("service not found".to_string()))?;

    let date = slot_datetime(request.date, &request.time).ok_or_else(|| {
        AppError::Validation(format!("{} is not a bookable time", request.time))
    })?;

    if date < *now {
        return Err(AppError::Validation(
            "cannot book a time in the past".to_string(),
        ));
    }

    if queries::is_slot_taken(conn, &service.barbershop_id, &date)? {
        return Err(AppError::Conflict("time slot already booked".to_string()));
    }

    let booking = Booking {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user.id.clone(),
        service_id: service.id,
        barbershop_id: service.barbershop_id,
        date,
        cancelled: false,
        cancelled_at: None,
        created_at: *now,
    };
    queries::create_booking(conn, &booking)?;

    tracing::info!(
        booking_id = %booking.id,
        barbershop_id = %booking.barbershop_id,
        date = %booking.date,
        "booking created"
    );
    Ok(booking)
}

/// Cancels a confirmed booking on behalf of its customer or the shop owner.
pub fn cancel_booking(
    conn: &Connection,
    user: &User,
    booking_id: &str,
    now: &NaiveDateTime,
) -> Result<Booking, AppError> {
    let booking = queries::get_booking_by_id(conn, booking_id)?
        .ok_or_else(|| AppError::NotFound("booking not found".to_string()))?;

    if booking.user_id != user.id {
        let owns_shop = queries::get_barbershop(conn, &booking.barbershop_id)?
            .is_some_and(|shop| shop.is_owned_by(&user.id));
        if !owns_shop {
            return Err(AppError::Forbidden(
                "you cannot cancel this booking".to_string(),
            ));
        }
    }

    match booking.status(now) {
        BookingStatus::Confirmed => {}
        BookingStatus::Cancelled => {
            return Err(AppError::Validation("booking is already cancelled".to_string()))
        }
        BookingStatus::Finished => {
            return Err(AppError::Validation("booking has already finished".to_string()))
        }
    }

    if !queries::cancel_booking(conn, &booking.id, now)? {
        return Err(AppError::Validation("booking is already cancelled".to_string()));
    }

    tracing::info!(booking_id = %booking.id, cancelled_by = %user.id, "booking cancelled");

    Ok(Booking {
        cancelled: true,
        cancelled_at: Some(*now),
        ..booking
    })
}
