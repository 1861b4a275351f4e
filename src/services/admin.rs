use chrono::NaiveDateTime;
use rusqlite::Connection;

use crate::db::queries::{self, BookingFilter};
use crate::errors::AppError;
use crate::models::{Barbershop, BookingDetails, BookingStatus, User};

/// Loads a barbershop and checks that `user` owns it.
pub fn require_owned_barbershop(
    conn: &Connection,
    user: &User,
    barbershop_id: &str,
) -> Result<Barbershop, AppError> {
    let shop = queries::get_barbershop(conn, barbershop_id)?
        .ok_or_else(|| AppError::NotFound("barbershop not found".to_string()))?;

    if !shop.is_owned_by(&user.id) {
        return Err(AppError::Forbidden(
            "you do not have permission to access this barbershop".to_string(),
        ));
    }
    Ok(shop)
}

pub fn get_barbershop_bookings(
    conn: &Connection,
    user: &User,
    barbershop_id: &str,
    filter: &BookingFilter,
    now: &NaiveDateTime,
) -> Result<Vec<BookingDetails>, AppError> {
    require_owned_barbershop(conn, user, barbershop_id)?;
    Ok(queries::get_barbershop_bookings(conn, barbershop_id, filter, now)?)
}

/// Owner dashboard figures over every booking of a shop.
#[derive(Debug, Clone)]
pub struct BookingOverview {
    pub total_bookings: usize,
    /// Service prices of every booking that was not cancelled.
    pub total_revenue_in_cents: i64,
    pub confirmed: Vec<BookingDetails>,
    pub cancelled: Vec<BookingDetails>,
    pub finished: Vec<BookingDetails>,
}

impl BookingOverview {
    pub fn from_bookings(bookings: Vec<BookingDetails>, now: &NaiveDateTime) -> Self {
        let total_bookings = bookings.len();
        let total_revenue_in_cents = bookings
            .iter()
            .filter(|b| !b.booking.cancelled)
            .map(|b| b.service.price_in_cents)
            .sum();

        let mut confirmed = vec![];
        let mut cancelled = vec![];
        let mut finished = vec![];
        for b in bookings {
            match b.booking.status(now) {
                BookingStatus::Confirmed => confirmed.push(b),
                BookingStatus::Cancelled => cancelled.push(b),
                BookingStatus::Finished => finished.push(b),
            }
        }

        Self {
            total_bookings,
            total_revenue_in_cents,
            confirmed,
            cancelled,
            finished,
        }
    }
}

pub fn dashboard(
    conn: &Connection,
    user: &User,
    barbershop_id: &str,
    now: &NaiveDateTime,
) -> Result<(Barbershop, BookingOverview), AppError> {
    let shop = require_owned_barbershop(conn, user, barbershop_id)?;
    let bookings =
        queries::get_barbershop_bookings(conn, barbershop_id, &BookingFilter::default(), now)?;
    Ok((shop, BookingOverview::from_bookings(bookings, now)))
}

/// Formats cents as Brazilian real, e.g. `R$ 1.234,50`. The currency
/// symbol is followed by a no-break space, as pt-BR locales print it.
pub fn format_brl(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let reais = (abs / 100).to_string();
    let centavos = abs % 100;

    let mut grouped = String::with_capacity(reais.len() + reais.len() / 3);
    for (i, ch) in reais.chars().enumerate() {
        if i > 0 && (reais.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{sign}R$\u{a0}{grouped},{centavos:02}")
}
