use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::auth::current_user;
use crate::handlers::extract::Json as JsonBody;
use crate::models::booking::{BarbershopContact, Customer, ServiceSummary};
use crate::models::{Booking, BookingDetails, BookingStatus, DATETIME_FORMAT};
use crate::services::booking::{self, NewBooking};
use crate::state::AppState;

#[derive(Serialize)]
pub struct BookingResponse {
    id: String,
    date: String,
    status: BookingStatus,
    cancelled: bool,
    cancelled_at: Option<String>,
    created_at: String,
    service: ServiceSummary,
    barbershop: BarbershopContact,
    user: Customer,
}

impl BookingResponse {
    pub fn from_details(details: BookingDetails, now: &NaiveDateTime) -> Self {
        let BookingDetails {
            booking,
            service,
            barbershop,
            customer,
        } = details;

        Self {
            status: booking.status(now),
            date: booking.date.format(DATETIME_FORMAT).to_string(),
            cancelled: booking.cancelled,
            cancelled_at: booking
                .cancelled_at
                .map(|t| t.format(DATETIME_FORMAT).to_string()),
            created_at: booking.created_at.format(DATETIME_FORMAT).to_string(),
            id: booking.id,
            service,
            barbershop,
            user: customer,
        }
    }
}

/// Bare booking row, returned by create and cancel.
#[derive(Serialize)]
pub struct BookingSummaryResponse {
    id: String,
    service_id: String,
    barbershop_id: String,
    date: String,
    status: BookingStatus,
    cancelled: bool,
    cancelled_at: Option<String>,
}

impl BookingSummaryResponse {
    fn new(booking: Booking, now: &NaiveDateTime) -> Self {
        Self {
            status: booking.status(now),
            date: booking.date.format(DATETIME_FORMAT).to_string(),
            cancelled: booking.cancelled,
            cancelled_at: booking
                .cancelled_at
                .map(|t| t.format(DATETIME_FORMAT).to_string()),
            id: booking.id,
            service_id: booking.service_id,
            barbershop_id: booking.barbershop_id,
        }
    }
}

// GET /api/bookings
pub async fn list_my_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let now = state.clock.now();
    let user = current_user(&state, &headers, &now)?;

    let bookings = {
        let db = state.db()?;
        queries::get_user_bookings(&db, &user.id)?
    };

    Ok(Json(
        bookings
            .into_iter()
            .map(|b| BookingResponse::from_details(b, &now))
            .collect(),
    ))
}

// POST /api/bookings
#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub service_id: String,
    pub date: NaiveDate,
    pub time: String,
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    JsonBody(body): JsonBody<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingSummaryResponse>), AppError> {
    let now = state.clock.now();
    let user = current_user(&state, &headers, &now)?;

    let request = NewBooking {
        service_id: body.service_id,
        date: body.date,
        time: body.time,
    };
    let created = {
        let db = state.db()?;
        booking::create_booking(&db, &user, &request, &now)?
    };

    Ok((
        StatusCode::CREATED,
        Json(BookingSummaryResponse::new(created, &now)),
    ))
}

// POST /api/bookings/:id/cancel
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<BookingSummaryResponse>, AppError> {
    let now = state.clock.now();
    let user = current_user(&state, &headers, &now)?;

    let cancelled = {
        let db = state.db()?;
        booking::cancel_booking(&db, &user, &id, &now)?
    };

    Ok(Json(BookingSummaryResponse::new(cancelled, &now)))
}
