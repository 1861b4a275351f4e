use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::db::queries::{self, BookingFilter};
use crate::errors::AppError;
use crate::handlers::auth::current_user;
use crate::handlers::extract::Query;
use crate::handlers::bookings::BookingResponse;
use crate::models::slots::day_bounds;
use crate::models::{BarbershopSummary, BookingDetails, StatusFilter};
use crate::services::admin::{self, format_brl};
use crate::state::AppState;

// GET /api/admin/barbershops
pub async fn get_user_barbershops(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<BarbershopSummary>>, AppError> {
    let now = state.clock.now();
    let user = current_user(&state, &headers, &now)?;

    let shops = {
        let db = state.db()?;
        queries::get_user_barbershops(&db, &user.id)?
    };
    Ok(Json(shops))
}

// GET /api/admin/barbershops/:id/bookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub status: Option<StatusFilter>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

/// Accepts `YYYY-MM-DD` (widened to the start or end of that day) or a full
/// `YYYY-MM-DDTHH:MM:SS` timestamp.
fn parse_date_bound(raw: &str, end_of_day: bool) -> Result<NaiveDateTime, AppError> {
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let (start, end) = day_bounds(day);
        return Ok(if end_of_day { end } else { start });
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .map_err(|_| AppError::Validation(format!("invalid date: {raw}")))
}

pub async fn get_barbershop_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let now = state.clock.now();
    let user = current_user(&state, &headers, &now)?;

    let filter = BookingFilter {
        status: query.status.unwrap_or_default(),
        date_from: query
            .date_from
            .as_deref()
            .map(|s| parse_date_bound(s, false))
            .transpose()?,
        date_to: query
            .date_to
            .as_deref()
            .map(|s| parse_date_bound(s, true))
            .transpose()?,
    };

    let bookings = {
        let db = state.db()?;
        admin::get_barbershop_bookings(&db, &user, &id, &filter, &now)?
    };

    Ok(Json(
        bookings
            .into_iter()
            .map(|b| BookingResponse::from_details(b, &now))
            .collect(),
    ))
}

// GET /api/admin/barbershops/:id/dashboard
#[derive(Serialize)]
pub struct DashboardResponse {
    barbershop: BarbershopSummary,
    total_bookings: usize,
    total_revenue_in_cents: i64,
    total_revenue: String,
    confirmed: Vec<BookingResponse>,
    cancelled: Vec<BookingResponse>,
    finished: Vec<BookingResponse>,
}

pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<DashboardResponse>, AppError> {
    let now = state.clock.now();
    let user = current_user(&state, &headers, &now)?;

    let (shop, overview) = {
        let db = state.db()?;
        admin::dashboard(&db, &user, &id, &now)?
    };

    let render = |list: Vec<BookingDetails>| -> Vec<BookingResponse> {
        list.into_iter()
            .map(|b| BookingResponse::from_details(b, &now))
            .collect()
    };

    Ok(Json(DashboardResponse {
        barbershop: BarbershopSummary {
            id: shop.id,
            name: shop.name,
        },
        total_bookings: overview.total_bookings,
        total_revenue_in_cents: overview.total_revenue_in_cents,
        total_revenue: format_brl(overview.total_revenue_in_cents),
        confirmed: render(overview.confirmed),
        cancelled: render(overview.cancelled),
        finished: render(overview.finished),
    }))
}
