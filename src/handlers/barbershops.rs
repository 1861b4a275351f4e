use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::extract::Query;
use crate::models::{Barbershop, BarbershopService};
use crate::services::availability;
use crate::state::AppState;

// GET /api/barbershops
#[derive(Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
}

pub async fn list_barbershops(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Barbershop>>, AppError> {
    let shops = {
        let db = state.db()?;
        queries::list_barbershops(&db, query.search.as_deref())?
    };
    Ok(Json(shops))
}

// GET /api/barbershops/:id
#[derive(Serialize)]
pub struct BarbershopResponse {
    #[serde(flatten)]
    barbershop: Barbershop,
    services: Vec<BarbershopService>,
}

pub async fn get_barbershop(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BarbershopResponse>, AppError> {
    let db = state.db()?;
    let barbershop = queries::get_barbershop(&db, &id)?
        .ok_or_else(|| AppError::NotFound("barbershop not found".to_string()))?;
    let services = queries::get_barbershop_services(&db, &id)?;

    Ok(Json(BarbershopResponse {
        barbershop,
        services,
    }))
}

// GET /api/barbershops/:id/available-slots?date=YYYY-MM-DD
#[derive(Deserialize)]
pub struct SlotsQuery {
    pub date: NaiveDate,
}

pub async fn available_slots(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<Vec<&'static str>>, AppError> {
    let slots = {
        let db = state.db()?;
        availability::get_date_available_time_slots(&db, &id, query.date)?
    };
    Ok(Json(slots))
}
