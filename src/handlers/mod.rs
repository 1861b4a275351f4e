pub mod admin;
pub mod auth;
pub mod barbershops;
pub mod bookings;
pub mod extract;
pub mod health;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/barbershops", get(barbershops::list_barbershops))
        .route("/api/barbershops/:id", get(barbershops::get_barbershop))
        .route(
            "/api/barbershops/:id/available-slots",
            get(barbershops::available_slots),
        )
        .route(
            "/api/bookings",
            get(bookings::list_my_bookings).post(bookings::create_booking),
        )
        .route("/api/bookings/:id/cancel", post(bookings::cancel_booking))
        .route("/api/admin/barbershops", get(admin::get_user_barbershops))
        .route(
            "/api/admin/barbershops/:id/bookings",
            get(admin::get_barbershop_bookings),
        )
        .route(
            "/api/admin/barbershops/:id/dashboard",
            get(admin::get_dashboard),
        )
        .with_state(state)
}
