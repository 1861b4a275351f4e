use axum::http::HeaderMap;
use chrono::NaiveDateTime;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::User;
use crate::state::AppState;

/// Resolves the `Authorization: Bearer <session token>` header to a user.
pub fn current_user(
    state: &AppState,
    headers: &HeaderMap,
    now: &NaiveDateTime,
) -> Result<User, AppError> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Unauthorized)?;

    let db = state.db()?;
    queries::get_session_user(&db, token, now)?.ok_or(AppError::Unauthorized)
}
