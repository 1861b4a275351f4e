use axum::extract::{FromRequest, FromRequestParts};

use crate::errors::AppError;

/// `Query` whose rejection is rendered as an `AppError` JSON body.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct Query<T>(pub T);

/// `Json` whose rejection is rendered as an `AppError` JSON body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Json<T>(pub T);
