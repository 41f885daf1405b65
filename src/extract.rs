use axum::extract::FromRequest;

use crate::error::AppError;

/// `Json` whose rejections (bad content type, malformed or mistyped body) are
/// reported as `AppError::BadRequest` inside the usual envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
