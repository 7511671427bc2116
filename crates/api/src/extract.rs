//! Request body extractors that report failures in the API's error shape.

use axum::extract::FromRequest;

use crate::error::AppError;

/// JSON request body. Malformed JSON, a wrong content type, and missing or
/// mistyped fields all become a 400 `{ error, code }` body instead of axum's
/// plain-text 415/422 rejections.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
