//! Request body extractor

use axum::extract::FromRequest;

use crate::error::AlertSrvError;

/// `Json` body whose rejections are reported as [`AlertSrvError`]
///
/// Keeps malformed bodies in the same `{success, error}` envelope as
/// handler errors.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AlertSrvError))]
pub struct ApiJson<T>(pub T);
