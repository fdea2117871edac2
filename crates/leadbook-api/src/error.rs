//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// An import pass is already running (409).
  #[error("busy: {0}")]
  Busy(String),

  /// The remote conversation database could not be reached (502).
  #[error("source unavailable: {0}")]
  SourceUnavailable(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Busy(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::SourceUnavailable(m) => (StatusCode::BAD_GATEWAY, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

impl From<leadbook_sync::Error> for ApiError {
  fn from(e: leadbook_sync::Error) -> Self {
    use leadbook_sync::Error as SyncError;
    match &e {
      SyncError::Busy => ApiError::Busy(e.to_string()),
      SyncError::InvalidInterval => ApiError::BadRequest(e.to_string()),
      SyncError::Source(_) => ApiError::SourceUnavailable(e.to_string()),
    }
  }
}
