//! Handlers for `/call-logs` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/call-logs/lead/:lead_id` | Logs for one lead, newest first |
//! | `POST` | `/call-logs` | Body: [`NewCallLog`]; a `new_status` also moves the lead |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use leadbook_core::{
  call_log::{CallLog, NewCallLog},
  source::ConversationSource,
  store::LeadStore,
};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// `GET /call-logs/lead/:lead_id`
pub async fn list_for_lead<S, C>(
  State(state): State<AppState<S, C>>,
  Path(lead_id): Path<Uuid>,
) -> Result<Json<Vec<CallLog>>, ApiError>
where
  S: LeadStore + 'static,
  C: ConversationSource + 'static,
{
  let logs = state
    .store
    .call_logs_for_lead(lead_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(logs))
}

/// `POST /call-logs` — returns 201 + the stored log.
pub async fn create<S, C>(
  State(state): State<AppState<S, C>>,
  Json(body): Json<NewCallLog>,
) -> Result<impl IntoResponse, ApiError>
where
  S: LeadStore + 'static,
  C: ConversationSource + 'static,
{
  state
    .store
    .get_lead(body.lead_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("lead {} not found", body.lead_id)))?;

  let log = state
    .store
    .add_call_log(body)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(log)))
}
