//! Handlers for `/agents` endpoints.

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use leadbook_core::{
  agent::{Agent, NewAgent},
  source::ConversationSource,
  store::LeadStore,
};

use crate::{AppState, error::ApiError};

/// `GET /agents`
pub async fn list<S, C>(
  State(state): State<AppState<S, C>>,
) -> Result<Json<Vec<Agent>>, ApiError>
where
  S: LeadStore + 'static,
  C: ConversationSource + 'static,
{
  let agents = state
    .store
    .list_agents()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(agents))
}

/// `POST /agents` — returns 201 + the stored agent.
pub async fn create<S, C>(
  State(state): State<AppState<S, C>>,
  Json(body): Json<NewAgent>,
) -> Result<impl IntoResponse, ApiError>
where
  S: LeadStore + 'static,
  C: ConversationSource + 'static,
{
  let agent = state
    .store
    .create_agent(body)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(agent)))
}
