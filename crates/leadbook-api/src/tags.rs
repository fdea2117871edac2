//! Handlers for `/tags` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/tags` | All tags, name ascending |
//! | `POST`   | `/tags` | Body: `{"name":"...","color":"#RRGGBB"}`, color optional |
//! | `PUT`    | `/tags/:id` | Full replace of name and color |
//! | `DELETE` | `/tags/:id` | Unlinks the tag from every lead |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use leadbook_core::{
  source::ConversationSource,
  store::LeadStore,
  tag::{NewTag, Tag},
};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// `GET /tags`
pub async fn list<S, C>(
  State(state): State<AppState<S, C>>,
) -> Result<Json<Vec<Tag>>, ApiError>
where
  S: LeadStore + 'static,
  C: ConversationSource + 'static,
{
  let tags = state
    .store
    .list_tags()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(tags))
}

/// `POST /tags` — returns 201 + the stored tag.
pub async fn create<S, C>(
  State(state): State<AppState<S, C>>,
  Json(body): Json<NewTag>,
) -> Result<impl IntoResponse, ApiError>
where
  S: LeadStore + 'static,
  C: ConversationSource + 'static,
{
  body
    .validate()
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let taken = state
    .store
    .list_tags()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .iter()
    .any(|t| t.name == body.name);
  if taken {
    return Err(ApiError::BadRequest(
      "a tag with this name already exists".into(),
    ));
  }

  let tag = state
    .store
    .create_tag(body)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(tag)))
}

/// `PUT /tags/:id`
pub async fn update_one<S, C>(
  State(state): State<AppState<S, C>>,
  Path(id): Path<Uuid>,
  Json(body): Json<NewTag>,
) -> Result<Json<Tag>, ApiError>
where
  S: LeadStore + 'static,
  C: ConversationSource + 'static,
{
  body
    .validate()
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let collision = state
    .store
    .list_tags()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .iter()
    .any(|t| t.name == body.name && t.id != id);
  if collision {
    return Err(ApiError::BadRequest(
      "a tag with this name already exists".into(),
    ));
  }

  let found = state
    .store
    .update_tag(id, body)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  if !found {
    return Err(ApiError::NotFound(format!("tag {id} not found")));
  }

  let tag = state
    .store
    .list_tags()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .into_iter()
    .find(|t| t.id == id)
    .ok_or_else(|| ApiError::NotFound(format!("tag {id} not found")))?;
  Ok(Json(tag))
}

/// `DELETE /tags/:id`
pub async fn delete_one<S, C>(
  State(state): State<AppState<S, C>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: LeadStore + 'static,
  C: ConversationSource + 'static,
{
  let deleted = state
    .store
    .delete_tag(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  if deleted {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("tag {id} not found")))
  }
}
