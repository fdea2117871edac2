//! Handlers for `/leads` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/leads` | Optional filters: `status`, `assigned_agent`, `search`, `date`, `date_from`, `date_to`, `limit`, `offset` |
//! | `POST`   | `/leads` | Body: [`CreateLeadBody`]; returns 201 + lead with tags |
//! | `GET`    | `/leads/:id` | Lead plus its `tags` array; 404 if not found |
//! | `PUT`    | `/leads/:id` | Partial update; optional `tag_ids` replaces the tag set |
//! | `DELETE` | `/leads/:id` | 204 on success |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{NaiveDate, Utc};
use leadbook_core::{
  lead::{Lead, LeadPatch, LeadStatus, NewLead},
  source::ConversationSource,
  store::{LeadQuery, LeadStore},
  tag::Tag,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// A lead together with its tag set, as returned by the detail endpoints.
#[derive(Debug, Serialize)]
pub struct LeadWithTags {
  #[serde(flatten)]
  pub lead: Lead,
  pub tags: Vec<Tag>,
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub status:         Option<LeadStatus>,
  pub assigned_agent: Option<Uuid>,
  /// Free-text filter over school name, client name, and mobile number.
  pub search:         Option<String>,
  /// `YYYY-MM-DD`, or the literal `today`.
  pub date:           Option<String>,
  pub date_from:      Option<NaiveDate>,
  pub date_to:        Option<NaiveDate>,
  pub limit:          Option<usize>,
  pub offset:         Option<usize>,
}

impl ListParams {
  fn into_query(self) -> Result<LeadQuery, ApiError> {
    let date = match self.date.as_deref() {
      None => None,
      Some("today") => Some(Utc::now().date_naive()),
      Some(raw) => {
        Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
          ApiError::BadRequest(format!("invalid date filter: {raw}"))
        })?)
      }
    };
    Ok(LeadQuery {
      status:         self.status,
      assigned_agent: self.assigned_agent,
      search:         self.search,
      date,
      date_from:      self.date_from,
      date_to:        self.date_to,
      limit:          self.limit,
      offset:         self.offset,
    })
  }
}

/// `GET /leads[?status=...][&search=...]`
pub async fn list<S, C>(
  State(state): State<AppState<S, C>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Lead>>, ApiError>
where
  S: LeadStore + 'static,
  C: ConversationSource + 'static,
{
  let query = params.into_query()?;
  let leads = state
    .store
    .list_leads(&query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(leads))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /leads`.
#[derive(Debug, Deserialize)]
pub struct CreateLeadBody {
  #[serde(flatten)]
  pub lead:    NewLead,
  #[serde(default)]
  pub tag_ids: Vec<Uuid>,
}

/// `POST /leads` — returns 201 + the stored lead with its tags.
pub async fn create<S, C>(
  State(state): State<AppState<S, C>>,
  Json(body): Json<CreateLeadBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: LeadStore + 'static,
  C: ConversationSource + 'static,
{
  body
    .lead
    .validate()
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let existing = state
    .store
    .find_by_phone(&body.lead.mobile_number)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  if existing.is_some() {
    return Err(ApiError::BadRequest(
      "a lead with this mobile number already exists".into(),
    ));
  }

  let lead = state
    .store
    .create_lead(body.lead)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  if !body.tag_ids.is_empty() {
    state
      .store
      .set_lead_tags(lead.id, body.tag_ids)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?;
  }

  let tags = state
    .store
    .tags_for_lead(lead.id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok((StatusCode::CREATED, Json(LeadWithTags { lead, tags })))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /leads/:id`
pub async fn get_one<S, C>(
  State(state): State<AppState<S, C>>,
  Path(id): Path<Uuid>,
) -> Result<Json<LeadWithTags>, ApiError>
where
  S: LeadStore + 'static,
  C: ConversationSource + 'static,
{
  let lead = state
    .store
    .get_lead(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("lead {id} not found")))?;
  let tags = state
    .store
    .tags_for_lead(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(LeadWithTags { lead, tags }))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `PUT /leads/:id`. Absent fields are left untouched;
/// `tag_ids`, when present, replaces the whole tag set.
#[derive(Debug, Deserialize)]
pub struct UpdateLeadBody {
  #[serde(flatten)]
  pub patch:   LeadPatch,
  pub tag_ids: Option<Vec<Uuid>>,
}

/// `PUT /leads/:id`
pub async fn update_one<S, C>(
  State(state): State<AppState<S, C>>,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateLeadBody>,
) -> Result<Json<LeadWithTags>, ApiError>
where
  S: LeadStore + 'static,
  C: ConversationSource + 'static,
{
  body
    .patch
    .validate()
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
  if body.patch.is_empty() && body.tag_ids.is_none() {
    return Err(ApiError::BadRequest("no fields to update".into()));
  }

  if let Some(number) = &body.patch.mobile_number {
    let owner = state
      .store
      .find_by_phone(number)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?;
    if let Some(owner) = owner
      && owner.id != id
    {
      return Err(ApiError::BadRequest(
        "another lead already has this mobile number".into(),
      ));
    }
  }

  if body.patch.is_empty() {
    // Tag-only update: the lead still has to exist.
    state
      .store
      .get_lead(id)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?
      .ok_or_else(|| ApiError::NotFound(format!("lead {id} not found")))?;
  } else {
    let found = state
      .store
      .update_lead(id, body.patch)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?;
    if !found {
      return Err(ApiError::NotFound(format!("lead {id} not found")));
    }
  }

  if let Some(tag_ids) = body.tag_ids {
    state
      .store
      .set_lead_tags(id, tag_ids)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?;
  }

  let lead = state
    .store
    .get_lead(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("lead {id} not found")))?;
  let tags = state
    .store
    .tags_for_lead(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(LeadWithTags { lead, tags }))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /leads/:id` — also removes the lead's tag links and call logs.
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
    .delete_lead(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  if deleted {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("lead {id} not found")))
  }
}
