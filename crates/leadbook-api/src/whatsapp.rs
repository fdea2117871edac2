//! Handlers for the WhatsApp integration endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/whatsapp/import` | Run one guarded pass now; 409 while busy, 502 if the source is down |
//! | `GET`  | `/whatsapp/stats` | Aggregate counts from the remote conversation table |
//! | `POST` | `/whatsapp/auto-import/start` | Body: `{"intervalMinutes":5}`, optional |
//! | `POST` | `/whatsapp/auto-import/stop` | Idempotent |
//! | `GET`  | `/whatsapp/auto-import/status` | `{"enabled":...,"intervalMinutes":...}` |
//! | `POST` | `/whatsapp/backfill-followups` | One-time maintenance; returns `{"updated":n}` |

use axum::{Json, extract::State};
use leadbook_core::{
  conversation::SourceStats, source::ConversationSource, store::LeadStore,
};
use leadbook_sync::{DEFAULT_INTERVAL_MINUTES, WorkerStatus};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError};

// ─── Manual import ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ImportResponse {
  pub message:  String,
  pub imported: u64,
  pub updated:  u64,
  pub total:    u64,
}

/// `POST /whatsapp/import` — run a single reconciliation pass.
pub async fn import_now<S, C>(
  State(state): State<AppState<S, C>>,
) -> Result<Json<ImportResponse>, ApiError>
where
  S: LeadStore + 'static,
  C: ConversationSource + 'static,
{
  let summary = state.worker.run_once().await?;
  Ok(Json(ImportResponse {
    message:  format!(
      "Import completed: {} new leads, {} updated",
      summary.imported, summary.updated
    ),
    imported: summary.imported,
    updated:  summary.updated,
    total:    summary.total,
  }))
}

// ─── Stats ────────────────────────────────────────────────────────────────────

/// `GET /whatsapp/stats`
pub async fn stats<S, C>(
  State(state): State<AppState<S, C>>,
) -> Result<Json<SourceStats>, ApiError>
where
  S: LeadStore + 'static,
  C: ConversationSource + 'static,
{
  let stats = state
    .source
    .fetch_stats()
    .await
    .map_err(|e| ApiError::SourceUnavailable(e.to_string()))?;
  Ok(Json(stats))
}

// ─── Auto-import lifecycle ────────────────────────────────────────────────────

/// JSON body accepted by `POST /whatsapp/auto-import/start`. The whole body
/// is optional; a missing interval means the five-minute default.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartBody {
  pub interval_minutes: Option<u64>,
}

/// `POST /whatsapp/auto-import/start`
pub async fn start_auto_import<S, C>(
  State(state): State<AppState<S, C>>,
  body: Option<Json<StartBody>>,
) -> Result<Json<WorkerStatus>, ApiError>
where
  S: LeadStore + 'static,
  C: ConversationSource + 'static,
{
  let interval = body
    .and_then(|Json(b)| b.interval_minutes)
    .unwrap_or(DEFAULT_INTERVAL_MINUTES);
  state.worker.start(interval).await?;
  Ok(Json(state.worker.status()))
}

/// `POST /whatsapp/auto-import/stop`
pub async fn stop_auto_import<S, C>(
  State(state): State<AppState<S, C>>,
) -> Json<WorkerStatus>
where
  S: LeadStore + 'static,
  C: ConversationSource + 'static,
{
  state.worker.stop().await;
  Json(state.worker.status())
}

/// `GET /whatsapp/auto-import/status`
pub async fn auto_import_status<S, C>(
  State(state): State<AppState<S, C>>,
) -> Json<WorkerStatus>
where
  S: LeadStore + 'static,
  C: ConversationSource + 'static,
{
  Json(state.worker.status())
}

// ─── Backfill ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct BackfillResponse {
  pub updated: u64,
}

/// `POST /whatsapp/backfill-followups` — give every synced lead that still
/// lacks a follow-up date one set to today.
pub async fn backfill_followups<S, C>(
  State(state): State<AppState<S, C>>,
) -> Result<Json<BackfillResponse>, ApiError>
where
  S: LeadStore + 'static,
  C: ConversationSource + 'static,
{
  let updated = state
    .store
    .backfill_followup_dates()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(BackfillResponse { updated }))
}
