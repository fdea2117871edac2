//! JSON REST API for Leadbook.
//!
//! Exposes an axum [`Router`] backed by any
//! [`leadbook_core::store::LeadStore`] plus a
//! [`leadbook_core::source::ConversationSource`] for the WhatsApp routes.
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! axum::serve(listener, leadbook_api::api_router(state)).await?;
//! ```

pub mod agents;
pub mod call_logs;
pub mod error;
pub mod leads;
pub mod tags;
pub mod whatsapp;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{get, post, put},
};
use chrono::Utc;
use leadbook_core::{source::ConversationSource, store::LeadStore};
use leadbook_sync::SyncWorker;
use serde_json::json;

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S, C> {
  pub store:  Arc<S>,
  pub source: Arc<C>,
  pub worker: SyncWorker<S, C>,
}

impl<S, C> Clone for AppState<S, C> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      source: Arc::clone(&self.source),
      worker: self.worker.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, C>(state: AppState<S, C>) -> Router<()>
where
  S: LeadStore + 'static,
  C: ConversationSource + 'static,
{
  Router::new()
    .route("/health", get(health))
    // Leads
    .route("/leads", get(leads::list::<S, C>).post(leads::create::<S, C>))
    .route(
      "/leads/{id}",
      get(leads::get_one::<S, C>)
        .put(leads::update_one::<S, C>)
        .delete(leads::delete_one::<S, C>),
    )
    // Tags
    .route("/tags", get(tags::list::<S, C>).post(tags::create::<S, C>))
    .route(
      "/tags/{id}",
      put(tags::update_one::<S, C>).delete(tags::delete_one::<S, C>),
    )
    // Call logs
    .route("/call-logs", post(call_logs::create::<S, C>))
    .route(
      "/call-logs/lead/{lead_id}",
      get(call_logs::list_for_lead::<S, C>),
    )
    // Agents
    .route("/agents", get(agents::list::<S, C>).post(agents::create::<S, C>))
    // WhatsApp
    .route("/whatsapp/import", post(whatsapp::import_now::<S, C>))
    .route("/whatsapp/stats", get(whatsapp::stats::<S, C>))
    .route(
      "/whatsapp/auto-import/start",
      post(whatsapp::start_auto_import::<S, C>),
    )
    .route(
      "/whatsapp/auto-import/stop",
      post(whatsapp::stop_auto_import::<S, C>),
    )
    .route(
      "/whatsapp/auto-import/status",
      get(whatsapp::auto_import_status::<S, C>),
    )
    .route(
      "/whatsapp/backfill-followups",
      post(whatsapp::backfill_followups::<S, C>),
    )
    .with_state(state)
}

/// `GET /health` — liveness probe; the server layer leaves it
/// unauthenticated.
async fn health() -> Json<serde_json::Value> {
  Json(json!({ "status": "OK", "timestamp": Utc::now() }))
}

// ─── Integration tests ────────────────────────────────────────────────────────
