//! The `LeadStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `leadbook-store-sqlite`).
//! Higher layers (`leadbook-sync`, `leadbook-api`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  agent::{Agent, NewAgent},
  call_log::{CallLog, NewCallLog},
  lead::{ImportedLead, Lead, LeadPatch, LeadStatus, NewLead},
  tag::{NewTag, Tag},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`LeadStore::list_leads`]. All filters are conjunctive;
/// results are ordered newest-first by creation time.
#[derive(Debug, Clone, Default)]
pub struct LeadQuery {
  pub status:         Option<LeadStatus>,
  pub assigned_agent: Option<Uuid>,
  /// Free-text filter over school name, mobile number, and client name.
  pub search:         Option<String>,
  /// Exact creation date.
  pub date:           Option<NaiveDate>,
  pub date_from:      Option<NaiveDate>,
  pub date_to:        Option<NaiveDate>,
  pub limit:          Option<usize>,
  pub offset:         Option<usize>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Leadbook storage backend.
///
/// The first three methods are the narrow surface the WhatsApp sync runs on;
/// their signatures encode the sync's write discipline. `update_synced` can
/// only ever touch the title, status, and freshness timestamp of a lead, so
/// a re-imported lead keeps its agent assignment, notes, and follow-up state
/// no matter how often the sync sees it.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait LeadStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Sync surface ──────────────────────────────────────────────────────

  /// Look up the lead owning `phone`, if any. The mobile number is unique,
  /// so this is always zero-or-one.
  fn find_by_phone<'a>(
    &'a self,
    phone: &'a str,
  ) -> impl Future<Output = Result<Option<Lead>, Self::Error>> + Send + 'a;

  /// Insert a lead from a source conversation. The store assigns the id,
  /// keeps `created_at` exactly as given, stamps `updated_at` with now, and
  /// defaults `next_followup_date` to today.
  fn import_lead(
    &self,
    input: ImportedLead,
  ) -> impl Future<Output = Result<Lead, Self::Error>> + Send + '_;

  /// Refresh the sync-owned fields (title, status, `updated_at`) of the lead
  /// owning `phone`. Returns the number of rows touched (0 or 1). No other
  /// column can be altered through this call.
  fn update_synced<'a>(
    &'a self,
    phone: &'a str,
    school_name: &'a str,
    status: LeadStatus,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  // ── Leads ─────────────────────────────────────────────────────────────

  fn list_leads<'a>(
    &'a self,
    query: &'a LeadQuery,
  ) -> impl Future<Output = Result<Vec<Lead>, Self::Error>> + Send + 'a;

  /// Retrieve a lead by id. Returns `None` if not found.
  fn get_lead(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Lead>, Self::Error>> + Send + '_;

  /// Create a lead from operator input. A duplicate mobile number is an
  /// error.
  fn create_lead(
    &self,
    input: NewLead,
  ) -> impl Future<Output = Result<Lead, Self::Error>> + Send + '_;

  /// Apply a partial update. Returns `false` if the lead does not exist.
  fn update_lead(
    &self,
    id: Uuid,
    patch: LeadPatch,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete a lead (and its tag links and call logs). Returns `false` if the
  /// lead does not exist.
  fn delete_lead(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Tags ──────────────────────────────────────────────────────────────

  /// All tags, name ascending.
  fn list_tags(
    &self,
  ) -> impl Future<Output = Result<Vec<Tag>, Self::Error>> + Send + '_;

  /// Create a tag. A duplicate name is an error.
  fn create_tag(
    &self,
    input: NewTag,
  ) -> impl Future<Output = Result<Tag, Self::Error>> + Send + '_;

  /// Rename/recolor a tag. Returns `false` if the tag does not exist.
  fn update_tag(
    &self,
    id: Uuid,
    input: NewTag,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete a tag and its lead links. Returns `false` if the tag does not
  /// exist.
  fn delete_tag(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn tags_for_lead(
    &self,
    lead_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Tag>, Self::Error>> + Send + '_;

  /// Replace the full tag set of a lead.
  fn set_lead_tags(
    &self,
    lead_id: Uuid,
    tag_ids: Vec<Uuid>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Call logs ─────────────────────────────────────────────────────────

  /// Logs for one lead, newest first.
  fn call_logs_for_lead(
    &self,
    lead_id: Uuid,
  ) -> impl Future<Output = Result<Vec<CallLog>, Self::Error>> + Send + '_;

  /// Record a call. Captures the lead's current status as
  /// `previous_status`; when `new_status` is set the lead is moved to it in
  /// the same call.
  fn add_call_log(
    &self,
    input: NewCallLog,
  ) -> impl Future<Output = Result<CallLog, Self::Error>> + Send + '_;

  // ── Agents ────────────────────────────────────────────────────────────

  /// All agents, name ascending.
  fn list_agents(
    &self,
  ) -> impl Future<Output = Result<Vec<Agent>, Self::Error>> + Send + '_;

  fn create_agent(
    &self,
    input: NewAgent,
  ) -> impl Future<Output = Result<Agent, Self::Error>> + Send + '_;

  // ── Maintenance ───────────────────────────────────────────────────────

  /// Give every placeholder-titled lead without a follow-up date one set to
  /// today. Returns the number of rows touched. One-shot repair for leads
  /// imported before follow-up defaulting existed.
  fn backfill_followup_dates(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
