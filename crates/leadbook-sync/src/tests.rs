//! Worker tests against an in-memory SQLite store and a scriptable fake
//! conversation source.

use std::{
  sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicU64, Ordering},
  },
  time::Duration,
};

use chrono::{TimeZone, Utc};
use leadbook_core::{
  agent::NewAgent,
  conversation::{Conversation, SourceStats},
  lead::{Lead, LeadStatus, NewLead},
  source::ConversationSource,
  store::{LeadQuery, LeadStore},
};
use leadbook_store_sqlite::SqliteStore;
use tokio::sync::Notify;

use crate::{Error, SyncSummary, SyncWorker};

// ─── Fixtures ─────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("source offline")]
struct SourceOffline;

/// In-memory stand-in for the remote conversation database. Tests flip the
/// flags to inject failures, and can gate a fetch on a [`Notify`] pair to
/// hold a pass open at a known point.
#[derive(Default)]
struct FakeSource {
  conversations: Mutex<Vec<Conversation>>,
  fail:          AtomicBool,
  gated:         AtomicBool,
  fetches:       AtomicU64,
  entered:       Notify,
  release:       Notify,
}

impl FakeSource {
  fn with(conversations: Vec<Conversation>) -> Arc<Self> {
    let source = Self::default();
    *source.conversations.lock().unwrap() = conversations;
    Arc::new(source)
  }

  fn fetches(&self) -> u64 {
    self.fetches.load(Ordering::SeqCst)
  }
}

impl ConversationSource for FakeSource {
  type Error = SourceOffline;

  async fn fetch_conversations(
    &self,
  ) -> Result<Vec<Conversation>, SourceOffline> {
    self.fetches.fetch_add(1, Ordering::SeqCst);
    self.entered.notify_one();
    if self.gated.load(Ordering::SeqCst) {
      self.release.notified().await;
    }
    if self.fail.load(Ordering::SeqCst) {
      return Err(SourceOffline);
    }
    Ok(self.conversations.lock().unwrap().clone())
  }

  async fn fetch_stats(&self) -> Result<SourceStats, SourceOffline> {
    Ok(SourceStats::default())
  }
}

fn conv(phone: &str, name: Option<&str>, status: &str) -> Conversation {
  Conversation {
    phone_number:    phone.into(),
    contact_name:    name.map(Into::into),
    status:          status.into(),
    created_at:      Utc.with_ymd_and_hms(2024, 3, 10, 9, 30, 0).unwrap(),
    last_message_at: None,
  }
}

async fn worker(
  conversations: Vec<Conversation>,
) -> (SyncWorker<SqliteStore, FakeSource>, Arc<SqliteStore>, Arc<FakeSource>)
{
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  let source = FakeSource::with(conversations);
  let worker = SyncWorker::new(Arc::clone(&store), Arc::clone(&source));
  (worker, store, source)
}

/// Let every queued task (timer ticks, spawned passes) run.
async fn settle() {
  for _ in 0..50 {
    tokio::task::yield_now().await;
  }
}

async fn wait_for_lead(store: &SqliteStore, phone: &str) -> Lead {
  for _ in 0..200 {
    if let Some(lead) = store.find_by_phone(phone).await.unwrap() {
      return lead;
    }
    tokio::task::yield_now().await;
  }
  panic!("lead {phone} never appeared");
}

// ─── Passes ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn first_pass_imports_every_conversation() {
  let (worker, store, _source) = worker(vec![
    conv("27811110000", Some("Jabulani Primary"), "open"),
    conv("27822220000", None, "pending"),
  ])
  .await;

  let summary = worker.run_once().await.unwrap();
  assert_eq!(summary, SyncSummary { imported: 2, updated: 0, total: 2 });

  let named = store.find_by_phone("27811110000").await.unwrap().unwrap();
  assert_eq!(named.school_name, "Jabulani Primary");
  assert_eq!(named.status, LeadStatus::New);
  assert_eq!(
    named.created_at,
    Utc.with_ymd_and_hms(2024, 3, 10, 9, 30, 0).unwrap()
  );

  let unnamed = store.find_by_phone("27822220000").await.unwrap().unwrap();
  assert_eq!(unnamed.school_name, "WhatsApp Contact 27822220000");
  assert_eq!(unnamed.status, LeadStatus::FollowUp);
  assert_eq!(unnamed.next_followup_date, Some(Utc::now().date_naive()));
}

#[tokio::test]
async fn second_pass_updates_instead_of_duplicating() {
  let (worker, store, source) =
    worker(vec![conv("27811110000", Some("Jabulani Primary"), "open")]).await;

  worker.run_once().await.unwrap();
  let summary = worker.run_once().await.unwrap();
  assert_eq!(summary, SyncSummary { imported: 0, updated: 1, total: 1 });
  assert_eq!(store.list_leads(&LeadQuery::default()).await.unwrap().len(), 1);

  // A source-side status change lands on the next pass.
  source.conversations.lock().unwrap()[0].status = "resolved".into();
  worker.run_once().await.unwrap();
  let lead = store.find_by_phone("27811110000").await.unwrap().unwrap();
  assert_eq!(lead.status, LeadStatus::Closed);
}

#[tokio::test]
async fn refresh_preserves_operator_owned_fields() {
  let (worker, store, _source) =
    worker(vec![conv("27811110000", Some("Jabulani Primary School"), "resolved")])
      .await;

  let agent = store
    .create_agent(NewAgent {
      full_name: "Thandi Nkosi".into(),
      email:     "thandi@example.com".into(),
    })
    .await
    .unwrap();

  let mut input = NewLead::new("27811110000", "Jabulani");
  input.client_name = Some("Mrs Dlamini".into());
  input.notes = Some("prefers afternoon calls".into());
  input.assigned_agent_id = Some(agent.id);
  let created = store.create_lead(input).await.unwrap();

  let summary = worker.run_once().await.unwrap();
  assert_eq!(summary, SyncSummary { imported: 0, updated: 1, total: 1 });

  let lead = store.find_by_phone("27811110000").await.unwrap().unwrap();
  assert_eq!(lead.school_name, "Jabulani Primary School");
  assert_eq!(lead.status, LeadStatus::Closed);
  assert_eq!(lead.client_name.as_deref(), Some("Mrs Dlamini"));
  assert_eq!(lead.notes.as_deref(), Some("prefers afternoon calls"));
  assert_eq!(lead.assigned_agent_id, Some(agent.id));
  assert_eq!(lead.created_at, created.created_at);
  assert_eq!(lead.next_followup_date, None);
}

#[tokio::test]
async fn source_statuses_map_onto_lead_statuses() {
  let (worker, store, _source) = worker(vec![
    conv("1001", None, "resolved"),
    conv("1002", None, "closed"),
    conv("1003", None, "pending"),
    conv("1004", None, "anything else"),
  ])
  .await;
  worker.run_once().await.unwrap();

  for (phone, expected) in [
    ("1001", LeadStatus::Closed),
    ("1002", LeadStatus::Closed),
    ("1003", LeadStatus::FollowUp),
    ("1004", LeadStatus::New),
  ] {
    let lead = store.find_by_phone(phone).await.unwrap().unwrap();
    assert_eq!(lead.status, expected, "phone {phone}");
  }
}

#[tokio::test]
async fn one_bad_record_does_not_sink_the_pass() {
  let (worker, store, _source) = worker(vec![
    conv("2001", None, "open"),
    conv("2002", None, "open"),
    // Rejected by the store's non-empty mobile number constraint.
    conv("", None, "open"),
    conv("2003", None, "open"),
    conv("2004", None, "open"),
  ])
  .await;

  let summary = worker.run_once().await.unwrap();
  assert_eq!(summary, SyncSummary { imported: 4, updated: 0, total: 5 });
  assert_eq!(store.list_leads(&LeadQuery::default()).await.unwrap().len(), 4);
}

#[tokio::test]
async fn source_failure_aborts_the_pass() {
  let (worker, store, source) = worker(vec![conv("3001", None, "open")]).await;
  source.fail.store(true, Ordering::SeqCst);

  assert!(matches!(worker.run_once().await, Err(Error::Source(_))));
  assert!(store.list_leads(&LeadQuery::default()).await.unwrap().is_empty());

  // The guard is released even after a failed pass.
  source.fail.store(false, Ordering::SeqCst);
  assert!(worker.run_once().await.is_ok());
}

#[tokio::test]
async fn concurrent_manual_triggers_collide() {
  let (worker, _store, source) = worker(vec![conv("4001", None, "open")]).await;
  source.gated.store(true, Ordering::SeqCst);

  let racer = worker.clone();
  let first = tokio::spawn(async move { racer.run_once().await });
  source.entered.notified().await;

  assert!(matches!(worker.run_once().await, Err(Error::Busy)));

  source.gated.store(false, Ordering::SeqCst);
  source.release.notify_one();
  let summary = first.await.unwrap().unwrap();
  assert_eq!(summary.imported, 1);

  assert!(worker.run_once().await.is_ok());
}

// ─── Lifecycle ────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn start_runs_a_pass_immediately() {
  let (worker, _store, source) = worker(vec![]).await;
  worker.start(5).await.unwrap();
  settle().await;
  assert_eq!(source.fetches(), 1);

  let status = worker.status();
  assert!(status.enabled);
  assert_eq!(status.interval_minutes, 5);
}

#[tokio::test(start_paused = true)]
async fn ticks_repeat_on_the_interval() {
  let (worker, _store, source) = worker(vec![]).await;
  worker.start(5).await.unwrap();
  settle().await;
  assert_eq!(source.fetches(), 1);

  tokio::time::advance(Duration::from_secs(5 * 60)).await;
  settle().await;
  assert_eq!(source.fetches(), 2);

  tokio::time::advance(Duration::from_secs(5 * 60)).await;
  settle().await;
  assert_eq!(source.fetches(), 3);
}

#[tokio::test(start_paused = true)]
async fn stop_disarms_the_timer() {
  let (worker, _store, source) = worker(vec![]).await;
  worker.start(5).await.unwrap();
  settle().await;
  assert_eq!(source.fetches(), 1);

  worker.stop().await;
  let status = worker.status();
  assert!(!status.enabled);
  assert_eq!(status.interval_minutes, 0);

  tokio::time::advance(Duration::from_secs(30 * 60)).await;
  settle().await;
  assert_eq!(source.fetches(), 1);
}

#[tokio::test(start_paused = true)]
async fn restart_replaces_the_timer() {
  let (worker, _store, source) = worker(vec![]).await;
  worker.start(5).await.unwrap();
  settle().await;
  worker.start(9).await.unwrap();
  settle().await;
  // Both calls ran their immediate pass.
  assert_eq!(source.fetches(), 2);
  assert_eq!(worker.status().interval_minutes, 9);

  // The five-minute cadence is gone.
  tokio::time::advance(Duration::from_secs(5 * 60)).await;
  settle().await;
  assert_eq!(source.fetches(), 2);

  // The nine-minute cadence is live.
  tokio::time::advance(Duration::from_secs(4 * 60)).await;
  settle().await;
  assert_eq!(source.fetches(), 3);
}

#[tokio::test(start_paused = true)]
async fn overlapping_tick_is_skipped() {
  let (worker, _store, source) = worker(vec![]).await;
  source.gated.store(true, Ordering::SeqCst);

  worker.start(1).await.unwrap();
  settle().await;
  assert_eq!(source.fetches(), 1);

  // The next tick lands while the first pass is still held open.
  tokio::time::advance(Duration::from_secs(60)).await;
  settle().await;
  assert_eq!(source.fetches(), 1);

  source.gated.store(false, Ordering::SeqCst);
  source.release.notify_one();
  settle().await;

  tokio::time::advance(Duration::from_secs(60)).await;
  settle().await;
  assert_eq!(source.fetches(), 2);
}

#[tokio::test(start_paused = true)]
async fn stop_never_interrupts_a_running_pass() {
  let (worker, store, source) =
    worker(vec![conv("27700001111", Some("Hope Academy"), "open")]).await;
  source.gated.store(true, Ordering::SeqCst);

  worker.start(5).await.unwrap();
  source.entered.notified().await;
  worker.stop().await;

  source.gated.store(false, Ordering::SeqCst);
  source.release.notify_one();

  let lead = wait_for_lead(&store, "27700001111").await;
  assert_eq!(lead.school_name, "Hope Academy");
}

#[tokio::test]
async fn zero_interval_is_rejected() {
  let (worker, _store, _source) = worker(vec![]).await;
  assert!(matches!(worker.start(0).await, Err(Error::InvalidInterval)));
  assert!(!worker.status().enabled);
}
