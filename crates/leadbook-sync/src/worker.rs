//! The auto-import worker: the repeating timer, the in-flight guard, and the
//! reconciliation pass itself.

use std::{
  sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, Ordering},
  },
  time::Duration,
};

use leadbook_core::{
  conversation::Conversation, lead::ImportedLead, source::ConversationSource,
  store::LeadStore,
};
use serde::{Deserialize, Serialize};
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{error, info, warn};

use crate::error::{Error, Result};

/// Pass interval used when a caller does not ask for a specific one.
pub const DEFAULT_INTERVAL_MINUTES: u64 = 5;

// ─── Summary & status ─────────────────────────────────────────────────────────

/// Counters from one completed reconciliation pass.
///
/// `total` counts every conversation the source returned, including ones
/// whose record failed and was skipped, so `imported + updated <= total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
  /// Leads created this pass.
  pub imported: u64,
  /// Leads refreshed in place this pass.
  pub updated:  u64,
  /// Conversations fetched from the source.
  pub total:    u64,
}

/// Scheduling state reported by [`SyncWorker::status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerStatus {
  /// Whether the repeating timer is armed.
  pub enabled:          bool,
  /// Minutes between passes; `0` while stopped.
  pub interval_minutes: u64,
}

// ─── Worker ───────────────────────────────────────────────────────────────────

/// Synchronises a [`ConversationSource`] into a [`LeadStore`].
///
/// Cloning is cheap and every clone drives the same underlying worker, so a
/// server can hand clones to its router state and keep one for shutdown.
pub struct SyncWorker<S, C> {
  store:  Arc<S>,
  source: Arc<C>,
  shared: Arc<Shared>,
}

struct Shared {
  /// Minutes between passes; `0` while the timer is disarmed.
  interval_minutes: AtomicU64,
  /// Held for the duration of a pass, timer-fired or manual.
  pass_running:     AtomicBool,
  /// The repeating timer task, when armed.
  timer:            Mutex<Option<JoinHandle<()>>>,
}

impl<S, C> Clone for SyncWorker<S, C> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      source: Arc::clone(&self.source),
      shared: Arc::clone(&self.shared),
    }
  }
}

enum Outcome {
  Imported,
  Updated,
}

impl<S, C> SyncWorker<S, C>
where
  S: LeadStore + 'static,
  C: ConversationSource + 'static,
{
  pub fn new(store: Arc<S>, source: Arc<C>) -> Self {
    Self {
      store,
      source,
      shared: Arc::new(Shared {
        interval_minutes: AtomicU64::new(0),
        pass_running:     AtomicBool::new(false),
        timer:            Mutex::new(None),
      }),
    }
  }

  // ─── Lifecycle ──────────────────────────────────────────────────────────────

  /// Arm the repeating timer.
  ///
  /// The first pass runs immediately; later passes run every
  /// `interval_minutes`. Calling this while already armed replaces the
  /// existing timer. A pass in flight is never interrupted.
  pub async fn start(&self, interval_minutes: u64) -> Result<()> {
    if interval_minutes == 0 {
      return Err(Error::InvalidInterval);
    }

    let mut timer = self.shared.timer.lock().await;
    if let Some(old) = timer.take() {
      old.abort();
    }
    self
      .shared
      .interval_minutes
      .store(interval_minutes, Ordering::SeqCst);

    let worker = self.clone();
    *timer = Some(tokio::spawn(async move {
      let period = Duration::from_secs(interval_minutes.saturating_mul(60));
      let mut ticker = tokio::time::interval(period);
      loop {
        // The first tick completes immediately.
        ticker.tick().await;
        worker.spawn_pass();
      }
    }));

    info!("auto-import scheduled every {interval_minutes} minutes");
    Ok(())
  }

  /// Disarm the timer. A pass already in flight runs to completion.
  ///
  /// Safe to call when already stopped.
  pub async fn stop(&self) {
    let mut timer = self.shared.timer.lock().await;
    if let Some(old) = timer.take() {
      old.abort();
    }
    self.shared.interval_minutes.store(0, Ordering::SeqCst);
    info!("auto-import stopped");
  }

  /// Current scheduling state.
  pub fn status(&self) -> WorkerStatus {
    let interval_minutes = self.shared.interval_minutes.load(Ordering::SeqCst);
    WorkerStatus { enabled: interval_minutes > 0, interval_minutes }
  }

  // ─── Passes ─────────────────────────────────────────────────────────────────

  /// Run a single reconciliation pass.
  ///
  /// Returns [`Error::Busy`] without touching anything when another pass is
  /// already in flight.
  pub async fn run_once(&self) -> Result<SyncSummary> {
    if self
      .shared
      .pass_running
      .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
      .is_err()
    {
      return Err(Error::Busy);
    }

    let result = self.reconcile().await;
    self.shared.pass_running.store(false, Ordering::SeqCst);
    result
  }

  /// Dispatch a pass without waiting on it. Used by the timer task.
  fn spawn_pass(&self) {
    let worker = self.clone();
    tokio::spawn(async move {
      match worker.run_once().await {
        Ok(_) => {}
        Err(Error::Busy) => {
          warn!("auto-import pass still running, tick skipped");
        }
        // Already logged inside the pass; the timer keeps its cadence.
        Err(_) => {}
      }
    });
  }

  async fn reconcile(&self) -> Result<SyncSummary> {
    info!("auto-import pass starting");

    let conversations = match self.source.fetch_conversations().await {
      Ok(conversations) => conversations,
      Err(e) => {
        error!("auto-import could not fetch conversations: {e}");
        return Err(Error::Source(Box::new(e)));
      }
    };

    let mut summary = SyncSummary {
      total: conversations.len() as u64,
      ..SyncSummary::default()
    };

    for conversation in &conversations {
      match self.sync_one(conversation).await {
        Ok(Outcome::Imported) => summary.imported += 1,
        Ok(Outcome::Updated) => summary.updated += 1,
        Err(e) => {
          warn!("skipping conversation {:?}: {e}", conversation.phone_number);
        }
      }
    }

    info!(
      "auto-import pass finished: {} imported, {} updated of {} conversations",
      summary.imported, summary.updated, summary.total
    );
    Ok(summary)
  }

  /// Upsert the lead for one conversation. The title and status always come
  /// from the conversation, whichever branch runs.
  async fn sync_one(
    &self,
    conversation: &Conversation,
  ) -> Result<Outcome, S::Error> {
    let title  = conversation.lead_title();
    let status = conversation.lead_status();

    if self
      .store
      .find_by_phone(&conversation.phone_number)
      .await?
      .is_some()
    {
      self
        .store
        .update_synced(&conversation.phone_number, &title, status)
        .await?;
      Ok(Outcome::Updated)
    } else {
      self
        .store
        .import_lead(ImportedLead {
          mobile_number: conversation.phone_number.clone(),
          school_name:   title,
          status,
          created_at:    conversation.created_at,
        })
        .await?;
      Ok(Outcome::Imported)
    }
  }
}
