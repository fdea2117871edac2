//! Read-only views of the remote WhatsApp conversation store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lead::LeadStatus;

// ─── Conversation ────────────────────────────────────────────────────────────

/// One conversation row as fetched from the remote database. Leadbook never
/// writes these; the sync reads them and reconciles leads from them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
  pub phone_number:    String,
  pub contact_name:    Option<String>,
  /// Free-form upstream status; mapped onto [`LeadStatus`] by
  /// [`LeadStatus::from_source`].
  pub status:          String,
  pub created_at:      DateTime<Utc>,
  pub last_message_at: Option<DateTime<Utc>>,
}

impl Conversation {
  /// The lead title this conversation produces: the contact name when one is
  /// known, otherwise a placeholder that embeds the phone number so the lead
  /// stays identifiable in lists.
  pub fn lead_title(&self) -> String {
    match self.contact_name.as_deref() {
      Some(name) if !name.is_empty() => name.to_owned(),
      _ => format!("WhatsApp Contact {}", self.phone_number),
    }
  }

  /// The pipeline status this conversation maps onto. Never fails.
  pub fn lead_status(&self) -> LeadStatus {
    LeadStatus::from_source(&self.status)
  }
}

// ─── SourceStats ─────────────────────────────────────────────────────────────

/// Aggregate counts over the remote conversation table.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SourceStats {
  pub total_conversations:   u64,
  pub open_conversations:    u64,
  pub pending_conversations: u64,
  /// Conversations created within the last 7 days.
  pub recent_conversations:  u64,
}

// ─── Tests ───────────────────────────────────────────────────────────────────
