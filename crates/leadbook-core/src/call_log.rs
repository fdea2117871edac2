//! Call logs — the interaction history recorded against a lead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::lead::LeadStatus;

/// One logged call. `previous_status` is captured by the store at insert
/// time; when `new_status` is set, recording the log also moves the lead to
/// that status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallLog {
  pub id:              Uuid,
  pub lead_id:         Uuid,
  pub agent_id:        Option<Uuid>,
  pub notes:           Option<String>,
  pub previous_status: Option<LeadStatus>,
  pub new_status:      Option<LeadStatus>,
  pub created_at:      DateTime<Utc>,
}

/// Input to [`crate::store::LeadStore::add_call_log`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCallLog {
  pub lead_id:    Uuid,
  pub agent_id:   Option<Uuid>,
  pub notes:      Option<String>,
  pub new_status: Option<LeadStatus>,
}
