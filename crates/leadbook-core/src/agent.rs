//! Agents — the people leads get assigned to.
//!
//! Agents are plain data here; Leadbook has no per-agent accounts. The
//! server's single operator credential covers all API access.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
  pub id:         Uuid,
  pub full_name:  String,
  pub email:      String,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::LeadStore::create_agent`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAgent {
  pub full_name: String,
  pub email:     String,
}
