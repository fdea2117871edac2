//! Lead types — the fundamental record of the Leadbook store.
//!
//! A lead is identified internally by UUID, but its *natural* key is the
//! mobile number: the store enforces at most one lead per number, and the
//! WhatsApp sync upserts against that key.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Status ──────────────────────────────────────────────────────────────────

/// The pipeline stage of a lead.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
  #[default]
  New,
  Interested,
  FollowUp,
  NotInterested,
  Closed,
}

impl LeadStatus {
  /// The wire/database string for this status.
  /// Must match the `rename_all = "snake_case"` serde tags above.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::New => "new",
      Self::Interested => "interested",
      Self::FollowUp => "follow_up",
      Self::NotInterested => "not_interested",
      Self::Closed => "closed",
    }
  }

  /// Strict parse for caller-supplied statuses. Unknown values are an error;
  /// contrast with [`LeadStatus::from_source`], which never fails.
  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "new" => Ok(Self::New),
      "interested" => Ok(Self::Interested),
      "follow_up" => Ok(Self::FollowUp),
      "not_interested" => Ok(Self::NotInterested),
      "closed" => Ok(Self::Closed),
      other => Err(Error::UnknownStatus(other.to_owned())),
    }
  }

  /// Map a free-form WhatsApp conversation status onto the lead pipeline.
  ///
  /// Total by construction: `resolved` and `closed` land on [`Closed`],
  /// `pending` lands on [`FollowUp`], and anything else (including `open`,
  /// the empty string, or garbage) lands on [`New`]. Matching is exact and
  /// case-sensitive.
  ///
  /// [`Closed`]: LeadStatus::Closed
  /// [`FollowUp`]: LeadStatus::FollowUp
  /// [`New`]: LeadStatus::New
  pub fn from_source(source: &str) -> Self {
    match source {
      "resolved" | "closed" => Self::Closed,
      "pending" => Self::FollowUp,
      _ => Self::New,
    }
  }
}

// ─── Lead ────────────────────────────────────────────────────────────────────

/// A sales lead. The `school_name` column doubles as the display title; for
/// synced leads with no known contact it holds the placeholder
/// `WhatsApp Contact {number}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
  pub id:                 Uuid,
  /// Natural key; unique and non-empty in every store.
  pub mobile_number:      String,
  pub school_name:        String,
  pub client_name:        Option<String>,
  pub school_address:     Option<String>,
  pub notes:              Option<String>,
  pub status:             LeadStatus,
  pub next_followup_date: Option<NaiveDate>,
  pub assigned_agent_id:  Option<Uuid>,
  pub created_by:         Option<Uuid>,
  pub created_at:         DateTime<Utc>,
  pub updated_at:         DateTime<Utc>,
}

// ─── NewLead ─────────────────────────────────────────────────────────────────

/// Input to [`crate::store::LeadStore::create_lead`]. The id and both
/// timestamps are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLead {
  pub mobile_number:      String,
  pub school_name:        String,
  pub client_name:        Option<String>,
  pub school_address:     Option<String>,
  pub notes:              Option<String>,
  #[serde(default)]
  pub status:             LeadStatus,
  pub next_followup_date: Option<NaiveDate>,
  pub assigned_agent_id:  Option<Uuid>,
  pub created_by:         Option<Uuid>,
}

impl NewLead {
  /// Convenience constructor with all optional fields cleared.
  pub fn new(
    mobile_number: impl Into<String>,
    school_name: impl Into<String>,
  ) -> Self {
    Self {
      mobile_number:      mobile_number.into(),
      school_name:        school_name.into(),
      client_name:        None,
      school_address:     None,
      notes:              None,
      status:             LeadStatus::default(),
      next_followup_date: None,
      assigned_agent_id:  None,
      created_by:         None,
    }
  }

  pub fn validate(&self) -> Result<()> {
    validate_mobile_number(&self.mobile_number)?;
    validate_school_name(&self.school_name)?;
    Ok(())
  }
}

// ─── ImportedLead ────────────────────────────────────────────────────────────

/// Input to [`crate::store::LeadStore::import_lead`] — the narrow shape the
/// WhatsApp sync is allowed to insert. `created_at` is copied verbatim from
/// the source conversation so upstream chronology survives the import; the
/// store sets `updated_at` and defaults the follow-up date to today.
#[derive(Debug, Clone)]
pub struct ImportedLead {
  pub mobile_number: String,
  pub school_name:   String,
  pub status:        LeadStatus,
  pub created_at:    DateTime<Utc>,
}

// ─── LeadPatch ───────────────────────────────────────────────────────────────

/// Partial update for [`crate::store::LeadStore::update_lead`].
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeadPatch {
  pub mobile_number:      Option<String>,
  pub school_name:        Option<String>,
  pub client_name:        Option<String>,
  pub school_address:     Option<String>,
  pub notes:              Option<String>,
  pub status:             Option<LeadStatus>,
  pub next_followup_date: Option<NaiveDate>,
  pub assigned_agent_id:  Option<Uuid>,
}

impl LeadPatch {
  /// True when no field is set; the store rejects such a patch as a no-op.
  pub fn is_empty(&self) -> bool {
    self.mobile_number.is_none()
      && self.school_name.is_none()
      && self.client_name.is_none()
      && self.school_address.is_none()
      && self.notes.is_none()
      && self.status.is_none()
      && self.next_followup_date.is_none()
      && self.assigned_agent_id.is_none()
  }

  pub fn validate(&self) -> Result<()> {
    if let Some(number) = &self.mobile_number {
      validate_mobile_number(number)?;
    }
    if let Some(name) = &self.school_name {
      validate_school_name(name)?;
    }
    Ok(())
  }
}

// ─── Field validation ────────────────────────────────────────────────────────

/// Digits plus the usual phone punctuation (`+ - ( )` and spaces).
pub fn validate_mobile_number(number: &str) -> Result<()> {
  if number.trim().is_empty() {
    return Err(Error::EmptyMobileNumber);
  }
  let ok = number
    .chars()
    .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'));
  if !ok {
    return Err(Error::InvalidMobileNumber(number.to_owned()));
  }
  Ok(())
}

pub fn validate_school_name(name: &str) -> Result<()> {
  if name.trim().len() < 2 {
    return Err(Error::SchoolNameTooShort);
  }
  Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_parse_accepts_every_known_value() {
    for s in ["new", "interested", "follow_up", "not_interested", "closed"] {
      let status = LeadStatus::parse(s).unwrap();
      assert_eq!(status.as_str(), s);
    }
  }

  #[test]
  fn status_parse_rejects_unknown_values() {
    assert!(matches!(
      LeadStatus::parse("archived"),
      Err(Error::UnknownStatus(_))
    ));
    assert!(matches!(LeadStatus::parse(""), Err(Error::UnknownStatus(_))));
  }

  #[test]
  fn status_serializes_snake_case() {
    let v = serde_json::to_value(LeadStatus::FollowUp).unwrap();
    assert_eq!(v, serde_json::json!("follow_up"));
    let v = serde_json::to_value(LeadStatus::NotInterested).unwrap();
    assert_eq!(v, serde_json::json!("not_interested"));
  }

  #[test]
  fn source_mapping_is_total() {
    assert_eq!(LeadStatus::from_source("resolved"), LeadStatus::Closed);
    assert_eq!(LeadStatus::from_source("closed"), LeadStatus::Closed);
    assert_eq!(LeadStatus::from_source("pending"), LeadStatus::FollowUp);

    // Everything else falls through to New, including the common "open",
    // the empty string, and values that never appear upstream.
    assert_eq!(LeadStatus::from_source("open"), LeadStatus::New);
    assert_eq!(LeadStatus::from_source(""), LeadStatus::New);
    assert_eq!(LeadStatus::from_source("RESOLVED"), LeadStatus::New);
    assert_eq!(LeadStatus::from_source("archived"), LeadStatus::New);
  }

  #[test]
  fn mobile_number_validation() {
    assert!(validate_mobile_number("+91 98765-43210").is_ok());
    assert!(validate_mobile_number("(040) 1234 5678").is_ok());
    assert!(matches!(
      validate_mobile_number(""),
      Err(Error::EmptyMobileNumber)
    ));
    assert!(matches!(
      validate_mobile_number("   "),
      Err(Error::EmptyMobileNumber)
    ));
    assert!(matches!(
      validate_mobile_number("98x7654"),
      Err(Error::InvalidMobileNumber(_))
    ));
  }

  #[test]
  fn school_name_validation() {
    assert!(validate_school_name("St Mary's").is_ok());
    assert!(matches!(
      validate_school_name("a"),
      Err(Error::SchoolNameTooShort)
    ));
    assert!(matches!(
      validate_school_name(" x "),
      Err(Error::SchoolNameTooShort)
    ));
  }

  #[test]
  fn empty_patch_detected() {
    assert!(LeadPatch::default().is_empty());
    let patch = LeadPatch {
      status: Some(LeadStatus::Closed),
      ..Default::default()
    };
    assert!(!patch.is_empty());
  }
}
