//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as `YYYY-MM-DD`,
//! UUIDs as hyphenated lowercase strings, and lead statuses by their
//! snake_case wire string.

use chrono::{DateTime, NaiveDate, Utc};
use leadbook_core::{
  agent::Agent,
  call_log::CallLog,
  lead::{Lead, LeadStatus},
  tag::Tag,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── LeadStatus ──────────────────────────────────────────────────────────────

pub fn decode_status(s: &str) -> Result<LeadStatus> {
  Ok(LeadStatus::parse(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `leads` row.
pub struct RawLead {
  pub lead_id:            String,
  pub mobile_number:      String,
  pub school_name:        String,
  pub client_name:        Option<String>,
  pub school_address:     Option<String>,
  pub notes:              Option<String>,
  pub status:             String,
  pub next_followup_date: Option<String>,
  pub assigned_agent_id:  Option<String>,
  pub created_by:         Option<String>,
  pub created_at:         String,
  pub updated_at:         String,
}

impl RawLead {
  /// Read from a row selected with the full `LEAD_COLUMNS` list.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      lead_id:            row.get(0)?,
      mobile_number:      row.get(1)?,
      school_name:        row.get(2)?,
      client_name:        row.get(3)?,
      school_address:     row.get(4)?,
      notes:              row.get(5)?,
      status:             row.get(6)?,
      next_followup_date: row.get(7)?,
      assigned_agent_id:  row.get(8)?,
      created_by:         row.get(9)?,
      created_at:         row.get(10)?,
      updated_at:         row.get(11)?,
    })
  }

  pub fn into_lead(self) -> Result<Lead> {
    Ok(Lead {
      id:                 decode_uuid(&self.lead_id)?,
      mobile_number:      self.mobile_number,
      school_name:        self.school_name,
      client_name:        self.client_name,
      school_address:     self.school_address,
      notes:              self.notes,
      status:             decode_status(&self.status)?,
      next_followup_date: self
        .next_followup_date
        .as_deref()
        .map(decode_date)
        .transpose()?,
      assigned_agent_id:  self
        .assigned_agent_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
      created_by:         self.created_by.as_deref().map(decode_uuid).transpose()?,
      created_at:         decode_dt(&self.created_at)?,
      updated_at:         decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `tags` row.
pub struct RawTag {
  pub tag_id:     String,
  pub name:       String,
  pub color:      String,
  pub created_at: String,
}

impl RawTag {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      tag_id:     row.get(0)?,
      name:       row.get(1)?,
      color:      row.get(2)?,
      created_at: row.get(3)?,
    })
  }

  pub fn into_tag(self) -> Result<Tag> {
    Ok(Tag {
      id:         decode_uuid(&self.tag_id)?,
      name:       self.name,
      color:      self.color,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `call_logs` row.
pub struct RawCallLog {
  pub call_log_id:     String,
  pub lead_id:         String,
  pub agent_id:        Option<String>,
  pub notes:           Option<String>,
  pub previous_status: Option<String>,
  pub new_status:      Option<String>,
  pub created_at:      String,
}

impl RawCallLog {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      call_log_id:     row.get(0)?,
      lead_id:         row.get(1)?,
      agent_id:        row.get(2)?,
      notes:           row.get(3)?,
      previous_status: row.get(4)?,
      new_status:      row.get(5)?,
      created_at:      row.get(6)?,
    })
  }

  pub fn into_call_log(self) -> Result<CallLog> {
    Ok(CallLog {
      id:              decode_uuid(&self.call_log_id)?,
      lead_id:         decode_uuid(&self.lead_id)?,
      agent_id:        self.agent_id.as_deref().map(decode_uuid).transpose()?,
      notes:           self.notes,
      previous_status: self
        .previous_status
        .as_deref()
        .map(decode_status)
        .transpose()?,
      new_status:      self.new_status.as_deref().map(decode_status).transpose()?,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `agents` row.
pub struct RawAgent {
  pub agent_id:   String,
  pub full_name:  String,
  pub email:      String,
  pub created_at: String,
}

impl RawAgent {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      agent_id:   row.get(0)?,
      full_name:  row.get(1)?,
      email:      row.get(2)?,
      created_at: row.get(3)?,
    })
  }

  pub fn into_agent(self) -> Result<Agent> {
    Ok(Agent {
      id:         decode_uuid(&self.agent_id)?,
      full_name:  self.full_name,
      email:      self.email,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
