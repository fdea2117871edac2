//! [`SqliteStore`] — the SQLite implementation of [`LeadStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use leadbook_core::{
  agent::{Agent, NewAgent},
  call_log::{CallLog, NewCallLog},
  lead::{ImportedLead, Lead, LeadPatch, LeadStatus, NewLead},
  store::{LeadQuery, LeadStore},
  tag::{NewTag, Tag},
};

use crate::{
  encode::{encode_date, encode_dt, encode_uuid, RawAgent, RawCallLog, RawLead, RawTag},
  schema::SCHEMA,
  Error, Result,
};

/// Column list shared by every `leads` SELECT; order matches
/// `RawLead::from_row`.
pub(crate) const LEAD_COLUMNS: &str = "lead_id, mobile_number, school_name, \
   client_name, school_address, notes, status, next_followup_date, \
   assigned_agent_id, created_by, created_at, updated_at";

const TAG_COLUMNS: &str = "tag_id, name, color, created_at";

const CALL_LOG_COLUMNS: &str = "call_log_id, lead_id, agent_id, notes, \
   previous_status, new_status, created_at";

const AGENT_COLUMNS: &str = "agent_id, full_name, email, created_at";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Leadbook store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert a fully-built [`Lead`] into the `leads` table.
  async fn insert_lead(&self, lead: &Lead) -> Result<()> {
    let lead_id_str  = encode_uuid(lead.id);
    let mobile       = lead.mobile_number.clone();
    let school_name  = lead.school_name.clone();
    let client_name  = lead.client_name.clone();
    let school_addr  = lead.school_address.clone();
    let notes        = lead.notes.clone();
    let status_str   = lead.status.as_str().to_owned();
    let followup_str = lead.next_followup_date.map(encode_date);
    let agent_str    = lead.assigned_agent_id.map(encode_uuid);
    let creator_str  = lead.created_by.map(encode_uuid);
    let created_str  = encode_dt(lead.created_at);
    let updated_str  = encode_dt(lead.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO leads (
             lead_id, mobile_number, school_name, client_name, school_address,
             notes, status, next_followup_date, assigned_agent_id, created_by,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
          rusqlite::params![
            lead_id_str,
            mobile,
            school_name,
            client_name,
            school_addr,
            notes,
            status_str,
            followup_str,
            agent_str,
            creator_str,
            created_str,
            updated_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── LeadStore impl ──────────────────────────────────────────────────────────

impl LeadStore for SqliteStore {
  type Error = Error;

  // ── Sync surface ──────────────────────────────────────────────────────────

  async fn find_by_phone(&self, phone: &str) -> Result<Option<Lead>> {
    let phone = phone.to_owned();

    let raw: Option<RawLead> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {LEAD_COLUMNS} FROM leads WHERE mobile_number = ?1"),
              rusqlite::params![phone],
              RawLead::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawLead::into_lead).transpose()
  }

  async fn import_lead(&self, input: ImportedLead) -> Result<Lead> {
    let now = Utc::now();

    // `created_at` comes from the source conversation; `updated_at` and the
    // default follow-up date are ours.
    let lead = Lead {
      id:                 Uuid::new_v4(),
      mobile_number:      input.mobile_number,
      school_name:        input.school_name,
      client_name:        None,
      school_address:     None,
      notes:              None,
      status:             input.status,
      next_followup_date: Some(now.date_naive()),
      assigned_agent_id:  None,
      created_by:         None,
      created_at:         input.created_at,
      updated_at:         now,
    };

    self.insert_lead(&lead).await?;
    Ok(lead)
  }

  async fn update_synced(
    &self,
    phone: &str,
    school_name: &str,
    status: LeadStatus,
  ) -> Result<u64> {
    let phone       = phone.to_owned();
    let school_name = school_name.to_owned();
    let status_str  = status.as_str().to_owned();
    let updated_str = encode_dt(Utc::now());

    let rows = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE leads SET school_name = ?1, status = ?2, updated_at = ?3
           WHERE mobile_number = ?4",
          rusqlite::params![school_name, status_str, updated_str, phone],
        )?)
      })
      .await?;

    Ok(rows as u64)
  }

  // ── Leads ─────────────────────────────────────────────────────────────────

  async fn list_leads(&self, query: &LeadQuery) -> Result<Vec<Lead>> {
    let status_str     = query.status.map(|s| s.as_str().to_owned());
    let agent_str      = query.assigned_agent.map(encode_uuid);
    let search_pattern = query.search.as_deref().map(|s| format!("%{s}%"));
    let date_str       = query.date.map(encode_date);
    let from_str       = query.date_from.map(encode_date);
    let to_str         = query.date_to.map(encode_date);
    let limit_val      = query.limit.unwrap_or(500) as i64;
    let offset_val     = query.offset.unwrap_or(0) as i64;

    let raws: Vec<RawLead> = self
      .conn
      .call(move |conn| {
        // Build WHERE clause dynamically; parameter slots are fixed.
        let mut conds: Vec<&'static str> = vec![];
        if status_str.is_some() {
          conds.push("status = ?1");
        }
        if agent_str.is_some() {
          conds.push("assigned_agent_id = ?2");
        }
        if search_pattern.is_some() {
          conds.push(
            "(school_name LIKE ?3 OR mobile_number LIKE ?3 OR client_name LIKE ?3)",
          );
        }
        // created_at is RFC 3339 UTC, so its first ten characters are the date.
        if date_str.is_some() {
          conds.push("substr(created_at, 1, 10) = ?4");
        }
        if from_str.is_some() {
          conds.push("substr(created_at, 1, 10) >= ?5");
        }
        if to_str.is_some() {
          conds.push("substr(created_at, 1, 10) <= ?6");
        }

        let where_clause = if conds.is_empty() {
          String::new()
        } else {
          format!("WHERE {}", conds.join(" AND "))
        };

        let sql = format!(
          "SELECT {LEAD_COLUMNS} FROM leads
           {where_clause}
           ORDER BY created_at DESC
           LIMIT ?7 OFFSET ?8"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              status_str.as_deref(),
              agent_str.as_deref(),
              search_pattern.as_deref(),
              date_str.as_deref(),
              from_str.as_deref(),
              to_str.as_deref(),
              limit_val,
              offset_val,
            ],
            RawLead::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLead::into_lead).collect()
  }

  async fn get_lead(&self, id: Uuid) -> Result<Option<Lead>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawLead> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {LEAD_COLUMNS} FROM leads WHERE lead_id = ?1"),
              rusqlite::params![id_str],
              RawLead::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawLead::into_lead).transpose()
  }

  async fn create_lead(&self, input: NewLead) -> Result<Lead> {
    if self.find_by_phone(&input.mobile_number).await?.is_some() {
      return Err(Error::DuplicateMobileNumber(input.mobile_number));
    }

    let now = Utc::now();
    let lead = Lead {
      id:                 Uuid::new_v4(),
      mobile_number:      input.mobile_number,
      school_name:        input.school_name,
      client_name:        input.client_name,
      school_address:     input.school_address,
      notes:              input.notes,
      status:             input.status,
      next_followup_date: input.next_followup_date,
      assigned_agent_id:  input.assigned_agent_id,
      created_by:         input.created_by,
      created_at:         now,
      updated_at:         now,
    };

    self.insert_lead(&lead).await?;
    Ok(lead)
  }

  async fn update_lead(&self, id: Uuid, patch: LeadPatch) -> Result<bool> {
    if patch.is_empty() {
      return Err(Error::EmptyUpdate);
    }

    // A mobile-number change must not collide with another lead.
    if let Some(number) = &patch.mobile_number
      && let Some(owner) = self.find_by_phone(number).await?
      && owner.id != id
    {
      return Err(Error::DuplicateMobileNumber(number.clone()));
    }

    let mobile       = patch.mobile_number;
    let school_name  = patch.school_name;
    let client_name  = patch.client_name;
    let school_addr  = patch.school_address;
    let notes        = patch.notes;
    let status_str   = patch.status.map(|s| s.as_str().to_owned());
    let followup_str = patch.next_followup_date.map(encode_date);
    let agent_str    = patch.assigned_agent_id.map(encode_uuid);
    let updated_str  = encode_dt(Utc::now());
    let id_str       = encode_uuid(id);

    let rows = self
      .conn
      .call(move |conn| {
        let mut sets: Vec<&'static str> = vec![];
        if mobile.is_some() {
          sets.push("mobile_number = ?1");
        }
        if school_name.is_some() {
          sets.push("school_name = ?2");
        }
        if client_name.is_some() {
          sets.push("client_name = ?3");
        }
        if school_addr.is_some() {
          sets.push("school_address = ?4");
        }
        if notes.is_some() {
          sets.push("notes = ?5");
        }
        if status_str.is_some() {
          sets.push("status = ?6");
        }
        if followup_str.is_some() {
          sets.push("next_followup_date = ?7");
        }
        if agent_str.is_some() {
          sets.push("assigned_agent_id = ?8");
        }
        sets.push("updated_at = ?9");

        let sql =
          format!("UPDATE leads SET {} WHERE lead_id = ?10", sets.join(", "));

        let mut stmt = conn.prepare(&sql)?;
        Ok(stmt.execute(rusqlite::params![
          mobile,
          school_name,
          client_name,
          school_addr,
          notes,
          status_str,
          followup_str,
          agent_str,
          updated_str,
          id_str,
        ])?)
      })
      .await?;

    Ok(rows > 0)
  }

  async fn delete_lead(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    // Tag links and call logs go with it via ON DELETE CASCADE.
    let rows = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM leads WHERE lead_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(rows > 0)
  }

  // ── Tags ──────────────────────────────────────────────────────────────────

  async fn list_tags(&self) -> Result<Vec<Tag>> {
    let raws: Vec<RawTag> = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare(&format!("SELECT {TAG_COLUMNS} FROM tags ORDER BY name ASC"))?;
        let rows = stmt
          .query_map([], RawTag::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTag::into_tag).collect()
  }

  async fn create_tag(&self, input: NewTag) -> Result<Tag> {
    let name_check = input.name.clone();
    let exists: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM tags WHERE name = ?1",
              rusqlite::params![name_check],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;

    if exists {
      return Err(Error::DuplicateTagName(input.name));
    }

    let tag = Tag {
      id:         Uuid::new_v4(),
      name:       input.name,
      color:      input.color,
      created_at: Utc::now(),
    };

    let id_str = encode_uuid(tag.id);
    let name   = tag.name.clone();
    let color  = tag.color.clone();
    let at_str = encode_dt(tag.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO tags (tag_id, name, color, created_at) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, name, color, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(tag)
  }

  async fn update_tag(&self, id: Uuid, input: NewTag) -> Result<bool> {
    let name_check = input.name.clone();
    let owner: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT tag_id FROM tags WHERE name = ?1",
              rusqlite::params![name_check],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    let id_str = encode_uuid(id);
    if let Some(owner) = owner
      && owner != id_str
    {
      return Err(Error::DuplicateTagName(input.name));
    }

    let name  = input.name;
    let color = input.color;

    let rows = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE tags SET name = ?1, color = ?2 WHERE tag_id = ?3",
          rusqlite::params![name, color, id_str],
        )?)
      })
      .await?;

    Ok(rows > 0)
  }

  async fn delete_tag(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let rows = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM tags WHERE tag_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(rows > 0)
  }

  async fn tags_for_lead(&self, lead_id: Uuid) -> Result<Vec<Tag>> {
    let lead_id_str = encode_uuid(lead_id);

    let raws: Vec<RawTag> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT t.tag_id, t.name, t.color, t.created_at
           FROM tags t
           JOIN lead_tags lt ON lt.tag_id = t.tag_id
           WHERE lt.lead_id = ?1
           ORDER BY t.name ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![lead_id_str], RawTag::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTag::into_tag).collect()
  }

  async fn set_lead_tags(&self, lead_id: Uuid, tag_ids: Vec<Uuid>) -> Result<()> {
    let lead_id_str = encode_uuid(lead_id);
    let tag_id_strs: Vec<String> = tag_ids.into_iter().map(encode_uuid).collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM lead_tags WHERE lead_id = ?1",
          rusqlite::params![lead_id_str],
        )?;
        {
          let mut stmt =
            tx.prepare("INSERT INTO lead_tags (lead_id, tag_id) VALUES (?1, ?2)")?;
          for tag_id in &tag_id_strs {
            stmt.execute(rusqlite::params![lead_id_str, tag_id])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  // ── Call logs ─────────────────────────────────────────────────────────────

  async fn call_logs_for_lead(&self, lead_id: Uuid) -> Result<Vec<CallLog>> {
    let lead_id_str = encode_uuid(lead_id);

    let raws: Vec<RawCallLog> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CALL_LOG_COLUMNS} FROM call_logs
           WHERE lead_id = ?1
           ORDER BY created_at DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![lead_id_str], RawCallLog::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCallLog::into_call_log).collect()
  }

  async fn add_call_log(&self, input: NewCallLog) -> Result<CallLog> {
    let lead = self
      .get_lead(input.lead_id)
      .await?
      .ok_or(Error::LeadNotFound(input.lead_id))?;

    let log = CallLog {
      id:              Uuid::new_v4(),
      lead_id:         input.lead_id,
      agent_id:        input.agent_id,
      notes:           input.notes,
      previous_status: Some(lead.status),
      new_status:      input.new_status,
      created_at:      Utc::now(),
    };

    let log_id_str  = encode_uuid(log.id);
    let lead_id_str = encode_uuid(log.lead_id);
    let agent_str   = log.agent_id.map(encode_uuid);
    let notes       = log.notes.clone();
    let prev_str    = log.previous_status.map(|s| s.as_str().to_owned());
    let new_str     = log.new_status.map(|s| s.as_str().to_owned());
    let at_str      = encode_dt(log.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO call_logs (
             call_log_id, lead_id, agent_id, notes,
             previous_status, new_status, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            log_id_str,
            lead_id_str,
            agent_str,
            notes,
            prev_str,
            new_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    // Recording an outcome also moves the lead.
    if let Some(new_status) = log.new_status {
      let status_str  = new_status.as_str().to_owned();
      let updated_str = encode_dt(Utc::now());
      let id_str      = encode_uuid(log.lead_id);

      self
        .conn
        .call(move |conn| {
          conn.execute(
            "UPDATE leads SET status = ?1, updated_at = ?2 WHERE lead_id = ?3",
            rusqlite::params![status_str, updated_str, id_str],
          )?;
          Ok(())
        })
        .await?;
    }

    Ok(log)
  }

  // ── Agents ────────────────────────────────────────────────────────────────

  async fn list_agents(&self) -> Result<Vec<Agent>> {
    let raws: Vec<RawAgent> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {AGENT_COLUMNS} FROM agents ORDER BY full_name ASC"
        ))?;
        let rows = stmt
          .query_map([], RawAgent::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAgent::into_agent).collect()
  }

  async fn create_agent(&self, input: NewAgent) -> Result<Agent> {
    let agent = Agent {
      id:         Uuid::new_v4(),
      full_name:  input.full_name,
      email:      input.email,
      created_at: Utc::now(),
    };

    let id_str = encode_uuid(agent.id);
    let name   = agent.full_name.clone();
    let email  = agent.email.clone();
    let at_str = encode_dt(agent.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO agents (agent_id, full_name, email, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, name, email, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(agent)
  }

  // ── Maintenance ───────────────────────────────────────────────────────────

  async fn backfill_followup_dates(&self) -> Result<u64> {
    let today_str = encode_date(Utc::now().date_naive());

    let rows = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE leads SET next_followup_date = ?1
           WHERE next_followup_date IS NULL
             AND school_name LIKE 'WhatsApp Contact %'",
          rusqlite::params![today_str],
        )?)
      })
      .await?;

    Ok(rows as u64)
  }
}
