//! [`MySqlSource`] — the MySQL implementation of [`ConversationSource`].

use std::time::Duration;

use chrono::{DateTime, Utc};
use leadbook_core::{
  conversation::{Conversation, SourceStats},
  source::ConversationSource,
};
use serde::Deserialize;
use sqlx::{
  mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow},
  ConnectOptions as _, Connection as _, Row as _,
};

use crate::{Error, Result};

// ─── Config ──────────────────────────────────────────────────────────────────

/// Connection settings for the remote conversation database.
#[derive(Debug, Clone, Deserialize)]
pub struct MySqlSourceConfig {
  pub host:                 String,
  #[serde(default = "default_port")]
  pub port:                 u16,
  pub username:             String,
  pub password:             String,
  pub database:             String,
  /// Conversations are partitioned per deployment; only this partition is
  /// synced.
  #[serde(default)]
  pub branch_id:            i64,
  #[serde(default = "default_connect_timeout")]
  pub connect_timeout_secs: u64,
}

fn default_port() -> u16 { 3306 }

fn default_connect_timeout() -> u64 { 10 }

// ─── Source ──────────────────────────────────────────────────────────────────

/// Read-only view of the WhatsApp bot's `whatsapp_conversations` table.
#[derive(Clone)]
pub struct MySqlSource {
  config: MySqlSourceConfig,
}

impl MySqlSource {
  pub fn new(config: MySqlSourceConfig) -> Self { Self { config } }

  fn connect_options(&self) -> MySqlConnectOptions {
    MySqlConnectOptions::new()
      .host(&self.config.host)
      .port(self.config.port)
      .username(&self.config.username)
      .password(&self.config.password)
      .database(&self.config.database)
  }

  /// Open a fresh connection, bounded by the configured timeout.
  async fn connect(&self) -> Result<MySqlConnection> {
    let secs = self.config.connect_timeout_secs;
    let options = self.connect_options();
    let connect = options.connect();
    match tokio::time::timeout(Duration::from_secs(secs), connect).await {
      Ok(conn) => Ok(conn?),
      Err(_) => Err(Error::ConnectTimeout(secs)),
    }
  }
}

impl ConversationSource for MySqlSource {
  type Error = Error;

  async fn fetch_conversations(&self) -> Result<Vec<Conversation>> {
    let mut conn = self.connect().await?;

    let fetched = sqlx::query(
      "SELECT phone_number, contact_name, status, created_at, last_message_at
       FROM whatsapp_conversations
       WHERE branch_id = ?
       ORDER BY created_at DESC",
    )
    .bind(self.config.branch_id)
    .fetch_all(&mut conn)
    .await;

    // Close regardless of the fetch outcome; the fetch error wins.
    let closed = conn.close().await;
    let rows = fetched?;
    closed?;

    rows.iter().map(decode_conversation).collect()
  }

  async fn fetch_stats(&self) -> Result<SourceStats> {
    let mut conn = self.connect().await?;

    // COUNT(CASE ...) keeps every column a BIGINT, unlike SUM.
    let fetched = sqlx::query(
      "SELECT
         COUNT(*)                                       AS total_count,
         COUNT(CASE WHEN status = 'open'    THEN 1 END) AS open_count,
         COUNT(CASE WHEN status = 'pending' THEN 1 END) AS pending_count,
         COUNT(CASE WHEN created_at >= DATE_SUB(NOW(), INTERVAL 7 DAY)
               THEN 1 END)                              AS recent_count
       FROM whatsapp_conversations
       WHERE branch_id = ?",
    )
    .bind(self.config.branch_id)
    .fetch_one(&mut conn)
    .await;

    let closed = conn.close().await;
    let row = fetched?;
    closed?;

    Ok(SourceStats {
      total_conversations:   row.try_get::<i64, _>("total_count")? as u64,
      open_conversations:    row.try_get::<i64, _>("open_count")? as u64,
      pending_conversations: row.try_get::<i64, _>("pending_count")? as u64,
      recent_conversations:  row.try_get::<i64, _>("recent_count")? as u64,
    })
  }
}

/// NULL phone numbers and statuses decode to empty strings rather than
/// failing the whole fetch; the sync then handles them per record.
fn decode_conversation(row: &MySqlRow) -> Result<Conversation> {
  Ok(Conversation {
    phone_number:    row
      .try_get::<Option<String>, _>("phone_number")?
      .unwrap_or_default(),
    contact_name:    row.try_get("contact_name")?,
    status:          row
      .try_get::<Option<String>, _>("status")?
      .unwrap_or_default(),
    created_at:      row.try_get::<DateTime<Utc>, _>("created_at")?,
    last_message_at: row.try_get("last_message_at")?,
  })
}
