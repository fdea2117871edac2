//! Async HTTP client wrapping the leadbook JSON API.

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use leadbook_core::{
  conversation::SourceStats,
  lead::{Lead, LeadStatus},
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Connection settings for the leadbook API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub username: String,
  pub password: String,
}

/// Filters for [`ApiClient::list_leads`]; `None` fields are omitted from the
/// query string.
#[derive(Debug, Default)]
pub struct LeadFilter {
  pub status:    Option<LeadStatus>,
  pub agent:     Option<Uuid>,
  pub search:    Option<String>,
  /// `YYYY-MM-DD`, or the literal `today`.
  pub date:      Option<String>,
  pub date_from: Option<NaiveDate>,
  pub date_to:   Option<NaiveDate>,
  pub limit:     Option<usize>,
}

impl LeadFilter {
  fn query_pairs(&self) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::new();
    if let Some(status) = self.status {
      pairs.push(("status", status.as_str().to_owned()));
    }
    if let Some(agent) = self.agent {
      pairs.push(("assigned_agent", agent.to_string()));
    }
    if let Some(search) = &self.search {
      pairs.push(("search", search.clone()));
    }
    if let Some(date) = &self.date {
      pairs.push(("date", date.clone()));
    }
    if let Some(from) = self.date_from {
      pairs.push(("date_from", from.to_string()));
    }
    if let Some(to) = self.date_to {
      pairs.push(("date_to", to.to_string()));
    }
    if let Some(limit) = self.limit {
      pairs.push(("limit", limit.to_string()));
    }
    pairs
  }
}

// ─── Wire shapes ──────────────────────────────────────────────────────────────

/// `/whatsapp/auto-import/*` responses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerStatus {
  pub enabled:          bool,
  pub interval_minutes: u64,
}

/// `POST /whatsapp/import` response.
#[derive(Debug, Deserialize)]
pub struct ImportOutcome {
  pub message:  String,
  pub imported: u64,
  pub updated:  u64,
  pub total:    u64,
}

/// `POST /whatsapp/backfill-followups` response.
#[derive(Debug, Deserialize)]
pub struct BackfillOutcome {
  pub updated: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StartBody {
  interval_minutes: u64,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
  error: String,
}

// ─── Client ───────────────────────────────────────────────────────────────────

/// Async HTTP client for the leadbook JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{path}", self.config.base_url.trim_end_matches('/'))
  }

  fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    if self.config.username.is_empty() {
      req
    } else {
      req.basic_auth(&self.config.username, Some(&self.config.password))
    }
  }

  // ── Leads ─────────────────────────────────────────────────────────────────

  /// `GET /leads[?status=...&search=...]`
  pub async fn list_leads(&self, filter: &LeadFilter) -> Result<Vec<Lead>> {
    let resp = self
      .auth(self.client.get(self.url("/leads")))
      .query(&filter.query_pairs())
      .send()
      .await
      .context("GET /leads failed")?;

    if !resp.status().is_success() {
      return Err(fail("GET /leads", resp).await);
    }
    resp.json().await.context("deserialising leads")
  }

  // ── WhatsApp sync ─────────────────────────────────────────────────────────

  /// `POST /whatsapp/import` — run one import pass now.
  pub async fn import_now(&self) -> Result<ImportOutcome> {
    let resp = self
      .auth(self.client.post(self.url("/whatsapp/import")))
      .send()
      .await
      .context("POST /whatsapp/import failed")?;

    if !resp.status().is_success() {
      return Err(fail("POST /whatsapp/import", resp).await);
    }
    resp.json().await.context("deserialising import outcome")
  }

  /// `GET /whatsapp/stats`
  pub async fn source_stats(&self) -> Result<SourceStats> {
    let resp = self
      .auth(self.client.get(self.url("/whatsapp/stats")))
      .send()
      .await
      .context("GET /whatsapp/stats failed")?;

    if !resp.status().is_success() {
      return Err(fail("GET /whatsapp/stats", resp).await);
    }
    resp.json().await.context("deserialising stats")
  }

  /// `POST /whatsapp/auto-import/start` — omitting the interval lets the
  /// server pick its default.
  pub async fn start_auto_import(
    &self,
    interval_minutes: Option<u64>,
  ) -> Result<WorkerStatus> {
    let mut req =
      self.auth(self.client.post(self.url("/whatsapp/auto-import/start")));
    if let Some(interval_minutes) = interval_minutes {
      req = req.json(&StartBody { interval_minutes });
    }
    let resp = req
      .send()
      .await
      .context("POST /whatsapp/auto-import/start failed")?;

    if !resp.status().is_success() {
      return Err(fail("POST /whatsapp/auto-import/start", resp).await);
    }
    resp.json().await.context("deserialising worker status")
  }

  /// `POST /whatsapp/auto-import/stop`
  pub async fn stop_auto_import(&self) -> Result<WorkerStatus> {
    let resp = self
      .auth(self.client.post(self.url("/whatsapp/auto-import/stop")))
      .send()
      .await
      .context("POST /whatsapp/auto-import/stop failed")?;

    if !resp.status().is_success() {
      return Err(fail("POST /whatsapp/auto-import/stop", resp).await);
    }
    resp.json().await.context("deserialising worker status")
  }

  /// `GET /whatsapp/auto-import/status`
  pub async fn auto_import_status(&self) -> Result<WorkerStatus> {
    let resp = self
      .auth(self.client.get(self.url("/whatsapp/auto-import/status")))
      .send()
      .await
      .context("GET /whatsapp/auto-import/status failed")?;

    if !resp.status().is_success() {
      return Err(fail("GET /whatsapp/auto-import/status", resp).await);
    }
    resp.json().await.context("deserialising worker status")
  }

  /// `POST /whatsapp/backfill-followups`
  pub async fn backfill_followups(&self) -> Result<BackfillOutcome> {
    let resp = self
      .auth(self.client.post(self.url("/whatsapp/backfill-followups")))
      .send()
      .await
      .context("POST /whatsapp/backfill-followups failed")?;

    if !resp.status().is_success() {
      return Err(fail("POST /whatsapp/backfill-followups", resp).await);
    }
    resp.json().await.context("deserialising backfill outcome")
  }
}

/// Build the error for a non-2xx response, surfacing the server's
/// `{"error": ...}` envelope when there is one.
async fn fail(what: &str, resp: reqwest::Response) -> anyhow::Error {
  let status = resp.status();
  match resp.json::<ErrorEnvelope>().await {
    Ok(envelope) => anyhow!("{what} → {status}: {}", envelope.error),
    Err(_) => anyhow!("{what} → {status}"),
  }
}
