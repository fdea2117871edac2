//! `leadbook` — operator CLI for the leadbook server.
//!
//! # Usage
//!
//! ```
//! leadbook --url http://localhost:3001 --user operator --password secret leads list
//! leadbook --config ~/.config/leadbook/config.toml sync status
//! leadbook sync start --interval 10
//! ```

mod client;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig, LeadFilter, WorkerStatus};
use leadbook_core::lead::{Lead, LeadStatus};
use serde::Deserialize;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "leadbook", about = "Operator CLI for the leadbook server")]
struct Args {
  /// Path to a TOML config file (url, username, password).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// Base URL of the leadbook server (default: http://localhost:3001).
  #[arg(long, env = "LEADBOOK_URL")]
  url: Option<String>,

  /// API username.
  #[arg(long, env = "LEADBOOK_USER")]
  user: Option<String>,

  /// API password (plaintext).
  #[arg(long, env = "LEADBOOK_PASSWORD")]
  password: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Inspect leads.
  Leads {
    #[command(subcommand)]
    command: LeadsCommand,
  },
  /// Control the WhatsApp auto-import worker.
  Sync {
    #[command(subcommand)]
    command: SyncCommand,
  },
  /// Show conversation counts from the WhatsApp source database.
  Stats,
  /// Set a follow-up date on imported leads that lack one.
  Backfill,
}

#[derive(Subcommand, Debug)]
enum LeadsCommand {
  /// List leads, newest first.
  List {
    /// Pipeline status (new, interested, follow_up, not_interested, closed).
    #[arg(long, value_parser = LeadStatus::parse)]
    status: Option<LeadStatus>,

    /// Assigned agent id.
    #[arg(long)]
    agent: Option<Uuid>,

    /// Free-text filter over school, client, and mobile number.
    #[arg(long)]
    search: Option<String>,

    /// Exact creation date: YYYY-MM-DD, or `today`.
    #[arg(long)]
    date: Option<String>,

    /// Created on or after this date.
    #[arg(long)]
    date_from: Option<NaiveDate>,

    /// Created on or before this date.
    #[arg(long)]
    date_to: Option<NaiveDate>,

    /// Maximum number of rows.
    #[arg(long)]
    limit: Option<usize>,
  },
}

#[derive(Subcommand, Debug)]
enum SyncCommand {
  /// Arm the periodic auto-import.
  Start {
    /// Minutes between passes (server default: 5).
    #[arg(long)]
    interval: Option<u64>,
  },
  /// Disarm the periodic auto-import.
  Stop,
  /// Show whether auto-import is armed, and at what cadence.
  Status,
  /// Run one import pass right now.
  Run,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  username: String,
  #[serde(default)]
  password: String,
}

/// CLI flags override the config file, which overrides the defaults.
fn resolve_config(args: &Args, file: &ConfigFile) -> ApiConfig {
  ApiConfig {
    base_url: args
      .url
      .clone()
      .or_else(|| (!file.url.is_empty()).then(|| file.url.clone()))
      .unwrap_or_else(|| "http://localhost:3001".to_string()),
    username: args
      .user
      .clone()
      .or_else(|| (!file.username.is_empty()).then(|| file.username.clone()))
      .unwrap_or_default(),
    password: args
      .password
      .clone()
      .or_else(|| (!file.password.is_empty()).then(|| file.password.clone()))
      .unwrap_or_default(),
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  let client = ApiClient::new(resolve_config(&args, &file_cfg))?;

  match args.command {
    Command::Leads { command } => match command {
      LeadsCommand::List {
        status,
        agent,
        search,
        date,
        date_from,
        date_to,
        limit,
      } => {
        let filter =
          LeadFilter { status, agent, search, date, date_from, date_to, limit };
        let leads = client.list_leads(&filter).await?;
        print_leads(&leads);
      }
    },
    Command::Sync { command } => match command {
      SyncCommand::Start { interval } => {
        let status = client.start_auto_import(interval).await?;
        print_worker_status(&status);
      }
      SyncCommand::Stop => {
        let status = client.stop_auto_import().await?;
        print_worker_status(&status);
      }
      SyncCommand::Status => {
        let status = client.auto_import_status().await?;
        print_worker_status(&status);
      }
      SyncCommand::Run => {
        let outcome = client.import_now().await?;
        println!("{}", outcome.message);
        println!(
          "{} conversation(s) scanned, {} imported, {} updated",
          outcome.total, outcome.imported, outcome.updated
        );
      }
    },
    Command::Stats => {
      let stats = client.source_stats().await?;
      println!("total conversations:  {}", stats.total_conversations);
      println!("open:                 {}", stats.open_conversations);
      println!("pending:              {}", stats.pending_conversations);
      println!("created last 7 days:  {}", stats.recent_conversations);
    }
    Command::Backfill => {
      let outcome = client.backfill_followups().await?;
      println!("{} lead(s) given a follow-up date", outcome.updated);
    }
  }

  Ok(())
}

// ─── Output ───────────────────────────────────────────────────────────────────

fn print_leads(leads: &[Lead]) {
  println!(
    "{:<36}  {:<16}  {:<28}  {:<14}  {}",
    "ID", "MOBILE", "SCHOOL", "STATUS", "FOLLOW-UP"
  );
  for lead in leads {
    println!(
      "{:<36}  {:<16}  {:<28}  {:<14}  {}",
      lead.id,
      lead.mobile_number,
      lead.school_name,
      lead.status.as_str(),
      lead
        .next_followup_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string()),
    );
  }
  println!("{} lead(s)", leads.len());
}

fn print_worker_status(status: &WorkerStatus) {
  if status.enabled {
    println!("auto-import: every {} minute(s)", status.interval_minutes);
  } else {
    println!("auto-import: stopped");
  }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
