//! SQL schema for the Leadbook SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS agents (
    agent_id   TEXT PRIMARY KEY,
    full_name  TEXT NOT NULL,
    email      TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- The mobile number is the natural key: UNIQUE backs the one-lead-per-number
-- invariant the WhatsApp sync upserts against, and the CHECK rejects source
-- rows with a blank number at the row level.
CREATE TABLE IF NOT EXISTS leads (
    lead_id            TEXT PRIMARY KEY,
    mobile_number      TEXT NOT NULL UNIQUE CHECK (mobile_number <> ''),
    school_name        TEXT NOT NULL,
    client_name        TEXT,
    school_address     TEXT,
    notes              TEXT,
    status             TEXT NOT NULL DEFAULT 'new',
    next_followup_date TEXT,             -- YYYY-MM-DD or NULL
    assigned_agent_id  TEXT REFERENCES agents(agent_id),
    created_by         TEXT REFERENCES agents(agent_id),
    created_at         TEXT NOT NULL,    -- RFC 3339 UTC
    updated_at         TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tags (
    tag_id     TEXT PRIMARY KEY,
    name       TEXT NOT NULL UNIQUE,
    color      TEXT NOT NULL DEFAULT '#3B82F6',
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS lead_tags (
    lead_id TEXT NOT NULL REFERENCES leads(lead_id) ON DELETE CASCADE,
    tag_id  TEXT NOT NULL REFERENCES tags(tag_id)   ON DELETE CASCADE,
    PRIMARY KEY (lead_id, tag_id)
);

CREATE TABLE IF NOT EXISTS call_logs (
    call_log_id     TEXT PRIMARY KEY,
    lead_id         TEXT NOT NULL REFERENCES leads(lead_id) ON DELETE CASCADE,
    agent_id        TEXT REFERENCES agents(agent_id),
    notes           TEXT,
    previous_status TEXT,
    new_status      TEXT,
    created_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS leads_status_idx    ON leads(status);
CREATE INDEX IF NOT EXISTS leads_agent_idx     ON leads(assigned_agent_id);
CREATE INDEX IF NOT EXISTS leads_created_idx   ON leads(created_at);
CREATE INDEX IF NOT EXISTS call_logs_lead_idx  ON call_logs(lead_id);

PRAGMA user_version = 1;
";
