//! Error type for `leadbook-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] leadbook_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// The mobile number is already owned by another lead.
  #[error("a lead with mobile number {0:?} already exists")]
  DuplicateMobileNumber(String),

  #[error("a tag named {0:?} already exists")]
  DuplicateTagName(String),

  #[error("lead not found: {0}")]
  LeadNotFound(uuid::Uuid),

  #[error("tag not found: {0}")]
  TagNotFound(uuid::Uuid),

  /// An update was requested with no fields to change.
  #[error("empty update")]
  EmptyUpdate,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
  /// True when the underlying SQLite error is a UNIQUE or CHECK violation —
  /// the per-record failures the sync treats as skippable.
  pub fn is_constraint_violation(&self) -> bool {
    match self {
      Self::Database(tokio_rusqlite::Error::Rusqlite(
        rusqlite::Error::SqliteFailure(e, _),
      )) => e.code == rusqlite::ErrorCode::ConstraintViolation,
      Self::DuplicateMobileNumber(_) | Self::DuplicateTagName(_) => true,
      _ => false,
    }
  }
}
