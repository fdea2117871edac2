//! Error type for `leadbook-source-mysql`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("source database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("source connect timed out after {0} s")]
  ConnectTimeout(u64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
