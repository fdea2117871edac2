//! Error types for `leadbook-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown lead status: {0:?}")]
  UnknownStatus(String),

  #[error("mobile number must not be empty")]
  EmptyMobileNumber,

  #[error("mobile number contains invalid characters: {0:?}")]
  InvalidMobileNumber(String),

  #[error("school name must be at least 2 characters")]
  SchoolNameTooShort,

  #[error("tag name must be between 1 and 100 characters")]
  InvalidTagName,

  #[error("tag color must be a #RRGGBB hex value: {0:?}")]
  InvalidTagColor(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
