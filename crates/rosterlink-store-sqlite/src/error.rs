//! Error type for `rosterlink-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Domain-level failures (e.g. a mutation naming an unknown roster key)
  /// surface through the core error type.
  #[error("core error: {0}")]
  Core(#[from] rosterlink_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date parse error: {0}")]
  DateParse(String),

  #[error("timestamp out of range: {0}")]
  TimestampOutOfRange(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
