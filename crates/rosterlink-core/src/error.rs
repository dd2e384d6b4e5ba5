//! Error types for `rosterlink-core`.

use thiserror::Error;

use crate::record::RosterKey;

#[derive(Debug, Error)]
pub enum Error {
  /// A mutation named a (last, first) key with no stored record.
  #[error("roster record not found: {0}")]
  RecordNotFound(RosterKey),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
