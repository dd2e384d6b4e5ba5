//! Error type for `rosterlink-engine`.

use thiserror::Error;

/// Failures surfaced by an interactive workflow: either the backing store or
/// the operator console. Unrecognised operator input is not an error — the
/// workflows silently re-prompt.
#[derive(Debug, Error)]
pub enum EngineError<E>
where
  E: std::error::Error + Send + Sync + 'static,
{
  #[error("store error: {0}")]
  Store(#[source] E),

  #[error("console error: {0}")]
  Console(#[from] std::io::Error),
}

pub type Result<T, E> = std::result::Result<T, EngineError<E>>;
