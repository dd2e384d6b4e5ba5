//! The reconciliation engine: identity matching, the interactive
//! disambiguation workflow, and the coach-review pass.
//!
//! Everything here is generic over [`rosterlink_core::store::RosterStore`]
//! and a [`console::Console`], so tests drive the workflows with scripted
//! input against an in-memory store.

pub mod coaches;
pub mod console;
pub mod error;
pub mod matching;
pub mod reconcile;

pub use error::EngineError;

#[cfg(test)]
mod tests;
