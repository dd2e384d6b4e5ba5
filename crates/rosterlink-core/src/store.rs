//! The `RosterStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `rosterlink-store-sqlite`). Higher layers (`rosterlink-engine`,
//! `rosterlink-cli`) depend on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};

use crate::record::{
  ExternalRecord, JointRow, LocalRecord, NewExternalRecord, NewLocalRecord,
  RosterKey,
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Filters for [`RosterStore::list_local`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilter {
  /// Drop records flagged as coaches from the listing.
  pub exclude_coaches: bool,
  /// Drop records that already carry an external-id link.
  pub exclude_linked:  bool,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a rosterlink storage backend.
///
/// Every mutating operation runs in its own atomic transaction: a crash
/// mid-write leaves either the old or the new value, never a torn state.
/// There is no multi-record transaction spanning a reconciliation run, so a
/// mid-run quit loses no committed work.
///
/// All methods return `Send` futures so the trait can be used from a
/// multi-threaded tokio runtime.
pub trait RosterStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Ingestion writes ──────────────────────────────────────────────────

  /// Insert-or-update local records keyed by (last, first), stamping each
  /// with `timestamp`. Replaces demographic fields; preserves any existing
  /// external-id link and coach flag. Never removes records.
  fn upsert_local(
    &self,
    records: Vec<NewLocalRecord>,
    timestamp: DateTime<Utc>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Insert-or-replace external records keyed by external id, stamping each
  /// with `timestamp`. Replaces the full record.
  fn upsert_external(
    &self,
    records: Vec<NewExternalRecord>,
    timestamp: DateTime<Utc>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Administrative operations ─────────────────────────────────────────

  /// Keys of local records absent from `fresh_keys` — supports the explicit
  /// drop-stale flow after a fresh ingestion. Read-only; never invoked
  /// automatically.
  fn local_missing_from(
    &self,
    fresh_keys: Vec<RosterKey>,
  ) -> impl Future<Output = Result<Vec<RosterKey>, Self::Error>> + Send + '_;

  /// Delete the named local records.
  fn delete_local(
    &self,
    keys: Vec<RosterKey>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Null out every external-id link. Irreversible without a backup; callers
  /// confirm with the operator first.
  fn clear_links(
    &self,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Reset every coach flag. Irreversible without a backup; callers confirm
  /// with the operator first.
  fn clear_coach_flags(
    &self,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Single-record mutations ───────────────────────────────────────────

  /// Set or clear the coach flag on one local record.
  fn set_coach(
    &self,
    key: RosterKey,
    is_coach: bool,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Link one local record to an external record. The referencing side is
  /// not checked for exclusivity — two local records may point at the same
  /// external id pending operator correction.
  fn set_external_id(
    &self,
    key: RosterKey,
    external_id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// List local records, filtered, in lexicographic (last, first) order when
  /// `ordered` — the deterministic review sequence shown to operators.
  fn list_local(
    &self,
    filter: LocalFilter,
    ordered: bool,
  ) -> impl Future<Output = Result<Vec<LocalRecord>, Self::Error>> + Send + '_;

  // ── Match query primitives ────────────────────────────────────────────
  //
  // The matching engine composes these; the store only answers single
  // queries. Results come back in store iteration order.

  /// External records agreeing on all four identity fields.
  fn external_matching_identity(
    &self,
    last: String,
    first: String,
    dob: NaiveDate,
    gender: String,
  ) -> impl Future<Output = Result<Vec<ExternalRecord>, Self::Error>> + Send + '_;

  /// External records sharing a last name.
  fn external_with_last(
    &self,
    last: String,
  ) -> impl Future<Output = Result<Vec<ExternalRecord>, Self::Error>> + Send + '_;

  /// External records sharing a first name.
  fn external_with_first(
    &self,
    first: String,
  ) -> impl Future<Output = Result<Vec<ExternalRecord>, Self::Error>> + Send + '_;

  /// External records sharing a date of birth.
  fn external_with_dob(
    &self,
    dob: NaiveDate,
  ) -> impl Future<Output = Result<Vec<ExternalRecord>, Self::Error>> + Send + '_;

  // ── Export projection ─────────────────────────────────────────────────

  /// The read-only export join: non-coach local records left-joined with
  /// their linked external record, ordered by (last, first), with per-field
  /// concordance computed in the join.
  fn joint_rows(
    &self,
  ) -> impl Future<Output = Result<Vec<JointRow>, Self::Error>> + Send + '_;
}
