//! Domain records for the two roster sources and the transient match result.
//!
//! A [`LocalRecord`] comes from the team's own roster; an [`ExternalRecord`]
//! comes from the outside membership registry. The link between them is the
//! local record's nullable `external_id` — there is no separate link entity.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel date applied when a local roster row arrives without a birth date.
/// A recognised placeholder, not an error.
pub const SENTINEL_DOB: NaiveDate = match NaiveDate::from_ymd_opt(1900, 1, 1) {
  Some(d) => d,
  None => unreachable!(),
};

// ─── Identity key ────────────────────────────────────────────────────────────

/// The identity key of a local record: at most one local record exists per
/// (last, first) pair at any time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RosterKey {
  pub last:  String,
  pub first: String,
}

impl RosterKey {
  pub fn new(last: impl Into<String>, first: impl Into<String>) -> Self {
    Self { last: last.into(), first: first.into() }
  }
}

impl fmt::Display for RosterKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}, {}", self.last, self.first)
  }
}

// ─── Local roster ────────────────────────────────────────────────────────────

/// A person entry from the team's own roster source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalRecord {
  pub last:        String,
  pub first:       String,
  pub dob:         NaiveDate,
  pub gender:      String,
  /// Reference to [`ExternalRecord::external_id`]; set only by reconciliation.
  pub external_id: Option<i64>,
  pub is_coach:    bool,
  pub updated_at:  DateTime<Utc>,
}

impl LocalRecord {
  pub fn key(&self) -> RosterKey {
    RosterKey::new(self.last.clone(), self.first.clone())
  }
}

/// A normalized local roster row as produced by ingestion, before the store
/// assigns its timestamp. Link and coach state live on the stored record and
/// survive re-ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLocalRecord {
  pub last:   String,
  pub first:  String,
  pub dob:    NaiveDate,
  pub gender: String,
}

impl NewLocalRecord {
  pub fn key(&self) -> RosterKey {
    RosterKey::new(self.last.clone(), self.first.clone())
  }
}

// ─── External registry ───────────────────────────────────────────────────────

/// A membership entry from the outside registry, keyed by a unique integer
/// membership id.
///
/// Derives full structural `Eq`/`Hash`: partial-match deduplication is by
/// whole-record value, not by id, so stale duplicate rows collapse only when
/// every field agrees.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalRecord {
  pub external_id:      i64,
  pub last:             String,
  pub first:            String,
  pub dob:              NaiveDate,
  pub gender:           String,
  pub valid_membership: bool,
  pub age_verified:     bool,
  pub updated_at:       DateTime<Utc>,
}

/// A normalized external registry row as produced by ingestion. Rows without
/// a membership number are dropped before they reach the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExternalRecord {
  pub external_id:      i64,
  pub last:             String,
  pub first:            String,
  pub dob:              NaiveDate,
  pub gender:           String,
  pub valid_membership: bool,
  pub age_verified:     bool,
}

// ─── Match result ────────────────────────────────────────────────────────────

/// The outcome of matching one local record against the external set.
/// Transient — never persisted.
///
/// `exact` holds records agreeing on all four identity fields, in store
/// iteration order. `partial` is only populated when `exact` is empty: the
/// union of single-field matches on last, first, or dob, deduplicated by
/// full-record equality and sorted by external id for stable enumeration.
#[derive(Debug, Clone, Default)]
pub struct MatchResult {
  pub exact:   Vec<ExternalRecord>,
  pub partial: Vec<ExternalRecord>,
}

impl MatchResult {
  /// Neither exact nor partial candidates were found.
  pub fn is_empty(&self) -> bool {
    self.exact.is_empty() && self.partial.is_empty()
  }
}

// ─── Export projection ───────────────────────────────────────────────────────

/// Per-field agreement between a linked local/external pair, computed by the
/// store's join. `true` means the two sides agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConcordance {
  pub last:   bool,
  pub first:  bool,
  pub dob:    bool,
  pub gender: bool,
}

/// One row of the read-only export projection: a non-coach local record
/// joined (left) with its linked external record. Registry-side fields are
/// `None`/`false` when no link exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointRow {
  pub last:             String,
  pub first:            String,
  pub dob:              NaiveDate,
  pub valid_membership: bool,
  pub external_id:      Option<i64>,
  pub age_verified:     bool,
  /// `None` when the local record is unlinked.
  pub concordance:      Option<FieldConcordance>,
}
