//! Encoding and decoding helpers between Rust domain types and the plain
//! representations stored in SQLite columns.
//!
//! Calendar dates are stored as ISO 8601 strings; timestamps as Unix-epoch
//! integers. The codecs are explicit functions invoked by the store, not
//! ambient process-wide registration.

use chrono::{DateTime, NaiveDate, Utc};
use rosterlink_core::record::{
  ExternalRecord, FieldConcordance, JointRow, LocalRecord,
};

use crate::{Error, Result};

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_ts(dt: DateTime<Utc>) -> i64 { dt.timestamp() }

pub fn decode_ts(secs: i64) -> Result<DateTime<Utc>> {
  DateTime::from_timestamp(secs, 0).ok_or(Error::TimestampOutOfRange(secs))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `roster` row.
pub struct RawLocal {
  pub last:        String,
  pub first:       String,
  pub dob:         String,
  pub gender:      String,
  pub external_id: Option<i64>,
  pub is_coach:    bool,
  pub update_time: i64,
}

impl RawLocal {
  pub fn into_record(self) -> Result<LocalRecord> {
    Ok(LocalRecord {
      last:        self.last,
      first:       self.first,
      dob:         decode_date(&self.dob)?,
      gender:      self.gender,
      external_id: self.external_id,
      is_coach:    self.is_coach,
      updated_at:  decode_ts(self.update_time)?,
    })
  }
}

/// Raw values read directly from a `usatf` row.
pub struct RawExternal {
  pub external_id:  i64,
  pub last:         String,
  pub first:        String,
  pub dob:          String,
  pub gender:       String,
  pub valid:        bool,
  pub age_verified: bool,
  pub update_time:  i64,
}

impl RawExternal {
  pub fn into_record(self) -> Result<ExternalRecord> {
    Ok(ExternalRecord {
      external_id:      self.external_id,
      last:             self.last,
      first:            self.first,
      dob:              decode_date(&self.dob)?,
      gender:           self.gender,
      valid_membership: self.valid,
      age_verified:     self.age_verified,
      updated_at:       decode_ts(self.update_time)?,
    })
  }
}

/// Raw values read from the export join. The registry-side columns and the
/// concordance expressions are NULL when the local record is unlinked.
pub struct RawJoint {
  pub last:          String,
  pub first:         String,
  pub dob:           String,
  pub valid:         Option<bool>,
  pub external_id:   Option<i64>,
  pub age_verified:  Option<bool>,
  pub last_match:    Option<bool>,
  pub first_match:   Option<bool>,
  pub dob_match:     Option<bool>,
  pub gender_match:  Option<bool>,
}

impl RawJoint {
  pub fn into_row(self) -> Result<JointRow> {
    let concordance = match (
      self.last_match,
      self.first_match,
      self.dob_match,
      self.gender_match,
    ) {
      (Some(last), Some(first), Some(dob), Some(gender)) => {
        Some(FieldConcordance { last, first, dob, gender })
      }
      _ => None,
    };

    Ok(JointRow {
      last: self.last,
      first: self.first,
      dob: decode_date(&self.dob)?,
      valid_membership: self.valid.unwrap_or(false),
      external_id: self.external_id,
      age_verified: self.age_verified.unwrap_or(false),
      concordance,
    })
  }
}
