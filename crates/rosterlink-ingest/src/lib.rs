//! CSV ingestion: field normalization and type coercion for both roster
//! sources.
//!
//! Produces the typed new-record values consumed by the store. Ingestion
//! errors are fatal — a partially-read roster would leave the record set
//! incomplete in an unrecoverable way — with one exception: external rows
//! without a usable membership number are silently dropped, since a registry
//! record cannot exist without its identity key.

use std::io;
use std::path::Path;

use chrono::NaiveDate;
use rosterlink_core::record::{NewExternalRecord, NewLocalRecord, SENTINEL_DOB};
use thiserror::Error;

// ─── Error type ──────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum IngestError {
  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("missing required column {0:?}")]
  MissingColumn(&'static str),

  #[error("row {row}: invalid date {value:?}")]
  InvalidDate { row: usize, value: String },
}

pub type Result<T, E = IngestError> = std::result::Result<T, E>;

// ─── Column vocabularies ─────────────────────────────────────────────────────

mod columns {
  // Local roster export headers.
  pub const LOCAL_LAST: &str = "Last";
  pub const LOCAL_FIRST: &str = "First";
  pub const LOCAL_DOB: &str = "Birthdate";
  pub const LOCAL_GENDER: &str = "Gender";

  // Membership registry export headers.
  pub const EXT_LAST: &str = "Last Name";
  pub const EXT_FIRST: &str = "First Name";
  pub const EXT_DOB: &str = "Date of Birth";
  pub const EXT_GENDER: &str = "Sex";
  pub const EXT_VALID: &str = "Individual Membership Status";
  pub const EXT_ID: &str = "Individual Membership Memb No.";
  pub const EXT_AGE_VERIFIED: &str = "Date of Birth Verification Status";
}

// ─── Public API ──────────────────────────────────────────────────────────────

/// Read and normalize a local roster CSV export.
///
/// An empty birth date becomes the sentinel placeholder; any other
/// unparseable date is fatal.
pub fn read_local_csv(path: impl AsRef<Path>) -> Result<Vec<NewLocalRecord>> {
  parse_local(csv::Reader::from_path(path)?)
}

/// Read and normalize a membership registry CSV export.
///
/// Rows whose membership-number field is empty or unparseable are dropped
/// before they reach the store.
pub fn read_external_csv(path: impl AsRef<Path>) -> Result<Vec<NewExternalRecord>> {
  parse_external(csv::Reader::from_path(path)?)
}

// ─── Parsing ─────────────────────────────────────────────────────────────────

fn parse_local<R: io::Read>(mut rdr: csv::Reader<R>) -> Result<Vec<NewLocalRecord>> {
  let headers = rdr.headers()?.clone();
  let last_idx = column(&headers, columns::LOCAL_LAST)?;
  let first_idx = column(&headers, columns::LOCAL_FIRST)?;
  let dob_idx = column(&headers, columns::LOCAL_DOB)?;
  let gender_idx = column(&headers, columns::LOCAL_GENDER)?;

  let mut records = Vec::new();
  for (i, row) in rdr.records().enumerate() {
    let row = row?;
    // Row numbers in errors are 1-based and count the header line.
    let row_no = i + 2;

    let raw_dob = field(&row, dob_idx).trim();
    let dob = if raw_dob.is_empty() {
      SENTINEL_DOB
    } else {
      parse_date(raw_dob, row_no)?
    };

    records.push(NewLocalRecord {
      last:   normalize_name(field(&row, last_idx)),
      first:  normalize_name(field(&row, first_idx)),
      dob,
      gender: normalize_name(field(&row, gender_idx)),
    });
  }

  Ok(records)
}

fn parse_external<R: io::Read>(
  mut rdr: csv::Reader<R>,
) -> Result<Vec<NewExternalRecord>> {
  let headers = rdr.headers()?.clone();
  let last_idx = column(&headers, columns::EXT_LAST)?;
  let first_idx = column(&headers, columns::EXT_FIRST)?;
  let dob_idx = column(&headers, columns::EXT_DOB)?;
  let gender_idx = column(&headers, columns::EXT_GENDER)?;
  let valid_idx = column(&headers, columns::EXT_VALID)?;
  let id_idx = column(&headers, columns::EXT_ID)?;
  let verified_idx = column(&headers, columns::EXT_AGE_VERIFIED)?;

  let mut records = Vec::new();
  let mut dropped = 0usize;

  for (i, row) in rdr.records().enumerate() {
    let row = row?;
    let row_no = i + 2;

    let Some(external_id) = field(&row, id_idx).trim().parse::<i64>().ok() else {
      dropped += 1;
      continue;
    };

    records.push(NewExternalRecord {
      external_id,
      last:             normalize_name(field(&row, last_idx)),
      first:            normalize_name(field(&row, first_idx)),
      dob:              parse_date(field(&row, dob_idx).trim(), row_no)?,
      gender:           normalize_name(field(&row, gender_idx)),
      valid_membership: field(&row, valid_idx).trim() == "Current",
      age_verified:     field(&row, verified_idx).trim() == "Current",
    });
  }

  if dropped > 0 {
    tracing::info!(dropped, "skipped registry rows without a membership number");
  }

  Ok(records)
}

fn column(headers: &csv::StringRecord, name: &'static str) -> Result<usize> {
  headers
    .iter()
    .position(|h| h.trim() == name)
    .ok_or(IngestError::MissingColumn(name))
}

fn field<'a>(row: &'a csv::StringRecord, idx: usize) -> &'a str {
  row.get(idx).unwrap_or("")
}

fn parse_date(s: &str, row_no: usize) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| IngestError::InvalidDate {
    row:   row_no,
    value: s.to_string(),
  })
}

// ─── Name normalization ──────────────────────────────────────────────────────

/// Title-case a name that arrived fully lower- or upper-case; leave mixed
/// case alone (hand-entered capitalisation like "McRae" survives).
fn normalize_name(raw: &str) -> String {
  let s = raw.trim();
  let has_lower = s.chars().any(char::is_lowercase);
  let has_upper = s.chars().any(char::is_uppercase);
  if has_lower && has_upper {
    return s.to_string();
  }
  title_case(s)
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
fn title_case(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  let mut at_word_start = true;
  for c in s.chars() {
    if c.is_alphabetic() {
      if at_word_start {
        out.extend(c.to_uppercase());
      } else {
        out.extend(c.to_lowercase());
      }
      at_word_start = false;
    } else {
      out.push(c);
      at_word_start = true;
    }
  }
  out
}

// ─── Tests ───────────────────────────────────────────────────────────────────
