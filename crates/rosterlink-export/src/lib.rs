//! Spreadsheet export: render the joined roster/registry projection to an
//! `.xlsx` workbook for the registration volunteers.
//!
//! Presentation snapshot only — not a round-trip format. Status cells are
//! colour-coded directly (green for good, red for needs-attention); the
//! mismatch columns show `True`/`False` per identity field and stay blank for
//! unlinked rows.

use std::path::Path;

use chrono::Datelike;
use rosterlink_core::record::JointRow;
use rust_xlsxwriter::{Color, Format, Workbook};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
  #[error("xlsx error: {0}")]
  Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

pub type Result<T, E = ExportError> = std::result::Result<T, E>;

const HEADER: [&str; 10] = [
  "Last",
  "First",
  "Age",
  "USATF Status",
  "USATF Num",
  "Age Verified",
  "Last Mismatch",
  "First Mismatch",
  "DOB Mismatch",
  "Gender Mismatch",
];

const GREEN: Color = Color::RGB(0xB7E1CD);
const RED: Color = Color::RGB(0xE06666);
const COLUMN_WIDTH: f64 = 14.29;

/// Write the export projection to `path`. `age_year` is the season year used
/// to compute each person's age column.
pub fn write_roster(
  path: impl AsRef<Path>,
  rows: &[JointRow],
  age_year: i32,
) -> Result<()> {
  let mut workbook = Workbook::new();
  let sheet = workbook.add_worksheet();
  sheet.set_name("registration")?;

  let bold = Format::new().set_bold();
  let good = Format::new().set_background_color(GREEN);
  let bad = Format::new().set_background_color(RED);

  for (col, title) in HEADER.iter().enumerate() {
    let col = col as u16;
    sheet.write_string_with_format(0, col, *title, &bold)?;
    sheet.set_column_width(col, COLUMN_WIDTH)?;
  }
  sheet.set_freeze_panes(1, 0)?;

  for (i, r) in rows.iter().enumerate() {
    let row = (i + 1) as u32;

    sheet.write_string(row, 0, &r.last)?;
    sheet.write_string(row, 1, &r.first)?;
    sheet.write_number(row, 2, f64::from(age_year - r.dob.year()))?;

    if r.valid_membership {
      sheet.write_string_with_format(row, 3, "Current", &good)?;
    } else {
      sheet.write_string_with_format(row, 3, "Not Assoc", &bad)?;
    }

    if let Some(id) = r.external_id {
      match exact_f64(id) {
        Some(n) => sheet.write_number(row, 4, n)?,
        // Ids beyond f64's exact integer range go in as text rather than
        // silently rounding.
        None => sheet.write_string(row, 4, id.to_string())?,
      };
    }

    if r.age_verified {
      sheet.write_string_with_format(row, 5, "Current", &good)?;
    } else {
      sheet.write_blank(row, 5, &bad)?;
    }

    // Mismatch flags are the negated concordance; unlinked rows stay blank.
    if let Some(c) = r.concordance {
      let flags = [!c.last, !c.first, !c.dob, !c.gender];
      for (j, mismatch) in flags.iter().enumerate() {
        let col = (6 + j) as u16;
        if *mismatch {
          sheet.write_string_with_format(row, col, "True", &bad)?;
        } else {
          sheet.write_string_with_format(row, col, "False", &good)?;
        }
      }
    }
  }

  workbook.save(path.as_ref())?;
  Ok(())
}

/// An i64 as an f64, only when the conversion is lossless. f64 represents
/// every integer up to 2^53 exactly; membership numbers should never get
/// near that, but a corrupt id must not round silently.
fn exact_f64(id: i64) -> Option<f64> {
  const MAX_EXACT: i64 = 1 << 53;
  (-MAX_EXACT..=MAX_EXACT).contains(&id).then(|| id as f64)
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use rosterlink_core::record::{FieldConcordance, JointRow};

  use super::{exact_f64, write_roster};

  fn row(last: &str, linked: bool) -> JointRow {
    JointRow {
      last:             last.into(),
      first:            "Jane".into(),
      dob:              NaiveDate::from_ymd_opt(2005, 3, 1).unwrap(),
      valid_membership: linked,
      external_id:      linked.then_some(12345),
      age_verified:     false,
      concordance:      linked.then_some(FieldConcordance {
        last:   true,
        first:  true,
        dob:    true,
        gender: false,
      }),
    }
  }

  #[test]
  fn writes_a_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roster.xlsx");

    write_roster(&path, &[row("Smith", true), row("Lee", false)], 2026).unwrap();

    let meta = std::fs::metadata(&path).unwrap();
    assert!(meta.len() > 0);
  }

  #[test]
  fn empty_projection_still_writes_headers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.xlsx");

    write_roster(&path, &[], 2026).unwrap();
    assert!(path.exists());
  }

  #[test]
  fn membership_numbers_stay_exact() {
    assert_eq!(exact_f64(12345), Some(12345.0));
    assert_eq!(exact_f64(1 << 53), Some(9_007_199_254_740_992.0));
    assert_eq!(exact_f64(-(1 << 53)), Some(-9_007_199_254_740_992.0));
    assert_eq!(exact_f64((1 << 53) + 1), None);
    assert_eq!(exact_f64(i64::MAX), None);
  }

  #[test]
  fn oversized_membership_number_still_exports() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("big-id.xlsx");

    let mut r = row("Smith", true);
    r.external_id = Some(i64::MAX);
    write_roster(&path, &[r], 2026).unwrap();
    assert!(path.exists());
  }
}
