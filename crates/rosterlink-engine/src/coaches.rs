//! Interactive coach review: walk the whole roster asking the operator to
//! confirm or clear the coach flag per person.
//!
//! Coaches are excluded from reconciliation by the store's listing query,
//! not by the matching logic, so this pass is the only place the flag is set.

use rosterlink_core::store::{LocalFilter, RosterStore};

use crate::console::Console;
use crate::error::{EngineError, Result};

/// Counts reported by a coach-review pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewReport {
  pub updated:    usize,
  pub skipped:    usize,
  pub quit_early: bool,
}

/// Prompt `(Y)es, (N)o, (S)kip, (D)one` for every local record, walking the
/// roster in (last, first) order so an interrupted pass is easy to resume.
/// `Y`/`N` write the flag through the store, `S` leaves it untouched, `D`
/// ends the pass. Anything else re-prompts.
pub async fn review<S, C>(store: &S, console: &mut C) -> Result<ReviewReport, S::Error>
where
  S: RosterStore,
  C: Console,
{
  let roster = store
    .list_local(LocalFilter::default(), true)
    .await
    .map_err(EngineError::Store)?;

  let mut report = ReviewReport::default();

  'roster: for record in roster {
    console.say(&format!(
      "Is {} {} a coach (current: {}): (Y)es, (N)o, (S)kip, (D)one",
      record.first, record.last, record.is_coach
    ));

    loop {
      let line = console.prompt("? ")?;
      let answer = line.trim().chars().next().map(|c| c.to_ascii_uppercase());
      match answer {
        Some('Y') | Some('N') => {
          store
            .set_coach(record.key(), answer == Some('Y'))
            .await
            .map_err(EngineError::Store)?;
          report.updated += 1;
          continue 'roster;
        }
        Some('S') => {
          report.skipped += 1;
          continue 'roster;
        }
        Some('D') => {
          report.quit_early = true;
          break 'roster;
        }
        _ => {} // re-prompt
      }
    }
  }

  tracing::info!(
    updated = report.updated,
    skipped = report.skipped,
    quit_early = report.quit_early,
    "coach review finished"
  );

  Ok(report)
}
