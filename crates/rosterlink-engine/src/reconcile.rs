//! The reconciliation controller: per-record ingest → match → resolve →
//! persist, with the interactive disambiguation protocol.
//!
//! The workflow is a small state machine per local record. A single exact
//! match auto-links without a prompt; multiple exact matches or any partial
//! matches are enumerated for the operator; no match at all leaves the record
//! for a future run. Already-linked records and coaches never enter the pool,
//! which is what makes repeated runs idempotent.

use rosterlink_core::record::{ExternalRecord, LocalRecord};
use rosterlink_core::store::{LocalFilter, RosterStore};

use crate::console::{Choice, Console, parse_choice};
use crate::error::{EngineError, Result};
use crate::matching::find_match;

/// Counts reported by a reconciliation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
  /// Linked without a prompt (single exact match).
  pub auto_linked:     usize,
  /// Linked by an operator picking from a candidate list.
  pub operator_linked: usize,
  /// Explicitly skipped at a prompt.
  pub skipped:         usize,
  /// No candidates at all; left for a future run.
  pub unmatched:       usize,
  /// The operator quit with `D` before the pool was exhausted. Every link
  /// committed before the quit is preserved.
  pub quit_early:      bool,
}

/// How one prompted record was resolved.
enum Resolution {
  Linked,
  Skipped,
  Quit,
}

/// Run the reconciliation workflow over every unlinked, non-coach local
/// record in lexicographic order.
pub async fn run<S, C>(store: &S, console: &mut C) -> Result<RunReport, S::Error>
where
  S: RosterStore,
  C: Console,
{
  let pool = store
    .list_local(
      LocalFilter { exclude_coaches: true, exclude_linked: true },
      true,
    )
    .await
    .map_err(EngineError::Store)?;

  console.say(&format!("Found {} unmatched runners...", pool.len()));

  let mut report = RunReport::default();

  for local in pool {
    let matches = find_match(store, &local).await.map_err(EngineError::Store)?;

    if matches.exact.len() == 1 {
      let id = matches.exact[0].external_id;
      console.say(&format!(
        "Found exact match for {} {} ({})",
        local.first, local.last, local.dob
      ));
      console.say(&id.to_string());
      link(store, &local, id).await?;
      report.auto_linked += 1;
      continue;
    }

    let resolution = if !matches.exact.is_empty() {
      console.say(&format!(
        "Found multiple exact matches for {} {} ({}):",
        local.first, local.last, local.dob
      ));
      disambiguate(store, console, &local, &matches.exact).await?
    } else if !matches.partial.is_empty() {
      console.say(&format!(
        "Found partial match(es) for {} {} ({}):",
        local.first, local.last, local.dob
      ));
      disambiguate(store, console, &local, &matches.partial).await?
    } else {
      report.unmatched += 1;
      continue;
    };

    match resolution {
      Resolution::Linked => report.operator_linked += 1,
      Resolution::Skipped => report.skipped += 1,
      Resolution::Quit => {
        report.quit_early = true;
        break;
      }
    }
  }

  tracing::info!(
    auto_linked = report.auto_linked,
    operator_linked = report.operator_linked,
    skipped = report.skipped,
    unmatched = report.unmatched,
    quit_early = report.quit_early,
    "reconciliation run finished"
  );

  Ok(report)
}

/// Enumerate `candidates` 1..N and loop on the prompt until the operator
/// picks, skips, or quits. Unrecognised input re-prompts.
async fn disambiguate<S, C>(
  store: &S,
  console: &mut C,
  local: &LocalRecord,
  candidates: &[ExternalRecord],
) -> Result<Resolution, S::Error>
where
  S: RosterStore,
  C: Console,
{
  for (i, cand) in candidates.iter().enumerate() {
    console.say(&format!(
      "{}) {}, {}, {}, {}, {}",
      i + 1,
      cand.last,
      cand.first,
      cand.dob,
      cand.gender,
      cand.external_id
    ));
  }

  loop {
    let line = console.prompt("#, (S)kip, (D)one? ")?;
    match parse_choice(&line, candidates.len()) {
      Some(Choice::Pick(i)) => {
        let id = candidates[i].external_id;
        console.say(&id.to_string());
        link(store, local, id).await?;
        return Ok(Resolution::Linked);
      }
      Some(Choice::Skip) => return Ok(Resolution::Skipped),
      Some(Choice::Done) => return Ok(Resolution::Quit),
      None => {} // re-prompt
    }
  }
}

/// Commit one link. Each call is its own transaction, so links made before
/// an operator quit are final.
async fn link<S: RosterStore>(
  store: &S,
  local: &LocalRecord,
  external_id: i64,
) -> Result<(), S::Error> {
  store
    .set_external_id(local.key(), external_id)
    .await
    .map_err(EngineError::Store)?;
  tracing::debug!(
    last = %local.last,
    first = %local.first,
    external_id,
    "linked roster record"
  );
  Ok(())
}
