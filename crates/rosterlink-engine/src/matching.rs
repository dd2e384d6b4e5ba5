//! Identity matching: classify candidate links as exact, partial, or none.

use std::collections::HashSet;

use rosterlink_core::record::{ExternalRecord, LocalRecord, MatchResult};
use rosterlink_core::store::RosterStore;

/// Match one local record against the current external set.
///
/// Exact candidates agree on all four identity fields and take precedence:
/// when any exist, the partial search is not run at all. Otherwise partial
/// candidates are the union of three independent single-field queries (same
/// last, same first, same dob). Gender is never used to filter the partial
/// set — a mismatch in any one field is recoverable data entry, but gender
/// similarity alone is too weak a signal to admit candidates.
///
/// Partial results are deduplicated by full-record equality (stale duplicate
/// registry rows collapse only when every field agrees) and sorted by
/// external id so operators see a stable enumeration.
pub async fn find_match<S: RosterStore>(
  store: &S,
  local: &LocalRecord,
) -> Result<MatchResult, S::Error> {
  let exact = store
    .external_matching_identity(
      local.last.clone(),
      local.first.clone(),
      local.dob,
      local.gender.clone(),
    )
    .await?;

  if !exact.is_empty() {
    return Ok(MatchResult { exact, partial: Vec::new() });
  }

  let mut seen: HashSet<ExternalRecord> = HashSet::new();
  seen.extend(store.external_with_last(local.last.clone()).await?);
  seen.extend(store.external_with_first(local.first.clone()).await?);
  seen.extend(store.external_with_dob(local.dob).await?);

  let mut partial: Vec<ExternalRecord> = seen.into_iter().collect();
  partial.sort_by_key(|r| r.external_id);

  Ok(MatchResult { exact: Vec::new(), partial })
}
