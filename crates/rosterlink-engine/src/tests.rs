//! Workflow tests: scripted consoles driving the reconciliation and
//! coach-review state machines against an in-memory store.

use chrono::{NaiveDate, TimeZone, Utc};
use rosterlink_core::{
  record::{NewExternalRecord, NewLocalRecord, RosterKey},
  store::{LocalFilter, RosterStore},
};
use rosterlink_store_sqlite::SqliteStore;

use crate::console::ScriptedConsole;
use crate::matching::find_match;
use crate::{coaches, reconcile};

fn date(s: &str) -> NaiveDate {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn ts() -> chrono::DateTime<Utc> {
  Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn local(last: &str, first: &str, dob: &str, gender: &str) -> NewLocalRecord {
  NewLocalRecord {
    last:   last.into(),
    first:  first.into(),
    dob:    date(dob),
    gender: gender.into(),
  }
}

fn external(
  id: i64,
  last: &str,
  first: &str,
  dob: &str,
  gender: &str,
) -> NewExternalRecord {
  NewExternalRecord {
    external_id:      id,
    last:             last.into(),
    first:            first.into(),
    dob:              date(dob),
    gender:           gender.into(),
    valid_membership: true,
    age_verified:     false,
  }
}

async fn store_with(
  locals: Vec<NewLocalRecord>,
  externals: Vec<NewExternalRecord>,
) -> SqliteStore {
  let s = SqliteStore::open_in_memory().await.unwrap();
  s.upsert_local(locals, ts()).await.unwrap();
  s.upsert_external(externals, ts()).await.unwrap();
  s
}

async fn linked_id(store: &SqliteStore, last: &str, first: &str) -> Option<i64> {
  store
    .list_local(LocalFilter::default(), true)
    .await
    .unwrap()
    .into_iter()
    .find(|r| r.last == last && r.first == first)
    .and_then(|r| r.external_id)
}

// ─── Matching ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn exact_match_needs_all_four_fields() {
  let s = store_with(
    vec![local("Smith", "Jane", "2005-03-01", "F")],
    vec![
      external(10, "Smith", "Jane", "2005-03-01", "F"),
      external(11, "Smith", "Jane", "2005-03-01", "M"),
    ],
  )
  .await;

  let pool = s.list_local(LocalFilter::default(), true).await.unwrap();
  let m = find_match(&s, &pool[0]).await.unwrap();

  assert_eq!(m.exact.len(), 1);
  assert_eq!(m.exact[0].external_id, 10);
  assert!(m.partial.is_empty());
}

#[tokio::test]
async fn exact_dominates_partial() {
  // id 12 shares last+dob and would be a partial candidate, but the exact
  // hit on id 10 means the partial search never produces anything.
  let s = store_with(
    vec![local("Smith", "Jane", "2005-03-01", "F")],
    vec![
      external(10, "Smith", "Jane", "2005-03-01", "F"),
      external(12, "Smith", "Ann", "2005-03-01", "F"),
    ],
  )
  .await;

  let pool = s.list_local(LocalFilter::default(), true).await.unwrap();
  let m = find_match(&s, &pool[0]).await.unwrap();

  assert_eq!(m.exact.len(), 1);
  assert!(m.partial.is_empty());
}

#[tokio::test]
async fn partial_is_single_field_union_ignoring_gender() {
  // (Lee, Kim, 2004-01-01, M) against a registry holding only
  // (id=20, Lee, Ann, 2004-01-01, F): matched on last name and dob,
  // not on first or gender.
  let s = store_with(
    vec![local("Lee", "Kim", "2004-01-01", "M")],
    vec![
      external(20, "Lee", "Ann", "2004-01-01", "F"),
      external(21, "Park", "Sue", "1999-09-09", "F"), // no field in common
    ],
  )
  .await;

  let pool = s.list_local(LocalFilter::default(), true).await.unwrap();
  let m = find_match(&s, &pool[0]).await.unwrap();

  assert!(m.exact.is_empty());
  assert_eq!(m.partial.len(), 1);
  assert_eq!(m.partial[0].external_id, 20);
}

#[tokio::test]
async fn partial_candidates_dedup_and_sort_by_id() {
  // id 31 matches on last AND dob — must appear once. Results come back
  // ordered by external id regardless of which query found them.
  let s = store_with(
    vec![local("Lee", "Kim", "2004-01-01", "M")],
    vec![
      external(33, "Lee", "Ann", "1999-09-09", "F"),
      external(31, "Lee", "Bea", "2004-01-01", "F"),
      external(32, "Park", "Kim", "1998-08-08", "M"),
    ],
  )
  .await;

  let pool = s.list_local(LocalFilter::default(), true).await.unwrap();
  let m = find_match(&s, &pool[0]).await.unwrap();

  let ids: Vec<i64> = m.partial.iter().map(|r| r.external_id).collect();
  assert_eq!(ids, vec![31, 32, 33]);
}

// ─── Reconciliation ──────────────────────────────────────────────────────────

#[tokio::test]
async fn single_exact_match_auto_links_without_prompting() {
  let s = store_with(
    vec![local("Smith", "Jane", "2005-03-01", "F")],
    vec![external(10, "Smith", "Jane", "2005-03-01", "F")],
  )
  .await;

  let mut console = ScriptedConsole::new(Vec::<String>::new());
  let report = reconcile::run(&s, &mut console).await.unwrap();

  assert_eq!(report.auto_linked, 1);
  assert_eq!(report.operator_linked, 0);
  assert!(!report.quit_early);
  assert_eq!(linked_id(&s, "Smith", "Jane").await, Some(10));
  assert!(console.saw("Found exact match for Jane Smith (2005-03-01)"));
}

#[tokio::test]
async fn rerunning_after_link_is_a_no_op() {
  let s = store_with(
    vec![local("Smith", "Jane", "2005-03-01", "F")],
    vec![external(10, "Smith", "Jane", "2005-03-01", "F")],
  )
  .await;

  let mut first = ScriptedConsole::new(Vec::<String>::new());
  reconcile::run(&s, &mut first).await.unwrap();

  // Second run: the linked record is out of the pool, nothing happens.
  let mut second = ScriptedConsole::new(Vec::<String>::new());
  let report = reconcile::run(&s, &mut second).await.unwrap();

  assert_eq!(report, reconcile::RunReport::default());
  assert!(second.saw("Found 0 unmatched runners..."));
  assert_eq!(linked_id(&s, "Smith", "Jane").await, Some(10));
}

#[tokio::test]
async fn multiple_exact_matches_prompt_and_selection_links() {
  // Two identical exact candidates; answering "2" links the second (id 11).
  let s = store_with(
    vec![local("Smith", "Jane", "2005-03-01", "F")],
    vec![
      external(10, "Smith", "Jane", "2005-03-01", "F"),
      external(11, "Smith", "Jane", "2005-03-01", "F"),
    ],
  )
  .await;

  let mut console = ScriptedConsole::new(["2"]);
  let report = reconcile::run(&s, &mut console).await.unwrap();

  assert_eq!(report.operator_linked, 1);
  assert_eq!(linked_id(&s, "Smith", "Jane").await, Some(11));
  assert!(console.saw("Found multiple exact matches for Jane Smith (2005-03-01):"));
  assert!(console.saw("1) Smith, Jane, 2005-03-01, F, 10"));
  assert!(console.saw("2) Smith, Jane, 2005-03-01, F, 11"));
}

#[tokio::test]
async fn partial_matches_prompt_and_skip_leaves_unlinked() {
  let s = store_with(
    vec![local("Lee", "Kim", "2004-01-01", "M")],
    vec![external(20, "Lee", "Ann", "2004-01-01", "F")],
  )
  .await;

  let mut console = ScriptedConsole::new(["S"]);
  let report = reconcile::run(&s, &mut console).await.unwrap();

  assert_eq!(report.skipped, 1);
  assert_eq!(linked_id(&s, "Lee", "Kim").await, None);
  assert!(console.saw("Found partial match(es) for Kim Lee (2004-01-01):"));
}

#[tokio::test]
async fn unrecognised_input_reprompts_until_valid() {
  let s = store_with(
    vec![local("Lee", "Kim", "2004-01-01", "M")],
    vec![external(20, "Lee", "Ann", "2004-01-01", "F")],
  )
  .await;

  // Garbage, out-of-range, empty — then a valid pick.
  let mut console = ScriptedConsole::new(["x", "9", "", "1"]);
  let report = reconcile::run(&s, &mut console).await.unwrap();

  assert_eq!(report.operator_linked, 1);
  assert_eq!(linked_id(&s, "Lee", "Kim").await, Some(20));
  let prompts = console
    .transcript
    .iter()
    .filter(|l| l.starts_with("#, (S)kip, (D)one?"))
    .count();
  assert_eq!(prompts, 4);
}

#[tokio::test]
async fn quit_preserves_committed_links_and_stops() {
  // Three records in lexicographic order: Adams auto-links, Baker gets a
  // prompt answered with D, Cole is never processed.
  let s = store_with(
    vec![
      local("Adams", "Ann", "2004-05-05", "F"),
      local("Baker", "Bob", "2003-06-06", "M"),
      local("Cole", "Cat", "2002-07-07", "F"),
    ],
    vec![
      external(40, "Adams", "Ann", "2004-05-05", "F"),
      external(41, "Baker", "Rob", "2003-06-06", "M"),
      external(42, "Cole", "Cat", "2002-07-07", "F"),
    ],
  )
  .await;

  let mut console = ScriptedConsole::new(["D"]);
  let report = reconcile::run(&s, &mut console).await.unwrap();

  assert!(report.quit_early);
  assert_eq!(report.auto_linked, 1);
  assert_eq!(linked_id(&s, "Adams", "Ann").await, Some(40));
  assert_eq!(linked_id(&s, "Baker", "Bob").await, None);
  assert_eq!(linked_id(&s, "Cole", "Cat").await, None);
  // Cole would have auto-linked; the quit means she was never reached.
  assert!(!console.saw("Found exact match for Cat Cole"));
}

#[tokio::test]
async fn no_candidates_means_no_prompt() {
  let s = store_with(
    vec![local("Novak", "Ida", "2001-02-03", "F")],
    vec![external(50, "Park", "Sue", "1999-09-09", "F")],
  )
  .await;

  let mut console = ScriptedConsole::new(Vec::<String>::new());
  let report = reconcile::run(&s, &mut console).await.unwrap();

  assert_eq!(report.unmatched, 1);
  assert_eq!(linked_id(&s, "Novak", "Ida").await, None);
}

#[tokio::test]
async fn coaches_and_linked_records_stay_out_of_the_pool() {
  let s = store_with(
    vec![
      local("Adams", "Ann", "2004-05-05", "F"),
      local("Baker", "Bob", "2003-06-06", "M"),
    ],
    vec![
      external(40, "Adams", "Ann", "2004-05-05", "F"),
      external(41, "Baker", "Bob", "2003-06-06", "M"),
    ],
  )
  .await;
  s.set_coach(RosterKey::new("Adams", "Ann"), true).await.unwrap();

  let mut console = ScriptedConsole::new(Vec::<String>::new());
  let report = reconcile::run(&s, &mut console).await.unwrap();

  // Only Baker was eligible.
  assert_eq!(report.auto_linked, 1);
  assert_eq!(linked_id(&s, "Adams", "Ann").await, None);
  assert_eq!(linked_id(&s, "Baker", "Bob").await, Some(41));
}

// ─── Coach review ────────────────────────────────────────────────────────────

#[tokio::test]
async fn coach_review_applies_answers_and_stops_on_done() {
  // Inserted out of name order: the review must still walk Adams, Baker,
  // Cole, Dunn so the scripted answers land on the right people.
  let s = store_with(
    vec![
      local("Dunn", "Eve", "2001-08-08", "F"),
      local("Baker", "Bob", "2003-06-06", "M"),
      local("Adams", "Ann", "2004-05-05", "F"),
      local("Cole", "Cat", "2002-07-07", "F"),
    ],
    vec![],
  )
  .await;

  // Y for Adams, garbage then N for Baker, skip Cole, done before Dunn.
  let mut console = ScriptedConsole::new(["Y", "huh", "n", "S", "D"]);
  let report = coaches::review(&s, &mut console).await.unwrap();

  assert_eq!(report.updated, 2);
  assert_eq!(report.skipped, 1);
  assert!(report.quit_early);

  let announced: Vec<&String> = console
    .transcript
    .iter()
    .filter(|l| l.starts_with("Is "))
    .collect();
  assert_eq!(announced.len(), 4); // Baker is announced once despite "huh"
  assert!(announced[0].starts_with("Is Ann Adams"));
  assert!(announced[1].starts_with("Is Bob Baker"));
  assert!(announced[2].starts_with("Is Cat Cole"));
  assert!(announced[3].starts_with("Is Eve Dunn"));

  let all = s.list_local(LocalFilter::default(), true).await.unwrap();
  let flag = |last: &str| all.iter().find(|r| r.last == last).unwrap().is_coach;
  assert!(flag("Adams"));
  assert!(!flag("Baker"));
  assert!(!flag("Cole"));
  assert!(!flag("Dunn"));
}
