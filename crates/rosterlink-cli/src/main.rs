//! `rosterlink` — merge a team roster with membership registry data.
//!
//! # Usage
//!
//! ```
//! rosterlink ingest --roster ts_export.csv --usatf membership.csv
//! rosterlink coaches
//! rosterlink merge
//! rosterlink export registration.xlsx --year 2026
//! ```

mod console;

use std::path::PathBuf;

use anyhow::{Context as _, bail};
use chrono::{Datelike, Utc};
use clap::{Parser, Subcommand};
use rosterlink_core::store::RosterStore;
use rosterlink_engine::{coaches, reconcile};
use rosterlink_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::console::{StdConsole, confirm};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
  name = "rosterlink",
  about = "Merge a team roster with membership registry data"
)]
struct Cli {
  /// Roster database.
  #[arg(
    short = 'd',
    long,
    default_value = "roster.db",
    env = "ROSTERLINK_DB",
    value_name = "FILE"
  )]
  database: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Initialize the database and/or ingest roster data.
  Ingest {
    /// A CSV roster exported from the team site.
    #[arg(short = 'r', long, value_name = "ROSTER_CSV")]
    roster: Option<PathBuf>,

    /// A CSV membership and age-verification export from the registry.
    #[arg(short = 'u', long, value_name = "USATF_CSV")]
    usatf: Option<PathBuf>,

    /// Drop local entries not found in the newly ingested roster file.
    #[arg(short, long)]
    clear: bool,
  },

  /// Review (or clear) coach designations.
  Coaches {
    /// Clear all coach flags and exit.
    #[arg(short, long)]
    clear: bool,
  },

  /// Merge membership data into the roster interactively.
  Merge {
    /// Clear all existing matches and exit.
    #[arg(short, long)]
    clear: bool,
  },

  /// Export the merged roster as a spreadsheet.
  Export {
    /// Name of the exported roster file.
    output: PathBuf,

    /// Year used to compute ages; defaults to the current year.
    #[arg(short, long)]
    year: Option<i32>,
  },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let store = SqliteStore::open(&cli.database)
    .await
    .with_context(|| format!("failed to open database {:?}", cli.database))?;

  match cli.command {
    Command::Ingest { roster, usatf, clear } => {
      ingest(&store, roster, usatf, clear).await
    }
    Command::Coaches { clear } => review_coaches(&store, clear).await,
    Command::Merge { clear } => merge(&store, clear).await,
    Command::Export { output, year } => export(&store, output, year).await,
  }
}

// ─── Subcommands ──────────────────────────────────────────────────────────────

async fn ingest(
  store: &SqliteStore,
  roster: Option<PathBuf>,
  usatf: Option<PathBuf>,
  clear: bool,
) -> anyhow::Result<()> {
  if roster.is_none() && usatf.is_none() {
    bail!("`ingest` requires one or both of --roster or --usatf");
  }

  // One timestamp for the whole session, so records from the same run are
  // distinguishable from earlier ingests.
  let session_ts = Utc::now();

  if let Some(path) = roster {
    println!("Initializing/updating database from file: {}", path.display());
    let records = rosterlink_ingest::read_local_csv(&path)
      .with_context(|| format!("reading roster file {}", path.display()))?;
    let fresh_keys: Vec<_> = records.iter().map(|r| r.key()).collect();

    store.upsert_local(records, session_ts).await?;

    if clear {
      let missing = store.local_missing_from(fresh_keys).await?;
      if !missing.is_empty() {
        println!("Dropping {} record(s) missing from the fresh roster:", missing.len());
        for key in &missing {
          println!("  {key}");
        }
        store.delete_local(missing).await?;
      }
    }
  }

  if let Some(path) = usatf {
    println!("Initializing/updating database from file: {}", path.display());
    let records = rosterlink_ingest::read_external_csv(&path)
      .with_context(|| format!("reading registry file {}", path.display()))?;
    println!("Ingested {} registry record(s)", records.len());
    store.upsert_external(records, session_ts).await?;
  }

  Ok(())
}

async fn review_coaches(store: &SqliteStore, clear: bool) -> anyhow::Result<()> {
  if clear {
    if !confirm("Clear all coach designations?")? {
      println!("Aborted.");
      return Ok(());
    }
    println!("Clearing existing coach designations...");
    store.clear_coach_flags().await?;
    return Ok(());
  }

  let report = coaches::review(store, &mut StdConsole).await?;
  println!(
    "Coach review: {} updated, {} skipped.",
    report.updated, report.skipped
  );
  Ok(())
}

async fn merge(store: &SqliteStore, clear: bool) -> anyhow::Result<()> {
  if clear {
    if !confirm("Clear all existing matches?")? {
      println!("Aborted.");
      return Ok(());
    }
    println!("Clearing existing matches...");
    store.clear_links().await?;
    return Ok(());
  }

  let report = reconcile::run(store, &mut StdConsole).await?;
  println!(
    "Merge: {} auto-linked, {} linked by choice, {} skipped, {} unmatched.",
    report.auto_linked, report.operator_linked, report.skipped, report.unmatched
  );
  if report.quit_early {
    println!("Run ended early; links made so far are saved.");
  }
  Ok(())
}

async fn export(
  store: &SqliteStore,
  output: PathBuf,
  year: Option<i32>,
) -> anyhow::Result<()> {
  let output = ensure_xlsx(output);
  let age_year = year.unwrap_or_else(|| Utc::now().year());

  let rows = store.joint_rows().await?;
  rosterlink_export::write_roster(&output, &rows, age_year)
    .with_context(|| format!("writing {}", output.display()))?;

  println!("Wrote {} row(s) to {}", rows.len(), output.display());
  Ok(())
}

/// Append `.xlsx` when the given name doesn't already end in it.
fn ensure_xlsx(path: PathBuf) -> PathBuf {
  let is_xlsx = path
    .extension()
    .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"));
  if is_xlsx {
    path
  } else {
    let mut name = path.into_os_string();
    name.push(".xlsx");
    PathBuf::from(name)
  }
}
