//! SQL schema for the rosterlink SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Dates are ISO 8601 TEXT; timestamps are Unix-epoch INTEGER. Both tables
/// are written exclusively through upsert statements, so the UNIQUE
/// constraints below never surface as errors on the ingestion paths.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- The team's own roster. One row per person, keyed by name.
-- usatf_id is the link to the registry; set only by reconciliation.
CREATE TABLE IF NOT EXISTS roster (
    last        TEXT NOT NULL,
    first       TEXT NOT NULL,
    dob         TEXT NOT NULL,
    gender      TEXT NOT NULL,
    usatf_id    INTEGER DEFAULT NULL,
    is_coach    INTEGER NOT NULL DEFAULT 0,
    update_time INTEGER NOT NULL,
    UNIQUE (last, first)
);

-- The external membership registry, keyed by membership number.
CREATE TABLE IF NOT EXISTS usatf (
    usatf_id     INTEGER UNIQUE NOT NULL,
    last         TEXT NOT NULL,
    first        TEXT NOT NULL,
    dob          TEXT NOT NULL,
    gender       TEXT NOT NULL,
    valid        INTEGER NOT NULL DEFAULT 0,
    age_verified INTEGER NOT NULL DEFAULT 0,
    update_time  INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS usatf_last_idx  ON usatf(last);
CREATE INDEX IF NOT EXISTS usatf_first_idx ON usatf(first);
CREATE INDEX IF NOT EXISTS usatf_dob_idx   ON usatf(dob);

PRAGMA user_version = 1;
";
