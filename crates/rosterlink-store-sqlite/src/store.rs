//! [`SqliteStore`] — the SQLite implementation of [`RosterStore`].

use std::{collections::HashSet, path::Path};

use chrono::{DateTime, NaiveDate, Utc};

use rosterlink_core::{
  record::{
    ExternalRecord, JointRow, LocalRecord, NewExternalRecord, NewLocalRecord,
    RosterKey,
  },
  store::{LocalFilter, RosterStore},
};

use crate::{
  Error, Result,
  encode::{RawExternal, RawJoint, RawLocal, encode_date, encode_ts},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A roster store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. Every
/// mutating method commits its own transaction; there is no cross-call
/// transaction state.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run one of the single-field registry scans. `column` is a trusted
  /// identifier from the callers below, never user input.
  async fn external_where(
    &self,
    column: &'static str,
    value: String,
  ) -> Result<Vec<ExternalRecord>> {
    let raws: Vec<RawExternal> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT usatf_id, last, first, dob, gender, valid, age_verified, update_time
           FROM usatf WHERE {column} = ?1"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![value], external_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawExternal::into_record).collect()
  }
}

/// Map a full `usatf` row in SELECT column order.
fn external_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawExternal> {
  Ok(RawExternal {
    external_id:  row.get(0)?,
    last:         row.get(1)?,
    first:        row.get(2)?,
    dob:          row.get(3)?,
    gender:       row.get(4)?,
    valid:        row.get(5)?,
    age_verified: row.get(6)?,
    update_time:  row.get(7)?,
  })
}

/// Map a full `roster` row in SELECT column order.
fn local_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawLocal> {
  Ok(RawLocal {
    last:        row.get(0)?,
    first:       row.get(1)?,
    dob:         row.get(2)?,
    gender:      row.get(3)?,
    external_id: row.get(4)?,
    is_coach:    row.get(5)?,
    update_time: row.get(6)?,
  })
}

// ─── RosterStore impl ────────────────────────────────────────────────────────

impl RosterStore for SqliteStore {
  type Error = Error;

  // ── Ingestion writes ──────────────────────────────────────────────────────

  async fn upsert_local(
    &self,
    records: Vec<NewLocalRecord>,
    timestamp: DateTime<Utc>,
  ) -> Result<()> {
    let ts = encode_ts(timestamp);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          // ON CONFLICT DO UPDATE rather than INSERT OR REPLACE: a REPLACE
          // would delete the row and with it any usatf_id link and coach
          // flag already on it.
          let mut stmt = tx.prepare(
            "INSERT INTO roster (last, first, dob, gender, update_time)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (last, first) DO UPDATE SET
               dob         = excluded.dob,
               gender      = excluded.gender,
               update_time = excluded.update_time",
          )?;
          for r in &records {
            stmt.execute(rusqlite::params![
              r.last,
              r.first,
              encode_date(r.dob),
              r.gender,
              ts,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn upsert_external(
    &self,
    records: Vec<NewExternalRecord>,
    timestamp: DateTime<Utc>,
  ) -> Result<()> {
    let ts = encode_ts(timestamp);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO usatf
               (usatf_id, last, first, dob, gender, valid, age_verified, update_time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT (usatf_id) DO UPDATE SET
               last         = excluded.last,
               first        = excluded.first,
               dob          = excluded.dob,
               gender       = excluded.gender,
               valid        = excluded.valid,
               age_verified = excluded.age_verified,
               update_time  = excluded.update_time",
          )?;
          for r in &records {
            stmt.execute(rusqlite::params![
              r.external_id,
              r.last,
              r.first,
              encode_date(r.dob),
              r.gender,
              r.valid_membership,
              r.age_verified,
              ts,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Administrative operations ─────────────────────────────────────────────

  async fn local_missing_from(
    &self,
    fresh_keys: Vec<RosterKey>,
  ) -> Result<Vec<RosterKey>> {
    let fresh: HashSet<RosterKey> = fresh_keys.into_iter().collect();

    let missing: Vec<RosterKey> = self
      .conn
      .call(move |conn| {
        let mut stmt =
          conn.prepare("SELECT last, first FROM roster ORDER BY last, first")?;
        let keys = stmt
          .query_map([], |row| {
            Ok(RosterKey::new(
              row.get::<_, String>(0)?,
              row.get::<_, String>(1)?,
            ))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(keys.into_iter().filter(|k| !fresh.contains(k)).collect())
      })
      .await?;

    Ok(missing)
  }

  async fn delete_local(&self, keys: Vec<RosterKey>) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt =
            tx.prepare("DELETE FROM roster WHERE last = ?1 AND first = ?2")?;
          for key in &keys {
            stmt.execute(rusqlite::params![key.last, key.first])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn clear_links(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute("UPDATE roster SET usatf_id = NULL", [])?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn clear_coach_flags(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute("UPDATE roster SET is_coach = 0", [])?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Single-record mutations ───────────────────────────────────────────────

  async fn set_coach(&self, key: RosterKey, is_coach: bool) -> Result<()> {
    let (last, first) = (key.last.clone(), key.first.clone());

    let affected = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE roster SET is_coach = ?1 WHERE last = ?2 AND first = ?3",
          rusqlite::params![is_coach, last, first],
        )?;
        Ok(n)
      })
      .await?;

    if affected == 0 {
      return Err(rosterlink_core::Error::RecordNotFound(key).into());
    }
    Ok(())
  }

  async fn set_external_id(&self, key: RosterKey, external_id: i64) -> Result<()> {
    let (last, first) = (key.last.clone(), key.first.clone());

    let affected = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE roster SET usatf_id = ?1 WHERE last = ?2 AND first = ?3",
          rusqlite::params![external_id, last, first],
        )?;
        Ok(n)
      })
      .await?;

    if affected == 0 {
      return Err(rosterlink_core::Error::RecordNotFound(key).into());
    }
    Ok(())
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn list_local(
    &self,
    filter: LocalFilter,
    ordered: bool,
  ) -> Result<Vec<LocalRecord>> {
    let raws: Vec<RawLocal> = self
      .conn
      .call(move |conn| {
        let mut conds: Vec<&'static str> = vec![];
        if filter.exclude_coaches {
          conds.push("is_coach = 0");
        }
        if filter.exclude_linked {
          conds.push("usatf_id IS NULL");
        }

        let where_clause = if conds.is_empty() {
          String::new()
        } else {
          format!(" WHERE {}", conds.join(" AND "))
        };
        let order_clause =
          if ordered { " ORDER BY last, first" } else { "" };

        let sql = format!(
          "SELECT last, first, dob, gender, usatf_id, is_coach, update_time
           FROM roster{where_clause}{order_clause}"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], local_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLocal::into_record).collect()
  }

  // ── Match query primitives ────────────────────────────────────────────────

  async fn external_matching_identity(
    &self,
    last: String,
    first: String,
    dob: NaiveDate,
    gender: String,
  ) -> Result<Vec<ExternalRecord>> {
    let dob_str = encode_date(dob);

    let raws: Vec<RawExternal> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT usatf_id, last, first, dob, gender, valid, age_verified, update_time
           FROM usatf
           WHERE last = ?1 AND first = ?2 AND dob = ?3 AND gender = ?4",
        )?;
        let rows = stmt
          .query_map(
            rusqlite::params![last, first, dob_str, gender],
            external_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawExternal::into_record).collect()
  }

  async fn external_with_last(&self, last: String) -> Result<Vec<ExternalRecord>> {
    self.external_where("last", last).await
  }

  async fn external_with_first(&self, first: String) -> Result<Vec<ExternalRecord>> {
    self.external_where("first", first).await
  }

  async fn external_with_dob(&self, dob: NaiveDate) -> Result<Vec<ExternalRecord>> {
    self.external_where("dob", encode_date(dob)).await
  }

  // ── Export projection ─────────────────────────────────────────────────────

  async fn joint_rows(&self) -> Result<Vec<JointRow>> {
    let raws: Vec<RawJoint> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT t.last, t.first, t.dob, u.valid, t.usatf_id, u.age_verified,
                  t.last = u.last, t.first = u.first,
                  t.dob = u.dob, t.gender = u.gender
           FROM roster t
           LEFT JOIN usatf u ON t.usatf_id = u.usatf_id
           WHERE t.is_coach = 0
           ORDER BY t.last, t.first",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawJoint {
              last:         row.get(0)?,
              first:        row.get(1)?,
              dob:          row.get(2)?,
              valid:        row.get(3)?,
              external_id:  row.get(4)?,
              age_verified: row.get(5)?,
              last_match:   row.get(6)?,
              first_match:  row.get(7)?,
              dob_match:    row.get(8)?,
              gender_match: row.get(9)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawJoint::into_row).collect()
  }
}
