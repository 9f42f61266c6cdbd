/// SQLite-backed store for the file-based dataset.
///
/// Files are opened read-only: a wrong path fails instead of silently
/// creating an empty database.
///
/// The query timeout is a deadline on the whole session: once it passes,
/// the progress handler interrupts whatever statement is running and the
/// query fails with `SQLITE_INTERRUPT`.

use super::schema;
use super::schema::TableDef;
use super::{Session, Store, StoreError, probe_sql, stats_rows};
use crate::model::{Observation, Precipitation, Station, TemperatureStats};
use rusqlite::{Connection, OpenFlags, Params};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// VM instructions between deadline checks.
const PROGRESS_INTERVAL: i32 = 1000;

pub struct SqliteStore {
    path: PathBuf,
    query_timeout: Duration,
}

impl SqliteStore {
    pub fn new(path: impl Into<PathBuf>, query_timeout: Duration) -> Self {
        Self {
            path: path.into(),
            query_timeout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Store for SqliteStore {
    fn open(&self) -> Result<Box<dyn Session>, StoreError> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(self.query_timeout)?;

        let deadline = Instant::now() + self.query_timeout;
        conn.progress_handler(PROGRESS_INTERVAL, Some(move || Instant::now() >= deadline));
        Ok(Box::new(SqliteSession { conn }))
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}

pub struct SqliteSession {
    conn: Connection,
}

impl SqliteSession {
    fn aggregate<P: Params>(
        &mut self,
        sql: &str,
        params: P,
    ) -> Result<Vec<TemperatureStats>, StoreError> {
        let (tobs, min, avg, max, count) = self.conn.query_row(sql, params, |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
        })?;
        Ok(stats_rows(tobs, min, avg, max, count))
    }
}

impl Session for SqliteSession {
    fn probe_table(&mut self, table: &TableDef) -> Result<(), StoreError> {
        self.conn.prepare(&probe_sql(table))?;
        Ok(())
    }

    fn precipitation_since(&mut self, cutoff: &str) -> Result<Vec<Precipitation>, StoreError> {
        let mut stmt = self.conn.prepare(schema::PRECIPITATION_SINCE)?;
        let rows = stmt
            .query_map([cutoff], |row| {
                Ok(Precipitation {
                    date: row.get(0)?,
                    prcp: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn stations(&mut self) -> Result<Vec<Station>, StoreError> {
        let mut stmt = self.conn.prepare(schema::ALL_STATIONS)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Station {
                    station_id: row.get(0)?,
                    name: row.get(1)?,
                    latitude: row.get(2)?,
                    longitude: row.get(3)?,
                    elevation: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn observations_since(
        &mut self,
        station_id: &str,
        cutoff: &str,
    ) -> Result<Vec<Observation>, StoreError> {
        let mut stmt = self.conn.prepare(schema::OBSERVATIONS_SINCE)?;
        let rows = stmt
            .query_map([station_id, cutoff], |row| {
                Ok(Observation {
                    date: row.get(0)?,
                    tobs: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn temperature_stats(
        &mut self,
        start: &str,
        end: Option<&str>,
    ) -> Result<Vec<TemperatureStats>, StoreError> {
        match end {
            Some(end) => self.aggregate(schema::STATS_RANGE, [start, end]),
            None => self.aggregate(schema::STATS_FROM, [start]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fixtures;

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("absent.sqlite"), Duration::from_secs(1));
        assert!(store.open().is_err(), "Read-only open must not create a database");
        assert!(!dir.path().join("absent.sqlite").exists());
    }

    #[test]
    fn test_precipitation_keeps_nulls_and_order() {
        let fixture = fixtures::seeded_store();
        let mut session = fixture.store.open().unwrap();

        let rows = session.precipitation_since("2016-08-23").unwrap();
        assert!(rows.iter().all(|r| r.date.as_str() > "2016-08-23"));
        assert!(rows.windows(2).all(|w| w[0].date <= w[1].date));
        assert!(rows.iter().any(|r| r.prcp.is_none()), "NULL prcp should pass through");
    }

    #[test]
    fn test_stations_returns_every_row() {
        let fixture = fixtures::seeded_store();
        let mut session = fixture.store.open().unwrap();

        let stations = session.stations().unwrap();
        assert_eq!(stations.len(), fixtures::STATIONS.len());
    }

    #[test]
    fn test_observations_filter_by_station() {
        let fixture = fixtures::seeded_store();
        let mut session = fixture.store.open().unwrap();

        let rows = session.observations_since("USC00519281", "2016-08-23").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], Observation { date: "2016-08-24".to_string(), tobs: 77.0 });
    }

    #[test]
    fn test_query_past_deadline_is_interrupted() {
        let fixture = fixtures::empty_store();
        let mut conn = fixture.conn();
        let tx = conn.transaction().unwrap();
        {
            let mut insert = tx
                .prepare("INSERT INTO measurement (station, date, prcp, tobs) VALUES (?1, ?2, ?3, ?4)")
                .unwrap();
            for i in 0..400_000u32 {
                let date = format!("2017-{:02}-{:02}", i % 12 + 1, i % 28 + 1);
                insert
                    .execute(rusqlite::params!["USC00519281", date, 0.01, 70.0])
                    .unwrap();
            }
        }
        tx.commit().unwrap();

        let store = SqliteStore::new(fixture.store.path(), Duration::from_millis(1));
        let mut session = store.open().unwrap();
        std::thread::sleep(Duration::from_millis(5));

        let result = session.precipitation_since("2016-08-23");
        assert!(
            matches!(result, Err(StoreError::Sqlite(_))),
            "Query should be interrupted once the timeout passes"
        );
    }

    #[test]
    fn test_query_within_deadline_succeeds() {
        let fixture = fixtures::seeded_store();
        let store = SqliteStore::new(fixture.store.path(), Duration::from_secs(30));
        let mut session = store.open().unwrap();

        assert_eq!(session.precipitation_since("2016-08-23").unwrap().len(), 6);
    }

    #[test]
    fn test_stats_on_empty_store_has_no_rows() {
        let fixture = fixtures::empty_store();
        let mut session = fixture.store.open().unwrap();

        assert!(session.temperature_stats("2010-01-01", None).unwrap().is_empty());
        assert!(session.temperature_stats("2010-01-01", Some("2020-01-01")).unwrap().is_empty());
    }
}
