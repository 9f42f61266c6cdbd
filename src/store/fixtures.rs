/// Test fixtures: small SQLite stores in temp directories.
///
/// Rows are modelled on the Hawaii climate dataset (station ids, names,
/// daily prcp/tobs values). `USC00519281` is the most active station and
/// the one served by the tobs route.

use super::schema::fixture_schema;
use super::Store;
use super::sqlite::SqliteStore;
use rusqlite::{Connection, params};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// `(station, date, prcp, tobs)`
pub(crate) type MeasurementRow = (&'static str, &'static str, Option<f64>, f64);

/// `(station, name, latitude, longitude, elevation)`
pub(crate) type StationRow = (&'static str, &'static str, f64, f64, f64);

pub(crate) const STATIONS: &[StationRow] = &[
    ("USC00519397", "WAIKIKI 717.2, HI US", 21.2716, -157.8168, 3.0),
    ("USC00513117", "KANEOHE 838.1, HI US", 21.4234, -157.8015, 14.6),
    ("USC00519281", "WAIHEE 837.5, HI US", 21.45167, -157.84889, 32.9),
];

pub(crate) const MEASUREMENTS: &[MeasurementRow] = &[
    ("USC00519281", "2015-06-01", Some(0.10), 72.0),
    ("USC00519281", "2016-08-23", Some(1.79), 77.0),
    ("USC00519281", "2016-08-24", Some(2.15), 77.0),
    ("USC00513117", "2016-08-24", None, 76.0),
    ("USC00519397", "2016-08-24", Some(0.08), 79.0),
    ("USC00519281", "2016-08-25", Some(0.06), 80.0),
    ("USC00519397", "2017-01-01", Some(0.00), 62.0),
    ("USC00519281", "2017-01-01", Some(0.03), 70.0),
];

/// A fixture store plus the temp directory that owns its file.
pub(crate) struct FixtureStore {
    _dir: TempDir,
    pub store: Arc<SqliteStore>,
}

impl FixtureStore {
    /// The store as the handle type request handlers receive.
    pub fn handle(&self) -> Arc<dyn Store> {
        self.store.clone()
    }

    /// Writable connection for seeding; the store itself only reads.
    pub fn conn(&self) -> Connection {
        Connection::open(self.store.path()).unwrap()
    }
}

pub(crate) fn store_with(measurements: &[MeasurementRow], stations: &[StationRow]) -> FixtureStore {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("climate.sqlite");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(fixture_schema()).unwrap();
    for (station, date, prcp, tobs) in measurements {
        conn.execute(
            "INSERT INTO measurement (station, date, prcp, tobs) VALUES (?1, ?2, ?3, ?4)",
            params![station, date, prcp, tobs],
        )
        .unwrap();
    }
    for (station, name, latitude, longitude, elevation) in stations {
        conn.execute(
            "INSERT INTO station (station, name, latitude, longitude, elevation)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![station, name, latitude, longitude, elevation],
        )
        .unwrap();
    }
    drop(conn);

    FixtureStore {
        _dir: dir,
        store: Arc::new(SqliteStore::new(path, Duration::from_secs(5))),
    }
}

pub(crate) fn seeded_store() -> FixtureStore {
    store_with(MEASUREMENTS, STATIONS)
}

pub(crate) fn empty_store() -> FixtureStore {
    store_with(&[], &[])
}
