//! Read-only access to the climate dataset.
//!
//! A [`Store`] is the long-lived handle built once at startup and shared
//! with every request handler. Each request calls [`Store::open`] to get
//! its own [`Session`]; the session is dropped when the handler returns,
//! which closes the underlying connection on every exit path.
//!
//! Two backends implement the seam:
//! - [`postgres::PostgresStore`] for `postgres://` connection strings
//! - [`sqlite::SqliteStore`] for SQLite database files
//!
//! Both run the statements in [`schema`] unchanged.

pub mod postgres;
pub mod schema;
pub mod sqlite;

#[cfg(test)]
pub(crate) mod fixtures;

use crate::model::{Observation, Precipitation, Station, TemperatureStats};
use schema::TableDef;
use thiserror::Error;

/// Failure talking to the store while serving a request.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] ::postgres::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Factory for per-request sessions.
pub trait Store: Send + Sync {
    /// Open a fresh session. The connection lives as long as the session.
    fn open(&self) -> Result<Box<dyn Session>, StoreError>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

/// One connection's worth of read-only queries.
///
/// Date arguments are compared as strings against the stored
/// `yyyy-mm-dd` values and are never validated here.
pub trait Session {
    /// Fail unless `table` exists with every declared column.
    fn probe_table(&mut self, table: &TableDef) -> Result<(), StoreError>;

    /// `(date, prcp)` rows with `date > cutoff`, ascending by date.
    fn precipitation_since(&mut self, cutoff: &str) -> Result<Vec<Precipitation>, StoreError>;

    /// Every station row, in store order.
    fn stations(&mut self) -> Result<Vec<Station>, StoreError>;

    /// `(date, tobs)` rows for one station with `date > cutoff`, ascending by date.
    fn observations_since(
        &mut self,
        station_id: &str,
        cutoff: &str,
    ) -> Result<Vec<Observation>, StoreError>;

    /// Aggregate temperature row for `date >= start` (and `date <= end` when given).
    fn temperature_stats(
        &mut self,
        start: &str,
        end: Option<&str>,
    ) -> Result<Vec<TemperatureStats>, StoreError>;
}

/// Zero-row select over a table's declared columns.
pub(crate) fn probe_sql(table: &TableDef) -> String {
    format!("SELECT {} FROM {} LIMIT 0", table.columns.join(", "), table.name)
}

/// Turn the raw aggregate columns into result rows.
///
/// An aggregate without GROUP BY always yields one row, all NULL when
/// nothing matched. A zero count means no measurements, so no rows.
pub(crate) fn stats_rows(
    tobs: Option<f64>,
    min: Option<f64>,
    avg: Option<f64>,
    max: Option<f64>,
    count: i64,
) -> Vec<TemperatureStats> {
    if count == 0 {
        return Vec::new();
    }
    vec![TemperatureStats { tobs, min, avg, max }]
}
