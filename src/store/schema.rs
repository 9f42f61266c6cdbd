//! Statically declared schema and the SQL run against it.
//!
//! The service never creates or alters tables. The table list is used to
//! check a store at startup; the DDL in [`fixture_schema`] exists only to
//! seed test and demo databases.
//!
//! Every statement uses `$n` placeholders, which PostgreSQL binds
//! positionally and SQLite treats as numbered parameters, so one text
//! serves both backends. Numeric columns are cast to DOUBLE PRECISION so
//! REAL, NUMERIC and INTEGER storage all decode as `f64`.

/// A table this service reads, with the columns it relies on.
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

pub const MEASUREMENT: TableDef = TableDef {
    name: "measurement",
    columns: &["station", "date", "prcp", "tobs"],
};

pub const STATION: TableDef = TableDef {
    name: "station",
    columns: &["station", "name", "latitude", "longitude", "elevation"],
};

/// Tables that must exist before the service starts answering.
pub const REQUIRED_TABLES: &[TableDef] = &[MEASUREMENT, STATION];

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

pub const PRECIPITATION_SINCE: &str = "SELECT date, CAST(prcp AS DOUBLE PRECISION)
     FROM measurement
     WHERE date > $1
     ORDER BY date";

pub const ALL_STATIONS: &str = "SELECT station,
            name,
            CAST(latitude AS DOUBLE PRECISION),
            CAST(longitude AS DOUBLE PRECISION),
            CAST(elevation AS DOUBLE PRECISION)
     FROM station";

pub const OBSERVATIONS_SINCE: &str = "SELECT date, CAST(tobs AS DOUBLE PRECISION)
     FROM measurement
     WHERE station = $1 AND date > $2
     ORDER BY date";

/// Columns: leading tobs, min, avg, max, count.
pub const STATS_FROM: &str = "SELECT
        (SELECT CAST(tobs AS DOUBLE PRECISION) FROM measurement
         WHERE date >= $1
         ORDER BY date, station
         LIMIT 1),
        CAST(MIN(tobs) AS DOUBLE PRECISION),
        CAST(AVG(tobs) AS DOUBLE PRECISION),
        CAST(MAX(tobs) AS DOUBLE PRECISION),
        COUNT(*)
     FROM measurement
     WHERE date >= $1";

/// Columns: leading tobs, min, avg, max, count.
pub const STATS_RANGE: &str = "SELECT
        (SELECT CAST(tobs AS DOUBLE PRECISION) FROM measurement
         WHERE date >= $1 AND date <= $2
         ORDER BY date, station
         LIMIT 1),
        CAST(MIN(tobs) AS DOUBLE PRECISION),
        CAST(AVG(tobs) AS DOUBLE PRECISION),
        CAST(MAX(tobs) AS DOUBLE PRECISION),
        COUNT(*)
     FROM measurement
     WHERE date >= $1 AND date <= $2";

/// DDL matching the declared tables, for seeding fixture databases.
///
/// Mirrors the layout of the published Hawaii climate dataset: an integer
/// surrogate key plus the columns above. Works on SQLite and PostgreSQL.
pub fn fixture_schema() -> &'static str {
    r#"
    CREATE TABLE IF NOT EXISTS measurement (
        id INTEGER PRIMARY KEY,
        station TEXT NOT NULL,
        date TEXT NOT NULL,
        prcp DOUBLE PRECISION,
        tobs DOUBLE PRECISION NOT NULL
    );

    CREATE TABLE IF NOT EXISTS station (
        id INTEGER PRIMARY KEY,
        station TEXT NOT NULL,
        name TEXT NOT NULL,
        latitude DOUBLE PRECISION NOT NULL,
        longitude DOUBLE PRECISION NOT NULL,
        elevation DOUBLE PRECISION NOT NULL
    );
    "#
}
