//! Shared row types returned by the store and consumed by the formatter.
//!
//! Dates are kept as the stored `yyyy-mm-dd` strings. Filtering compares
//! them lexicographically, which matches chronological order only because
//! the dataset is zero-padded; nothing here parses them into typed dates.

// ---------------------------------------------------------------------------
// Defaults for the fixed query shapes
// ---------------------------------------------------------------------------

/// Measurements strictly after this date make up the "last year" window.
pub const DEFAULT_CUTOFF_DATE: &str = "2016-08-23";

/// Station whose observations are served by the tobs route.
pub const DEFAULT_STATION_ID: &str = "USC00519281";

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// One `(date, prcp)` row from `measurement`.
#[derive(Debug, Clone, PartialEq)]
pub struct Precipitation {
    pub date: String,
    /// Missing readings are stored as NULL and passed through unchanged.
    pub prcp: Option<f64>,
}

/// One row from `station`.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub station_id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
}

/// One `(date, tobs)` row from `measurement`.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub date: String,
    pub tobs: f64,
}

/// Result row of the aggregate temperature query.
///
/// `tobs` is the observation of the earliest matching measurement; `min`,
/// `avg` and `max` cover every matching measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureStats {
    pub tobs: Option<f64>,
    pub min: Option<f64>,
    pub avg: Option<f64>,
    pub max: Option<f64>,
}
