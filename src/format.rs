/// Response formatter: shapes query rows into each route's JSON body.
///
/// - precipitation → `[{"date", "prcp"}, ...]`
/// - stations      → `[{"station", "name", "lat", "lon", "elev"}, ...]`
/// - tobs          → `[date, tobs, date, tobs, ...]`
/// - stats         → `[tobs, min, avg, max, ...]`
///
/// Row order is preserved and no row is dropped or filtered.

use crate::model::{Observation, Precipitation, Station, TemperatureStats};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Response Types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PrecipitationEntry {
    pub date: String,
    pub prcp: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct StationEntry {
    pub station: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub elev: f64,
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

pub fn precipitation(rows: &[Precipitation]) -> Vec<PrecipitationEntry> {
    rows.iter()
        .map(|r| PrecipitationEntry {
            date: r.date.clone(),
            prcp: r.prcp,
        })
        .collect()
}

pub fn stations(rows: &[Station]) -> Vec<StationEntry> {
    rows.iter()
        .map(|s| StationEntry {
            station: s.station_id.clone(),
            name: s.name.clone(),
            lat: s.latitude,
            lon: s.longitude,
            elev: s.elevation,
        })
        .collect()
}

/// Row-major flattening of `(date, tobs)` pairs.
pub fn observations(rows: &[Observation]) -> Vec<Value> {
    rows.iter()
        .flat_map(|r| [Value::from(r.date.as_str()), Value::from(r.tobs)])
        .collect()
}

/// Row-major flattening of `(tobs, min, avg, max)`; NULLs stay `null`.
pub fn temperature_stats(rows: &[TemperatureStats]) -> Vec<Value> {
    rows.iter()
        .flat_map(|r| [r.tobs, r.min, r.avg, r.max])
        .map(|v| v.map_or(Value::Null, Value::from))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
