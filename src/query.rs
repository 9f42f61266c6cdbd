/// Query layer: one read-only operation per API route.
///
/// Holds the fixed parameters of the trailing-window routes and forwards
/// each call to a per-request [`Session`]. Nothing here caches or retries;
/// a store failure comes straight back to the caller.

use crate::model::{
    DEFAULT_CUTOFF_DATE, DEFAULT_STATION_ID, Observation, Precipitation, Station,
    TemperatureStats,
};
use crate::store::{Session, StoreError};

#[derive(Debug, Clone)]
pub struct QueryLayer {
    cutoff_date: String,
    station_id: String,
}

impl Default for QueryLayer {
    fn default() -> Self {
        Self::new(DEFAULT_CUTOFF_DATE, DEFAULT_STATION_ID)
    }
}

impl QueryLayer {
    pub fn new(cutoff_date: impl Into<String>, station_id: impl Into<String>) -> Self {
        Self {
            cutoff_date: cutoff_date.into(),
            station_id: station_id.into(),
        }
    }

    pub fn cutoff_date(&self) -> &str {
        &self.cutoff_date
    }

    pub fn station_id(&self) -> &str {
        &self.station_id
    }

    /// All precipitation rows after the cutoff, ascending by date.
    pub fn fetch_precipitation(
        &self,
        session: &mut dyn Session,
    ) -> Result<Vec<Precipitation>, StoreError> {
        let rows = session.precipitation_since(&self.cutoff_date)?;
        log::debug!("fetch_precipitation returned {} rows", rows.len());
        Ok(rows)
    }

    /// Every station row.
    pub fn fetch_stations(&self, session: &mut dyn Session) -> Result<Vec<Station>, StoreError> {
        let rows = session.stations()?;
        log::debug!("fetch_stations returned {} rows", rows.len());
        Ok(rows)
    }

    /// Observations for the configured station after the cutoff.
    pub fn fetch_recent_observations(
        &self,
        session: &mut dyn Session,
    ) -> Result<Vec<Observation>, StoreError> {
        let rows = session.observations_since(&self.station_id, &self.cutoff_date)?;
        log::debug!(
            "fetch_recent_observations({}) returned {} rows",
            self.station_id,
            rows.len()
        );
        Ok(rows)
    }

    /// Temperature stats for `date >= start`. `start` is not validated.
    pub fn fetch_stats_from(
        &self,
        session: &mut dyn Session,
        start: &str,
    ) -> Result<Vec<TemperatureStats>, StoreError> {
        let rows = session.temperature_stats(start, None)?;
        log::debug!("fetch_stats_from({}) returned {} rows", start, rows.len());
        Ok(rows)
    }

    /// Temperature stats for `start <= date <= end`. Neither bound is validated.
    pub fn fetch_stats_range(
        &self,
        session: &mut dyn Session,
        start: &str,
        end: &str,
    ) -> Result<Vec<TemperatureStats>, StoreError> {
        let rows = session.temperature_stats(start, Some(end))?;
        log::debug!(
            "fetch_stats_range({}, {}) returned {} rows",
            start,
            end,
            rows.len()
        );
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use crate::store::fixtures;

    #[test]
    fn test_precipitation_only_after_cutoff_and_sorted() {
        let fixture = fixtures::seeded_store();
        let mut session = fixture.store.open().unwrap();

        let rows = QueryLayer::default().fetch_precipitation(session.as_mut()).unwrap();

        assert_eq!(rows.len(), 6);
        assert!(rows.iter().all(|r| r.date.as_str() > "2016-08-23"));
        assert!(rows.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn test_precipitation_keeps_duplicate_dates() {
        let fixture = fixtures::seeded_store();
        let mut session = fixture.store.open().unwrap();

        let rows = QueryLayer::default().fetch_precipitation(session.as_mut()).unwrap();
        let same_day = rows.iter().filter(|r| r.date == "2016-08-24").count();
        assert_eq!(same_day, 3, "No dedup across stations");
    }

    #[test]
    fn test_recent_observations_only_for_station() {
        let fixture = fixtures::seeded_store();
        let mut session = fixture.store.open().unwrap();

        let rows = QueryLayer::default()
            .fetch_recent_observations(session.as_mut())
            .unwrap();

        let dates: Vec<&str> = rows.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2016-08-24", "2016-08-25", "2017-01-01"]);
        assert_eq!(rows[2].tobs, 70.0);
    }

    #[test]
    fn test_configured_station_and_cutoff_are_used() {
        let fixture = fixtures::seeded_store();
        let mut session = fixture.store.open().unwrap();
        let layer = QueryLayer::new("2016-12-31", "USC00519397");

        let rows = layer.fetch_recent_observations(session.as_mut()).unwrap();
        assert_eq!(
            rows,
            vec![Observation { date: "2017-01-01".to_string(), tobs: 62.0 }]
        );
    }

    #[test]
    fn test_stations_every_row() {
        let fixture = fixtures::seeded_store();
        let mut session = fixture.store.open().unwrap();

        let rows = QueryLayer::default().fetch_stations(session.as_mut()).unwrap();
        assert_eq!(rows.len(), fixtures::STATIONS.len());
        assert!(rows.iter().any(|s| s.station_id == "USC00519281" && s.elevation == 32.9));
    }

    #[test]
    fn test_stats_from_three_day_seed() {
        let fixture = fixtures::store_with(
            &[
                ("USC00519281", "2017-01-01", None, 10.0),
                ("USC00519281", "2017-01-02", None, 20.0),
                ("USC00519281", "2017-01-03", None, 30.0),
            ],
            &[],
        );
        let mut session = fixture.store.open().unwrap();

        let rows = QueryLayer::default()
            .fetch_stats_from(session.as_mut(), "2017-01-02")
            .unwrap();

        assert_eq!(
            rows,
            vec![TemperatureStats {
                tobs: Some(20.0),
                min: Some(20.0),
                avg: Some(25.0),
                max: Some(30.0),
            }]
        );
    }

    #[test]
    fn test_stats_range_is_inclusive() {
        let fixture = fixtures::store_with(
            &[
                ("USC00519281", "2017-01-01", None, 10.0),
                ("USC00519281", "2017-01-02", None, 20.0),
                ("USC00519281", "2017-01-03", None, 30.0),
            ],
            &[],
        );
        let mut session = fixture.store.open().unwrap();

        let rows = QueryLayer::default()
            .fetch_stats_range(session.as_mut(), "2017-01-01", "2017-01-02")
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].tobs, Some(10.0));
        assert_eq!(rows[0].min, Some(10.0));
        assert_eq!(rows[0].avg, Some(15.0));
        assert_eq!(rows[0].max, Some(20.0));
    }

    #[test]
    fn test_stats_range_never_exceeds_stats_from() {
        let fixture = fixtures::seeded_store();
        let mut session = fixture.store.open().unwrap();
        let layer = QueryLayer::default();

        let bounds = [
            ("2015-01-01", "2015-12-31"),
            ("2016-08-24", "2016-08-24"),
            ("2016-08-24", "2017-12-31"),
            ("2018-01-01", "2019-01-01"),
        ];
        for (start, end) in bounds {
            let from = layer.fetch_stats_from(session.as_mut(), start).unwrap();
            let range = layer.fetch_stats_range(session.as_mut(), start, end).unwrap();
            assert!(range.len() <= from.len(), "{}..{}", start, end);
        }
    }

    #[test]
    fn test_malformed_date_is_not_an_error() {
        let fixture = fixtures::seeded_store();
        let mut session = fixture.store.open().unwrap();

        // "z" sorts after every digit, so nothing matches
        let rows = QueryLayer::default()
            .fetch_stats_from(session.as_mut(), "zzzz")
            .unwrap();
        assert!(rows.is_empty());
    }
}
