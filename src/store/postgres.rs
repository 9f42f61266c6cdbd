/// PostgreSQL-backed store.
///
/// Every session is its own connection, switched to read-only mode and
/// given a statement timeout before any query runs.

use super::schema;
use super::schema::TableDef;
use super::{Session, Store, StoreError, probe_sql, stats_rows};
use crate::model::{Observation, Precipitation, Station, TemperatureStats};
use postgres::{Client, Config, NoTls};
use std::time::Duration;

pub struct PostgresStore {
    config: Config,
    query_timeout: Duration,
}

impl PostgresStore {
    /// Build a store from a `postgres://` URL. Nothing connects until
    /// the first session is opened.
    pub fn new(url: &str, query_timeout: Duration) -> Result<Self, StoreError> {
        let mut config: Config = url.parse()?;
        config.connect_timeout(query_timeout);
        Ok(Self {
            config,
            query_timeout,
        })
    }
}

impl Store for PostgresStore {
    fn open(&self) -> Result<Box<dyn Session>, StoreError> {
        let mut client = self.config.connect(NoTls)?;
        client.batch_execute(&format!(
            "SET statement_timeout = {}; SET default_transaction_read_only = on",
            self.query_timeout.as_millis()
        ))?;
        Ok(Box::new(PostgresSession { client }))
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

pub struct PostgresSession {
    client: Client,
}

impl PostgresSession {
    fn aggregate(
        &mut self,
        sql: &str,
        params: &[&(dyn postgres::types::ToSql + Sync)],
    ) -> Result<Vec<TemperatureStats>, StoreError> {
        let row = self.client.query_one(sql, params)?;
        Ok(stats_rows(
            row.try_get(0)?,
            row.try_get(1)?,
            row.try_get(2)?,
            row.try_get(3)?,
            row.try_get(4)?,
        ))
    }
}

impl Session for PostgresSession {
    fn probe_table(&mut self, table: &TableDef) -> Result<(), StoreError> {
        self.client.query(probe_sql(table).as_str(), &[])?;
        Ok(())
    }

    fn precipitation_since(&mut self, cutoff: &str) -> Result<Vec<Precipitation>, StoreError> {
        let rows = self.client.query(schema::PRECIPITATION_SINCE, &[&cutoff])?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(Precipitation {
                date: row.try_get(0)?,
                prcp: row.try_get(1)?,
            });
        }
        Ok(out)
    }

    fn stations(&mut self) -> Result<Vec<Station>, StoreError> {
        let rows = self.client.query(schema::ALL_STATIONS, &[])?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(Station {
                station_id: row.try_get(0)?,
                name: row.try_get(1)?,
                latitude: row.try_get(2)?,
                longitude: row.try_get(3)?,
                elevation: row.try_get(4)?,
            });
        }
        Ok(out)
    }

    fn observations_since(
        &mut self,
        station_id: &str,
        cutoff: &str,
    ) -> Result<Vec<Observation>, StoreError> {
        let rows = self
            .client
            .query(schema::OBSERVATIONS_SINCE, &[&station_id, &cutoff])?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(Observation {
                date: row.try_get(0)?,
                tobs: row.try_get(1)?,
            });
        }
        Ok(out)
    }

    fn temperature_stats(
        &mut self,
        start: &str,
        end: Option<&str>,
    ) -> Result<Vec<TemperatureStats>, StoreError> {
        match end {
            Some(end) => self.aggregate(schema::STATS_RANGE, &[&start, &end]),
            None => self.aggregate(schema::STATS_FROM, &[&start]),
        }
    }
}
