use super::{has_key, list_keys, parse_date, register_key};
use crate::domain::entities::indicator_series::IndicatorSeries;
use crate::domain::error::DomainError;
use crate::domain::ports::repository::Repository;
use rusqlite::{params, Connection};
use std::collections::BTreeSet;
use std::sync::Mutex;

const COLLECTION: &str = "market_indicators";

pub struct SqliteMarketIndicatorRepo {
    conn: Mutex<Connection>,
}

impl SqliteMarketIndicatorRepo {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

impl Repository<IndicatorSeries> for SqliteMarketIndicatorRepo {
    fn list_keys(&self) -> Result<BTreeSet<String>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        list_keys(&conn, COLLECTION)
    }

    fn get(&self, key: &str) -> Result<Option<IndicatorSeries>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        if !has_key(&conn, COLLECTION, key)? {
            return Ok(None);
        }

        let mut stmt = conn.prepare(
            "SELECT date, value FROM market_indicators WHERE indicator_id = ?1 ORDER BY date",
        )?;
        let rows = stmt
            .query_map(params![key], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, Option<f64>>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut series = IndicatorSeries::new();
        for (date, value) in rows {
            series.insert(parse_date(&date)?, value);
        }
        Ok(Some(series))
    }

    fn store(&self, key: &str, value: &IndicatorSeries) -> Result<(), DomainError> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        let tx = conn.transaction()?;
        register_key(&tx, COLLECTION, key)?;
        for (date, v) in &value.values {
            tx.execute(
                "INSERT INTO market_indicators (indicator_id, date, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT(indicator_id, date) DO UPDATE SET value = excluded.value",
                params![key, date.format("%Y-%m-%d").to_string(), v],
            )
            .map_err(|e| DomainError::Storage(format!("Failed to store indicator value: {e}")))?;
        }
        tx.commit()?;
        Ok(())
    }
}
