use super::{has_key, list_keys, parse_date, register_key};
use crate::domain::entities::price_series::{PriceBar, PriceSeries};
use crate::domain::error::DomainError;
use crate::domain::ports::repository::Repository;
use rusqlite::{params, Connection};
use std::collections::BTreeSet;
use std::sync::Mutex;

const COLLECTION: &str = "prices";

pub struct SqlitePriceRepo {
    conn: Mutex<Connection>,
}

impl SqlitePriceRepo {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

impl Repository<PriceSeries> for SqlitePriceRepo {
    fn list_keys(&self) -> Result<BTreeSet<String>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        list_keys(&conn, COLLECTION)
    }

    fn get(&self, key: &str) -> Result<Option<PriceSeries>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        if !has_key(&conn, COLLECTION, key)? {
            return Ok(None);
        }

        let mut stmt = conn.prepare(
            "SELECT date, open, high, low, close, volume FROM prices WHERE symbol = ?1 ORDER BY date",
        )?;
        let rows = stmt
            .query_map(params![key], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    PriceBar::new(row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?, row.get(5)?),
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut series = PriceSeries::new(key);
        for (date, bar) in rows {
            series.bars.insert(parse_date(&date)?, bar);
        }
        Ok(Some(series))
    }

    fn store(&self, key: &str, value: &PriceSeries) -> Result<(), DomainError> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        let tx = conn.transaction()?;
        register_key(&tx, COLLECTION, key)?;
        for (date, bar) in &value.bars {
            tx.execute(
                "INSERT INTO prices (symbol, date, open, high, low, close, volume)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(symbol, date) DO UPDATE SET
                    open = excluded.open, high = excluded.high, low = excluded.low,
                    close = excluded.close, volume = excluded.volume",
                params![
                    key,
                    date.format("%Y-%m-%d").to_string(),
                    bar.open,
                    bar.high,
                    bar.low,
                    bar.close,
                    bar.volume,
                ],
            )
            .map_err(|e| DomainError::Storage(format!("Failed to store price bar: {e}")))?;
        }
        tx.commit()?;
        Ok(())
    }
}
