use super::{has_key, list_keys, parse_date, register_key};
use crate::domain::entities::indicator_table::IndicatorTable;
use crate::domain::error::DomainError;
use crate::domain::ports::repository::Repository;
use rusqlite::{params, Connection};
use std::collections::BTreeSet;
use std::sync::Mutex;

const COLLECTION: &str = "stock_indicators";

/// Stores the table in long form, one row per (date, indicator) cell. Column
/// order is recovered from insertion order.
pub struct SqliteStockIndicatorRepo {
    conn: Mutex<Connection>,
}

impl SqliteStockIndicatorRepo {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

impl Repository<IndicatorTable> for SqliteStockIndicatorRepo {
    fn list_keys(&self) -> Result<BTreeSet<String>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        list_keys(&conn, COLLECTION)
    }

    fn get(&self, key: &str) -> Result<Option<IndicatorTable>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        if !has_key(&conn, COLLECTION, key)? {
            return Ok(None);
        }

        let mut table = IndicatorTable::new();
        let mut columns = conn.prepare(
            "SELECT indicator FROM stock_indicators WHERE symbol = ?1
             GROUP BY indicator ORDER BY MIN(rowid)",
        )?;
        table.columns = columns
            .query_map(params![key], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut cells = conn.prepare(
            "SELECT date, indicator, value FROM stock_indicators WHERE symbol = ?1 ORDER BY date",
        )?;
        let rows = cells
            .query_map(params![key], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<f64>>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        for (date, indicator, value) in rows {
            table.set(parse_date(&date)?, &indicator, value);
        }
        Ok(Some(table))
    }

    fn store(&self, key: &str, value: &IndicatorTable) -> Result<(), DomainError> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        let tx = conn.transaction()?;
        register_key(&tx, COLLECTION, key)?;
        for (date, row) in &value.rows {
            let date = date.format("%Y-%m-%d").to_string();
            for indicator in &value.columns {
                let Some(cell) = row.get(indicator) else {
                    continue;
                };
                tx.execute(
                    "INSERT INTO stock_indicators (symbol, date, indicator, value) VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(symbol, date, indicator) DO UPDATE SET value = excluded.value",
                    params![key, date, indicator, cell],
                )
                .map_err(|e| DomainError::Storage(format!("Failed to store indicator cell: {e}")))?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}
