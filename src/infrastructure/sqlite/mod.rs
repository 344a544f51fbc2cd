pub mod market_indicator_repo;
pub mod migrations;
pub mod news_repo;
pub mod price_repo;
pub mod stock_indicator_repo;

use crate::domain::error::DomainError;
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::collections::BTreeSet;

/// Opens `path` (or `:memory:`) in WAL mode with the schema applied.
pub fn open(path: &str) -> Result<Connection, DomainError> {
    let conn = Connection::open(path)
        .map_err(|e| DomainError::Storage(format!("DB error: {e}")))?;
    conn.pragma_update(None, "journal_mode", "WAL")
        .map_err(|e| DomainError::Storage(format!("WAL error: {e}")))?;
    migrations::run_migrations(&conn).map_err(DomainError::Storage)?;
    Ok(conn)
}

pub(crate) fn register_key(conn: &Connection, collection: &str, key: &str) -> Result<(), DomainError> {
    conn.execute(
        "INSERT OR IGNORE INTO repo_keys (collection, key) VALUES (?1, ?2)",
        params![collection, key],
    )?;
    Ok(())
}

pub(crate) fn has_key(conn: &Connection, collection: &str, key: &str) -> Result<bool, DomainError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM repo_keys WHERE collection = ?1 AND key = ?2",
        params![collection, key],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub(crate) fn list_keys(conn: &Connection, collection: &str) -> Result<BTreeSet<String>, DomainError> {
    let mut stmt = conn.prepare("SELECT key FROM repo_keys WHERE collection = ?1")?;
    let keys = stmt
        .query_map(params![collection], |row| row.get::<_, String>(0))?
        .collect::<Result<BTreeSet<_>, _>>()?;
    Ok(keys)
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| DomainError::Storage(format!("Invalid stored date '{s}': {e}")))
}
