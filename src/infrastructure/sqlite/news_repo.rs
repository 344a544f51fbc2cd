use super::{has_key, list_keys, register_key};
use crate::domain::entities::news_item::NewsItem;
use crate::domain::error::DomainError;
use crate::domain::ports::repository::Repository;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::collections::BTreeSet;
use std::sync::Mutex;

const COLLECTION: &str = "news_articles";

pub struct SqliteNewsRepo {
    conn: Mutex<Connection>,
}

impl SqliteNewsRepo {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

impl Repository<Vec<NewsItem>> for SqliteNewsRepo {
    fn list_keys(&self) -> Result<BTreeSet<String>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        list_keys(&conn, COLLECTION)
    }

    fn get(&self, key: &str) -> Result<Option<Vec<NewsItem>>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        if !has_key(&conn, COLLECTION, key)? {
            return Ok(None);
        }

        let mut stmt = conn.prepare(
            "SELECT title, source, published_at, url, summary FROM news_articles
             WHERE symbol = ?1 ORDER BY published_at, rowid",
        )?;
        let rows = stmt
            .query_map(params![key], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(title, source, published_at, url, summary)| {
                let published_at = DateTime::parse_from_rfc3339(&published_at)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| {
                        DomainError::Storage(format!("Invalid stored timestamp '{published_at}': {e}"))
                    })?;
                Ok(NewsItem {
                    title,
                    source,
                    published_at,
                    url,
                    summary,
                })
            })
            .collect::<Result<Vec<_>, DomainError>>()
            .map(Some)
    }

    fn store(&self, key: &str, value: &Vec<NewsItem>) -> Result<(), DomainError> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        let tx = conn.transaction()?;
        register_key(&tx, COLLECTION, key)?;
        for item in value {
            tx.execute(
                "INSERT INTO news_articles (symbol, url, title, source, published_at, summary)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(symbol, url) DO UPDATE SET
                    title = excluded.title, source = excluded.source,
                    published_at = excluded.published_at, summary = excluded.summary",
                params![
                    key,
                    item.url,
                    item.title,
                    item.source,
                    item.published_at.to_rfc3339(),
                    item.summary,
                ],
            )
            .map_err(|e| DomainError::Storage(format!("Failed to store news article: {e}")))?;
        }
        tx.commit()?;
        Ok(())
    }
}
