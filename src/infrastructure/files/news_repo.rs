use super::{csv_keys, existing_dir, file_for};
use crate::domain::entities::news_item::{merge_by_url, NewsItem};
use crate::domain::error::DomainError;
use crate::domain::ports::repository::Repository;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Serialize, Deserialize)]
struct NewsRow {
    title: String,
    source: String,
    published_at: DateTime<Utc>,
    url: String,
    summary: Option<String>,
}

impl From<NewsRow> for NewsItem {
    fn from(row: NewsRow) -> Self {
        NewsItem {
            title: row.title,
            source: row.source,
            published_at: row.published_at,
            url: row.url,
            summary: row.summary.filter(|s| !s.is_empty()),
        }
    }
}

impl From<&NewsItem> for NewsRow {
    fn from(item: &NewsItem) -> Self {
        NewsRow {
            title: item.title.clone(),
            source: item.source.clone(),
            published_at: item.published_at,
            url: item.url.clone(),
            summary: item.summary.clone(),
        }
    }
}

/// `title,source,published_at,url,summary`, ordered by publication time.
pub struct CsvNewsRepo {
    base_path: PathBuf,
}

impl CsvNewsRepo {
    pub fn new(base_path: &Path) -> Result<Self, DomainError> {
        Ok(Self {
            base_path: existing_dir(base_path)?,
        })
    }

    fn read(path: &Path) -> Result<Vec<NewsItem>, DomainError> {
        let mut reader = csv::Reader::from_path(path)?;
        reader
            .deserialize::<NewsRow>()
            .map(|row| row.map(NewsItem::from).map_err(DomainError::from))
            .collect()
    }
}

impl Repository<Vec<NewsItem>> for CsvNewsRepo {
    fn list_keys(&self) -> Result<BTreeSet<String>, DomainError> {
        csv_keys(&self.base_path)
    }

    fn get(&self, key: &str) -> Result<Option<Vec<NewsItem>>, DomainError> {
        let path = file_for(&self.base_path, key);
        if !path.exists() {
            return Ok(None);
        }
        Self::read(&path).map(Some)
    }

    fn store(&self, key: &str, value: &Vec<NewsItem>) -> Result<(), DomainError> {
        let path = file_for(&self.base_path, key);
        let existing = if path.exists() {
            info!(symbol = key, "Writing to existing news file");
            Self::read(&path)?
        } else {
            info!(symbol = key, "Creating new news article file");
            Vec::new()
        };
        let merged = merge_by_url(existing, value);

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)?;
        writer.write_record(["title", "source", "published_at", "url", "summary"])?;
        for item in &merged {
            writer.serialize(NewsRow::from(item))?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn item(title: &str, url: &str, day: u32, summary: Option<&str>) -> NewsItem {
        NewsItem {
            title: title.into(),
            source: "Wire".into(),
            published_at: Utc.with_ymd_and_hms(2024, 1, day, 15, 0, 0).unwrap(),
            url: url.into(),
            summary: summary.map(String::from),
        }
    }

    #[test]
    fn test_store_dedupes_by_url() {
        let dir = tempfile::tempdir().unwrap();
        let repo = CsvNewsRepo::new(dir.path()).unwrap();

        repo.store(
            "ACME",
            &vec![
                item("Second", "https://x/2", 3, None),
                item("First, with comma", "https://x/1", 1, Some("Quoted \"text\"")),
            ],
        )
        .unwrap();
        repo.store("ACME", &vec![item("Second (edited)", "https://x/2", 3, None)])
            .unwrap();

        let stored = repo.get("ACME").unwrap().unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].title, "First, with comma");
        assert_eq!(stored[0].summary.as_deref(), Some("Quoted \"text\""));
        assert_eq!(stored[1].title, "Second (edited)");
        assert_eq!(stored[1].summary, None);
    }
}
