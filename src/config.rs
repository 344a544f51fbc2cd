//! Runtime configuration read from `STOCKGPT_*` environment variables.

use crate::domain::error::DomainError;
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    Csv,
    Sqlite,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(format!("Unknown storage backend '{other}' (expected csv or sqlite)")),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DictionaryRow {
    id: String,
    name: String,
    active: String,
}

/// Active indicator ids and their display names, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorDictionary {
    entries: Vec<(String, String)>,
}

impl IndicatorDictionary {
    pub fn from_path(path: &Path) -> Result<Self, DomainError> {
        let file = std::fs::File::open(path).map_err(|e| {
            DomainError::Config(format!("Cannot open indicator dictionary {}: {e}", path.display()))
        })?;
        Self::from_reader(file)
            .map_err(|e| DomainError::Config(format!("{}: {e}", path.display())))
    }

    /// Parses `id,name,active` rows; only rows with a truthy `active` are kept.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DomainError> {
        let mut reader = csv::Reader::from_reader(reader);
        let headers = reader.headers()?.clone();
        for column in ["id", "name", "active"] {
            if !headers.iter().any(|h| h.trim() == column) {
                return Err(DomainError::Config(format!(
                    "Indicator dictionary lacks the '{column}' column (expected id,name,active)"
                )));
            }
        }

        let mut entries = Vec::new();
        for row in reader.deserialize::<DictionaryRow>() {
            let row = row.map_err(|e| DomainError::Config(format!("Malformed dictionary row: {e}")))?;
            if is_truthy(&row.active) {
                entries.push((row.id.trim().to_string(), row.name.trim().to_string()));
            }
        }
        Ok(Self { entries })
    }

    pub fn ids(&self) -> Vec<String> {
        self.entries.iter().map(|(id, _)| id.clone()).collect()
    }

    /// Display name of `id`; unknown ids name themselves.
    pub fn name_of<'a>(&'a self, id: &'a str) -> &'a str {
        self.entries
            .iter()
            .find(|(known, _)| known == id)
            .map(|(_, name)| name.as_str())
            .unwrap_or(id)
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "1" | "yes" | "y"
    )
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub fred_api_key: String,
    pub news_api_key: String,
    pub data_base_dir: PathBuf,
    pub storage: StorageBackend,
    pub db_path: PathBuf,
    pub default_market_indicators: Vec<String>,
    pub default_stock_indicators: Vec<String>,
    pub market_indicator_names: IndicatorDictionary,
    pub stock_indicator_names: IndicatorDictionary,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Builds and validates the configuration from `lookup`, which resolves a
    /// variable name such as `STOCKGPT_FRED_API_KEY` to its value.
    pub fn from_vars<F>(lookup: F) -> Result<Self, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let fred_api_key = var("STOCKGPT_FRED_API_KEY").ok_or_else(|| {
            DomainError::Config(
                "No FRED API key given (use the environment variable STOCKGPT_FRED_API_KEY)".into(),
            )
        })?;
        let news_api_key = var("STOCKGPT_NEWS_API_KEY").ok_or_else(|| {
            DomainError::Config(
                "No News API key given (use the environment variable STOCKGPT_NEWS_API_KEY)".into(),
            )
        })?;

        let data_base_dir = PathBuf::from(var("STOCKGPT_DATA_BASE_DIR").unwrap_or_else(|| "./data".into()));
        let storage = match var("STOCKGPT_STORAGE") {
            Some(s) => s.parse().map_err(DomainError::Config)?,
            None => StorageBackend::default(),
        };
        let db_path = var("STOCKGPT_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_base_dir.join("stockgpt.db"));

        let mut config = Self {
            fred_api_key,
            news_api_key,
            data_base_dir,
            storage,
            db_path,
            default_market_indicators: Vec::new(),
            default_stock_indicators: Vec::new(),
            market_indicator_names: IndicatorDictionary::default(),
            stock_indicator_names: IndicatorDictionary::default(),
        };
        config.check_paths()?;

        config.market_indicator_names =
            IndicatorDictionary::from_path(&config.market_indicator_dictionary_file())?;
        config.stock_indicator_names =
            IndicatorDictionary::from_path(&config.stock_indicator_dictionary_file())?;

        config.default_market_indicators = match var("STOCKGPT_DEFAULT_MARKET_INDICATORS") {
            Some(list) => split_list(&list),
            None => config.market_indicator_names.ids(),
        };
        if config.default_market_indicators.is_empty() {
            return Err(DomainError::Config("No default market indicators given".into()));
        }
        config.default_stock_indicators = match var("STOCKGPT_DEFAULT_STOCK_INDICATORS") {
            Some(list) => split_list(&list),
            None => config.stock_indicator_names.ids(),
        };

        Ok(config)
    }

    fn check_paths(&self) -> Result<(), DomainError> {
        let mut required = vec![
            ("Data base dir", self.data_base_dir.clone()),
            ("Market indicator dictionary file", self.market_indicator_dictionary_file()),
            ("Stock indicator dictionary file", self.stock_indicator_dictionary_file()),
        ];
        if self.storage == StorageBackend::Csv {
            required.extend([
                ("Stock value base dir", self.stock_value_dir()),
                ("Market indicator base dir", self.market_indicator_dir()),
                ("Stock indicators base dir", self.stock_indicator_dir()),
                ("News article base dir", self.news_article_dir()),
            ]);
        }
        for (label, path) in required {
            if !path.exists() {
                return Err(DomainError::Config(format!(
                    "{label} {} does not exist",
                    path.display()
                )));
            }
        }
        Ok(())
    }

    fn stock_data_dir(&self) -> PathBuf {
        self.data_base_dir.join("stock_data")
    }

    pub fn stock_value_dir(&self) -> PathBuf {
        self.stock_data_dir().join("stock_values")
    }

    pub fn market_indicator_dir(&self) -> PathBuf {
        self.stock_data_dir().join("market_indicators")
    }

    pub fn stock_indicator_dir(&self) -> PathBuf {
        self.stock_data_dir().join("stock_indicators")
    }

    pub fn news_article_dir(&self) -> PathBuf {
        self.stock_data_dir().join("news_articles")
    }

    pub fn market_indicator_dictionary_file(&self) -> PathBuf {
        self.data_base_dir.join("defaults").join("market_indicators.csv")
    }

    pub fn stock_indicator_dictionary_file(&self) -> PathBuf {
        self.data_base_dir.join("defaults").join("stock_indicators.csv")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;

    fn data_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for sub in ["stock_values", "market_indicators", "stock_indicators", "news_articles"] {
            fs::create_dir_all(dir.path().join("stock_data").join(sub)).unwrap();
        }
        fs::create_dir_all(dir.path().join("defaults")).unwrap();
        fs::write(
            dir.path().join("defaults/market_indicators.csv"),
            "id,name,active\nUNRATE,Unemployment Rate,True\nGDP,Gross Domestic Product,False\nDGS10,10-Year Treasury,True\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("defaults/stock_indicators.csv"),
            "id,name,active\nRSI,Relative Strength Index,True\nOBV,On-Balance Volume,True\n",
        )
        .unwrap();
        dir
    }

    fn vars(dir: &Path, extra: &[(&str, &str)]) -> HashMap<String, String> {
        let mut vars: HashMap<String, String> = [
            ("STOCKGPT_FRED_API_KEY", "fred"),
            ("STOCKGPT_NEWS_API_KEY", "news"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        vars.insert(
            "STOCKGPT_DATA_BASE_DIR".into(),
            dir.to_string_lossy().into_owned(),
        );
        for (k, v) in extra {
            vars.insert(k.to_string(), v.to_string());
        }
        vars
    }

    fn load(vars: &HashMap<String, String>) -> Result<AppConfig, DomainError> {
        AppConfig::from_vars(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults_from_dictionaries() {
        let dir = data_dir();
        let config = load(&vars(dir.path(), &[])).unwrap();

        assert_eq!(config.storage, StorageBackend::Csv);
        assert_eq!(config.default_market_indicators, vec!["UNRATE", "DGS10"]);
        assert_eq!(config.default_stock_indicators, vec!["RSI", "OBV"]);
        assert_eq!(config.market_indicator_names.name_of("UNRATE"), "Unemployment Rate");
        assert_eq!(config.market_indicator_names.name_of("GDP"), "GDP");
        assert_eq!(config.db_path, dir.path().join("stockgpt.db"));
    }

    #[test]
    fn test_comma_lists_override_dictionaries() {
        let dir = data_dir();
        let config = load(&vars(
            dir.path(),
            &[
                ("STOCKGPT_DEFAULT_MARKET_INDICATORS", "T10Y2Y, VIXCLS"),
                ("STOCKGPT_DEFAULT_STOCK_INDICATORS", "SMA50"),
            ],
        ))
        .unwrap();
        assert_eq!(config.default_market_indicators, vec!["T10Y2Y", "VIXCLS"]);
        assert_eq!(config.default_stock_indicators, vec!["SMA50"]);
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let dir = data_dir();
        let mut vars = vars(dir.path(), &[]);
        vars.remove("STOCKGPT_NEWS_API_KEY");
        let err = load(&vars).unwrap_err();
        assert!(matches!(err, DomainError::Config(msg) if msg.contains("STOCKGPT_NEWS_API_KEY")));
    }

    #[test]
    fn test_missing_directory_is_config_error() {
        let dir = data_dir();
        fs::remove_dir(dir.path().join("stock_data/news_articles")).unwrap();
        assert!(matches!(load(&vars(dir.path(), &[])), Err(DomainError::Config(_))));

        // the sqlite backend does not need the per-collection directories
        let config = load(&vars(dir.path(), &[("STOCKGPT_STORAGE", "sqlite")])).unwrap();
        assert_eq!(config.storage, StorageBackend::Sqlite);
    }

    #[test]
    fn test_no_market_indicators_is_config_error() {
        let dir = data_dir();
        fs::write(dir.path().join("defaults/market_indicators.csv"), "id,name,active\n").unwrap();
        assert!(matches!(load(&vars(dir.path(), &[])), Err(DomainError::Config(_))));
    }

    #[test]
    fn test_dictionary_requires_columns() {
        let err = IndicatorDictionary::from_reader("id,label\nX,Y\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DomainError::Config(_)));
    }
}
