use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS repo_keys (
            collection TEXT NOT NULL,
            key TEXT NOT NULL,
            PRIMARY KEY (collection, key)
        );

        CREATE TABLE IF NOT EXISTS prices (
            symbol TEXT NOT NULL,
            date TEXT NOT NULL,
            open REAL,
            high REAL,
            low REAL,
            close REAL,
            volume REAL,
            PRIMARY KEY (symbol, date)
        );

        CREATE TABLE IF NOT EXISTS market_indicators (
            indicator_id TEXT NOT NULL,
            date TEXT NOT NULL,
            value REAL,
            PRIMARY KEY (indicator_id, date)
        );

        CREATE TABLE IF NOT EXISTS stock_indicators (
            symbol TEXT NOT NULL,
            date TEXT NOT NULL,
            indicator TEXT NOT NULL,
            value REAL,
            PRIMARY KEY (symbol, date, indicator)
        );

        CREATE TABLE IF NOT EXISTS news_articles (
            symbol TEXT NOT NULL,
            url TEXT NOT NULL,
            title TEXT NOT NULL,
            source TEXT NOT NULL,
            published_at TEXT NOT NULL,
            summary TEXT,
            PRIMARY KEY (symbol, url)
        );

        CREATE INDEX IF NOT EXISTS idx_news_published ON news_articles(symbol, published_at);
        "
    ).map_err(|e| format!("Migration failed: {e}"))
}
