use crate::domain::market::StockSnapshot;
use crate::domain::ports::PriceProvider;
use anyhow::{Context, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Snapshots stored as `<dir>/<SYMBOL>.json`.
///
/// Doubles as a price provider: the latest close of a symbol's file is its
/// current price, so refreshing the files drives outcome resolution.
#[derive(Debug, Clone)]
pub struct FileSnapshotSource {
    dir: PathBuf,
}

impl FileSnapshotSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.json", symbol))
    }

    pub async fn load(&self, symbol: &str) -> Result<StockSnapshot> {
        let path = self.path_for(symbol);
        let raw = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read snapshot {:?}", path))?;
        parse_snapshot(&raw).with_context(|| format!("Invalid snapshot {:?}", path))
    }

    /// Symbols with a snapshot file, sorted
    pub async fn list_symbols(&self) -> Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .with_context(|| format!("Failed to list snapshot dir {:?}", self.dir))?;

        let mut symbols = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                symbols.push(stem.to_string());
            }
        }
        symbols.sort();
        Ok(symbols)
    }

    /// Every readable snapshot; unreadable files are logged and skipped
    pub async fn load_all(&self) -> Result<Vec<StockSnapshot>> {
        let mut snapshots = Vec::new();
        for symbol in self.list_symbols().await? {
            match self.load(&symbol).await {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(e) => warn!("FileSnapshotSource: skipping {}: {:#}", symbol, e),
            }
        }
        Ok(snapshots)
    }
}

pub fn parse_snapshot(raw: &str) -> Result<StockSnapshot> {
    let snapshot: StockSnapshot = serde_json::from_str(raw)?;
    Ok(snapshot)
}

#[async_trait]
impl PriceProvider for FileSnapshotSource {
    async fn latest_price(&self, symbol: &str) -> Result<Option<Decimal>> {
        if !tokio::fs::try_exists(self.path_for(symbol)).await? {
            debug!("FileSnapshotSource: no snapshot for {}", symbol);
            return Ok(None);
        }
        let snapshot = self.load(symbol).await?;
        Ok(snapshot.last_close().and_then(Decimal::from_f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "symbol": "AAPL",
        "marketData": {
            "prices": [
                {"date": "2024-05-01T00:00:00Z", "open": 170.0, "high": 172.0, "low": 169.0, "close": 171.0, "adjustedClose": 171.0},
                {"date": "2024-05-02T00:00:00Z", "open": 171.0, "high": 174.0, "low": 170.5, "close": 173.5, "adjustedClose": 173.5}
            ],
            "volume": [{"date": "2024-05-02T00:00:00Z", "volume": 1000000}]
        },
        "fundamentals": {"peRatio": 28.5, "eps": 6.1}
    }"#;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("stockcast-{}-{}", name, uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_parse_snapshot() {
        let snapshot = parse_snapshot(SNAPSHOT).unwrap();
        assert_eq!(snapshot.symbol, "AAPL");
        assert_eq!(snapshot.last_close(), Some(173.5));
        assert!(snapshot.political_trades.is_none());
    }

    #[tokio::test]
    async fn test_directory_round() {
        let dir = temp_dir("snapshots");
        std::fs::write(dir.join("AAPL.json"), SNAPSHOT).unwrap();
        std::fs::write(dir.join("BROKEN.json"), "{").unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let source = FileSnapshotSource::new(&dir);
        assert_eq!(source.list_symbols().await.unwrap(), vec!["AAPL", "BROKEN"]);
        assert_eq!(source.load_all().await.unwrap().len(), 1);

        let price = source.latest_price("AAPL").await.unwrap();
        assert_eq!(price, Decimal::from_f64(173.5));
        assert_eq!(source.latest_price("MSFT").await.unwrap(), None);
        assert!(source.latest_price("BROKEN").await.is_err());

        std::fs::remove_dir_all(&dir).ok();
    }
}
