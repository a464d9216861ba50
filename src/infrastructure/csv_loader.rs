use crate::domain::market::{MarketData, PriceBar, StockSnapshot, VolumeBar};
use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// One `date,open,high,low,close,adjusted_close,volume` row
#[derive(Debug, Deserialize)]
struct PriceRecord {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default, alias = "adjClose", alias = "adjustedClose")]
    adjusted_close: Option<f64>,
    #[serde(default)]
    volume: Option<f64>,
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC)
fn parse_date(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Unrecognized date '{}'", raw))?;
    day.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .with_context(|| format!("Invalid date '{}'", raw))
}

/// Read price history from CSV, sorted chronologically
pub fn read_market_data<R: Read>(reader: R) -> Result<MarketData> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut prices = Vec::new();
    let mut volume = Vec::new();

    for (line, result) in rdr.deserialize().enumerate() {
        let record: PriceRecord =
            result.with_context(|| format!("Malformed price row {}", line + 1))?;
        let date = parse_date(&record.date)?;

        prices.push(PriceBar {
            date,
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            adjusted_close: record.adjusted_close.unwrap_or(record.close),
        });
        if let Some(v) = record.volume {
            volume.push(VolumeBar { date, volume: v });
        }
    }

    if prices.is_empty() {
        bail!("Price file contains no rows");
    }

    prices.sort_by_key(|bar| bar.date);
    volume.sort_by_key(|bar| bar.date);
    Ok(MarketData { prices, volume })
}

pub fn load_market_data(path: &Path) -> Result<MarketData> {
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    read_market_data(BufReader::new(file)).with_context(|| format!("Failed to parse {:?}", path))
}

/// Snapshot with price history only; sentiment sources are absent
pub fn load_snapshot(symbol: &str, path: &Path) -> Result<StockSnapshot> {
    Ok(StockSnapshot::new(symbol, load_market_data(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_rows_in_date_order() {
        let data = "\
date,open,high,low,close,adjusted_close,volume
2024-01-03,102,103,101,102.5,102.5,1200
2024-01-02,100,101,99,100.5,100.4,1000
";
        let market = read_market_data(data.as_bytes()).unwrap();
        assert_eq!(market.prices.len(), 2);
        assert_eq!(market.prices[0].close, 100.5);
        assert_eq!(market.prices[0].adjusted_close, 100.4);
        assert_eq!(market.volume[1].volume, 1200.0);
    }

    #[test]
    fn test_optional_columns() {
        let data = "\
date,open,high,low,close
2024-01-02T15:30:00Z,10,11,9,10.5
";
        let market = read_market_data(data.as_bytes()).unwrap();
        assert_eq!(market.prices[0].adjusted_close, 10.5);
        assert!(market.volume.is_empty());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(read_market_data("date,open,high,low,close\n".as_bytes()).is_err());
        let bad_date = "date,open,high,low,close\nyesterday,1,1,1,1\n";
        assert!(read_market_data(bad_date.as_bytes()).is_err());
    }
}
