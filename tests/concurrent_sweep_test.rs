use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use std::sync::Arc;
use stockcast::application::learning::{ModelRegistry, PerformanceLogger};
use stockcast::domain::learning::RetrainingConfig;
use stockcast::domain::market::{MarketData, PriceBar, StockSnapshot};
use stockcast::domain::prediction::{AccuracyMetrics, PredictionResult, PredictionScenario};
use stockcast::infrastructure::mock::MockPriceProvider;

const MODEL: &str = "polynomial-regression-v1.0.0";

fn matured(symbol: &str, offset_ms: i64) -> (StockSnapshot, PredictionResult) {
    let scenario = PredictionScenario {
        target_price: dec!(50),
        timeframe: "7d".to_string(),
        probability: 0.6,
        factors: vec![],
        confidence_interval: (dec!(45), dec!(55)),
        standard_error: 2.0,
    };
    let issued_at = Utc::now() - Duration::days(10) - Duration::milliseconds(offset_ms);
    let snapshot = StockSnapshot::new(
        symbol,
        MarketData {
            prices: vec![PriceBar {
                date: issued_at,
                open: 48.0,
                high: 49.0,
                low: 47.0,
                close: 48.0,
                adjusted_close: 48.0,
            }],
            volume: vec![],
        },
    );
    let result = PredictionResult {
        symbol: symbol.to_string(),
        conservative: scenario.clone(),
        bullish: scenario.clone(),
        bearish: scenario,
        accuracy: AccuracyMetrics {
            r_squared: 0.7,
            rmse: 1.0,
            mape: 2.0,
            confidence_interval: (46.0, 54.0),
        },
        confidence: 0.6,
        timestamp: issued_at,
    };
    (snapshot, result)
}

fn logger(prices: &MockPriceProvider) -> (Arc<ModelRegistry>, Arc<PerformanceLogger>) {
    let registry = Arc::new(ModelRegistry::new(RetrainingConfig {
        enabled: false,
        ..Default::default()
    }));
    let logger = Arc::new(PerformanceLogger::new(
        registry.clone(),
        Arc::new(prices.clone()),
    ));
    (registry, logger)
}

/// Test: Overlapping sweeps never score the same prediction twice
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_overlapping_sweeps_resolve_each_prediction_once() {
    let prices = MockPriceProvider::new();
    let (registry, logger) = logger(&prices);

    let symbols = ["AAPL", "MSFT", "NVDA", "AMZN"];
    for symbol in symbols {
        prices.set_price(symbol, dec!(50)).await;
        for i in 0..5 {
            let (snapshot, result) = matured(symbol, i);
            logger.log_prediction(&result, &snapshot, MODEL).await.unwrap();
        }
    }
    assert_eq!(logger.pending_count().await, 60);

    let mut handles = vec![];
    for _ in 0..8 {
        let logger = logger.clone();
        handles.push(tokio::spawn(async move {
            logger.check_and_log_outcomes().await
        }));
    }

    let mut resolved = 0;
    for handle in handles {
        let summary = handle.await.unwrap();
        assert!(summary.failed_symbols.is_empty());
        resolved += summary.resolved;
    }

    assert_eq!(resolved, 60);
    assert_eq!(registry.outcome_count().await, 60);
    assert_eq!(logger.pending_count().await, 0);
}

/// Test: One symbol's quote failure leaves the others unaffected
#[tokio::test]
async fn test_failed_symbol_isolated_from_sweep() {
    let prices = MockPriceProvider::new();
    let (registry, logger) = logger(&prices);

    prices.set_price("AAPL", dec!(55)).await;
    prices.fail_symbol("TSLA").await;
    for symbol in ["AAPL", "TSLA"] {
        let (snapshot, result) = matured(symbol, 0);
        logger.log_prediction(&result, &snapshot, MODEL).await.unwrap();
    }

    let summary = logger.check_and_log_outcomes().await;
    assert_eq!(summary.resolved, 3);
    assert_eq!(summary.failed_symbols, vec!["TSLA".to_string()]);
    assert_eq!(logger.pending_count().await, 3);

    let outcomes = registry.outcomes_for_symbol("AAPL").await;
    assert_eq!(outcomes.len(), 3);
    // |50 - 55| / 55
    assert!(outcomes.iter().all(|o| (o.accuracy - (1.0 - 5.0 / 55.0)).abs() < 1e-9));

    // Next sweep retries the released symbol once a quote is available
    prices.set_price("TSLA", dec!(50)).await;
    let summary = logger.check_and_log_outcomes().await;
    assert_eq!(summary.resolved, 3);
    assert_eq!(logger.pending_count().await, 0);
}
