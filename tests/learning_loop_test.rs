use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stockcast::application::system::{Application, SystemHandle};
use stockcast::config::Config;
use stockcast::domain::learning::{
    ABTestConfig, ModelVersion, POLYNOMIAL_REGRESSION, RetrainingConfig, TriggerReason,
};
use stockcast::infrastructure::mock::MockPriceProvider;
use stockcast::infrastructure::random::FixedRandomSource;
use stockcast::infrastructure::snapshot_source::FileSnapshotSource;

// --- Helpers ---

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("stockcast-{}-{}", name, uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Daily bars ending today, rising by `slope` per day
fn write_snapshot(dir: &Path, symbol: &str, bars: usize, start: f64, slope: f64) {
    let today = Utc::now();
    let prices: Vec<_> = (0..bars)
        .map(|i| {
            let close = start + slope * i as f64;
            let date = today - Duration::days((bars - 1 - i) as i64);
            json!({
                "date": date.to_rfc3339(),
                "open": close - 0.5,
                "high": close + 1.0,
                "low": close - 1.0,
                "close": close,
                "adjustedClose": close,
            })
        })
        .collect();

    let snapshot = json!({
        "symbol": symbol,
        "marketData": { "prices": prices },
    });
    std::fs::write(
        dir.join(format!("{}.json", symbol)),
        serde_json::to_string(&snapshot).unwrap(),
    )
    .unwrap();
}

async fn start_system(dir: &Path, prices: &MockPriceProvider, draw: f64) -> SystemHandle {
    let config = Config {
        snapshot_dir: dir.to_path_buf(),
        retraining: RetrainingConfig {
            min_predictions: 3,
            accuracy_threshold: 0.6,
            ..Default::default()
        },
        observability_enabled: false,
        ..Config::default()
    };

    let app = Application::build_with(
        config,
        Arc::new(FileSnapshotSource::new(dir)),
        Arc::new(prices.clone()),
        Arc::new(FixedRandomSource::new(draw)),
    )
    .await
    .expect("application should build");
    app.start().await.expect("application should start")
}

fn seed_id() -> String {
    ModelVersion::model_id(POLYNOMIAL_REGRESSION, "1.0.0")
}

// --- Tests ---

#[tokio::test]
async fn test_forecast_run_logs_three_scenarios_per_symbol() {
    let dir = temp_dir("loop");
    write_snapshot(&dir, "AAPL", 60, 150.0, 0.5);
    write_snapshot(&dir, "MSFT", 60, 300.0, -0.2);
    let prices = MockPriceProvider::new();

    let mut handle = start_system(&dir, &prices, 90.0).await;
    let run = handle.run_forecasts().await.unwrap();

    assert_eq!(run.issued, vec!["AAPL".to_string(), "MSFT".to_string()]);
    assert!(run.failed.is_empty());
    assert_eq!(handle.logger.pending_count().await, 6);

    let pending = handle.logger.pending_predictions().await;
    assert!(pending.iter().all(|p| p.model_version == seed_id()));
    assert!(pending.iter().all(|p| p.target_date > Utc::now()));

    handle.stop().await;
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_short_history_is_reported_not_fatal() {
    let dir = temp_dir("short");
    write_snapshot(&dir, "AAPL", 60, 150.0, 0.5);
    write_snapshot(&dir, "TINY", 1, 10.0, 0.0);
    let prices = MockPriceProvider::new();

    let mut handle = start_system(&dir, &prices, 90.0).await;
    let run = handle.run_forecasts().await.unwrap();

    assert_eq!(run.issued, vec!["AAPL".to_string()]);
    assert_eq!(run.failed, vec!["TINY".to_string()]);
    assert_eq!(handle.logger.pending_count().await, 3);
    assert_eq!(handle.metrics.prediction_failures_total.get(), 1);

    handle.stop().await;
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_poor_outcomes_spawn_inactive_candidate() {
    let dir = temp_dir("retrain");
    write_snapshot(&dir, "AAPL", 60, 150.0, 0.5);
    let prices = MockPriceProvider::new();

    let mut handle = start_system(&dir, &prices, 90.0).await;
    handle.run_forecasts().await.unwrap();

    // Price collapse: every scenario scores zero accuracy
    prices.set_price("AAPL", dec!(1)).await;
    let outcomes = handle.logger.force_check_outcomes("AAPL").await.unwrap();

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes.iter().all(|o| o.accuracy == 0.0));
    assert_eq!(handle.logger.pending_count().await, 0);
    assert_eq!(handle.registry.outcome_count().await, 3);

    let events = handle.registry.retraining_events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].reason, TriggerReason::PoorAccuracy);
    assert_eq!(events[0].previous_model_id, seed_id());

    let models = handle.registry.list_by_type(POLYNOMIAL_REGRESSION).await;
    assert_eq!(models.len(), 2);
    assert_eq!(
        handle
            .registry
            .get_active(POLYNOMIAL_REGRESSION)
            .await
            .unwrap()
            .id,
        seed_id()
    );

    handle.stop().await;
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_ab_test_routes_traffic_and_promotes_on_stop() {
    let dir = temp_dir("abtest");
    write_snapshot(&dir, "AAPL", 60, 150.0, 0.5);
    write_snapshot(&dir, "MSFT", 60, 300.0, 0.1);
    let prices = MockPriceProvider::new();

    // Draw 10 falls under the 50% split: every request goes to the treatment
    let mut handle = start_system(&dir, &prices, 10.0).await;
    let event = handle
        .registry
        .trigger_retraining(POLYNOMIAL_REGRESSION, TriggerReason::Manual)
        .await
        .expect("candidate should be created");
    let treatment = event.new_model_id.clone();

    let config = ABTestConfig {
        min_sample_size: 50,
        ..Default::default()
    };
    assert!(
        handle
            .controller
            .start_ab_test(&seed_id(), &treatment, config)
            .await
    );

    let run = handle.run_forecasts().await.unwrap();
    assert_eq!(run.issued.len(), 2);

    let pending = handle.logger.pending_predictions().await;
    assert_eq!(pending.len(), 6);
    assert!(pending.iter().all(|p| p.model_version == treatment));

    let result = handle.controller.stop_ab_test().await.unwrap();
    assert_eq!(result.test.treatment_metrics.predictions, 2);
    assert_eq!(result.test.control_metrics.predictions, 0);
    assert!(result.promoted);
    assert_eq!(
        handle
            .registry
            .get_active(POLYNOMIAL_REGRESSION)
            .await
            .unwrap()
            .id,
        treatment
    );

    handle.stop().await;
    std::fs::remove_dir_all(&dir).ok();
}
