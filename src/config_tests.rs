use crate::config::Config;
use std::env;
use std::sync::Mutex;
use std::sync::OnceLock;

// Global lock to prevent race conditions when modifying environment variables in tests
static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn get_env_lock() -> &'static Mutex<()> {
    ENV_LOCK.get_or_init(|| Mutex::new(()))
}

fn set(key: &str, value: &str) {
    // SAFETY: every test touching the environment holds ENV_LOCK
    unsafe { env::set_var(key, value) };
}

fn clear(keys: &[&str]) {
    for key in keys {
        // SAFETY: see `set`
        unsafe { env::remove_var(key) };
    }
}

#[test]
fn test_config_from_env_defaults() {
    let _guard = get_env_lock().lock().unwrap();
    let config = Config::from_env().expect("Should parse with defaults");

    assert_eq!(config.timeframe.to_days(), 30);
    assert_eq!(config.polynomial_degree, 2);
    assert_eq!(config.retraining.min_predictions, 10);
    assert_eq!(config.ab_test.test_duration_days, 14);
}

#[test]
fn test_config_reads_learning_overrides() {
    let _guard = get_env_lock().lock().unwrap();
    set("RETRAINING_ACCURACY_THRESHOLD", "0.75");
    set("AB_TEST_TRAFFIC_SPLIT_PERCENT", "20");
    set("AB_TEST_ENABLED", "false");
    set("PREDICTION_TIMEFRAME", "2w");

    let config = Config::from_env().unwrap();

    assert!((config.retraining.accuracy_threshold - 0.75).abs() < 1e-9);
    assert!((config.ab_test.traffic_split_percent - 20.0).abs() < 1e-9);
    assert!(!config.ab_test.enabled);
    assert_eq!(config.timeframe.to_days(), 14);

    clear(&[
        "RETRAINING_ACCURACY_THRESHOLD",
        "AB_TEST_TRAFFIC_SPLIT_PERCENT",
        "AB_TEST_ENABLED",
        "PREDICTION_TIMEFRAME",
    ]);
}

#[test]
fn test_malformed_number_returns_error() {
    let _guard = get_env_lock().lock().unwrap();
    set("RETRAINING_MIN_PREDICTIONS", "ten");

    let result = Config::from_env();

    assert!(result.is_err());
    let err_msg = format!("{:?}", result.err().unwrap());
    assert!(err_msg.contains("RETRAINING_MIN_PREDICTIONS"));

    clear(&["RETRAINING_MIN_PREDICTIONS"]);
}

#[test]
fn test_out_of_range_values_rejected() {
    let _guard = get_env_lock().lock().unwrap();

    set("RETRAINING_ACCURACY_THRESHOLD", "1.2");
    assert!(Config::from_env().is_err());
    clear(&["RETRAINING_ACCURACY_THRESHOLD"]);

    set("AB_TEST_TRAFFIC_SPLIT_PERCENT", "150");
    assert!(Config::from_env().is_err());
    clear(&["AB_TEST_TRAFFIC_SPLIT_PERCENT"]);

    set("POLYNOMIAL_DEGREE", "0");
    assert!(Config::from_env().is_err());
    set("POLYNOMIAL_DEGREE", "7");
    assert!(Config::from_env().is_err());
    clear(&["POLYNOMIAL_DEGREE"]);

    set("PREDICTION_TIMEFRAME", "soon");
    let err_msg = format!("{:?}", Config::from_env().err().unwrap());
    assert!(err_msg.contains("PREDICTION_TIMEFRAME"));
    clear(&["PREDICTION_TIMEFRAME"]);
}

#[test]
fn test_degree_boundary_values() {
    let _guard = get_env_lock().lock().unwrap();

    set("POLYNOMIAL_DEGREE", "1");
    assert_eq!(Config::from_env().unwrap().polynomial_degree, 1);

    set("POLYNOMIAL_DEGREE", "6");
    assert_eq!(Config::from_env().unwrap().polynomial_degree, 6);

    clear(&["POLYNOMIAL_DEGREE"]);
}

#[test]
fn test_malformed_observability_values_rejected() {
    let _guard = get_env_lock().lock().unwrap();

    set("OBSERVABILITY_ENABLED", "sometimes");
    let err_msg = format!("{:?}", Config::from_env().err().unwrap());
    assert!(err_msg.contains("OBSERVABILITY_ENABLED"));
    clear(&["OBSERVABILITY_ENABLED"]);

    set("OBSERVABILITY_INTERVAL", "1m");
    let err_msg = format!("{:?}", Config::from_env().err().unwrap());
    assert!(err_msg.contains("OBSERVABILITY_INTERVAL"));

    set("OBSERVABILITY_INTERVAL", "0");
    assert!(Config::from_env().is_err());

    set("OBSERVABILITY_INTERVAL", "15");
    set("OBSERVABILITY_ENABLED", "false");
    let config = Config::from_env().unwrap();
    assert_eq!(config.observability_interval_secs, 15);
    assert!(!config.observability_enabled);
    clear(&["OBSERVABILITY_INTERVAL", "OBSERVABILITY_ENABLED"]);
}

#[test]
fn test_ab_test_seed() {
    let _guard = get_env_lock().lock().unwrap();

    set("AB_TEST_SEED", "42");
    assert_eq!(Config::from_env().unwrap().ab_test_seed, Some(42));

    set("AB_TEST_SEED", "-1");
    let err_msg = format!("{:?}", Config::from_env().err().unwrap());
    assert!(err_msg.contains("AB_TEST_SEED"));
    clear(&["AB_TEST_SEED"]);
}
