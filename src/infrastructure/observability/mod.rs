//! Outbound-only observability for Stockcast
//!
//! Nothing here listens on a socket. State leaves the process in two ways:
//!
//! 1. `MetricsReporter` prints a `METRICS_JSON:` line to stdout on an interval,
//!    ready for Loki, Fluentd or CloudWatch log shippers
//! 2. `Metrics::render()` returns the Prometheus text exposition for a sidecar
//!    or pushgateway client to forward

pub mod metrics;
pub mod reporter;

pub use metrics::Metrics;
pub use reporter::MetricsReporter;
