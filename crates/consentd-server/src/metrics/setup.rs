//! Metrics setup and initialization.

use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

use super::cache::register_cache_metrics;
use super::http::register_http_metrics;

/// Installs the Prometheus recorder and returns the render handle for the
/// `/metrics` endpoint.
pub fn init_metrics() -> PrometheusHandle {
    let handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .set_buckets(&[
            0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5,
            5.0, 10.0,
        ])
        .expect("failed to set histogram buckets")
        .install_recorder()
        .expect("failed to install metrics recorder");

    register_cache_metrics();
    register_http_metrics();

    info!("Metrics system initialized");
    handle
}
