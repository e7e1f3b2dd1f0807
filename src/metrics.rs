use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the global Prometheus recorder
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;

    init_metric_descriptions();

    Ok(handle)
}

/// Initialize metric descriptions (can be called multiple times safely)
fn init_metric_descriptions() {
    describe_counter!(
        "appraiser_requests_total",
        "Total number of appraisal requests by response status"
    );
    describe_histogram!(
        "appraiser_upstream_duration_seconds",
        "Provider call duration in seconds, by pipeline step"
    );
    describe_counter!(
        "appraiser_listings_search_total",
        "Listings searches by outcome (success or degraded)"
    );
    describe_gauge!("appraiser_info", "Service version information");

    gauge!("appraiser_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Record a finished /predict request
pub fn record_request(status: u16) {
    counter!("appraiser_requests_total", "status" => status.to_string()).increment(1);
}

/// Record how long one provider call took
pub fn record_upstream_duration(step: &'static str, duration: Duration) {
    histogram!("appraiser_upstream_duration_seconds", "step" => step)
        .record(duration.as_secs_f64());
}

pub fn record_listings_search(outcome: &'static str) {
    counter!("appraiser_listings_search_total", "outcome" => outcome).increment(1);
}
