//! Metrics and observability utilities
//!
//! Prometheus metrics for the campaign workflow with standardized naming.

use crate::errors::ErrorCode;
use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all CampaignHub metrics
pub const METRICS_PREFIX: &str = "campaignhub";

/// Histogram buckets for request latency (in seconds)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001,  // 1ms
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
];

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    describe_counter!(
        format!("{}_campaigns_created_total", METRICS_PREFIX),
        Unit::Count,
        "Campaigns created by advertisers"
    );

    describe_counter!(
        format!("{}_campaigns_closed_total", METRICS_PREFIX),
        Unit::Count,
        "Campaign close actions"
    );

    describe_counter!(
        format!("{}_applications_created_total", METRICS_PREFIX),
        Unit::Count,
        "Influencer applications accepted"
    );

    describe_counter!(
        format!("{}_selection_updates_total", METRICS_PREFIX),
        Unit::Count,
        "Application rows changed by selection"
    );

    describe_counter!(
        format!("{}_submissions_created_total", METRICS_PREFIX),
        Unit::Count,
        "Review submissions accepted"
    );

    describe_counter!(
        format!("{}_onboarding_completed_total", METRICS_PREFIX),
        Unit::Count,
        "Onboarding steps completed"
    );

    describe_counter!(
        format!("{}_rejections_total", METRICS_PREFIX),
        Unit::Count,
        "Failed operations by error code"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

pub fn record_campaign_created() {
    counter!(format!("{}_campaigns_created_total", METRICS_PREFIX)).increment(1);
}

pub fn record_campaign_closed() {
    counter!(format!("{}_campaigns_closed_total", METRICS_PREFIX)).increment(1);
}

pub fn record_application_created() {
    counter!(format!("{}_applications_created_total", METRICS_PREFIX)).increment(1);
}

/// Rows changed by one selection call, split by target status
pub fn record_selection(selected: u64, waitlisted: u64) {
    counter!(
        format!("{}_selection_updates_total", METRICS_PREFIX),
        "status" => "selected"
    )
    .increment(selected);

    counter!(
        format!("{}_selection_updates_total", METRICS_PREFIX),
        "status" => "waitlisted"
    )
    .increment(waitlisted);
}

pub fn record_submission_created() {
    counter!(format!("{}_submissions_created_total", METRICS_PREFIX)).increment(1);
}

/// `step` is one of `profile`, `advertiser`, `influencer`
pub fn record_onboarding(step: &'static str) {
    counter!(
        format!("{}_onboarding_completed_total", METRICS_PREFIX),
        "step" => step
    )
    .increment(1);
}

pub fn record_rejection(code: ErrorCode) {
    counter!(
        format!("{}_rejections_total", METRICS_PREFIX),
        "code" => code.as_str()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_buckets_sorted() {
        let mut prev = 0.0;
        for &bucket in LATENCY_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }
    }

    #[test]
    fn test_recorders_without_exporter() {
        // No recorder installed: calls are no-ops
        let metrics = RequestMetrics::start("GET", "/api/campaigns");
        metrics.finish(200);
        record_selection(2, 1);
        record_rejection(ErrorCode::Conflict);
        record_onboarding("profile");
    }
}
