//! Prometheus metrics for relay-service.
//!
//! The registry is owned by [`RelayMetrics`], created once at start-up and
//! shared through `AppState`.

use crate::models::Operation;
use crate::services::providers::ProviderError;
use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub struct RelayMetrics {
    registry: Registry,
    http_requests_total: IntCounterVec,
    http_request_duration_seconds: HistogramVec,
    relay_requests_total: IntCounterVec,
    upstream_latency_seconds: HistogramVec,
    upstream_errors_total: IntCounterVec,
}

impl RelayMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "path", "status"],
        )?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request duration in seconds",
            ),
            &["method", "path", "status"],
        )?;

        // outcome: success, upstream_error
        let relay_requests_total = IntCounterVec::new(
            Opts::new("relay_requests_total", "Relay requests that reached the upstream"),
            &["operation", "outcome"],
        )?;

        let upstream_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "relay_upstream_latency_seconds",
                "Upstream provider latency in seconds",
            )
            .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]),
            &["operation"],
        )?;

        let upstream_errors_total = IntCounterVec::new(
            Opts::new("relay_upstream_errors_total", "Total upstream provider errors"),
            &["operation", "error_type"],
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(relay_requests_total.clone()))?;
        registry.register(Box::new(upstream_latency_seconds.clone()))?;
        registry.register(Box::new(upstream_errors_total.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            relay_requests_total,
            upstream_latency_seconds,
            upstream_errors_total,
        })
    }

    pub fn record_upstream(
        &self,
        operation: Operation,
        elapsed: Duration,
        error: Option<&ProviderError>,
    ) {
        self.upstream_latency_seconds
            .with_label_values(&[operation.as_str()])
            .observe(elapsed.as_secs_f64());

        let outcome = match error {
            Some(err) => {
                self.upstream_errors_total
                    .with_label_values(&[operation.as_str(), err.kind()])
                    .inc();
                "upstream_error"
            }
            None => "success",
        };

        self.relay_requests_total
            .with_label_values(&[operation.as_str(), outcome])
            .inc();
    }

    fn record_http(&self, method: &str, path: &str, status: &str, elapsed: Duration) {
        self.http_requests_total
            .with_label_values(&[method, path, status])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path, status])
            .observe(elapsed.as_secs_f64());
    }

    /// Render all metrics in the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Count and time every HTTP request, labelled by route template.
pub async fn http_metrics_middleware(
    State(metrics): State<Arc<RelayMetrics>>,
    req: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(req).await;

    let status = response.status().as_u16().to_string();
    metrics.record_http(&method, &path, &status, start.elapsed());

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_outcomes_are_exported() {
        let metrics = RelayMetrics::new().unwrap();
        metrics.record_upstream(Operation::Chat, Duration::from_millis(20), None);
        metrics.record_upstream(
            Operation::Image,
            Duration::from_millis(20),
            Some(&ProviderError::RateLimited),
        );

        let text = metrics.encode().unwrap();
        assert!(text.contains(r#"relay_requests_total{operation="chat",outcome="success"} 1"#));
        assert!(text.contains(
            r#"relay_upstream_errors_total{error_type="rate_limited",operation="image"} 1"#
        ));
    }
}
