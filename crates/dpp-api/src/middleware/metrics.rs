//! # Request & Domain Metrics
//!
//! Prometheus exporter backed by a dedicated registry.
//!
//! HTTP-level metrics (request counts, latency, errors) are recorded in
//! middleware. Domain-level gauges (applications by status, history size)
//! are recomputed from the store on each `/metrics` scrape — see the
//! scrape handler in `lib.rs`.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use prometheus::{
    core::Collector, Encoder, GaugeVec, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Cloneable handle over one Prometheus registry; clones share counters.
#[derive(Clone)]
pub struct ApiMetrics {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Registry,

    // -- Recorded per request by the middleware --
    http_requests_total: IntCounterVec,
    http_request_duration_seconds: HistogramVec,
    http_errors_total: IntCounterVec,

    // -- Recomputed from the store on each scrape --
    applications_total: GaugeVec,
    status_history_entries_total: prometheus::Gauge,
}

impl std::fmt::Debug for ApiMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiMetrics")
            .field("requests", &self.requests())
            .field("errors", &self.errors())
            .finish()
    }
}

impl ApiMetrics {
    /// Fresh registry with every portal metric registered.
    pub fn new() -> Self {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("dpp_http_requests_total", "Total HTTP requests"),
            &["method", "path", "status"],
        )
        .expect("metric can be created");

        let http_request_duration_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "dpp_http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .buckets(vec![
                0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
            &["method", "path"],
        )
        .expect("metric can be created");

        let http_errors_total = IntCounterVec::new(
            Opts::new("dpp_http_errors_total", "Total HTTP errors (4xx and 5xx)"),
            &["method", "path", "status"],
        )
        .expect("metric can be created");

        let applications_total = GaugeVec::new(
            Opts::new("dpp_applications_total", "Total applications by status"),
            &["status"],
        )
        .expect("metric can be created");

        let status_history_entries_total = prometheus::Gauge::new(
            "dpp_status_history_entries_total",
            "Total status history entries across all applications",
        )
        .expect("metric can be created");

        registry
            .register(Box::new(http_requests_total.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(http_request_duration_seconds.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(http_errors_total.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(applications_total.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(status_history_entries_total.clone()))
            .expect("metric can be registered");

        Self {
            inner: Arc::new(Inner {
                registry,
                http_requests_total,
                http_request_duration_seconds,
                http_errors_total,
                applications_total,
                status_history_entries_total,
            }),
        }
    }

    /// Requests recorded so far, summed over all label sets.
    pub fn requests(&self) -> u64 {
        let mut total = 0u64;
        let families = self.inner.http_requests_total.collect();
        for mf in &families {
            for m in mf.get_metric() {
                total += m.get_counter().get_value() as u64;
            }
        }
        total
    }

    /// 4xx/5xx responses recorded so far, summed over all label sets.
    pub fn errors(&self) -> u64 {
        let mut total = 0u64;
        let families = self.inner.http_errors_total.collect();
        for mf in &families {
            for m in mf.get_metric() {
                total += m.get_counter().get_value() as u64;
            }
        }
        total
    }

    /// Count one request; 4xx/5xx responses also land in the error counter.
    fn record_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.inner
            .http_requests_total
            .with_label_values(&[method, path, &status_str])
            .inc();

        self.inner
            .http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);

        if status >= 400 {
            self.inner
                .http_errors_total
                .with_label_values(&[method, path, &status_str])
                .inc();
        }
    }

    // -- Gauge access for the scrape handler --

    /// Per-status applications gauge.
    pub fn applications_total(&self) -> &GaugeVec {
        &self.inner.applications_total
    }

    /// History-entries gauge.
    pub fn status_history_entries_total(&self) -> &prometheus::Gauge {
        &self.inner.status_history_entries_total
    }

    /// Encode everything in the registry as text exposition format.
    pub fn gather_and_encode(&self) -> Result<String, String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| format!("failed to encode metrics: {e}"))?;
        String::from_utf8(buffer)
            .map_err(|e| format!("metrics encoding produced invalid UTF-8: {e}"))
    }
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize a request path for use as a Prometheus label.
///
/// Replaces application-number segments with `{number}` and UUID segments
/// with `{id}` to prevent cardinality explosion.
fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if is_application_number(segment) {
                "{number}"
            } else if is_uuid(segment) {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// An application number segment: 1-8 ASCII letters followed by exactly
/// 11 digits (`DESH12345678901`). Case-insensitive like the tracker.
fn is_application_number(segment: &str) -> bool {
    let prefix_len = segment
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .count();
    if prefix_len == 0 || prefix_len > 8 {
        return false;
    }
    let digits = &segment[prefix_len..];
    digits.len() == 11 && digits.chars().all(|c| c.is_ascii_digit())
}

/// A standard 8-4-4-4-12 UUID segment.
fn is_uuid(segment: &str) -> bool {
    segment.len() == 36
        && segment.chars().enumerate().all(|(i, c)| {
            if i == 8 || i == 13 || i == 18 || i == 23 {
                c == '-'
            } else {
                c.is_ascii_hexdigit()
            }
        })
}

/// Times each request and records method, normalized path, and status.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let metrics = request.extensions().get::<ApiMetrics>().cloned();
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path());
    let start = Instant::now();

    let response = next.run(request).await;

    if let Some(m) = metrics {
        let duration = start.elapsed().as_secs_f64();
        let status = response.status().as_u16();
        m.record_request(&method, &path, status, duration);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_metrics_new_starts_at_zero() {
        let m = ApiMetrics::new();
        assert_eq!(m.requests(), 0);
        assert_eq!(m.errors(), 0);
    }

    #[test]
    fn requests_increments() {
        let m = ApiMetrics::new();
        m.record_request("GET", "/test", 200, 0.01);
        assert_eq!(m.requests(), 1);
        m.record_request("POST", "/test", 201, 0.02);
        m.record_request("GET", "/other", 200, 0.005);
        assert_eq!(m.requests(), 3);
    }

    #[test]
    fn errors_increments() {
        let m = ApiMetrics::new();
        m.record_request("GET", "/test", 500, 0.1);
        assert_eq!(m.errors(), 1);
        m.record_request("GET", "/test", 404, 0.05);
        assert_eq!(m.errors(), 2);
    }

    #[test]
    fn request_and_error_counts_independent() {
        let m = ApiMetrics::new();
        for _ in 0..5 {
            m.record_request("GET", "/ok", 200, 0.01);
        }
        m.record_request("GET", "/fail", 500, 0.1);
        m.record_request("POST", "/fail", 400, 0.05);
        assert_eq!(m.requests(), 7);
        assert_eq!(m.errors(), 2);
    }

    #[test]
    fn concurrent_increments_are_safe() {
        let m = ApiMetrics::new();
        let threads: Vec<_> = (0..10)
            .map(|_| {
                let m = m.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        m.record_request("GET", "/test", 200, 0.001);
                        m.record_request("GET", "/err", 500, 0.001);
                    }
                })
            })
            .collect();

        for t in threads {
            t.join().unwrap();
        }

        assert_eq!(m.requests(), 20_000);
        assert_eq!(m.errors(), 10_000);
    }

    #[test]
    fn clone_shares_underlying_counters() {
        let m = ApiMetrics::new();
        let clone = m.clone();

        m.record_request("GET", "/test", 200, 0.01);
        assert_eq!(clone.requests(), 1, "clone should see the same counter");

        clone.record_request("GET", "/err", 500, 0.01);
        assert_eq!(m.errors(), 1, "original should see clone's increment");
    }

    #[test]
    fn gather_and_encode_produces_text() {
        let m = ApiMetrics::new();
        m.record_request("GET", "/test", 200, 0.01);
        let output = m.gather_and_encode().unwrap();
        assert!(output.contains("dpp_http_requests_total"));
        assert!(output.contains("dpp_http_request_duration_seconds"));
    }

    #[test]
    fn normalize_path_replaces_application_number() {
        let path = "/v1/applications/DESH25089514237";
        assert_eq!(normalize_path(path), "/v1/applications/{number}");
    }

    #[test]
    fn normalize_path_replaces_application_number_in_middle() {
        let path = "/v1/applications/DESH25089514237/status";
        assert_eq!(normalize_path(path), "/v1/applications/{number}/status");
    }

    #[test]
    fn normalize_path_replaces_lowercase_number() {
        // The tracker upcases on lookup, so lowercase numbers reach the
        // router and must still collapse to one label.
        let path = "/v1/applications/desh25089514237";
        assert_eq!(normalize_path(path), "/v1/applications/{number}");
    }

    #[test]
    fn normalize_path_replaces_uuid() {
        let path = "/v1/users/550e8400-e29b-41d4-a716-446655440000";
        assert_eq!(normalize_path(path), "/v1/users/{id}");
    }

    #[test]
    fn normalize_path_preserves_static_segments() {
        let path = "/v1/applications/stats/summary";
        assert_eq!(normalize_path(path), "/v1/applications/stats/summary");
    }

    #[test]
    fn normalize_path_ignores_near_misses() {
        // 10 digits, not 11.
        assert_eq!(
            normalize_path("/v1/applications/DESH2508951423"),
            "/v1/applications/DESH2508951423"
        );
        // Bare word.
        assert_eq!(normalize_path("/v1/track"), "/v1/track");
    }

    #[test]
    fn domain_gauges_update() {
        let m = ApiMetrics::new();
        m.applications_total()
            .with_label_values(&["submitted"])
            .set(3.0);
        m.applications_total()
            .with_label_values(&["approved"])
            .set(1.0);
        m.status_history_entries_total().set(9.0);

        let output = m.gather_and_encode().unwrap();
        assert!(output.contains("dpp_applications_total"));
        assert!(output.contains("dpp_status_history_entries_total"));
    }
}
