//! # Prometheus Metrics
//!
//! Operational metrics for the vault API, scraped by Prometheus at
//! `/metrics` on the metrics port.
//!
//! All metrics are registered in a dedicated [`prometheus::Registry`] under
//! the `aurum` namespace so they do not collide with any default global
//! registry consumers.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, Registry, TextEncoder};
use std::future::Future;
use std::sync::Arc;

/// Holds all Prometheus metric handles for the node.
#[derive(Clone)]
pub struct ServiceMetrics {
    /// Prometheus registry that owns all metrics below.
    registry: Registry,
    /// Bar listings served (`/vaults/:id/bars`), including 404s.
    pub bar_queries_total: IntCounter,
    /// Logical contract reads attempted. A collected-fees read counts once.
    pub contract_reads_total: IntCounter,
    /// Logical contract reads that failed.
    pub contract_read_failures_total: IntCounter,
    /// Reserve summaries served from synthetic data.
    pub reserve_fallbacks_total: IntCounter,
    /// Latency of logical contract reads in seconds.
    pub contract_read_latency_seconds: Histogram,
}

fn counter(registry: &Registry, name: &str, help: &str) -> IntCounter {
    let c = IntCounter::new(name, help).expect("metric creation");
    registry
        .register(Box::new(c.clone()))
        .expect("metric registration");
    c
}

impl ServiceMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> Self {
        let registry = Registry::new_custom(Some("aurum".into()), None)
            .expect("failed to create prometheus registry");

        let bar_queries_total = counter(
            &registry,
            "bar_queries_total",
            "Total number of vault bar listings served",
        );
        let contract_reads_total = counter(
            &registry,
            "contract_reads_total",
            "Total number of reserve contract reads attempted",
        );
        let contract_read_failures_total = counter(
            &registry,
            "contract_read_failures_total",
            "Total number of reserve contract reads that failed",
        );
        let reserve_fallbacks_total = counter(
            &registry,
            "reserve_fallbacks_total",
            "Total number of reserve summaries served from fallback data",
        );

        let contract_read_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "contract_read_latency_seconds",
                "Reserve contract read latency in seconds",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )
        .expect("metric creation");
        registry
            .register(Box::new(contract_read_latency_seconds.clone()))
            .expect("metric registration");

        Self {
            registry,
            bar_queries_total,
            contract_reads_total,
            contract_read_failures_total,
            reserve_fallbacks_total,
            contract_read_latency_seconds,
        }
    }

    /// Runs one logical contract read, recording count, latency and failure.
    pub async fn observe_contract_read<T, E, F>(&self, read: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        self.contract_reads_total.inc();
        let timer = self.contract_read_latency_seconds.start_timer();
        let result = read.await;
        timer.observe_duration();
        if result.is_err() {
            self.contract_read_failures_total.inc();
        }
        result
    }

    /// Encodes all registered metrics into the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared metrics state passed to axum handlers.
pub type SharedMetrics = Arc<ServiceMetrics>;

/// Axum handler that renders `/metrics` in Prometheus text format.
pub async fn metrics_handler(
    axum::extract::State(metrics): axum::extract::State<SharedMetrics>,
) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_observe_counts_failures() {
        let m = ServiceMetrics::new();
        let ok: Result<u8, &str> = m.observe_contract_read(async { Ok(1) }).await;
        let err: Result<u8, &str> = m.observe_contract_read(async { Err("down") }).await;

        assert!(ok.is_ok());
        assert!(err.is_err());
        assert_eq!(m.contract_reads_total.get(), 2);
        assert_eq!(m.contract_read_failures_total.get(), 1);
        assert_eq!(m.contract_read_latency_seconds.get_sample_count(), 2);
    }

    #[test]
    fn test_encode_uses_namespace() {
        let m = ServiceMetrics::new();
        m.bar_queries_total.inc();
        let text = m.encode().unwrap();
        assert!(text.contains("aurum_bar_queries_total 1"));
    }
}
