//! # Prometheus Metrics
//!
//! Operational metrics for the Actions server, scraped at `/metrics` on the
//! metrics port. Kept off the public API port so the action origin never
//! exposes internals.
//!
//! All metrics are registered in a dedicated [`prometheus::Registry`] so they
//! do not collide with any default global registry consumers.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Holds all Prometheus metric handles for the server.
///
/// Prometheus handles are internally reference counted, so clones record
/// into the same series.
#[derive(Clone)]
pub struct NodeMetrics {
    /// Prometheus registry that owns all metrics below.
    registry: Registry,
    /// Discovery document requests served (GET and OPTIONS).
    pub metadata_requests_total: IntCounter,
    /// Unsigned transactions returned, by currency symbol.
    pub transactions_built_total: IntCounterVec,
    /// POSTs rejected for invalid input.
    pub build_rejections_total: IntCounter,
    /// POSTs that failed because the ledger call failed or timed out.
    pub ledger_failures_total: IntCounter,
    /// Wall time of a successful or failed build, ledger call included.
    pub build_latency_seconds: Histogram,
}

impl NodeMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("blinkpay".into()), None)?;

        let metadata_requests_total = IntCounter::new(
            "metadata_requests_total",
            "Total number of action discovery requests served",
        )?;
        registry.register(Box::new(metadata_requests_total.clone()))?;

        let transactions_built_total = IntCounterVec::new(
            Opts::new(
                "transactions_built_total",
                "Total number of unsigned transfer transactions built",
            ),
            &["currency"],
        )?;
        registry.register(Box::new(transactions_built_total.clone()))?;

        let build_rejections_total = IntCounter::new(
            "build_rejections_total",
            "Total number of transfer requests rejected for invalid input",
        )?;
        registry.register(Box::new(build_rejections_total.clone()))?;

        let ledger_failures_total = IntCounter::new(
            "ledger_failures_total",
            "Total number of builds failed by the ledger client or its timeout",
        )?;
        registry.register(Box::new(ledger_failures_total.clone()))?;

        let build_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "build_latency_seconds",
                "Transfer build latency in seconds, blockhash fetch included",
            )
            .buckets(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
        )?;
        registry.register(Box::new(build_latency_seconds.clone()))?;

        Ok(Self {
            registry,
            metadata_requests_total,
            transactions_built_total,
            build_rejections_total,
            ledger_failures_total,
            build_latency_seconds,
        })
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

/// Shared metrics state passed to axum handlers.
pub type SharedMetrics = Arc<NodeMetrics>;

/// Axum handler that renders `/metrics` in Prometheus text format.
///
/// Returns HTTP 500 if encoding fails (should never happen in practice).
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
