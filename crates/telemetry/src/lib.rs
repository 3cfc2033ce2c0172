//! Telemetry: structured logging, in-process handler metrics and OTel wiring.

#![deny(unsafe_code)]

use handler::{HandlerError, HandlerObserver, JsonMessage};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};
use uuid::Uuid;

#[cfg(feature = "otel")]
pub mod handler_observer;

/// Errors raised while wiring telemetry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The OpenTelemetry pipeline could not be installed.
    #[error("otel setup failed: {0}")]
    Otel(String),
}

/// Initialize structured logging (JSON) with env filter.
/// Set `RUST_LOG`, e.g., "info,handler=debug".
pub fn init_json_logging() {
    let fmt_layer = fmt::layer().json().with_current_span(true).with_span_list(true);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = Registry::default().with(filter).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber).ok();
}

/// Initialize the OpenTelemetry tracer and meter provider (behind the `otel`
/// feature). No tracing subscriber hookup.
#[cfg(feature = "otel")]
pub fn init_otel(service_name: &str) -> Result<(), TelemetryError> {
    use opentelemetry::KeyValue;
    use opentelemetry_sdk::trace as sdktrace;
    use opentelemetry_sdk::{runtime, Resource};

    let resource = Resource::new(vec![KeyValue::new("service.name", service_name.to_owned())]);
    let _tracer_provider = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(opentelemetry_otlp::new_exporter().http())
        .with_trace_config(sdktrace::config().with_resource(resource))
        .install_batch(runtime::Tokio)
        .map_err(|e| TelemetryError::Otel(e.to_string()))?;
    metrics::init_metrics()
}

#[cfg(feature = "otel")]
pub mod metrics {
    //! OTLP meter provider shared by the handler instruments.
    use super::TelemetryError;
    use once_cell::sync::OnceCell;
    use opentelemetry::global;
    use opentelemetry::KeyValue;
    use opentelemetry_sdk::Resource;

    static METRICS_INIT: OnceCell<Result<(), String>> = OnceCell::new();

    fn detect_service_name() -> String {
        std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "header-filter".to_string())
    }

    fn install_from_env() -> Result<(), String> {
        // Exporter endpoint and headers come from OTEL_EXPORTER_OTLP_*.
        let resource = Resource::new(vec![KeyValue::new("service.name", detect_service_name())]);
        let provider = opentelemetry_otlp::new_pipeline()
            .metrics(opentelemetry_sdk::runtime::Tokio)
            .with_exporter(opentelemetry_otlp::new_exporter().http())
            .with_resource(resource)
            .build()
            .map_err(|e| e.to_string())?;
        global::set_meter_provider(provider);
        tracing::debug!("otlp meter provider installed");
        Ok(())
    }

    /// Install the global OTLP meter provider once per process. Later calls
    /// return the outcome of the first. Must run inside a Tokio runtime.
    pub fn init_metrics() -> Result<(), TelemetryError> {
        METRICS_INIT.get_or_init(install_from_env).clone().map_err(TelemetryError::Otel)
    }

    /// Whether a meter provider has been installed by [`init_metrics`].
    #[must_use]
    pub fn is_installed() -> bool {
        matches!(METRICS_INIT.get(), Some(Ok(())))
    }
}

/// Lock-free counters for handled messages. Cheap to clone; clones share counts.
#[derive(Clone, Default, Debug)]
pub struct HandlerMetrics {
    transformed: Arc<AtomicU64>,
    headers_removed: Arc<AtomicU64>,
    failed: Arc<AtomicU64>,
}

/// Point-in-time copy of [`HandlerMetrics`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Messages the transformer produced output for.
    pub transformed: u64,
    /// Headers dropped across all transformed messages.
    pub headers_removed: u64,
    /// Messages whose handling failed (routed to an error channel or returned).
    pub failed: u64,
}

impl HandlerMetrics {
    /// Fresh zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current values.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            transformed: self.transformed.load(Ordering::Relaxed),
            headers_removed: self.headers_removed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

impl HandlerObserver for HandlerMetrics {
    fn on_transformed(&self, inbound_headers: usize, outbound: &JsonMessage) {
        let _ = self.transformed.fetch_add(1, Ordering::Relaxed);
        let removed = inbound_headers.saturating_sub(outbound.headers().len()) as u64;
        if removed > 0 {
            let _ = self.headers_removed.fetch_add(removed, Ordering::Relaxed);
        }
    }

    fn on_failed(&self, _message_id: Uuid, _error: &HandlerError) {
        let _ = self.failed.fetch_add(1, Ordering::Relaxed);
    }
}
