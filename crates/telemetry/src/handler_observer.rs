#![allow(clippy::module_name_repetitions)]
//! OTel-backed observer for the transforming handler.

use handler::{HandlerError, HandlerObserver, JsonMessage};
use once_cell::sync::OnceCell;
use opentelemetry::global;
use opentelemetry::metrics::{Counter, Meter};
use opentelemetry::KeyValue;
use uuid::Uuid;

struct Instruments {
    messages: Counter<u64>,
    headers_removed: Counter<u64>,
}

static INSTR: OnceCell<Instruments> = OnceCell::new();

fn ensure_instruments() -> &'static Instruments {
    INSTR.get_or_init(|| {
        if let Err(e) = crate::metrics::init_metrics() {
            tracing::warn!(error = %e, "meter provider unavailable, handler metrics are dropped");
        }
        let meter: Meter = global::meter("handler");
        let messages = meter
            .u64_counter("handler.message.count")
            .with_description("Messages handled, by outcome")
            .init();
        let headers_removed = meter
            .u64_counter("handler.headers.removed")
            .with_description("Headers dropped by the transformer")
            .init();
        Instruments { messages, headers_removed }
    })
}

fn error_kind(error: &HandlerError) -> &'static str {
    match error {
        HandlerError::Transform(_) => "transform",
        HandlerError::NoReplyDestination { .. } => "no_reply_destination",
        HandlerError::UnknownChannel(_) => "unknown_channel",
        HandlerError::Send(_) => "send",
    }
}

/// OTel-backed observer for handled messages.
#[derive(Clone, Copy, Debug, Default)]
pub struct OtelHandlerObserver;

impl HandlerObserver for OtelHandlerObserver {
    fn on_transformed(&self, inbound_headers: usize, outbound: &JsonMessage) {
        let inst = ensure_instruments();
        inst.messages.add(1, &[KeyValue::new("outcome", "transformed")]);
        let removed = inbound_headers.saturating_sub(outbound.headers().len()) as u64;
        if removed > 0 {
            inst.headers_removed.add(removed, &[]);
        }
    }

    fn on_failed(&self, _message_id: Uuid, error: &HandlerError) {
        let inst = ensure_instruments();
        let attrs = [
            KeyValue::new("outcome", "failed"),
            KeyValue::new("error", error_kind(error)),
        ];
        inst.messages.add(1, &attrs);
    }
}

/// Return an observer instance. The first call installs the OTLP meter
/// provider (see [`crate::metrics::init_metrics`]) and creates the instruments,
/// so it must run inside a Tokio runtime.
pub fn global() -> OtelHandlerObserver {
    let _ = ensure_instruments();
    OtelHandlerObserver
}
