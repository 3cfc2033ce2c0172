use handler::{ChannelRegistry, MessageTransformingHandler, QueueChannel};
use header_filter::HeaderFilter;
use message_core::MessageBuilder;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const FILTER_YAML: &str = r#"
header_names:
  - "x-debug-*"
  - authorization
pattern_match: true
"#;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init_json_logging();

    let metrics = telemetry::HandlerMetrics::new();
    let registry = ChannelRegistry::new();
    let replies = Arc::new(QueueChannel::new("replies"));
    registry.register(replies.clone());

    let filter = HeaderFilter::from_yaml_str(FILTER_YAML)?;
    let handler =
        MessageTransformingHandler::new(filter, registry).with_observer(Arc::new(metrics.clone()));

    #[cfg(feature = "otel")]
    let handler = {
        telemetry::init_otel("header-filter-demo")?;
        handler.with_observer(Arc::new(telemetry::handler_observer::global()))
    };

    let message = MessageBuilder::with_payload(json!({"order": 17}))
        .header("authorization", "Bearer secret")
        .header("x-debug-trace", true)
        .header("tenant", "acme")
        .correlation_id("demo-1")
        .reply_channel("replies")
        .build();
    handler.handle_message(message)?;

    if let Some(reply) = replies.receive(Duration::from_millis(100)).await {
        println!("{}", serde_json::to_string_pretty(&reply)?);
    }
    println!("{:?}", metrics.snapshot());
    Ok(())
}
