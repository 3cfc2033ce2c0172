use handler::{ChannelRegistry, MessageTransformingHandler, QueueChannel};
use header_filter::HeaderFilter;
use message_core::MessageBuilder;
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;
use telemetry::{HandlerMetrics, MetricsSnapshot};

fn handler_with(metrics: &HandlerMetrics) -> (MessageTransformingHandler<HeaderFilter>, Arc<QueueChannel>) {
    let reg = ChannelRegistry::new();
    let replies = Arc::new(QueueChannel::new("replies"));
    reg.register(replies.clone());
    let filter = HeaderFilter::pattern(["drop-*"]).unwrap();
    let handler = MessageTransformingHandler::new(filter, reg).with_observer(Arc::new(metrics.clone()));
    (handler, replies)
}

#[test]
fn counts_transforms_removals_and_failures() {
    telemetry::init_json_logging();
    let metrics = HandlerMetrics::new();
    let (handler, replies) = handler_with(&metrics);

    let m = MessageBuilder::with_payload(json!(1))
        .header("drop-a", 1)
        .header("drop-b", 2)
        .header("keep", 3)
        .reply_channel("replies")
        .build();
    handler.handle_message(m).unwrap();
    assert!(replies.try_receive().is_some());

    let orphan = MessageBuilder::with_payload(json!(2)).build();
    assert!(handler.handle_message(orphan).is_err());

    assert_eq!(
        metrics.snapshot(),
        MetricsSnapshot { transformed: 2, headers_removed: 2, failed: 1 }
    );
}

proptest! {
    #[test]
    fn removed_count_matches_dropped_headers(drops in 0usize..8, keeps in 0usize..8) {
        let metrics = HandlerMetrics::new();
        let (handler, replies) = handler_with(&metrics);
        let builder = (0..drops).fold(MessageBuilder::with_payload(json!(null)), |b, i| b.header(format!("drop-{i}"), i));
        let builder = (0..keeps).fold(builder, |b, i| b.header(format!("keep-{i}"), i));
        handler.handle_message(builder.reply_channel("replies").build()).unwrap();

        let out = replies.try_receive().unwrap();
        prop_assert_eq!(out.headers().len(), keeps + 1);
        prop_assert_eq!(metrics.snapshot().headers_removed, drops as u64);
        prop_assert_eq!(metrics.snapshot().failed, 0);
    }
}
