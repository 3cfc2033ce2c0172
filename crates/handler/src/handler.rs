use crate::channel::ChannelError;
use crate::registry::ChannelRegistry;
use crate::JsonMessage;
use message_core::headers::CORRELATION_ID;
use message_core::{MessageBuilder, MessageTransformer, TransformError};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info_span, warn};
use uuid::Uuid;

/// Why a message could not be handled.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The transformer failed.
    #[error(transparent)]
    Transform(#[from] TransformError),
    /// No output channel is configured and the message has no `replyChannel`.
    #[error("no output channel or replyChannel header available for message {message_id}")]
    NoReplyDestination {
        /// Id of the inbound message.
        message_id: Uuid,
    },
    /// A destination name did not resolve.
    #[error("channel '{0}' is not registered")]
    UnknownChannel(String),
    /// The destination refused the message.
    #[error(transparent)]
    Send(#[from] ChannelError),
}

/// Observer invoked for each handled message.
///
/// Called inline on the handling thread; implementations must be cheap and
/// non-blocking.
///
/// `on_transformed` fires as soon as the transformer returns, before delivery
/// is attempted. A message whose reply cannot be delivered therefore sees
/// `on_transformed` followed by `on_failed`.
pub trait HandlerObserver: Send + Sync {
    /// The transformer produced `outbound` from a message carrying
    /// `inbound_headers` headers.
    fn on_transformed(&self, inbound_headers: usize, outbound: &JsonMessage);
    /// Handling `message_id` failed with `error`.
    fn on_failed(&self, message_id: Uuid, error: &HandlerError);
}

/// Applies a transformer and forwards the result to the reply destination.
pub struct MessageTransformingHandler<T> {
    transformer: T,
    registry: ChannelRegistry,
    output_channel: Option<String>,
    observers: Vec<Arc<dyn HandlerObserver>>,
}

impl<T> MessageTransformingHandler<T>
where
    T: MessageTransformer<Value>,
{
    /// Handler resolving destinations through `registry`.
    pub fn new(transformer: T, registry: ChannelRegistry) -> Self {
        Self { transformer, registry, output_channel: None, observers: Vec::new() }
    }

    /// Always send results to `name`, ignoring `replyChannel` headers.
    #[must_use]
    pub fn with_output_channel(mut self, name: impl Into<String>) -> Self {
        self.output_channel = Some(name.into());
        self
    }

    /// Add an observer; observers are notified in registration order.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn HandlerObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// The wrapped transformer.
    #[must_use]
    pub fn transformer(&self) -> &T {
        &self.transformer
    }

    /// Transform `message` once and deliver the result.
    ///
    /// Destinations are read from the inbound message, so a transformer that
    /// strips `replyChannel` or `errorChannel` does not affect routing. When
    /// the failure is delivered to the error channel this returns `Ok`.
    pub fn handle_message(&self, message: JsonMessage) -> Result<(), HandlerError> {
        let message_id = message.id();
        let span = info_span!("transformer.handle", message_id = %message_id);
        let _guard = span.enter();

        let headers = message.headers();
        let reply_to =
            self.output_channel.clone().or_else(|| headers.reply_channel().map(str::to_owned));
        let error_to = headers.error_channel().map(str::to_owned);
        let correlation = headers.get(CORRELATION_ID).cloned();
        let inbound_headers = headers.len();

        let result = self
            .transformer
            .transform_message(message)
            .map_err(HandlerError::from)
            .and_then(|out| {
                for obs in &self.observers {
                    obs.on_transformed(inbound_headers, &out);
                }
                let name = reply_to.ok_or(HandlerError::NoReplyDestination { message_id })?;
                self.send_to(&name, out)?;
                debug!(channel = %name, "reply sent");
                Ok(())
            });

        result.or_else(|err| {
            for obs in &self.observers {
                obs.on_failed(message_id, &err);
            }
            self.route_error(message_id, correlation, error_to.as_deref(), err)
        })
    }

    fn send_to(&self, name: &str, message: JsonMessage) -> Result<(), HandlerError> {
        let channel =
            self.registry.resolve(name).ok_or_else(|| HandlerError::UnknownChannel(name.into()))?;
        channel.send(message)?;
        Ok(())
    }

    fn route_error(
        &self,
        message_id: Uuid,
        correlation: Option<Value>,
        error_to: Option<&str>,
        err: HandlerError,
    ) -> Result<(), HandlerError> {
        let Some(name) = error_to else {
            warn!(error = %err, "handling failed, no error channel");
            return Err(err);
        };
        let mut builder = MessageBuilder::with_payload(json!({
            "failed_message_id": message_id.to_string(),
            "error": err.to_string(),
        }));
        if let Some(c) = correlation {
            builder = builder.header(CORRELATION_ID, c);
        }
        match self.send_to(name, builder.build()) {
            Ok(()) => {
                warn!(error = %err, channel = %name, "handling failed, routed to error channel");
                Ok(())
            }
            Err(send_err) => {
                warn!(error = %err, channel = %name, send_error = %send_err, "error channel unavailable");
                Err(err)
            }
        }
    }
}
