//! Request/reply handler around a [`MessageTransformer`](message_core::MessageTransformer).
//!
//! The handler applies its transformer once per inbound message and sends the
//! result to a named channel: the configured output channel if any, otherwise
//! the inbound `replyChannel` header. Failures go to the inbound `errorChannel`
//! when it resolves, and are returned to the caller otherwise.
//!
//! Channels are resolved by name through a [`ChannelRegistry`]. [`QueueChannel`]
//! is the in-process implementation used to collect replies.

#![deny(unsafe_code)]

mod channel;
mod handler;
mod registry;

pub use channel::{ChannelError, MessageChannel, QueueChannel};
pub use handler::{HandlerError, HandlerObserver, MessageTransformingHandler};
pub use registry::ChannelRegistry;

/// Messages routed by the handler carry JSON payloads.
pub type JsonMessage = message_core::Message<serde_json::Value>;
