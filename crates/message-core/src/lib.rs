//! Message envelope primitives shared by the filter and the reply handler.

#![deny(unsafe_code)]

/// Version of the message-core library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod ids {
    //! ID utilities: message ids and timestamps.

    use std::time::{SystemTime, UNIX_EPOCH};
    use uuid::Uuid;

    /// Milliseconds since UNIX epoch (for timestamps).
    #[must_use]
    pub fn now_ms() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    /// Fresh message identifier (UUID v4).
    #[must_use]
    pub fn new_message_id() -> Uuid {
        Uuid::new_v4()
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn ids_are_unique() {
            assert_ne!(new_message_id(), new_message_id());
        }

        #[test]
        fn clock_is_past_2020() {
            assert!(now_ms() > 1_577_836_800_000);
        }
    }
}

pub mod headers {
    //! Header map and the well-known header keys.
    //!
    //! Well-known keys are plain entries in the map. Nothing in this crate
    //! protects them from removal; a transformer that matches them drops them.

    use serde::{Deserialize, Serialize};
    use serde_json::Value;
    use std::collections::BTreeMap;

    /// Correlates a reply (or a group of messages) with its originating request.
    pub const CORRELATION_ID: &str = "correlationId";
    /// Name of the channel replies should be sent to.
    pub const REPLY_CHANNEL: &str = "replyChannel";
    /// Name of the channel failures should be sent to.
    pub const ERROR_CHANNEL: &str = "errorChannel";
    /// Delivery priority hint.
    pub const PRIORITY: &str = "priority";
    /// Position of this message within a sequence.
    pub const SEQUENCE_NUMBER: &str = "sequenceNumber";
    /// Total number of messages in the sequence.
    pub const SEQUENCE_SIZE: &str = "sequenceSize";
    /// Expiration instant (millis since epoch).
    pub const EXPIRATION_DATE: &str = "expirationDate";

    /// Header map: unique string keys to JSON values, iterated in key order.
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Headers(BTreeMap<String, Value>);

    impl Headers {
        /// Empty header map.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Value stored under `key`.
        #[must_use]
        pub fn get(&self, key: &str) -> Option<&Value> {
            self.0.get(key)
        }

        /// Whether `key` is present.
        #[must_use]
        pub fn contains_key(&self, key: &str) -> bool {
            self.0.contains_key(key)
        }

        /// Number of headers.
        #[must_use]
        pub fn len(&self) -> usize {
            self.0.len()
        }

        /// True when there are no headers.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.0.is_empty()
        }

        /// Header keys in sorted order.
        pub fn keys(&self) -> impl Iterator<Item = &str> {
            self.0.keys().map(String::as_str)
        }

        /// `(key, value)` pairs in sorted key order.
        pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
            self.0.iter().map(|(k, v)| (k.as_str(), v))
        }

        /// Insert or replace a header, returning the previous value.
        pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
            self.0.insert(key.into(), value.into())
        }

        /// Remove a header, returning its value.
        pub fn remove(&mut self, key: &str) -> Option<Value> {
            self.0.remove(key)
        }

        /// Keep only the headers for which `keep` returns true.
        pub fn retain<F>(&mut self, mut keep: F)
        where
            F: FnMut(&str, &Value) -> bool,
        {
            self.0.retain(|k, v| keep(k, v));
        }

        /// The `correlationId` header when it is a string.
        #[must_use]
        pub fn correlation_id(&self) -> Option<&str> {
            self.get_str(CORRELATION_ID)
        }

        /// The `replyChannel` header when it is a string.
        #[must_use]
        pub fn reply_channel(&self) -> Option<&str> {
            self.get_str(REPLY_CHANNEL)
        }

        /// The `errorChannel` header when it is a string.
        #[must_use]
        pub fn error_channel(&self) -> Option<&str> {
            self.get_str(ERROR_CHANNEL)
        }

        fn get_str(&self, key: &str) -> Option<&str> {
            self.0.get(key).and_then(Value::as_str)
        }
    }

    impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Headers {
        fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
            Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
        }
    }

    impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Headers {
        fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
            self.0.extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
        }
    }

}

pub mod message {
    //! Immutable message envelope and its builder.

    use super::headers::{Headers, CORRELATION_ID, ERROR_CHANNEL, REPLY_CHANNEL};
    use super::ids::{new_message_id, now_ms};
    use serde::{Deserialize, Serialize};
    use serde_json::Value;
    use uuid::Uuid;

    /// Payload plus headers.
    ///
    /// `id` and `timestamp` are stamped once by [`MessageBuilder::build`] and are
    /// part of the envelope itself, not of the header map, so header
    /// transformations carry them over untouched.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Message<P> {
        id: Uuid,
        timestamp: u64,
        headers: Headers,
        payload: P,
    }

    impl<P> Message<P> {
        /// Unique message id.
        #[must_use]
        pub const fn id(&self) -> Uuid {
            self.id
        }

        /// Creation time in millis since epoch.
        #[must_use]
        pub const fn timestamp(&self) -> u64 {
            self.timestamp
        }

        /// Header map.
        #[must_use]
        pub const fn headers(&self) -> &Headers {
            &self.headers
        }

        /// Payload.
        #[must_use]
        pub const fn payload(&self) -> &P {
            &self.payload
        }

        /// Consume the message, returning the payload.
        pub fn into_payload(self) -> P {
            self.payload
        }

        /// Same envelope (id, timestamp, payload) with only the headers `keep` accepts.
        #[must_use]
        pub fn retain_headers<F>(mut self, keep: F) -> Self
        where
            F: FnMut(&str, &Value) -> bool,
        {
            self.headers.retain(keep);
            self
        }
    }

    /// Builder stamping a fresh id and timestamp on [`build`](Self::build).
    #[derive(Debug, Clone)]
    pub struct MessageBuilder<P> {
        payload: P,
        headers: Headers,
    }

    impl<P> MessageBuilder<P> {
        /// Start a message around `payload`.
        pub fn with_payload(payload: P) -> Self {
            Self { payload, headers: Headers::new() }
        }

        /// Set a header.
        #[must_use]
        pub fn header(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
            self.headers.insert(key, value);
            self
        }

        /// Copy every header from `headers`, replacing existing keys.
        #[must_use]
        pub fn copy_headers(mut self, headers: &Headers) -> Self {
            self.headers.extend(headers.iter().map(|(k, v)| (k, v.clone())));
            self
        }

        /// Set the `correlationId` header.
        #[must_use]
        pub fn correlation_id(self, id: impl Into<String>) -> Self {
            self.header(CORRELATION_ID, id.into())
        }

        /// Set the `replyChannel` header.
        #[must_use]
        pub fn reply_channel(self, name: impl Into<String>) -> Self {
            self.header(REPLY_CHANNEL, name.into())
        }

        /// Set the `errorChannel` header.
        #[must_use]
        pub fn error_channel(self, name: impl Into<String>) -> Self {
            self.header(ERROR_CHANNEL, name.into())
        }

        /// Build the message.
        pub fn build(self) -> Message<P> {
            Message {
                id: new_message_id(),
                timestamp: now_ms(),
                headers: self.headers,
                payload: self.payload,
            }
        }
    }

}

pub mod transform {
    //! The seam a handler drives: one message in, one message out.

    use super::message::Message;
    use thiserror::Error;

    /// Failure reported by a transformer.
    #[derive(Debug, Error)]
    pub enum TransformError {
        /// The transformer rejected or could not process the message.
        #[error("transform failed: {0}")]
        Failed(String),
    }

    /// Turns an inbound message into the message forwarded downstream.
    pub trait MessageTransformer<P>: Send + Sync {
        /// Transform `message`.
        fn transform_message(&self, message: Message<P>) -> Result<Message<P>, TransformError>;
    }
}

pub use headers::Headers;
pub use message::{Message, MessageBuilder};
pub use transform::{MessageTransformer, TransformError};
