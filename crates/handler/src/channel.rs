use crate::JsonMessage;
use thiserror::Error;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use tokio::time::{timeout, Duration};

/// Errors emitted when delivering to a channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The receiving side is gone.
    #[error("channel '{0}' is closed")]
    Closed(String),
}

/// Named destination a handler can send to.
pub trait MessageChannel: Send + Sync {
    /// Name the channel is registered under.
    fn name(&self) -> &str;
    /// Deliver `message`. Must not block.
    fn send(&self, message: JsonMessage) -> Result<(), ChannelError>;
}

/// Unbounded in-process queue.
#[derive(Debug)]
pub struct QueueChannel {
    name: String,
    tx: UnboundedSender<JsonMessage>,
    rx: Mutex<UnboundedReceiver<JsonMessage>>,
}

impl QueueChannel {
    /// Create an empty queue called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        let (tx, rx) = unbounded_channel();
        Self { name: name.into(), tx, rx: Mutex::new(rx) }
    }

    /// Pop the next message without waiting.
    ///
    /// Returns `None` when the queue is empty or another task is receiving.
    pub fn try_receive(&self) -> Option<JsonMessage> {
        self.rx.try_lock().ok()?.try_recv().ok()
    }

    /// Wait up to `wait` for the next message.
    pub async fn receive(&self, wait: Duration) -> Option<JsonMessage> {
        let mut rx = self.rx.lock().await;
        timeout(wait, rx.recv()).await.ok().flatten()
    }

    /// Stop accepting messages; later sends fail with [`ChannelError::Closed`].
    /// Messages already queued can still be received.
    pub async fn close(&self) {
        self.rx.lock().await.close();
    }
}

impl MessageChannel for QueueChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&self, message: JsonMessage) -> Result<(), ChannelError> {
        self.tx.send(message).map_err(|_| ChannelError::Closed(self.name.clone()))
    }
}
