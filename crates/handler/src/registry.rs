use crate::channel::MessageChannel;
use dashmap::DashMap;
use std::sync::Arc;

/// Name → channel lookup shared between handlers. Cheap to clone.
#[derive(Clone, Default)]
pub struct ChannelRegistry {
    channels: Arc<DashMap<String, Arc<dyn MessageChannel>>>,
}

impl ChannelRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `channel` under its own name, returning any channel it replaces.
    pub fn register(&self, channel: Arc<dyn MessageChannel>) -> Option<Arc<dyn MessageChannel>> {
        self.channels.insert(channel.name().to_string(), channel)
    }

    /// Channel registered as `name`.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn MessageChannel>> {
        self.channels.get(name).map(|c| Arc::clone(c.value()))
    }

    /// Unregister `name`.
    pub fn remove(&self, name: &str) -> Option<Arc<dyn MessageChannel>> {
        self.channels.remove(name).map(|(_, c)| c)
    }
}

impl std::fmt::Debug for ChannelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<String> = self.channels.iter().map(|e| e.key().clone()).collect();
        names.sort();
        f.debug_struct("ChannelRegistry").field("channels", &names).finish()
    }
}
