use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::error::ChannelError;
use crate::types::{Item, PlayState, StreamDescriptor, StreamOptions};

/// Capability contract implemented by every content source.
#[async_trait::async_trait]
pub trait Channel: Send + Sync {
    /// List the children of a container; `None` lists the channel root.
    /// Order follows the underlying enumeration.
    async fn list_contents(&self, container_id: Option<&str>) -> Result<Vec<Item>, ChannelError>;

    /// Fetch one item. `detailed = false` skips enrichment.
    async fn get_item(&self, item_id: &str, detailed: bool) -> Result<Item, ChannelError>;

    async fn get_stream(
        &self,
        item: &Item,
        options: &StreamOptions,
    ) -> Result<StreamDescriptor, ChannelError>;

    /// Last play state of an item; `None` when nothing was recorded.
    async fn get_last_play_state(&self, item_id: &str) -> Result<Option<PlayState>, ChannelError>;

    /// Same as `get_last_play_state` for callers already holding the item.
    async fn get_last_play_state_from_item(
        &self,
        item: &Item,
    ) -> Result<Option<PlayState>, ChannelError> {
        self.get_last_play_state(&item.id).await
    }

    async fn put_play_state(&self, item_id: &str, state: PlayState) -> Result<(), ChannelError>;

    /// Map a path from another namespace into this channel's id space.
    async fn resolve_file(&self, path: &str) -> Result<Item, ChannelError>;
}

/// Registration record for a channel.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelDescriptor {
    pub id: String,
    pub title: String,
    pub sequence: i32,
}

/// Channels known to the host, dispatched by id.
#[derive(Default, Clone)]
pub struct ChannelRegistry {
    channels: Vec<(ChannelDescriptor, Arc<dyn Channel>)>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a channel. A later registration with the same id replaces the earlier one.
    pub fn register(&mut self, descriptor: ChannelDescriptor, channel: Arc<dyn Channel>) {
        info!(channel = %descriptor.id, title = %descriptor.title, "registering channel");
        self.channels.retain(|(d, _)| d.id != descriptor.id);
        self.channels.push((descriptor, channel));
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Channel>> {
        self.channels
            .iter()
            .find(|(d, _)| d.id == id)
            .map(|(_, c)| c.clone())
    }

    pub fn require(&self, id: &str) -> Result<Arc<dyn Channel>, ChannelError> {
        self.get(id)
            .ok_or_else(|| ChannelError::NotFound(format!("channel {id}")))
    }

    /// Registered channels ordered by sequence, then by id.
    pub fn list(&self) -> Vec<ChannelDescriptor> {
        let mut out: Vec<_> = self.channels.iter().map(|(d, _)| d.clone()).collect();
        out.sort_by(|a, b| a.sequence.cmp(&b.sequence).then_with(|| a.id.cmp(&b.id)));
        out
    }
}
