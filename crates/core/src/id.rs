//! Composite ids used by presentation adapters.
//!
//! Grammar: `channel:<channelId>[:<itemId>]`. The item id is opaque to the
//! core and may itself contain `:`; it belongs to the channel that owns it.

use crate::error::ChannelError;

const PREFIX: &str = "channel";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeId {
    pub channel_id: String,
    pub item_id: Option<String>,
}

impl CompositeId {
    pub fn new(channel_id: impl Into<String>, item_id: Option<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            item_id,
        }
    }

    pub fn parse(s: &str) -> Result<Self, ChannelError> {
        let mut parts = s.splitn(3, ':');
        if parts.next() != Some(PREFIX) {
            return Err(ChannelError::InvalidId(s.to_string()));
        }
        let channel_id = match parts.next() {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => return Err(ChannelError::InvalidId(s.to_string())),
        };
        let item_id = parts.next().filter(|i| !i.is_empty()).map(str::to_string);
        Ok(Self {
            channel_id,
            item_id,
        })
    }
}

impl std::fmt::Display for CompositeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.item_id {
            Some(item) => write!(f, "{PREFIX}:{}:{item}", self.channel_id),
            None => write!(f, "{PREFIX}:{}", self.channel_id),
        }
    }
}

/// Percent-encode each `/`-separated segment of an id, keeping the separators.
pub fn encode_id_path(id: &str) -> String {
    id.split('/')
        .map(|seg| urlencoding::encode(seg).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
