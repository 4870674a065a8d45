//! Content-channel model shared by every channel and the host.

pub mod channel;
pub mod error;
pub mod id;
pub mod mimetypes;
pub mod types;

pub use channel::{Channel, ChannelDescriptor, ChannelRegistry};
pub use error::ChannelError;
pub use types::{
    Item, ItemType, MediaFormat, PlayState, PlayStatus, StreamDescriptor, StreamOptions,
    TranscodeProfile,
};
