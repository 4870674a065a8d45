#![allow(clippy::collapsible_if)]
pub mod ffprobe;
pub mod hls;
pub mod negotiate;
pub mod profiles;

use std::path::PathBuf;

use pith_core::ChannelError;
use thiserror::Error;

pub use ffprobe::{FfprobeProber, MediaInfo, MediaProber};
pub use profiles::ProfileRegistry;

#[derive(Error, Debug)]
pub enum TranscodeError {
    #[error("ffprobe not found at {0}")]
    BinaryNotFound(PathBuf),
    #[error("ffprobe failed: {0}")]
    ProbeFailed(String),
    #[error("unknown transcode profile: {0}")]
    UnknownProfile(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<TranscodeError> for ChannelError {
    fn from(e: TranscodeError) -> Self {
        match e {
            TranscodeError::UnknownProfile(name) => ChannelError::UnknownProfile(name),
            other => ChannelError::Probe(other.to_string()),
        }
    }
}
