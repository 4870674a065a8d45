use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether an item can be browsed into or is a leaf.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Container,
    #[default]
    File,
}

/// Playback status of a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayStatus {
    Unwatched,
    InProgress,
    Watched,
}

impl PlayStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unwatched => "unwatched",
            Self::InProgress => "in_progress",
            Self::Watched => "watched",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unwatched" => Some(Self::Unwatched),
            "in_progress" | "inprogress" => Some(Self::InProgress),
            "watched" => Some(Self::Watched),
            _ => None,
        }
    }
}

impl std::fmt::Display for PlayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last known playback state of an item. One record per item id; last write wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayState {
    #[serde(default)]
    pub id: String,
    pub status: PlayStatus,
    /// Playback position in seconds.
    #[serde(default)]
    pub position: Option<f64>,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
}

impl PlayState {
    pub fn new(id: impl Into<String>, status: PlayStatus) -> Self {
        Self {
            id: id.into(),
            status,
            position: None,
            updated: None,
        }
    }
}

/// The uniform content record every channel produces.
///
/// `id`, `item_type` and `mediatype` are identity; everything else is
/// presentation data and may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mediatype: Option<String>,

    // File-backed fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mimetype: Option<String>,
    #[serde(default)]
    pub playable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modification_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<DateTime<Utc>>,

    // Enrichment fields, owned by metadata providers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub still: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,

    // Catalog fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_scanned: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_seasons: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_episodes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_new: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub seasons: Vec<Item>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub episodes: Vec<Item>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub play_state: Option<PlayState>,
    #[serde(default)]
    pub unavailable: bool,
}

impl Item {
    pub fn container(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            item_type: ItemType::Container,
            ..Default::default()
        }
    }

    pub fn file(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            item_type: ItemType::File,
            ..Default::default()
        }
    }

    pub fn with_mediatype(mut self, mediatype: &str) -> Self {
        self.mediatype = Some(mediatype.to_string());
        self
    }

    pub fn is_container(&self) -> bool {
        self.item_type == ItemType::Container
    }
}

/// Container/codec summary of a probed media file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaFormat {
    pub container: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_codec: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audio_codecs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitrate_kbps: Option<u32>,
}

/// Where and how an item can be streamed.
///
/// With transcode targets requested, `url` is unset and `streams` holds one
/// descriptor per requested profile, in request order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mimetype: Option<String>,
    pub seekable: bool,
    /// Duration in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<MediaFormat>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub streams: Vec<StreamDescriptor>,
}

/// Options for `Channel::get_stream`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamOptions {
    /// Comma-separated transcode profile names.
    #[serde(default)]
    pub target: Option<String>,
}

impl StreamOptions {
    pub fn with_target(target: impl Into<String>) -> Self {
        Self {
            target: Some(target.into()),
        }
    }

    /// Requested profile names, trimmed, empty entries dropped.
    pub fn targets(&self) -> Vec<&str> {
        self.target
            .as_deref()
            .map(|t| {
                t.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// A named transcode target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscodeProfile {
    pub mimetype: String,
    #[serde(default)]
    pub seekable: bool,
    #[serde(default)]
    pub requires_playlist: bool,
}
