//! Item id grammar of the Sonarr channel.
//!
//! `sonarr.show.<id>`, `sonarr.show.<id>.season.<n>`, `sonarr.episode.<id>`;
//! an absent or empty id is the channel root.

use std::sync::LazyLock;

use pith_core::ChannelError;
use regex::Regex;

static RE_SHOW_OR_EPISODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^sonarr\.(show|episode)\.([^.]+)$").unwrap());

static RE_SEASON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^sonarr\.show\.([^.]+)\.season\.([^.]+)$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SonarrId {
    Root,
    Show(u64),
    Season { show: u64, season: u32 },
    Episode(u64),
}

impl SonarrId {
    pub fn parse(item_id: Option<&str>) -> Result<Self, ChannelError> {
        let id = match item_id {
            None | Some("") => return Ok(Self::Root),
            Some(id) => id,
        };
        let invalid = || ChannelError::InvalidId(id.to_string());

        if let Some(caps) = RE_SEASON.captures(id) {
            return Ok(Self::Season {
                show: caps[1].parse().map_err(|_| invalid())?,
                season: caps[2].parse().map_err(|_| invalid())?,
            });
        }

        let caps = RE_SHOW_OR_EPISODE.captures(id).ok_or_else(invalid)?;
        let remote: u64 = caps[2].parse().map_err(|_| invalid())?;
        match &caps[1] {
            "show" => Ok(Self::Show(remote)),
            _ => Ok(Self::Episode(remote)),
        }
    }

    pub fn mediatype(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Show(_) => "show",
            Self::Season { .. } => "season",
            Self::Episode(_) => "episode",
        }
    }
}

impl std::fmt::Display for SonarrId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Root => Ok(()),
            Self::Show(id) => write!(f, "sonarr.show.{id}"),
            Self::Season { show, season } => write!(f, "sonarr.show.{show}.season.{season}"),
            Self::Episode(id) => write!(f, "sonarr.episode.{id}"),
        }
    }
}
