use std::collections::HashMap;

use pith_core::TranscodeProfile;

use crate::hls::{self, MP4_CONTENT_TYPE, PLAYLIST_CONTENT_TYPE, WEBM_CONTENT_TYPE};
use crate::TranscodeError;

/// Transcode profiles by name.
#[derive(Debug, Clone, Default)]
pub struct ProfileRegistry {
    profiles: HashMap<String, TranscodeProfile>,
}

impl ProfileRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in profiles: `low`, `high` and `hls`.
    pub fn with_defaults() -> Self {
        let mut reg = Self::empty();
        reg.insert(
            "low",
            TranscodeProfile {
                mimetype: WEBM_CONTENT_TYPE.into(),
                seekable: false,
                requires_playlist: false,
            },
        );
        reg.insert(
            "high",
            TranscodeProfile {
                mimetype: MP4_CONTENT_TYPE.into(),
                seekable: false,
                requires_playlist: false,
            },
        );
        reg.insert(
            "hls",
            TranscodeProfile {
                mimetype: PLAYLIST_CONTENT_TYPE.into(),
                seekable: true,
                requires_playlist: true,
            },
        );
        reg
    }

    /// Add or replace a profile. Playlist mimetypes always require a playlist.
    pub fn insert(&mut self, name: impl Into<String>, mut profile: TranscodeProfile) {
        profile.requires_playlist |= hls::is_playlist_type(&profile.mimetype);
        self.profiles.insert(name.into(), profile);
    }

    /// Layer `overrides` on top of this registry.
    pub fn merged(mut self, overrides: HashMap<String, TranscodeProfile>) -> Self {
        for (name, profile) in overrides {
            self.insert(name, profile);
        }
        self
    }

    pub fn get(&self, name: &str) -> Result<&TranscodeProfile, TranscodeError> {
        self.profiles
            .get(name)
            .ok_or_else(|| TranscodeError::UnknownProfile(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_present() {
        let reg = ProfileRegistry::with_defaults();
        assert_eq!(reg.names(), vec!["high", "hls", "low"]);
        assert!(reg.get("hls").unwrap().requires_playlist);
        assert!(!reg.get("low").unwrap().requires_playlist);
    }

    #[test]
    fn unknown_name_fails() {
        let reg = ProfileRegistry::with_defaults();
        assert!(matches!(
            reg.get("ultra"),
            Err(TranscodeError::UnknownProfile(n)) if n == "ultra"
        ));
    }

    #[test]
    fn overrides_replace_and_normalize() {
        let mut overrides = HashMap::new();
        overrides.insert(
            "low".to_string(),
            TranscodeProfile {
                mimetype: "application/x-mpegURL".into(),
                seekable: true,
                requires_playlist: false,
            },
        );
        let reg = ProfileRegistry::with_defaults().merged(overrides);
        let low = reg.get("low").unwrap();
        assert!(low.seekable);
        assert!(low.requires_playlist);
    }
}
