//! Stream/profile negotiation.
//!
//! A transcode request names profiles in the `target` option. Each named
//! profile becomes one descriptor whose URL carries `transcode=<name>`, plus
//! `playlist=true` when the profile requires a playlist.

use pith_core::{StreamDescriptor, StreamOptions};
use tracing::debug;

use crate::ffprobe::MediaInfo;
use crate::profiles::ProfileRegistry;
use crate::TranscodeError;

pub const TRANSCODE_PARAM: &str = "transcode";
pub const PLAYLIST_PARAM: &str = "playlist";

/// Build the stream descriptor for a probed file served at `base_url`.
///
/// Fails on the first unknown profile name; no partial list is returned.
pub fn describe(
    base_url: &str,
    mimetype: Option<&str>,
    media: &MediaInfo,
    options: &StreamOptions,
    profiles: &ProfileRegistry,
) -> Result<StreamDescriptor, TranscodeError> {
    let duration = Some(media.duration_ms());
    let mut descriptor = StreamDescriptor {
        url: Some(base_url.to_string()),
        mimetype: mimetype.map(str::to_string),
        seekable: true,
        duration,
        format: Some(media.format()),
        streams: Vec::new(),
    };

    let targets = options.targets();
    if targets.is_empty() {
        return Ok(descriptor);
    }

    let mut streams = Vec::with_capacity(targets.len());
    for name in targets {
        let profile = profiles.get(name)?;
        let mut url = with_param(base_url, TRANSCODE_PARAM, name);
        if profile.requires_playlist {
            url = with_param(&url, PLAYLIST_PARAM, "true");
        }
        debug!(profile = name, url = %url, "transcode stream");
        streams.push(StreamDescriptor {
            url: Some(url),
            mimetype: Some(profile.mimetype.clone()),
            seekable: profile.seekable,
            duration,
            format: None,
            streams: Vec::new(),
        });
    }

    descriptor.url = None;
    descriptor.streams = streams;
    Ok(descriptor)
}

fn with_param(url: &str, key: &str, value: &str) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}{key}={}", urlencoding::encode(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media() -> MediaInfo {
        MediaInfo {
            container: "matroska,webm".into(),
            duration_secs: 42.5,
            bitrate_kbps: None,
            video_codec: Some("h264".into()),
            audio_codecs: vec!["aac".into()],
        }
    }

    const BASE: &str = "http://host:3333/stream/movies/a%20b.mkv";

    #[test]
    fn no_target_gives_single_url() {
        let d = describe(
            BASE,
            Some("video/x-matroska"),
            &media(),
            &StreamOptions::default(),
            &ProfileRegistry::with_defaults(),
        )
        .unwrap();
        assert_eq!(d.url.as_deref(), Some(BASE));
        assert_eq!(d.duration, Some(42_500));
        assert!(d.seekable);
        assert!(d.streams.is_empty());
        assert_eq!(d.format.unwrap().video_codec.as_deref(), Some("h264"));
    }

    #[test]
    fn one_stream_per_profile() {
        let d = describe(
            BASE,
            Some("video/x-matroska"),
            &media(),
            &StreamOptions::with_target("low,hls"),
            &ProfileRegistry::with_defaults(),
        )
        .unwrap();
        assert!(d.url.is_none());
        assert_eq!(d.streams.len(), 2);

        let low = d.streams[0].url.as_deref().unwrap();
        assert!(low.contains("transcode=low"));
        assert!(!low.contains("playlist"));

        let hls = d.streams[1].url.as_deref().unwrap();
        assert!(hls.contains("transcode=hls"));
        assert!(hls.ends_with("&playlist=true"));
        assert_eq!(
            d.streams[1].mimetype.as_deref(),
            Some(crate::hls::PLAYLIST_CONTENT_TYPE)
        );
    }

    #[test]
    fn unknown_profile_fails_fast() {
        let err = describe(
            BASE,
            None,
            &media(),
            &StreamOptions::with_target("low,bogus"),
            &ProfileRegistry::with_defaults(),
        )
        .unwrap_err();
        assert!(matches!(err, TranscodeError::UnknownProfile(n) if n == "bogus"));
    }

    #[test]
    fn params_append_to_existing_query() {
        assert_eq!(with_param("http://x/s?a=1", "transcode", "low"), "http://x/s?a=1&transcode=low");
    }
}
