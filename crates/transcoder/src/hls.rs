/// Content types of the transcode outputs the built-in profiles produce.

/// HLS master/variant playlists.
pub const PLAYLIST_CONTENT_TYPE: &str = "application/vnd.apple.mpegurl";

/// Fragmented MP4 progressive output.
pub const MP4_CONTENT_TYPE: &str = "video/mp4";

/// WebM progressive output.
pub const WEBM_CONTENT_TYPE: &str = "video/webm";

/// Whether clients must fetch a playlist rather than the stream itself.
pub fn is_playlist_type(mimetype: &str) -> bool {
    mimetype.eq_ignore_ascii_case(PLAYLIST_CONTENT_TYPE)
        || mimetype.eq_ignore_ascii_case("application/x-mpegurl")
}
