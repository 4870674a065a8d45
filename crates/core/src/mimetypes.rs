//! Extension to mimetype lookup table.

/// Look up the mimetype for a file extension (with or without the leading dot).
pub fn for_extension(ext: &str) -> Option<&'static str> {
    let ext = ext.trim_start_matches('.').to_ascii_lowercase();
    let mime = match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "avi" => "video/x-msvideo",
        "mov" => "video/quicktime",
        "wmv" => "video/x-ms-wmv",
        "flv" => "video/x-flv",
        "ts" | "m2ts" | "mts" => "video/mp2t",
        "mpg" | "mpeg" | "mpe" => "video/mpeg",
        "3gp" => "video/3gpp",
        "ogv" => "video/ogg",
        "mp3" => "audio/mpeg",
        "flac" => "audio/flac",
        "m4a" => "audio/mp4",
        "ogg" | "oga" => "audio/ogg",
        "wav" => "audio/wav",
        "jpg" | "jpeg" | "tbn" => "image/jpeg",
        "png" => "image/png",
        _ => return None,
    };
    Some(mime)
}

/// Mimetype for a file name or path, based on its last extension.
pub fn for_path(path: &std::path::Path) -> Option<&'static str> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(for_extension)
}

pub fn is_video(mimetype: &str) -> bool {
    mimetype.starts_with("video/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn known_extensions() {
        assert_eq!(for_extension("mkv"), Some("video/x-matroska"));
        assert_eq!(for_extension(".MP4"), Some("video/mp4"));
        assert_eq!(for_path(Path::new("movies/a.b.webm")), Some("video/webm"));
    }

    #[test]
    fn unknown_extensions() {
        assert_eq!(for_extension("nfo"), None);
        assert_eq!(for_path(Path::new("README")), None);
    }
}
