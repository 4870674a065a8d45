use std::path::{Path, PathBuf};

use pith_core::MediaFormat;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::TranscodeError;

/// Container, codec and duration of a media file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub container: String,
    pub duration_secs: f64,
    pub bitrate_kbps: Option<u32>,
    pub video_codec: Option<String>,
    pub audio_codecs: Vec<String>,
}

impl MediaInfo {
    pub fn duration_ms(&self) -> u64 {
        (self.duration_secs * 1000.0).round().max(0.0) as u64
    }

    pub fn format(&self) -> MediaFormat {
        MediaFormat {
            container: self.container.clone(),
            video_codec: self.video_codec.clone(),
            audio_codecs: self.audio_codecs.clone(),
            bitrate_kbps: self.bitrate_kbps,
        }
    }
}

/// Inspects media files.
#[async_trait::async_trait]
pub trait MediaProber: Send + Sync {
    async fn probe(&self, file: &Path) -> Result<MediaInfo, TranscodeError>;
}

/// Prober backed by the `ffprobe` binary.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    ffprobe_path: PathBuf,
}

impl FfprobeProber {
    pub fn new(ffprobe_path: impl Into<PathBuf>) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
        }
    }
}

impl Default for FfprobeProber {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

#[async_trait::async_trait]
impl MediaProber for FfprobeProber {
    async fn probe(&self, file: &Path) -> Result<MediaInfo, TranscodeError> {
        debug!(file = %file.display(), "probing media");
        let output = tokio::process::Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(file)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    TranscodeError::BinaryNotFound(self.ffprobe_path.clone())
                }
                _ => TranscodeError::ProbeFailed(format!("spawn failed: {e}")),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TranscodeError::ProbeFailed(format!(
                "{}: {}",
                file.display(),
                stderr.trim()
            )));
        }

        let raw: serde_json::Value = serde_json::from_slice(&output.stdout)
            .map_err(|e| TranscodeError::ProbeFailed(format!("parse JSON: {e}")))?;

        parse_probe_output(&raw)
    }
}

fn parse_probe_output(raw: &serde_json::Value) -> Result<MediaInfo, TranscodeError> {
    let format = raw
        .get("format")
        .ok_or_else(|| TranscodeError::ProbeFailed("missing 'format'".into()))?;

    let container = format
        .get("format_name")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string();

    let duration_secs: f64 = format
        .get("duration")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.0);

    let bitrate_kbps: Option<u32> = format
        .get("bit_rate")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<u64>().ok())
        .map(|b| (b / 1000) as u32);

    let streams = raw
        .get("streams")
        .and_then(|v| v.as_array())
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut video_codec = None;
    let mut audio_codecs = Vec::new();

    for s in streams {
        let codec = s
            .get("codec_name")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();
        match s.get("codec_type").and_then(|v| v.as_str()) {
            Some("video") if video_codec.is_none() => video_codec = Some(codec),
            Some("audio") => audio_codecs.push(codec),
            _ => {}
        }
    }

    Ok(MediaInfo {
        container,
        duration_secs,
        bitrate_kbps,
        video_codec,
        audio_codecs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_probe_json() {
        let json = serde_json::json!({
            "format": {
                "format_name": "matroska,webm",
                "duration": "7200.123",
                "bit_rate": "5000000"
            },
            "streams": [
                { "index": 0, "codec_type": "video", "codec_name": "h264" },
                { "index": 1, "codec_type": "audio", "codec_name": "aac" },
                { "index": 2, "codec_type": "audio", "codec_name": "ac3" },
                { "index": 3, "codec_type": "video", "codec_name": "mjpeg" },
                { "index": 4, "codec_type": "subtitle", "codec_name": "subrip" }
            ]
        });

        let info = parse_probe_output(&json).unwrap();
        assert_eq!(info.container, "matroska,webm");
        assert_eq!(info.duration_ms(), 7_200_123);
        assert_eq!(info.bitrate_kbps, Some(5000));
        assert_eq!(info.video_codec.as_deref(), Some("h264"));
        assert_eq!(info.audio_codecs, vec!["aac", "ac3"]);
    }

    #[test]
    fn missing_format_is_probe_failure() {
        let json = serde_json::json!({ "streams": [] });
        assert!(matches!(
            parse_probe_output(&json),
            Err(TranscodeError::ProbeFailed(_))
        ));
    }

    #[tokio::test]
    async fn missing_binary_is_reported() {
        let prober = FfprobeProber::new("/nonexistent/ffprobe-binary");
        let err = prober.probe(Path::new("/tmp/a.mkv")).await.unwrap_err();
        assert!(matches!(err, TranscodeError::BinaryNotFound(_)));
    }
}
