use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use pith_core::{ChannelError, mimetypes};
use serde::Deserialize;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("only bytes ranges supported")]
    Unit,
    #[error("multi-range not supported")]
    MultiRange,
    #[error("malformed range")]
    Malformed,
    #[error("range not satisfiable")]
    Unsatisfiable,
}

/// A single byte range, end inclusive.
#[derive(Debug, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end_inclusive: u64,
}

/// Parse an HTTP Range header per RFC 7233.
/// Only supports single byte ranges: `bytes=start-end`, `bytes=start-` or `bytes=-suffix`.
pub fn parse_range_header(range_str: &str, file_size: u64) -> Result<ByteRange, RangeError> {
    let ranges = range_str
        .trim()
        .strip_prefix("bytes=")
        .ok_or(RangeError::Unit)?;

    if ranges.contains(',') {
        return Err(RangeError::MultiRange);
    }
    if file_size == 0 {
        return Err(RangeError::Unsatisfiable);
    }

    let (start_s, end_s) = ranges.split_once('-').ok_or(RangeError::Malformed)?;

    if start_s.is_empty() {
        let suffix: u64 = end_s.parse().map_err(|_| RangeError::Malformed)?;
        if suffix == 0 {
            return Err(RangeError::Unsatisfiable);
        }
        return Ok(ByteRange {
            start: file_size.saturating_sub(suffix),
            end_inclusive: file_size - 1,
        });
    }

    let start: u64 = start_s.parse().map_err(|_| RangeError::Malformed)?;
    let end: u64 = if end_s.is_empty() {
        file_size - 1
    } else {
        end_s.parse().map_err(|_| RangeError::Malformed)?
    };

    if start >= file_size {
        return Err(RangeError::Unsatisfiable);
    }
    let end = end.min(file_size - 1);
    if start > end {
        return Err(RangeError::Malformed);
    }

    Ok(ByteRange {
        start,
        end_inclusive: end,
    })
}

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    transcode: Option<String>,
}

/// Serve the bytes of a files-channel item with HTTP Range support.
/// GET /stream/{*path}
pub async fn stream_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(query): Query<StreamQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if let Some(profile) = query.transcode {
        return Err(ChannelError::Unsupported(format!(
            "transcoding to {profile} is handled by the transcode service"
        ))
        .into());
    }

    // get_file refuses ids outside the root
    let file_path = state.files.get_file(&path)?;
    let meta = tokio::fs::metadata(&file_path)
        .await
        .map_err(|_| ChannelError::NotFound(path.clone()))?;
    if !meta.is_file() {
        return Err(ChannelError::NotFound(path).into());
    }

    let file_size = meta.len();
    let content_type = mimetypes::for_path(&file_path).unwrap_or("application/octet-stream");
    let mut file = tokio::fs::File::open(&file_path)
        .await
        .map_err(ChannelError::Io)?;

    let Some(range_header) = headers.get(header::RANGE).and_then(|v| v.to_str().ok()) else {
        debug!(path = %path, size = file_size, "streaming whole file");
        let stream = tokio_util::io::ReaderStream::new(file);
        return Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, content_type.to_string()),
                (header::CONTENT_LENGTH, file_size.to_string()),
                (header::ACCEPT_RANGES, "bytes".to_string()),
            ],
            Body::from_stream(stream),
        )
            .into_response());
    };

    let range = match parse_range_header(range_header, file_size) {
        Ok(r) => r,
        Err(e) => {
            debug!(path = %path, range = range_header, error = %e, "bad range");
            return Ok((
                StatusCode::RANGE_NOT_SATISFIABLE,
                [(header::CONTENT_RANGE, format!("bytes */{file_size}"))],
            )
                .into_response());
        }
    };

    let content_length = range.end_inclusive - range.start + 1;
    file.seek(std::io::SeekFrom::Start(range.start))
        .await
        .map_err(ChannelError::Io)?;
    let stream = tokio_util::io::ReaderStream::new(file.take(content_length));

    Ok((
        StatusCode::PARTIAL_CONTENT,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_LENGTH, content_length.to_string()),
            (
                header::CONTENT_RANGE,
                format!("bytes {}-{}/{}", range.start, range.end_inclusive, file_size),
            ),
            (header::ACCEPT_RANGES, "bytes".to_string()),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_range_basic() {
        let r = parse_range_header("bytes=0-999", 5000).unwrap();
        assert_eq!(r, ByteRange { start: 0, end_inclusive: 999 });
    }

    #[test]
    fn parse_range_open_end() {
        let r = parse_range_header("bytes=1000-", 5000).unwrap();
        assert_eq!(r.start, 1000);
        assert_eq!(r.end_inclusive, 4999);
    }

    #[test]
    fn parse_range_suffix() {
        let r = parse_range_header("bytes=-500", 5000).unwrap();
        assert_eq!(r.start, 4500);
        assert_eq!(r.end_inclusive, 4999);
    }

    #[test]
    fn parse_range_clamps_end() {
        let r = parse_range_header("bytes=0-99999", 5000).unwrap();
        assert_eq!(r.end_inclusive, 4999);
    }

    #[test]
    fn parse_range_rejections() {
        assert_eq!(parse_range_header("bytes=5000-", 5000), Err(RangeError::Unsatisfiable));
        assert_eq!(parse_range_header("bytes=0-100, 200-300", 5000), Err(RangeError::MultiRange));
        assert_eq!(parse_range_header("items=0-1", 5000), Err(RangeError::Unit));
        assert_eq!(parse_range_header("bytes=0-1", 0), Err(RangeError::Unsatisfiable));
        assert_eq!(parse_range_header("bytes=9-3", 5000), Err(RangeError::Malformed));
    }
}
