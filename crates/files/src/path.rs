//! Lexical id/path normalization and root containment.

use std::path::{Component, Path, PathBuf};

use pith_core::ChannelError;

/// Normalize a root-relative id to `a/b/c` form.
///
/// Absolute ids and ids whose `..` segments climb above the root are
/// rejected. The empty id is the root itself.
pub fn normalize_id(id: &str) -> Result<String, ChannelError> {
    let mut parts: Vec<String> = Vec::new();
    for comp in Path::new(id).components() {
        match comp {
            Component::Normal(seg) => parts.push(seg.to_string_lossy().into_owned()),
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.pop().is_none() {
                    return Err(ChannelError::NotContained(id.to_string()));
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(ChannelError::NotContained(id.to_string()));
            }
        }
    }
    Ok(parts.join("/"))
}

/// Resolve `.` and `..` in an absolute path without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// The id of `path` when it lies strictly inside `root` (both normalized).
///
/// Containment is component-wise, so `/media2/x` is not inside `/media`.
pub fn id_within(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let id = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    (!id.is_empty()).then_some(id)
}
