//! Best-effort enrichment of items with presentation metadata.

pub mod fanart;
pub mod pipeline;
pub mod provider;
pub mod thumbnails;

use std::path::{Path, PathBuf};

use pith_core::id::encode_id_path;
use pith_core::Item;
use thiserror::Error;

pub use pipeline::MetadataPipeline;
pub use provider::MetadataProvider;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("provider error: {0}")]
    Provider(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("provider timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// What a provider may know about the channel it enriches for.
#[derive(Debug, Clone)]
pub struct EnrichContext {
    pub root_dir: PathBuf,
    /// Base URL with a trailing slash, e.g. `http://host:3333/`.
    pub root_url: String,
}

impl EnrichContext {
    pub fn new(root_dir: impl Into<PathBuf>, root_url: impl Into<String>) -> Self {
        let mut root_url = root_url.into();
        if !root_url.ends_with('/') {
            root_url.push('/');
        }
        Self {
            root_dir: root_dir.into(),
            root_url,
        }
    }

    /// Stream URL of a file under the root, or `None` when it lies elsewhere.
    pub fn stream_url(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root_dir).ok()?;
        let id = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        Some(format!("{}stream/{}", self.root_url, encode_id_path(&id)))
    }
}

/// Presentation fields produced by one provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enrichment {
    pub thumbnail: Option<String>,
    pub poster: Option<String>,
    pub backdrop: Option<String>,
    pub still: Option<String>,
}

impl Enrichment {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Fill blanks on `item`; fields already set are kept, so earlier
    /// providers win. Identity fields are never touched.
    pub fn apply_to(self, item: &mut Item) {
        macro_rules! fill {
            ($field:ident) => {
                if item.$field.is_none() {
                    item.$field = self.$field;
                }
            };
        }
        fill!(thumbnail);
        fill!(poster);
        fill!(backdrop);
        fill!(still);
    }
}
