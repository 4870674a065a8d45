//! Channel over a local directory tree.
//!
//! Item ids are root-relative paths (`movies/Alien (1979)/Alien.mkv`). This
//! channel is the only owner of file bytes and play state; other channels
//! reach both through [`Channel::resolve_file`].

pub mod path;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::{StreamExt, TryStreamExt};
use pith_core::id::encode_id_path;
use pith_core::{
    Channel, ChannelError, Item, PlayState, StreamDescriptor, StreamOptions, mimetypes,
};
use pith_db::PlayStateStore;
use pith_metadata::{EnrichContext, MetadataPipeline};
use pith_transcoder::{negotiate, MediaProber, ProfileRegistry};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::path::{id_within, normalize_id, normalize_path};

pub const CHANNEL_ID: &str = "files";

/// Entries materialized concurrently per listing.
const LIST_CONCURRENCY: usize = 16;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    pub root_dir: PathBuf,
    pub show_hidden_files: bool,
    /// Extensions never listed, with the leading dot (`.nfo`).
    pub exclude_extensions: Vec<String>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("/media"),
            show_hidden_files: false,
            exclude_extensions: [".nfo", ".tbn", ".jpg", ".jpeg", ".png", ".srt", ".txt"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

pub struct FilesChannel {
    root: PathBuf,
    show_hidden_files: bool,
    exclude_extensions: Vec<String>,
    ctx: EnrichContext,
    store: Arc<dyn PlayStateStore>,
    pipeline: Arc<MetadataPipeline>,
    prober: Arc<dyn MediaProber>,
    profiles: Arc<ProfileRegistry>,
}

impl FilesChannel {
    pub fn new(
        config: FilesConfig,
        root_url: &str,
        store: Arc<dyn PlayStateStore>,
        pipeline: Arc<MetadataPipeline>,
        prober: Arc<dyn MediaProber>,
        profiles: Arc<ProfileRegistry>,
    ) -> Self {
        let absolute = std::path::absolute(&config.root_dir).unwrap_or(config.root_dir);
        let root = normalize_path(&absolute);
        let exclude_extensions = config
            .exclude_extensions
            .iter()
            .map(|e| {
                let e = e.to_ascii_lowercase();
                if e.starts_with('.') { e } else { format!(".{e}") }
            })
            .collect();

        Self {
            ctx: EnrichContext::new(root.clone(), root_url),
            root,
            show_hidden_files: config.show_hidden_files,
            exclude_extensions,
            store,
            pipeline,
            prober,
            profiles,
        }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    /// Absolute path of an item id. Ids escaping the root are refused.
    pub fn get_file(&self, item_id: &str) -> Result<PathBuf, ChannelError> {
        let rel = normalize_id(item_id)?;
        Ok(if rel.is_empty() {
            self.root.clone()
        } else {
            self.root.join(rel)
        })
    }

    /// Streaming endpoint for an item id.
    pub fn stream_url(&self, item_id: &str) -> String {
        format!("{}stream/{}", self.ctx.root_url, encode_id_path(item_id))
    }

    fn is_listed(&self, name: &str) -> bool {
        if name.starts_with('.') && !self.show_hidden_files {
            return false;
        }
        let ext = std::path::Path::new(name)
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_ascii_lowercase()));
        !ext.is_some_and(|e| self.exclude_extensions.contains(&e))
    }

    fn title_for(&self, rel: &str) -> String {
        match rel.rsplit('/').next() {
            Some(last) if !last.is_empty() => last.to_string(),
            _ => self
                .root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Files".to_string()),
        }
    }

    /// Stat-backed item, without enrichment. A failed stat still yields an
    /// inert file item with no mimetype, size or times.
    async fn materialize(&self, rel: String, path: &std::path::Path) -> Item {
        let title = self.title_for(&rel);
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_dir() => Item::container(rel, title),
            Ok(meta) => {
                let mut item = Item::file(rel, title);
                item.mimetype = mimetypes::for_path(path).map(str::to_string);
                item.playable = item.mimetype.is_some();
                item.file_size = Some(meta.len());
                item.modification_time = meta.modified().ok().map(DateTime::<Utc>::from);
                item.creation_time = meta.created().ok().map(DateTime::<Utc>::from);
                item
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "stat failed");
                Item::file(rel, title)
            }
        }
    }
}

#[async_trait::async_trait]
impl Channel for FilesChannel {
    async fn list_contents(&self, container_id: Option<&str>) -> Result<Vec<Item>, ChannelError> {
        let container = container_id.map(normalize_id).transpose()?.unwrap_or_default();
        let dir = self.get_file(&container)?;
        debug!(dir = %dir.display(), "listing directory");

        let mut read_dir = tokio::fs::read_dir(&dir).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ChannelError::NotFound(container.clone()),
            _ => ChannelError::Io(e),
        })?;

        let mut ids = Vec::new();
        while let Some(entry) = read_dir.next_entry().await? {
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    warn!(dir = %dir.display(), name = ?raw, "skipping non utf-8 entry");
                    continue;
                }
            };
            if !self.is_listed(&name) {
                debug!(name = %name, "skipping entry");
                continue;
            }
            ids.push(if container.is_empty() {
                name
            } else {
                format!("{container}/{name}")
            });
        }

        futures::stream::iter(ids)
            .map(|id| async move { self.get_item(&id, false).await })
            .buffered(LIST_CONCURRENCY)
            .try_collect()
            .await
    }

    async fn get_item(&self, item_id: &str, detailed: bool) -> Result<Item, ChannelError> {
        let rel = normalize_id(item_id)?;
        let path = self.get_file(&rel)?;
        let mut item = self.materialize(rel, &path).await;

        if detailed {
            self.pipeline.enrich(&self.ctx, &path, &mut item).await;
            if !item.is_container() {
                item.play_state = self.store.get(&item.id).await?;
            }
        }
        Ok(item)
    }

    async fn get_stream(
        &self,
        item: &Item,
        options: &StreamOptions,
    ) -> Result<StreamDescriptor, ChannelError> {
        for name in options.targets() {
            self.profiles.get(name)?;
        }

        let path = self.get_file(&item.id)?;
        let info = self.prober.probe(&path).await?;
        let base_url = self.stream_url(&item.id);

        Ok(negotiate::describe(
            &base_url,
            item.mimetype.as_deref(),
            &info,
            options,
            &self.profiles,
        )?)
    }

    async fn get_last_play_state(&self, item_id: &str) -> Result<Option<PlayState>, ChannelError> {
        let id = normalize_id(item_id)?;
        Ok(self.store.get(&id).await?)
    }

    async fn put_play_state(&self, item_id: &str, mut state: PlayState) -> Result<(), ChannelError> {
        state.id = normalize_id(item_id)?;
        if state.updated.is_none() {
            state.updated = Some(Utc::now());
        }
        debug!(id = %state.id, status = %state.status, "put play state");
        self.store.put(&state).await?;
        Ok(())
    }

    async fn resolve_file(&self, path: &str) -> Result<Item, ChannelError> {
        let candidate = std::path::Path::new(path);
        if !candidate.is_absolute() {
            return Err(ChannelError::NotContained(path.to_string()));
        }
        let id = id_within(&self.root, &normalize_path(candidate))
            .ok_or_else(|| ChannelError::NotContained(path.to_string()))?;
        self.get_item(&id, true).await
    }
}
