//! Thumbnails from `.tbn` side files, falling back to a preview still for video.

use std::path::Path;

use pith_core::id::encode_id_path;
use pith_core::{Item, ItemType, mimetypes};

use crate::provider::MetadataProvider;
use crate::{EnrichContext, Enrichment, MetadataError};

const PREVIEW_OFFSET: &str = "0:10:00";

/// Owns `thumbnail` and `still`.
pub struct ThumbnailProvider;

#[async_trait::async_trait]
impl MetadataProvider for ThumbnailProvider {
    fn name(&self) -> &str {
        "thumbnails"
    }

    fn applies_to(&self, _ctx: &EnrichContext, _path: &Path, item: &Item) -> bool {
        item.item_type == ItemType::File
    }

    async fn get(
        &self,
        ctx: &EnrichContext,
        path: &Path,
        item: &Item,
    ) -> Result<Enrichment, MetadataError> {
        let own = path.with_extension("tbn");
        let candidates = [
            Some(own),
            path.parent().map(|dir| dir.join("movie.tbn")),
        ];

        for tbn in candidates.into_iter().flatten() {
            if tbn != path && tokio::fs::try_exists(&tbn).await? {
                return Ok(Enrichment {
                    thumbnail: ctx.stream_url(&tbn),
                    ..Default::default()
                });
            }
        }

        let still = item
            .mimetype
            .as_deref()
            .filter(|m| mimetypes::is_video(m))
            .map(|_| {
                format!(
                    "{}preview/{}/{PREVIEW_OFFSET}.jpg",
                    ctx.root_url,
                    encode_id_path(&item.id)
                )
            });

        Ok(Enrichment {
            still,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(id: &str) -> Item {
        let mut item = Item::file(id, id);
        item.mimetype = Some("video/x-matroska".into());
        item
    }

    #[tokio::test]
    async fn prefers_own_tbn() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.mkv"), b"").unwrap();
        std::fs::write(dir.path().join("a.tbn"), b"").unwrap();
        std::fs::write(dir.path().join("movie.tbn"), b"").unwrap();
        let ctx = EnrichContext::new(dir.path(), "http://h/");

        let out = ThumbnailProvider
            .get(&ctx, &dir.path().join("a.mkv"), &video("a.mkv"))
            .await
            .unwrap();
        assert_eq!(out.thumbnail.as_deref(), Some("http://h/stream/a.tbn"));
        assert_eq!(out.still, None);
    }

    #[tokio::test]
    async fn falls_back_to_movie_tbn() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("Film")).unwrap();
        std::fs::write(dir.path().join("Film/movie.tbn"), b"").unwrap();
        let ctx = EnrichContext::new(dir.path(), "http://h/");

        let out = ThumbnailProvider
            .get(&ctx, &dir.path().join("Film/f.mkv"), &video("Film/f.mkv"))
            .await
            .unwrap();
        assert_eq!(out.thumbnail.as_deref(), Some("http://h/stream/Film/movie.tbn"));
    }

    #[tokio::test]
    async fn video_without_tbn_gets_preview_still() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = EnrichContext::new(dir.path(), "http://h/");

        let out = ThumbnailProvider
            .get(&ctx, &dir.path().join("My Film.mkv"), &video("My Film.mkv"))
            .await
            .unwrap();
        assert_eq!(out.thumbnail, None);
        assert_eq!(
            out.still.as_deref(),
            Some("http://h/preview/My%20Film.mkv/0:10:00.jpg")
        );
    }

    #[tokio::test]
    async fn non_video_without_tbn_gets_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = EnrichContext::new(dir.path(), "http://h/");
        let item = Item::file("notes.txt", "notes.txt");

        let out = ThumbnailProvider
            .get(&ctx, &dir.path().join("notes.txt"), &item)
            .await
            .unwrap();
        assert!(out.is_empty());
        assert!(!ThumbnailProvider.applies_to(&ctx, dir.path(), &Item::container("x", "x")));
    }
}
