//! Poster and backdrop images stored next to the media.

use std::path::{Path, PathBuf};

use pith_core::{Item, ItemType, mimetypes};

use crate::provider::MetadataProvider;
use crate::{EnrichContext, Enrichment, MetadataError};

/// Owns `poster` and `backdrop`.
pub struct FanartProvider;

impl FanartProvider {
    /// Candidate (backdrop, poster) files, most specific first.
    fn candidates(path: &Path, item: &Item) -> (Vec<PathBuf>, Vec<PathBuf>) {
        if item.is_container() {
            return (
                vec![path.join("fanart.jpg")],
                vec![path.join("poster.jpg"), path.join("folder.jpg")],
            );
        }

        let Some(dir) = path.parent() else {
            return (Vec::new(), Vec::new());
        };
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        (
            vec![dir.join(format!("{stem}-fanart.jpg")), dir.join("fanart.jpg")],
            vec![
                dir.join(format!("{stem}-poster.jpg")),
                dir.join("poster.jpg"),
                dir.join("folder.jpg"),
            ],
        )
    }
}

async fn first_existing(ctx: &EnrichContext, files: &[PathBuf]) -> Result<Option<String>, MetadataError> {
    for f in files {
        if tokio::fs::try_exists(f).await? {
            return Ok(ctx.stream_url(f));
        }
    }
    Ok(None)
}

#[async_trait::async_trait]
impl MetadataProvider for FanartProvider {
    fn name(&self) -> &str {
        "fanart"
    }

    fn applies_to(&self, _ctx: &EnrichContext, _path: &Path, item: &Item) -> bool {
        match item.item_type {
            ItemType::Container => true,
            ItemType::File => item.mimetype.as_deref().is_some_and(mimetypes::is_video),
        }
    }

    async fn get(
        &self,
        ctx: &EnrichContext,
        path: &Path,
        item: &Item,
    ) -> Result<Enrichment, MetadataError> {
        let (backdrops, posters) = Self::candidates(path, item);
        let (backdrop, poster) = tokio::try_join!(
            first_existing(ctx, &backdrops),
            first_existing(ctx, &posters)
        )?;
        Ok(Enrichment {
            backdrop,
            poster,
            ..Default::default()
        })
    }
}
