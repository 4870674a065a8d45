use std::path::Path;

use pith_core::Item;

use crate::{EnrichContext, Enrichment, MetadataError};

/// An enrichment provider.
///
/// Providers see the item read-only and return the fields they own; the
/// pipeline merges results after every selected provider has finished.
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Whether this provider has anything to say about `item` at `path`.
    fn applies_to(&self, ctx: &EnrichContext, path: &Path, item: &Item) -> bool;

    async fn get(
        &self,
        ctx: &EnrichContext,
        path: &Path,
        item: &Item,
    ) -> Result<Enrichment, MetadataError>;
}
