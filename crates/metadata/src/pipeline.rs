use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use pith_core::Item;
use tracing::{debug, warn};

use crate::fanart::FanartProvider;
use crate::provider::MetadataProvider;
use crate::thumbnails::ThumbnailProvider;
use crate::{EnrichContext, MetadataError};

/// Registered providers, selected per item and run concurrently.
pub struct MetadataPipeline {
    providers: Vec<Arc<dyn MetadataProvider>>,
    timeout: Duration,
}

impl MetadataPipeline {
    /// An empty pipeline; each provider call is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            providers: Vec::new(),
            timeout,
        }
    }

    /// Thumbnail and fanart providers, in that order.
    pub fn with_defaults(timeout: Duration) -> Self {
        let mut pipeline = Self::new(timeout);
        pipeline.register(Arc::new(ThumbnailProvider));
        pipeline.register(Arc::new(FanartProvider));
        pipeline
    }

    pub fn register(&mut self, provider: Arc<dyn MetadataProvider>) {
        self.providers.push(provider);
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Run every applicable provider and merge what they return into `item`.
    ///
    /// Returns once all selected providers have finished or timed out.
    /// Failures are logged and dropped. Results merge in registration order.
    pub async fn enrich(&self, ctx: &EnrichContext, path: &Path, item: &mut Item) {
        let selected: Vec<_> = self
            .providers
            .iter()
            .filter(|p| p.applies_to(ctx, path, item))
            .collect();
        if selected.is_empty() {
            return;
        }

        let snapshot: &Item = item;
        let results = join_all(selected.iter().map(|provider| async move {
            let res = match tokio::time::timeout(self.timeout, provider.get(ctx, path, snapshot))
                .await
            {
                Ok(res) => res,
                Err(_) => Err(MetadataError::Timeout(self.timeout)),
            };
            (provider.name(), res)
        }))
        .await;

        for (name, res) in results {
            match res {
                Ok(enrichment) => {
                    debug!(provider = name, id = %item.id, empty = enrichment.is_empty(), "provider finished");
                    enrichment.apply_to(item);
                }
                Err(e) => {
                    warn!(provider = name, id = %item.id, error = %e, "metadata provider failed");
                }
            }
        }
    }
}
