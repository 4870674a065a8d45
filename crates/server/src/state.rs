use std::sync::Arc;

use pith_core::{ChannelDescriptor, ChannelError, ChannelRegistry};
use pith_db::PlayStateStore;
use pith_files::FilesChannel;
use pith_metadata::MetadataPipeline;
use pith_sonarr::api::HttpSonarrApi;
use pith_sonarr::SonarrChannel;
use pith_transcoder::{FfprobeProber, MediaProber, ProfileRegistry};
use tracing::info;

use crate::config::Settings;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ChannelRegistry>,
    /// Serves stream bytes; the only channel that owns files.
    pub files: Arc<FilesChannel>,
}

impl AppState {
    /// Wire up every configured channel.
    pub fn from_settings(
        settings: &Settings,
        store: Arc<dyn PlayStateStore>,
    ) -> Result<Self, ChannelError> {
        let prober: Arc<dyn MediaProber> =
            Arc::new(FfprobeProber::new(settings.transcoder.ffprobe_path.clone()));
        Self::with_prober(settings, store, prober)
    }

    pub fn with_prober(
        settings: &Settings,
        store: Arc<dyn PlayStateStore>,
        prober: Arc<dyn MediaProber>,
    ) -> Result<Self, ChannelError> {
        let profiles = Arc::new(
            ProfileRegistry::with_defaults().merged(settings.transcoder.profiles.clone()),
        );
        info!(profiles = ?profiles.names(), "transcode profiles loaded");
        let pipeline = Arc::new(MetadataPipeline::with_defaults(settings.enrichment_timeout()));

        let files = Arc::new(FilesChannel::new(
            settings.files.clone(),
            &settings.root_url,
            store,
            pipeline,
            prober,
            profiles,
        ));
        info!(root = %files.root().display(), "files channel ready");

        let mut registry = ChannelRegistry::new();
        registry.register(
            ChannelDescriptor {
                id: pith_files::CHANNEL_ID.into(),
                title: "Files".into(),
                sequence: 0,
            },
            files.clone(),
        );

        if settings.sonarr.is_active() {
            let api = HttpSonarrApi::new(
                &settings.sonarr.url,
                &settings.sonarr.apikey,
                settings.remote_timeout(),
            )?;
            let sonarr = SonarrChannel::new(
                Arc::new(api),
                files.clone(),
                settings.max_age_for_new(),
            );
            registry.register(
                ChannelDescriptor {
                    id: pith_sonarr::CHANNEL_ID.into(),
                    title: "Sonarr".into(),
                    sequence: 10,
                },
                Arc::new(sonarr),
            );
        }

        Ok(Self {
            registry: Arc::new(registry),
            files,
        })
    }
}
