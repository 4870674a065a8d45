//! Channel mirroring a Sonarr show → season → episode catalog.
//!
//! This channel is a pure index. Streams and play state are delegated to the
//! files channel by resolving the episode's file path through
//! [`Channel::resolve_file`].

pub mod aggregate;
pub mod api;
pub mod id;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use futures::future::{join_all, try_join_all};
use pith_core::{Channel, ChannelError, Item, PlayState, StreamDescriptor, StreamOptions};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::aggregate::{aggregate_play_state, has_new};
use crate::api::{Episode, EpisodeFile, Series, SonarrApi, parse_date};
use crate::id::SonarrId;

pub const CHANNEL_ID: &str = "sonarr";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SonarrConfig {
    pub enabled: bool,
    pub url: String,
    pub apikey: String,
}

impl SonarrConfig {
    pub fn is_active(&self) -> bool {
        self.enabled && !self.url.is_empty()
    }
}

pub struct SonarrChannel {
    api: Arc<dyn SonarrApi>,
    files: Arc<dyn Channel>,
    max_age_for_new: chrono::Duration,
    /// Episode file records seen so far, by episode id.
    episode_files: Mutex<HashMap<u64, EpisodeFile>>,
}

impl SonarrChannel {
    pub fn new(
        api: Arc<dyn SonarrApi>,
        files: Arc<dyn Channel>,
        max_age_for_new: chrono::Duration,
    ) -> Self {
        Self {
            api,
            files,
            max_age_for_new,
            episode_files: Mutex::new(HashMap::new()),
        }
    }

    fn convert_season(&self, show: &Series, season: &api::Season) -> Item {
        let id = SonarrId::Season {
            show: show.id,
            season: season.season_number,
        };
        let mut item = Item::container(id.to_string(), format!("Season {}", season.season_number))
            .with_mediatype("season");
        item.season = Some(season.season_number);
        item.unavailable = season
            .statistics
            .as_ref()
            .is_some_and(|s| s.episode_file_count == 0);
        item
    }

    /// Episode item without play state.
    async fn episode_item(&self, ep: &Episode) -> Item {
        let mut item = Item::file(
            SonarrId::Episode(ep.id).to_string(),
            ep.title.clone().unwrap_or_default(),
        )
        .with_mediatype("episode");
        item.air_date = ep.air_date.clone();
        item.date_scanned = ep
            .episode_file
            .as_ref()
            .and_then(|f| parse_date(f.date_added.as_deref()));
        item.season = Some(ep.season_number);
        item.episode = Some(ep.episode_number);
        item.overview = ep.overview.clone();
        item.playable = ep.has_file;
        item.unavailable = !ep.has_file;

        let mut cache = self.episode_files.lock().await;
        match &ep.episode_file {
            Some(file) if ep.has_file => {
                cache.insert(ep.id, file.clone());
            }
            _ => {
                cache.remove(&ep.id);
            }
        }
        item
    }

    /// Episode item with its play state. A failed play-state lookup only
    /// leaves the state unset.
    async fn convert_episode(&self, ep: &Episode) -> Item {
        let mut item = self.episode_item(ep).await;
        match self.get_last_play_state_from_item(&item).await {
            Ok(state) => item.play_state = state,
            Err(e) => warn!(id = %item.id, error = %e, "play state lookup failed"),
        }
        item
    }

    async fn convert_series(&self, show: &Series, episodes: Option<&[Episode]>) -> Item {
        let img = |cover: &str| {
            show.images
                .iter()
                .find(|i| i.cover_type == cover)
                .and_then(|i| i.url.as_deref())
                .map(|u| self.api.image_url(u))
        };

        let id = SonarrId::Show(show.id).to_string();
        let mut item = Item::container(id, show.title.clone()).with_mediatype("show");
        item.backdrop = img("fanart");
        item.poster = img("poster");
        item.banner = img("banner");
        item.creation_time = parse_date(show.added.as_deref());
        item.genres = show.genres.clone();
        item.overview = show.overview.clone();
        item.no_seasons = Some(show.season_count);
        item.no_episodes = Some(show.episode_count);
        item.seasons = show
            .seasons
            .iter()
            .map(|s| self.convert_season(show, s))
            .collect();

        let Some(episodes) = episodes else {
            return item;
        };

        let mapped = join_all(episodes.iter().map(|e| self.convert_episode(e))).await;
        for season in &mut item.seasons {
            let season_eps: Vec<Item> = mapped
                .iter()
                .filter(|e| e.season == season.season)
                .cloned()
                .collect();
            season.play_state = aggregate_play_state(&season.id, &season_eps);
        }
        item.play_state = aggregate_play_state(&item.id, &item.seasons);
        item.has_new = Some(has_new(&mapped, Utc::now(), self.max_age_for_new));
        item.episodes = mapped;
        item
    }

    async fn season_episodes(&self, show: u64, season: u32) -> Result<Vec<Item>, ChannelError> {
        let all = self.api.episodes(show).await?;
        Ok(join_all(
            all.iter()
                .filter(|e| e.season_number == season)
                .map(|e| self.convert_episode(e)),
        )
        .await)
    }

    /// Root listing: every show, sorted by title, each with its episodes.
    async fn list_shows(&self) -> Result<Vec<Item>, ChannelError> {
        let mut series = self.api.series_list().await?;
        series.sort_by_cached_key(|s| s.title.to_lowercase());
        try_join_all(series.iter().map(|show| async move {
            let episodes = self.api.episodes(show.id).await?;
            Ok::<_, ChannelError>(self.convert_series(show, Some(&episodes)).await)
        }))
        .await
    }

    /// The episode file record for an episode item, cached or fetched.
    /// Unavailable episodes never resolve, whatever was cached earlier.
    async fn episode_file(&self, item: &Item) -> Result<EpisodeFile, ChannelError> {
        let SonarrId::Episode(episode_id) = SonarrId::parse(Some(&item.id))? else {
            return Err(ChannelError::Unsupported(format!(
                "{} has no file of its own",
                item.id
            )));
        };

        if item.unavailable {
            self.episode_files.lock().await.remove(&episode_id);
            return Err(ChannelError::NotFound(format!("{} has no file", item.id)));
        }
        if let Some(file) = self.episode_files.lock().await.get(&episode_id) {
            return Ok(file.clone());
        }

        let episode = self.api.episode(episode_id).await?;
        if !episode.has_file {
            return Err(ChannelError::NotFound(format!("{} has no file", item.id)));
        }
        let file = match episode.episode_file {
            Some(file) => file,
            None if episode.episode_file_id != 0 => {
                self.api.episode_file(episode.episode_file_id).await?
            }
            None => return Err(ChannelError::NotFound(format!("{} has no file", item.id))),
        };
        self.episode_files
            .lock()
            .await
            .insert(episode_id, file.clone());
        Ok(file)
    }

    /// Resolve an episode item to the files channel item that backs it.
    pub async fn get_file(&self, item: &Item) -> Result<Item, ChannelError> {
        let file = self.episode_file(item).await?;
        debug!(id = %item.id, path = %file.path, "delegating to files channel");
        self.files.resolve_file(&file.path).await
    }
}

#[async_trait::async_trait]
impl Channel for SonarrChannel {
    async fn list_contents(&self, container_id: Option<&str>) -> Result<Vec<Item>, ChannelError> {
        match SonarrId::parse(container_id)? {
            SonarrId::Root => self.list_shows().await,
            SonarrId::Show(show) => {
                let series = self.api.series(show).await?;
                Ok(series
                    .seasons
                    .iter()
                    .map(|s| self.convert_season(&series, s))
                    .collect())
            }
            SonarrId::Season { show, season } => self.season_episodes(show, season).await,
            SonarrId::Episode(_) => Err(ChannelError::InvalidId(format!(
                "{} is not a container",
                container_id.unwrap_or_default()
            ))),
        }
    }

    async fn get_item(&self, item_id: &str, detailed: bool) -> Result<Item, ChannelError> {
        match SonarrId::parse(Some(item_id))? {
            SonarrId::Root => Ok(Item::container("", "Sonarr").with_mediatype("root")),
            SonarrId::Show(show) => {
                let (episodes, series) =
                    tokio::try_join!(self.api.episodes(show), self.api.series(show))?;
                Ok(self.convert_series(&series, Some(&episodes)).await)
            }
            SonarrId::Season { show, season } => {
                let series = self.api.series(show).await?;
                let info = series
                    .seasons
                    .iter()
                    .find(|s| s.season_number == season)
                    .ok_or_else(|| ChannelError::NotFound(item_id.to_string()))?;
                let mut item = self.convert_season(&series, info);
                if detailed {
                    let episodes = self.season_episodes(show, season).await?;
                    item.play_state = aggregate_play_state(&item.id, &episodes);
                }
                Ok(item)
            }
            SonarrId::Episode(episode) => {
                let ep = self.api.episode(episode).await?;
                Ok(self.convert_episode(&ep).await)
            }
        }
    }

    async fn get_stream(
        &self,
        item: &Item,
        options: &StreamOptions,
    ) -> Result<StreamDescriptor, ChannelError> {
        let file = self.get_file(item).await?;
        self.files.get_stream(&file, options).await
    }

    async fn get_last_play_state(&self, item_id: &str) -> Result<Option<PlayState>, ChannelError> {
        match SonarrId::parse(Some(item_id))? {
            SonarrId::Episode(episode) => {
                let ep = self.api.episode(episode).await?;
                let item = self.episode_item(&ep).await;
                self.get_last_play_state_from_item(&item).await
            }
            _ => Ok(None),
        }
    }

    /// Only available episodes carry play state; it lives with their file.
    async fn get_last_play_state_from_item(
        &self,
        item: &Item,
    ) -> Result<Option<PlayState>, ChannelError> {
        if item.mediatype.as_deref() != Some("episode") || item.unavailable {
            return Ok(None);
        }
        let file = self.get_file(item).await?;
        self.files.get_last_play_state_from_item(&file).await
    }

    async fn put_play_state(&self, item_id: &str, state: PlayState) -> Result<(), ChannelError> {
        let item = self.get_item(item_id, false).await?;
        let file = self.get_file(&item).await?;
        self.files.put_play_state(&file.id, state).await
    }

    async fn resolve_file(&self, path: &str) -> Result<Item, ChannelError> {
        Err(ChannelError::Unsupported(format!(
            "sonarr cannot resolve file paths ({path})"
        )))
    }
}
