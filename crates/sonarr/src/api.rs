//! Sonarr HTTP API client.
//!
//! Uses the v2 API: `api/series`, `api/episode`, `api/episodeFile`.

use std::time::Duration;

use chrono::{DateTime, Utc};
use pith_core::ChannelError;
use reqwest::Url;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub added: Option<String>,
    #[serde(default)]
    pub season_count: u32,
    #[serde(default)]
    pub episode_count: u32,
    #[serde(default)]
    pub seasons: Vec<Season>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub cover_type: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    pub season_number: u32,
    #[serde(default)]
    pub statistics: Option<SeasonStatistics>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonStatistics {
    #[serde(default)]
    pub episode_file_count: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub id: u64,
    #[serde(default)]
    pub series_id: u64,
    pub season_number: u32,
    pub episode_number: u32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub has_file: bool,
    #[serde(default)]
    pub episode_file_id: u64,
    #[serde(default)]
    pub episode_file: Option<EpisodeFile>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeFile {
    pub id: u64,
    pub path: String,
    #[serde(default)]
    pub date_added: Option<String>,
}

/// Lenient RFC 3339 parse; Sonarr omits or mangles dates now and then.
pub fn parse_date(s: Option<&str>) -> Option<DateTime<Utc>> {
    s.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&Utc))
}

/// Remote catalog operations the channel needs.
#[async_trait::async_trait]
pub trait SonarrApi: Send + Sync {
    async fn series_list(&self) -> Result<Vec<Series>, ChannelError>;
    async fn series(&self, id: u64) -> Result<Series, ChannelError>;
    async fn episodes(&self, series_id: u64) -> Result<Vec<Episode>, ChannelError>;
    async fn episode(&self, id: u64) -> Result<Episode, ChannelError>;
    async fn episode_file(&self, id: u64) -> Result<EpisodeFile, ChannelError>;

    /// Client-reachable URL for an image path reported by the API.
    fn image_url(&self, raw: &str) -> String;
}

pub struct HttpSonarrApi {
    base: Url,
    apikey: String,
    client: reqwest::Client,
}

impl HttpSonarrApi {
    pub fn new(url: &str, apikey: &str, timeout: Duration) -> Result<Self, ChannelError> {
        let normalized = if url.ends_with('/') {
            url.to_string()
        } else {
            format!("{url}/")
        };
        let base = Url::parse(&normalized)
            .map_err(|e| ChannelError::Remote(format!("invalid sonarr url {url}: {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChannelError::Remote(format!("http client: {e}")))?;
        Ok(Self {
            base,
            apikey: apikey.to_string(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ChannelError> {
        self.base
            .join(path)
            .map_err(|e| ChannelError::Remote(format!("bad endpoint {path}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ChannelError> {
        let url = self.endpoint(path)?;
        debug!(url = %url, "sonarr request");

        let mut all_params = vec![("apikey", self.apikey.as_str())];
        all_params.extend_from_slice(params);

        let resp = self
            .client
            .get(url)
            .query(&all_params)
            .send()
            .await
            .map_err(|e| ChannelError::Remote(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ChannelError::NotFound(format!("sonarr {path}")));
        }

        if !resp.status().is_success() {
            return Err(ChannelError::Remote(format!(
                "sonarr returned {} for {path}",
                resp.status()
            )));
        }

        resp.json()
            .await
            .map_err(|e| ChannelError::Remote(format!("parse JSON from {path}: {e}")))
    }
}

#[async_trait::async_trait]
impl SonarrApi for HttpSonarrApi {
    async fn series_list(&self) -> Result<Vec<Series>, ChannelError> {
        self.get_json("api/series", &[]).await
    }

    async fn series(&self, id: u64) -> Result<Series, ChannelError> {
        self.get_json(&format!("api/series/{id}"), &[]).await
    }

    async fn episodes(&self, series_id: u64) -> Result<Vec<Episode>, ChannelError> {
        let id = series_id.to_string();
        self.get_json("api/episode", &[("seriesId", id.as_str())]).await
    }

    async fn episode(&self, id: u64) -> Result<Episode, ChannelError> {
        self.get_json(&format!("api/episode/{id}"), &[]).await
    }

    async fn episode_file(&self, id: u64) -> Result<EpisodeFile, ChannelError> {
        self.get_json(&format!("api/episodeFile/{id}"), &[]).await
    }

    /// Images are served from `<base>/MediaCover/...`; route them through
    /// the authenticated API path instead.
    fn image_url(&self, raw: &str) -> String {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            return raw.to_string();
        }
        let rest = raw
            .strip_prefix(self.base.path())
            .unwrap_or_else(|| raw.trim_start_matches('/'));
        let sep = if rest.contains('?') { '&' } else { '?' };
        format!("{}api/{rest}{sep}apikey={}", self.base, self.apikey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(url: &str) -> HttpSonarrApi {
        HttpSonarrApi::new(url, "KEY", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn image_urls_go_through_api() {
        let a = api("http://nas:8989/sonarr");
        assert_eq!(
            a.image_url("/sonarr/MediaCover/3/poster.jpg?lastWrite=1"),
            "http://nas:8989/sonarr/api/MediaCover/3/poster.jpg?lastWrite=1&apikey=KEY"
        );
        let root = api("http://nas:8989/");
        assert_eq!(
            root.image_url("/MediaCover/3/fanart.jpg"),
            "http://nas:8989/api/MediaCover/3/fanart.jpg?apikey=KEY"
        );
        assert_eq!(root.image_url("https://cdn/x.jpg"), "https://cdn/x.jpg");
    }

    #[test]
    fn endpoints_resolve_under_base_path() {
        let a = api("http://nas:8989/sonarr");
        assert_eq!(
            a.endpoint("api/episode/4").unwrap().as_str(),
            "http://nas:8989/sonarr/api/episode/4"
        );
    }

    #[test]
    fn invalid_url_is_remote_error() {
        assert!(matches!(
            HttpSonarrApi::new("not a url", "k", Duration::from_secs(1)),
            Err(ChannelError::Remote(_))
        ));
    }

    #[test]
    fn episode_json_decodes() {
        let ep: Episode = serde_json::from_value(serde_json::json!({
            "id": 451,
            "seriesId": 3,
            "seasonNumber": 2,
            "episodeNumber": 5,
            "title": "Pilot",
            "airDate": "2019-04-01",
            "hasFile": true,
            "episodeFileId": 77,
            "episodeFile": { "id": 77, "path": "/tv/Show/S02E05.mkv", "dateAdded": "2019-04-02T10:00:00Z" },
            "monitored": true
        }))
        .unwrap();
        assert_eq!(ep.episode_file.as_ref().unwrap().path, "/tv/Show/S02E05.mkv");
        assert!(parse_date(ep.episode_file.unwrap().date_added.as_deref()).is_some());
        assert_eq!(parse_date(Some("garbage")), None);
    }
}
