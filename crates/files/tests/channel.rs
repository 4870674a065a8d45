use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use pith_core::{Channel, ChannelError, ItemType, PlayState, PlayStatus, StreamOptions};
use pith_db::MemoryPlayStateStore;
use pith_files::{FilesChannel, FilesConfig};
use pith_metadata::MetadataPipeline;
use pith_transcoder::{MediaInfo, MediaProber, ProfileRegistry, TranscodeError};
use tempfile::TempDir;

struct FakeProber {
    fail: bool,
}

#[async_trait::async_trait]
impl MediaProber for FakeProber {
    async fn probe(&self, file: &Path) -> Result<MediaInfo, TranscodeError> {
        if self.fail {
            return Err(TranscodeError::ProbeFailed(format!("{}: invalid data", file.display())));
        }
        Ok(MediaInfo {
            container: "matroska,webm".into(),
            duration_secs: 90.0,
            bitrate_kbps: Some(4000),
            video_codec: Some("h264".into()),
            audio_codecs: vec!["aac".into()],
        })
    }
}

fn fixture() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::create_dir_all(root.join("movies/Alien")).unwrap();
    std::fs::write(root.join("movies/Alien/Alien.mkv"), b"not really a movie").unwrap();
    std::fs::write(root.join("movies/Alien/Alien.nfo"), b"<movie/>").unwrap();
    std::fs::write(root.join("movies/Alien/Alien-poster.jpg"), b"").unwrap();
    std::fs::write(root.join("movies/Alien/Alien.tbn"), b"").unwrap();
    std::fs::write(root.join("movies/b.mp4"), b"").unwrap();
    std::fs::create_dir(root.join(".nfo-cache")).unwrap();
    std::fs::write(root.join(".hidden.nfo"), b"").unwrap();
    std::fs::write(root.join("readme.txt"), b"").unwrap();
    dir
}

fn channel_with(root: &Path, show_hidden_files: bool, fail_probe: bool) -> FilesChannel {
    let config = FilesConfig {
        root_dir: root.to_path_buf(),
        show_hidden_files,
        exclude_extensions: vec![".nfo".into(), "TXT".into(), ".jpg".into(), ".tbn".into()],
    };
    FilesChannel::new(
        config,
        "http://pith:3333/",
        Arc::new(MemoryPlayStateStore::new()),
        Arc::new(MetadataPipeline::with_defaults(Duration::from_secs(5))),
        Arc::new(FakeProber { fail: fail_probe }),
        Arc::new(ProfileRegistry::with_defaults()),
    )
}

fn channel(root: &Path) -> FilesChannel {
    channel_with(root, false, false)
}

fn titles(items: &[pith_core::Item]) -> Vec<String> {
    let mut t: Vec<_> = items.iter().map(|i| i.title.clone()).collect();
    t.sort();
    t
}

#[tokio::test]
async fn root_listing_hides_dotfiles_and_excluded_extensions() {
    let dir = fixture();
    let items = channel(dir.path()).list_contents(None).await.unwrap();
    assert_eq!(titles(&items), vec!["movies"]);
    assert_eq!(items[0].item_type, ItemType::Container);
    assert_eq!(items[0].id, "movies");
}

#[tokio::test]
async fn hidden_files_shown_when_configured() {
    let dir = fixture();
    let items = channel_with(dir.path(), true, false)
        .list_contents(None)
        .await
        .unwrap();
    // .hidden.nfo stays excluded by extension regardless of the hidden policy
    assert_eq!(titles(&items), vec![".nfo-cache", "movies"]);
}

#[tokio::test]
async fn nested_listing_uses_root_relative_ids() {
    let dir = fixture();
    let items = channel(dir.path())
        .list_contents(Some("movies/Alien"))
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
    let movie = &items[0];
    assert_eq!(movie.id, "movies/Alien/Alien.mkv");
    assert_eq!(movie.mimetype.as_deref(), Some("video/x-matroska"));
    assert!(movie.playable);
    assert_eq!(movie.file_size, Some(18));
    assert!(movie.modification_time.is_some());
    // listings skip enrichment
    assert_eq!(movie.thumbnail, None);
}

#[tokio::test]
async fn listing_preserves_enumeration_order() {
    let dir = fixture();
    let ch = channel(dir.path());
    let expected: Vec<String> = std::fs::read_dir(dir.path().join("movies"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    let items = ch.list_contents(Some("movies")).await.unwrap();
    let got: Vec<_> = items.iter().map(|i| i.title.clone()).collect();
    assert_eq!(got, expected);
}

#[tokio::test]
async fn listed_ids_resolve_to_same_identity() {
    let dir = fixture();
    let ch = channel(dir.path());
    for container in [None, Some("movies"), Some("movies/Alien")] {
        for listed in ch.list_contents(container).await.unwrap() {
            let item = ch.get_item(&listed.id, true).await.unwrap();
            assert_eq!(item.id, listed.id);
            assert_eq!(item.item_type, listed.item_type);
            assert_eq!(item.mediatype, listed.mediatype);
        }
    }
}

#[tokio::test]
async fn detailed_item_is_enriched() {
    let dir = fixture();
    let item = channel(dir.path())
        .get_item("movies/Alien/Alien.mkv", true)
        .await
        .unwrap();
    assert_eq!(
        item.thumbnail.as_deref(),
        Some("http://pith:3333/stream/movies/Alien/Alien.tbn")
    );
    assert_eq!(
        item.poster.as_deref(),
        Some("http://pith:3333/stream/movies/Alien/Alien-poster.jpg")
    );
}

#[tokio::test]
async fn missing_path_yields_inert_item() {
    let dir = fixture();
    let item = channel(dir.path())
        .get_item("movies/gone.mkv", true)
        .await
        .unwrap();
    assert_eq!(item.item_type, ItemType::File);
    assert_eq!(item.file_size, None);
    assert_eq!(item.modification_time, None);
    assert_eq!(item.mimetype, None);
    assert!(!item.playable);
}

#[tokio::test]
async fn escaping_ids_are_refused() {
    let dir = fixture();
    let ch = channel(dir.path());
    for id in ["../outside", "movies/../../outside", "/etc/passwd"] {
        assert!(matches!(
            ch.get_item(id, false).await,
            Err(ChannelError::NotContained(_))
        ));
        assert!(ch.get_file(id).is_err());
    }
    assert!(ch.list_contents(Some("..")).await.is_err());
}

#[tokio::test]
async fn missing_container_is_not_found() {
    let dir = fixture();
    assert!(matches!(
        channel(dir.path()).list_contents(Some("nope")).await,
        Err(ChannelError::NotFound(_))
    ));
}

#[tokio::test]
async fn resolve_file_requires_containment() {
    let dir = fixture();
    let ch = channel(dir.path());

    let inside = dir.path().join("movies/Alien/Alien.mkv");
    let item = ch.resolve_file(&inside.to_string_lossy()).await.unwrap();
    assert_eq!(item.id, "movies/Alien/Alien.mkv");

    for outside in [
        "/etc/passwd".to_string(),
        format!("{}/../escape.mkv", dir.path().display()),
        format!("{}-sibling/a.mkv", dir.path().display()),
        "relative/a.mkv".to_string(),
    ] {
        assert!(
            matches!(ch.resolve_file(&outside).await, Err(ChannelError::NotContained(_))),
            "{outside} should not be contained"
        );
    }
}

#[tokio::test]
async fn play_state_round_trip() {
    let dir = fixture();
    let ch = channel(dir.path());
    let state = PlayState {
        id: String::new(),
        status: PlayStatus::InProgress,
        position: Some(61.0),
        updated: None,
    };
    ch.put_play_state("movies/b.mp4", state).await.unwrap();

    let got = ch.get_last_play_state("movies/b.mp4").await.unwrap().unwrap();
    assert_eq!(got.id, "movies/b.mp4");
    assert_eq!(got.status, PlayStatus::InProgress);
    assert_eq!(got.position, Some(61.0));
    assert!(got.updated.is_some());

    let item = ch.get_item("movies/b.mp4", true).await.unwrap();
    assert_eq!(item.play_state.map(|s| s.status), Some(PlayStatus::InProgress));
}

#[tokio::test]
async fn play_state_survives_missing_item() {
    let dir = fixture();
    let ch = channel(dir.path());
    assert_eq!(ch.get_last_play_state("deleted.mkv").await.unwrap(), None);
    ch.put_play_state("deleted.mkv", PlayState::new("", PlayStatus::Watched))
        .await
        .unwrap();
    assert!(ch.get_last_play_state("deleted.mkv").await.unwrap().is_some());
}

#[tokio::test]
async fn stream_with_targets_has_one_descriptor_per_profile() {
    let dir = fixture();
    let ch = channel(dir.path());
    let item = ch.get_item("movies/Alien/Alien.mkv", false).await.unwrap();

    let plain = ch.get_stream(&item, &StreamOptions::default()).await.unwrap();
    assert_eq!(
        plain.url.as_deref(),
        Some("http://pith:3333/stream/movies/Alien/Alien.mkv")
    );
    assert_eq!(plain.duration, Some(90_000));

    let d = ch
        .get_stream(&item, &StreamOptions::with_target("low,high"))
        .await
        .unwrap();
    assert_eq!(d.streams.len(), 2);
    let low = d.streams[0].url.as_deref().unwrap();
    let high = d.streams[1].url.as_deref().unwrap();
    assert!(low.contains("transcode=low") && !low.contains("playlist"));
    assert!(high.contains("transcode=high") && !high.contains("playlist"));

    let hls = ch
        .get_stream(&item, &StreamOptions::with_target("hls"))
        .await
        .unwrap();
    assert!(hls.streams[0].url.as_deref().unwrap().contains("playlist=true"));
}

#[tokio::test]
async fn stream_fails_on_unknown_profile_and_probe_failure() {
    let dir = fixture();
    let item = channel(dir.path())
        .get_item("movies/b.mp4", false)
        .await
        .unwrap();

    assert!(matches!(
        channel(dir.path())
            .get_stream(&item, &StreamOptions::with_target("low,8k"))
            .await,
        Err(ChannelError::UnknownProfile(p)) if p == "8k"
    ));
    assert!(matches!(
        channel_with(dir.path(), false, true)
            .get_stream(&item, &StreamOptions::default())
            .await,
        Err(ChannelError::Probe(_))
    ));
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn non_utf8_names_are_not_listed() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = fixture();
    let odd = dir.path().join("odd");
    std::fs::create_dir(&odd).unwrap();
    std::fs::write(odd.join("ok.mkv"), b"").unwrap();
    // Both names decode lossily to the same string.
    std::fs::write(odd.join(OsStr::from_bytes(b"clip\xff.mkv")), b"").unwrap();
    std::fs::write(odd.join(OsStr::from_bytes(b"clip\xfe.mkv")), b"").unwrap();

    let items = channel(dir.path()).list_contents(Some("odd")).await.unwrap();
    assert_eq!(titles(&items), vec!["ok.mkv"]);
    assert_eq!(items[0].id, "odd/ok.mkv");
}
