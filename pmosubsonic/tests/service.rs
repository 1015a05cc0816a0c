//! Integration tests for the playback service layer

mod common;

use async_trait::async_trait;
use common::*;
use pmosubsonic::{
    MediaPlayer, PlayArtistRequest, PlayMediaRequest, PlayOutcome, RandomAlbumFilter,
    ServerConfig, SubsonicService, ValidationError, validate_server,
};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Lecteur qui enregistre les demandes reçues
#[derive(Default)]
struct RecordingPlayer {
    calls: Mutex<Vec<(String, String, String)>>,
    fail_on: Option<String>,
}

impl RecordingPlayer {
    fn calls(&self) -> Vec<(String, String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaPlayer for RecordingPlayer {
    async fn play_media(&self, entity_id: &str, url: &str, mime_type: &str) -> anyhow::Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((entity_id.to_string(), url.to_string(), mime_type.to_string()));
        if self.fail_on.as_deref() == Some(entity_id) {
            anyhow::bail!("player {} is unavailable", entity_id);
        }
        Ok(())
    }
}

fn service(server: &MockServer, player: Arc<RecordingPlayer>) -> SubsonicService {
    SubsonicService::new(Arc::new(client(server)), player)
}

fn targets() -> Vec<String> {
    vec!["media_player.salon".to_string(), "media_player.cuisine".to_string()]
}

#[tokio::test]
async fn test_play_album_dispatches_first_track_to_every_target() {
    let server = MockServer::start().await;
    mount_album(&server, "al-1", &["S1", "S2", "S3"]).await;

    let player = Arc::new(RecordingPlayer::default());
    let outcome = service(&server, player.clone())
        .play_album(targets(), "al-1", false)
        .await
        .unwrap();

    match outcome {
        PlayOutcome::Dispatched { track, targets: sent } => {
            assert_eq!(track.id(), Some("S1"));
            assert_eq!(sent, targets());
        }
        other => panic!("Expected Dispatched, got {:?}", other),
    }

    let calls = player.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].0, "media_player.salon");
    assert_eq!(calls[1].0, "media_player.cuisine");
    for (_, url, mime) in &calls {
        assert!(url.contains("/rest/stream.view?"));
        assert!(url.contains("id=S1"));
        assert_eq!(mime, "audio/mpeg");
    }
}

#[tokio::test]
async fn test_player_failure_does_not_stop_other_targets() {
    let server = MockServer::start().await;
    mount_album(&server, "al-1", &["S1"]).await;

    let player = Arc::new(RecordingPlayer {
        fail_on: Some("media_player.salon".to_string()),
        ..Default::default()
    });
    let outcome = service(&server, player.clone())
        .play_album(targets(), "al-1", false)
        .await
        .unwrap();

    assert!(matches!(outcome, PlayOutcome::Dispatched { .. }));
    assert_eq!(player.calls().len(), 2);
}

#[tokio::test]
async fn test_play_media_without_targets() {
    let server = MockServer::start().await;
    let player = Arc::new(RecordingPlayer::default());

    let outcome = service(&server, player.clone())
        .play_media(PlayMediaRequest {
            media_type: "album".into(),
            media_id: "al-1".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(outcome, PlayOutcome::NoTarget);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_play_media_without_media() {
    let server = MockServer::start().await;
    let player = Arc::new(RecordingPlayer::default());

    let outcome = service(&server, player.clone())
        .play_media(PlayMediaRequest {
            entity_ids: targets(),
            media_type: "album".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(outcome, PlayOutcome::MissingMedia);
    assert!(player.calls().is_empty());
}

#[tokio::test]
async fn test_play_media_nothing_resolved() {
    let server = MockServer::start().await;
    mount_album(&server, "al-empty", &[]).await;

    let player = Arc::new(RecordingPlayer::default());
    let outcome = service(&server, player.clone())
        .play_media(PlayMediaRequest {
            entity_ids: targets(),
            media_type: "album".into(),
            media_id: "al-empty".into(),
            shuffle: false,
            enqueue: true,
        })
        .await
        .unwrap();

    assert_eq!(outcome, PlayOutcome::NothingResolved);
    assert!(player.calls().is_empty());
}

#[tokio::test]
async fn test_play_media_first_track_without_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(endpoint("getAlbum")))
        .respond_with(xml_response(ok_xml(
            r#"<album id="al-1"><song title="Orphan"/><song id="S2"/></album>"#,
        )))
        .mount(&server)
        .await;

    let player = Arc::new(RecordingPlayer::default());
    let outcome = service(&server, player.clone())
        .play_album(targets(), "al-1", false)
        .await
        .unwrap();

    assert_eq!(outcome, PlayOutcome::NoStreamUrl);
    assert!(player.calls().is_empty());
}

#[tokio::test]
async fn test_play_media_propagates_server_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(endpoint("getPlaylist")))
        .respond_with(xml_response(failed_xml(70, "Playlist not found")))
        .mount(&server)
        .await;

    let player = Arc::new(RecordingPlayer::default());
    let err = service(&server, player.clone())
        .play_playlist(targets(), "pl-404", false)
        .await
        .unwrap_err();

    assert!(err.is_not_found(), "got {:?}", err);
    assert!(player.calls().is_empty());
}

#[tokio::test]
async fn test_play_track() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(endpoint("getSong")))
        .respond_with(xml_response(ok_xml(r#"<song id="S7" suffix="flac"/>"#)))
        .mount(&server)
        .await;

    let player = Arc::new(RecordingPlayer::default());
    service(&server, player.clone())
        .play_track(vec!["media_player.salon".into()], "S7")
        .await
        .unwrap();

    let calls = player.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].2, "audio/flac");
}

#[tokio::test]
async fn test_play_artist_without_shuffle() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(endpoint("getArtist")))
        .respond_with(xml_response(ok_xml(
            r#"<artist id="ar-1"><album id="al-1"/><album id="al-2"/></artist>"#,
        )))
        .mount(&server)
        .await;
    mount_album(&server, "al-1", &["S1"]).await;
    mount_album(&server, "al-2", &["S2"]).await;

    let player = Arc::new(RecordingPlayer::default());
    let outcome = service(&server, player.clone())
        .play_artist(PlayArtistRequest::new(targets(), "ar-1").shuffle(false))
        .await
        .unwrap();

    match outcome {
        PlayOutcome::Dispatched { track, .. } => assert_eq!(track.id(), Some("S1")),
        other => panic!("Expected Dispatched, got {:?}", other),
    }
}

#[tokio::test]
async fn test_play_random_album_applies_filter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(endpoint("getAlbumList2")))
        .respond_with(xml_response(ok_xml(
            r#"<albumList2>
                <album id="al-old" year="1959" genre="Jazz"/>
                <album id="al-rock" year="1994" genre="Alternative Rock"/>
                <album id="al-noyear" genre="Rock"/>
                <album id="al-pop" year="1995" genre="Pop"/>
            </albumList2>"#,
        )))
        .mount(&server)
        .await;
    mount_album(&server, "al-rock", &["R1", "R2"]).await;

    let player = Arc::new(RecordingPlayer::default());
    let filter = RandomAlbumFilter {
        genre: Some("ROCK".into()),
        year_from: Some(1990),
        year_to: Some(1999),
    };
    let outcome = service(&server, player.clone())
        .play_random_album(targets(), filter, false)
        .await
        .unwrap();

    match outcome {
        PlayOutcome::Dispatched { track, .. } => assert_eq!(track.id(), Some("R1")),
        other => panic!("Expected Dispatched, got {:?}", other),
    }
}

#[tokio::test]
async fn test_play_random_album_without_candidates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(endpoint("getAlbumList2")))
        .respond_with(xml_response(ok_xml(
            r#"<albumList2><album id="al-1" year="1959" genre="Jazz"/></albumList2>"#,
        )))
        .mount(&server)
        .await;

    let player = Arc::new(RecordingPlayer::default());
    let filter = RandomAlbumFilter {
        genre: Some("Metal".into()),
        ..Default::default()
    };
    let outcome = service(&server, player.clone())
        .play_random_album(targets(), filter, true)
        .await
        .unwrap();

    assert_eq!(outcome, PlayOutcome::NothingResolved);
    assert!(player.calls().is_empty());
}

#[tokio::test]
async fn test_validate_server_ok() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(endpoint("ping")))
        .respond_with(xml_response(ok_xml("")))
        .mount(&server)
        .await;

    assert_eq!(validate_server(&server_config(&server)).await, Ok(()));
}

#[tokio::test]
async fn test_validate_server_invalid_auth() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(endpoint("ping")))
        .respond_with(xml_response(failed_xml(40, "Wrong username or password")))
        .mount(&server)
        .await;

    assert_eq!(
        validate_server(&server_config(&server)).await,
        Err(ValidationError::InvalidAuth)
    );
}

#[tokio::test]
async fn test_validate_server_cannot_connect() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(endpoint("ping")))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    assert_eq!(
        validate_server(&server_config(&server)).await,
        Err(ValidationError::CannotConnect)
    );

    let invalid = ServerConfig::new("not a url", "alice", "secret");
    assert_eq!(
        validate_server(&invalid).await,
        Err(ValidationError::CannotConnect)
    );
}
