//! Integration tests for playback orchestration over HTTP
//!
//! These drive the real client against a mocked Jellyfin server to verify the
//! negotiation, URL construction and stop reporting end to end.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use jellyplay::jellyfin::{JellyfinClient, MediaItem, MediaSource};
use jellyplay::playback::{AdvanceTarget, PlaybackOrchestrator, SubtitleTrack};

use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn queue_item(id: &str, name: &str) -> MediaItem {
    MediaItem {
        id: id.to_string(),
        name: name.to_string(),
        media_type: "Movie".to_string(),
        is_folder: false,
        run_time_ticks: Some(600_000_000),
        series_id: None,
        series_name: None,
        parent_index_number: None,
        index_number: None,
        media_sources: vec![MediaSource {
            id: Some(format!("{}-decl", id)),
            container: Some("mkv".to_string()),
            default_audio_stream_index: Some(1),
            default_subtitle_stream_index: Some(2),
            ..MediaSource::default()
        }],
        user_data: None,
    }
}

fn playback_info_body(source_id: &str, play_session_id: &str) -> serde_json::Value {
    json!({
        "MediaSources": [{
            "Id": source_id,
            "Container": "mkv",
            "SupportsDirectStream": true,
            "SupportsTranscoding": false,
            "MediaStreams": [
                {"Index": 0, "Type": "Video", "Codec": "h264"},
                {"Index": 1, "Type": "Audio", "Codec": "aac"},
                {"Index": 2, "Type": "Subtitle", "Codec": "subrip", "DeliveryUrl": "/sub/2.vtt"}
            ],
            "DefaultAudioStreamIndex": 1,
            "DefaultSubtitleStreamIndex": 2,
            "ETag": "etag-1"
        }],
        "PlaySessionId": play_session_id
    })
}

async fn orchestrator_for(server: &MockServer) -> (PlaybackOrchestrator, Arc<JellyfinClient>) {
    let client = Arc::new(
        JellyfinClient::new(&server.uri())
            .with_api_key("key")
            .with_user_id("user-1")
            .with_device_id("device-1"),
    );
    (PlaybackOrchestrator::new(client.clone()), client)
}

#[tokio::test]
async fn advance_negotiates_and_commits_direct_stream() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/Items/b/PlaybackInfo"))
        .and(header("X-Emby-Token", "key"))
        .and(query_param("UserId", "user-1"))
        .and(query_param("AudioStreamIndex", "1"))
        .and(query_param("SubtitleStreamIndex", "2"))
        .and(query_param("MediaSourceId", "b-decl"))
        .respond_with(ResponseTemplate::new(200).set_body_json(playback_info_body("src-b", "psid-b")))
        .mount(&server)
        .await;

    // No intro-skip plugin on this server; the advance must tolerate it.
    Mock::given(method("GET"))
        .and(path("/Episode/b/IntroSkipperSegments"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/Sessions/Playing/Stopped"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let (orchestrator, _client) = orchestrator_for(&server).await;
    orchestrator
        .set_queue(vec![queue_item("a", "A"), queue_item("b", "B")], 0)
        .await;

    orchestrator
        .advance(AdvanceTarget::Index(1))
        .await
        .expect("advance should commit");

    let session = orchestrator.current_session().expect("session committed");
    assert_eq!(session.item_name, "B");
    assert_eq!(
        session.playback_url,
        format!(
            "{}/Videos/src-b/stream.mkv?Static=true&tag=etag-1&mediaSourceId=src-b&deviceId=device-1&api_key=key",
            server.uri()
        )
    );
    assert_eq!(session.play_session_id.as_deref(), Some("psid-b"));
    assert_eq!(session.media_source.subtitle.track, SubtitleTrack::Track(2));
    assert_eq!(
        session.media_source.subtitle.url.as_deref(),
        Some("/sub/2.vtt")
    );
    assert!(session.intro.is_none());
    assert_eq!(orchestrator.queue_snapshot().await.current_index(), 1);
}

#[tokio::test]
async fn advance_uses_server_transcoding_path() {
    let server = MockServer::start().await;

    let mut body = playback_info_body("src-a", "psid-a");
    body["MediaSources"][0]["SupportsTranscoding"] = json!(true);
    body["MediaSources"][0]["TranscodingUrl"] = json!("/videos/123/master.m3u8");

    Mock::given(method("POST"))
        .and(path("/Items/a/PlaybackInfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Episode/a/IntroSkipperSegments"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/Sessions/Playing/Stopped"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let (orchestrator, _client) = orchestrator_for(&server).await;
    orchestrator.set_queue(vec![queue_item("a", "A")], 0).await;

    orchestrator
        .advance(AdvanceTarget::Index(0))
        .await
        .expect("advance should commit");

    let session = orchestrator.current_session().unwrap();
    assert_eq!(
        session.playback_url,
        format!("{}/videos/123/master.m3u8", server.uri())
    );
}

#[tokio::test]
async fn second_advance_reports_previous_session_stopped() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/Items/a/PlaybackInfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(playback_info_body("src-a", "psid-a")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/Items/b/PlaybackInfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(playback_info_body("src-b", "psid-b")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Episode/a/IntroSkipperSegments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Introduction": {"Start": 0.0, "End": 30.0}})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Episode/b/IntroSkipperSegments"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    // The stop report for the outgoing session must carry the ids captured
    // before the new commit.
    Mock::given(method("POST"))
        .and(path("/Sessions/Playing/Stopped"))
        .and(header("X-Emby-Token", "key"))
        .and(body_partial_json(json!({
            "Failed": false,
            "ItemId": "a",
            "MediaSourceId": "src-a",
            "PlaySessionId": "psid-a"
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/Sessions/Playing/Stopped"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let (orchestrator, _client) = orchestrator_for(&server).await;
    orchestrator
        .set_queue(vec![queue_item("a", "A"), queue_item("b", "B")], 0)
        .await;

    orchestrator
        .advance(AdvanceTarget::Index(0))
        .await
        .expect("first advance");
    let first = orchestrator.current_session().unwrap();
    assert_eq!(first.play_session_id.as_deref(), Some("psid-a"));
    assert!(first.intro.is_some());

    orchestrator
        .advance(AdvanceTarget::Next)
        .await
        .expect("second advance");

    // Stop reporting is fire-and-forget; give the background task a moment.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let second = orchestrator.current_session().unwrap();
    assert_eq!(second.play_session_id.as_deref(), Some("psid-b"));
    assert!(second.intro.is_none());
}
