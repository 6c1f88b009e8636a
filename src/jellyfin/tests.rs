//! Unit tests for Jellyfin API client

#[cfg(test)]
mod tests {
    use crate::jellyfin::api::PlaybackApi;
    use crate::jellyfin::models_playback::{MediaSource, PlaybackInfoResponse, PlaybackStopInfo};
    use crate::jellyfin::JellyfinClient;

    fn test_client() -> JellyfinClient {
        JellyfinClient::new("http://localhost:8096")
            .with_api_key("test_api_key")
            .with_user_id("test_user_id")
            .with_device_id("test_device")
    }

    #[test]
    fn test_client_creation() {
        let client = JellyfinClient::new("http://localhost:8096");
        assert_eq!(client.get_server_url(), "http://localhost:8096");
        assert!(client.get_api_key().is_none());
        assert!(client.get_user_id().is_none());
    }

    #[test]
    fn test_client_normalizes_trailing_slash() {
        let client = JellyfinClient::new("http://localhost:8096/");
        assert_eq!(client.get_server_url(), "http://localhost:8096");
    }

    #[test]
    fn test_client_with_api_key() {
        let client = JellyfinClient::new("http://localhost:8096").with_api_key("test_api_key");
        assert_eq!(client.get_api_key(), Some("test_api_key"));
        assert!(client.get_user_id().is_none());
    }

    #[test]
    fn test_client_with_user_id() {
        let client = test_client();
        assert_eq!(client.get_api_key(), Some("test_api_key"));
        assert_eq!(client.get_user_id(), Some("test_user_id"));
        assert_eq!(client.device_id(), "test_device");
    }

    #[test]
    fn test_audio_stream_url() {
        let client = test_client();
        let url = client.audio_stream_url("item123").unwrap();
        assert_eq!(
            url,
            "http://localhost:8096/Audio/item123/universal?userId=test_user_id&deviceId=test_device"
        );
    }

    #[test]
    fn test_audio_stream_url_requires_credentials() {
        let client = JellyfinClient::new("http://localhost:8096");
        assert!(client.audio_stream_url("item123").is_err());
    }

    #[test]
    fn test_direct_stream_url() {
        let client = test_client();
        let source = MediaSource {
            id: Some("src1".to_string()),
            container: Some("mp4".to_string()),
            e_tag: Some("etag1".to_string()),
            ..MediaSource::default()
        };
        let url = client.direct_stream_url(&source).unwrap();
        assert_eq!(
            url,
            "http://localhost:8096/Videos/src1/stream.mp4?Static=true&tag=etag1&mediaSourceId=src1&deviceId=test_device&api_key=test_api_key"
        );
    }

    #[test]
    fn test_direct_stream_url_defaults_container() {
        let client = test_client();
        let source = MediaSource {
            id: Some("src1".to_string()),
            ..MediaSource::default()
        };
        let url = client.direct_stream_url(&source).unwrap();
        assert!(url.contains("/Videos/src1/stream.mkv?"));
        assert!(url.contains("tag=&"));
    }

    #[test]
    fn test_direct_stream_url_requires_source_id() {
        let client = test_client();
        let source = MediaSource::default();
        assert!(client.direct_stream_url(&source).is_err());
    }

    #[test]
    fn test_transcode_stream_url() {
        let client = JellyfinClient::new("https://h").with_api_key("k");
        assert_eq!(
            client.transcode_stream_url("/videos/123/master.m3u8"),
            "https://h/videos/123/master.m3u8"
        );
    }

    #[test]
    fn test_playback_info_response_deserialization() {
        let json = r#"{
            "MediaSources": [{
                "Id": "src1",
                "Container": "mkv",
                "SupportsDirectStream": true,
                "SupportsTranscoding": false,
                "MediaStreams": [
                    {"Index": 0, "Type": "Video", "Codec": "h264"},
                    {"Index": 1, "Type": "Audio", "Codec": "aac"},
                    {"Index": 2, "Type": "Subtitle", "Codec": "subrip", "DeliveryUrl": "/sub.vtt"}
                ],
                "DefaultAudioStreamIndex": 1,
                "DefaultSubtitleStreamIndex": 2,
                "ETag": "abc"
            }],
            "PlaySessionId": "psid"
        }"#;
        let response: PlaybackInfoResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.play_session_id.as_deref(), Some("psid"));
        let source = &response.media_sources[0];
        assert_eq!(source.id.as_deref(), Some("src1"));
        assert!(source.supports_direct_stream);
        assert_eq!(source.e_tag.as_deref(), Some("abc"));
        assert_eq!(source.media_streams.len(), 3);
        assert!(source.media_streams[0].is_video());
        assert!(source.media_streams[2].is_subtitle());
        assert_eq!(
            source.media_streams[2].delivery_url.as_deref(),
            Some("/sub.vtt")
        );
    }

    #[test]
    fn test_playback_stop_info_serialization() {
        let info = PlaybackStopInfo {
            failed: false,
            item_id: Some("item1".to_string()),
            media_source_id: Some("src1".to_string()),
            play_session_id: Some("psid".to_string()),
        };
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["Failed"], false);
        assert_eq!(value["ItemId"], "item1");
        assert_eq!(value["MediaSourceId"], "src1");
        assert_eq!(value["PlaySessionId"], "psid");
    }

    #[test]
    fn test_device_profile_serialization() {
        let profile = crate::jellyfin::DeviceProfile::default();
        let value = serde_json::to_value(&profile).unwrap();
        assert!(value["MaxStreamingBitrate"].is_u64());
        assert_eq!(value["TranscodingProfiles"][0]["Protocol"], "hls");
        assert_eq!(value["DirectPlayProfiles"][0]["Type"], "Video");
    }
}
