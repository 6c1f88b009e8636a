//! Playback-related data models for Jellyfin API

use serde::{Deserialize, Serialize};

use crate::jellyfin::profile::DeviceProfile;

/// One elementary stream (video/audio/subtitle) within a media source.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct MediaStream {
    #[serde(default)]
    pub index: i32,
    #[serde(rename = "Type", default)]
    pub stream_type: String,
    #[serde(default)]
    pub codec: Option<String>,
    #[serde(default)]
    pub display_title: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    /// Server-relative URL for externally delivered streams (subtitles).
    #[serde(default)]
    pub delivery_url: Option<String>,
}

impl MediaStream {
    pub fn is_video(&self) -> bool {
        self.stream_type == "Video"
    }

    pub fn is_subtitle(&self) -> bool {
        self.stream_type == "Subtitle"
    }
}

/// One concrete encoded representation of an item, with its own streams and
/// delivery capabilities.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct MediaSource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub container: Option<String>,
    #[serde(default)]
    pub supports_direct_stream: bool,
    #[serde(default)]
    pub supports_transcoding: bool,
    /// Server-provided path for transcoded delivery. Only meaningful together
    /// with `supports_transcoding`.
    #[serde(default)]
    pub transcoding_url: Option<String>,
    #[serde(default)]
    pub media_streams: Vec<MediaStream>,
    #[serde(default)]
    pub default_audio_stream_index: Option<i32>,
    #[serde(default)]
    pub default_subtitle_stream_index: Option<i32>,
    /// Opaque freshness tag forwarded in direct-stream URLs.
    #[serde(rename = "ETag", default)]
    pub e_tag: Option<String>,
}

/// Response of POST /Items/{itemId}/PlaybackInfo.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct PlaybackInfoResponse {
    #[serde(default)]
    pub media_sources: Vec<MediaSource>,
    /// Server-issued identifier correlating start/stop reporting for one
    /// playback attempt.
    #[serde(default)]
    pub play_session_id: Option<String>,
}

/// Parameters of a playback-info negotiation call.
#[derive(Debug, Clone)]
pub struct PlaybackInfoRequest {
    pub item_id: String,
    pub user_id: String,
    pub media_source_id: Option<String>,
    pub audio_stream_index: i32,
    pub subtitle_stream_index: i32,
    pub start_time_ticks: i64,
    pub device_profile: DeviceProfile,
}

/// JSON body of the playback-info request; everything else travels as query
/// parameters.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct PlaybackInfoBody {
    pub device_profile: DeviceProfile,
}

/// Payload for POST /Sessions/Playing/Stopped.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct PlaybackStopInfo {
    pub failed: bool,
    #[serde(default)]
    pub item_id: Option<String>,
    #[serde(default)]
    pub media_source_id: Option<String>,
    #[serde(default)]
    pub play_session_id: Option<String>,
}
