//! Data models for Jellyfin API responses

use serde::{Deserialize, Serialize};

use crate::jellyfin::models_playback::MediaSource;

/// Per-user playback state attached to an item.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct UserData {
    #[serde(rename = "PlaybackPositionTicks", default)]
    pub playback_position_ticks: i64,
    #[serde(rename = "Played", default)]
    pub played: bool,
}

/// Represents a media item in a Jellyfin library
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct MediaItem {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Type")]
    pub media_type: String,
    #[serde(rename = "IsFolder", default)]
    pub is_folder: bool,
    #[serde(rename = "RunTimeTicks", default)]
    pub run_time_ticks: Option<i64>, // Duration in 100-nanosecond units
    #[serde(rename = "SeriesId", default)]
    pub series_id: Option<String>,
    #[serde(rename = "SeriesName", default)]
    pub series_name: Option<String>,
    #[serde(rename = "ParentIndexNumber", default)]
    pub parent_index_number: Option<i32>, // Season number for episodes
    #[serde(rename = "IndexNumber", default)]
    pub index_number: Option<i32>, // Episode number within the season
    #[serde(rename = "MediaSources", default)]
    pub media_sources: Vec<MediaSource>,
    #[serde(rename = "UserData", default)]
    pub user_data: Option<UserData>,
}

impl MediaItem {
    /// Whether this item plays through the audio pipeline (no transcode
    /// negotiation, no subtitles).
    pub fn is_audio(&self) -> bool {
        self.media_type == "Audio"
    }

    /// Resume offset in ticks from the user's previous playback, 0 if none.
    pub fn resume_position_ticks(&self) -> i64 {
        self.user_data
            .as_ref()
            .map(|u| u.playback_position_ticks)
            .unwrap_or(0)
    }
}

/// Represents a collection of media items with additional metadata
#[derive(Deserialize, Serialize, Debug)]
pub struct ItemsResponse {
    #[serde(rename = "Items")]
    pub items: Vec<MediaItem>,
    #[serde(rename = "TotalRecordCount", default)]
    pub total_record_count: i32,
}

/// Represents authentication request for Jellyfin
#[derive(Deserialize, Serialize, Debug)]
pub struct AuthRequest {
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "PW")]
    pub pw: String,
}

/// Represents authentication response from Jellyfin
#[derive(Deserialize, Serialize, Debug)]
pub struct AuthResponse {
    #[serde(rename = "User")]
    pub user: User,
    #[serde(rename = "AccessToken")]
    pub access_token: String,
    #[serde(rename = "ServerId")]
    pub server_id: String,
}

/// Represents a user in Jellyfin
#[derive(Deserialize, Serialize, Debug)]
pub struct User {
    #[serde(rename = "Id", alias = "id")]
    pub id: String,
    #[serde(rename = "Name", alias = "name")]
    pub name: String,
    #[serde(default, rename = "ServerName", alias = "serverName")]
    pub server_name: Option<String>,
}
