//! Device capability profile declared during playback negotiation

use serde::{Deserialize, Serialize};

/// Capability profile sent with every playback-info request. The server uses
/// it to decide between direct streaming and transcoding.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct DeviceProfile {
    pub max_streaming_bitrate: u64,
    pub direct_play_profiles: Vec<DirectPlayProfile>,
    pub transcoding_profiles: Vec<TranscodingProfile>,
    pub subtitle_profiles: Vec<SubtitleProfile>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct DirectPlayProfile {
    pub container: String,
    #[serde(rename = "Type")]
    pub profile_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_codec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_codec: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct TranscodingProfile {
    pub container: String,
    #[serde(rename = "Type")]
    pub profile_type: String,
    pub protocol: String,
    pub video_codec: String,
    pub audio_codec: String,
    pub context: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct SubtitleProfile {
    pub format: String,
    pub method: String,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        DeviceProfile {
            max_streaming_bitrate: 120_000_000,
            direct_play_profiles: vec![
                DirectPlayProfile {
                    container: "mkv,mp4,webm".to_string(),
                    profile_type: "Video".to_string(),
                    video_codec: Some("h264,hevc,vp9,av1".to_string()),
                    audio_codec: Some("aac,mp3,ac3,eac3,opus,flac".to_string()),
                },
                DirectPlayProfile {
                    container: "mp3,flac,ogg,m4a".to_string(),
                    profile_type: "Audio".to_string(),
                    video_codec: None,
                    audio_codec: None,
                },
            ],
            transcoding_profiles: vec![TranscodingProfile {
                container: "ts".to_string(),
                profile_type: "Video".to_string(),
                protocol: "hls".to_string(),
                video_codec: "h264".to_string(),
                audio_codec: "aac".to_string(),
                context: "Streaming".to_string(),
            }],
            subtitle_profiles: vec![
                SubtitleProfile {
                    format: "vtt".to_string(),
                    method: "External".to_string(),
                },
                SubtitleProfile {
                    format: "ass".to_string(),
                    method: "External".to_string(),
                },
                SubtitleProfile {
                    format: "ssa".to_string(),
                    method: "External".to_string(),
                },
            ],
        }
    }
}
