//! Committed playback session state

use crate::jellyfin::models::MediaItem;
use crate::playback::subtitles::SubtitleSelection;

/// The media source actually being played within a session.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveMediaSource {
    pub video_track: i32,
    pub audio_track: i32,
    pub container: String,
    pub id: Option<String>,
    pub subtitle: SubtitleSelection,
}

/// One live playback session. Replaced wholesale on every commit; never
/// mutated field-by-field from outside the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSession {
    pub item_name: String,
    /// `"S<season>:E<episode> <name>"` for series episodes, empty otherwise.
    pub episode_title: String,
    pub media_source: ActiveMediaSource,
    pub playback_url: String,
    pub user_id: String,
    /// Resume offset in ticks.
    pub start_position: i64,
    pub item_duration: i64,
    pub item: MediaItem,
    pub play_session_id: Option<String>,
    /// Opaque intro-skip metadata, absent when the fetch failed or the server
    /// has none.
    pub intro: Option<serde_json::Value>,
}

/// Projection for the audio pipeline. Audio items skip transcode negotiation
/// and subtitle resolution entirely, so this stays separate from
/// [`PlaybackSession`].
#[derive(Debug, Clone, PartialEq)]
pub struct AudioNowPlaying {
    pub url: String,
    pub item: MediaItem,
    pub playlist_item_id: Option<String>,
}
