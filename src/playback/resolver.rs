//! Media source resolution for video playback

use tracing::{debug, instrument, warn};

use crate::jellyfin::api::PlaybackApi;
use crate::jellyfin::models::MediaItem;
use crate::jellyfin::models_playback::PlaybackInfoRequest;
use crate::jellyfin::DeviceProfile;
use crate::playback::subtitles::{select_subtitle, SubtitleRequest, SubtitleSelection};
use crate::playback::PlaybackError;

const RESOLVER_LOG_TARGET: &str = "jellyplay::playback::resolver";

// Defaults applied to missing response fields, in one place so missing-field
// behavior stays reviewable.
const DEFAULT_AUDIO_STREAM_INDEX: i32 = 0;
const DEFAULT_SUBTITLE_STREAM_INDEX: i32 = 0;
const DEFAULT_CONTAINER: &str = "mkv";
const DEFAULT_SEASON_NUMBER: i32 = 0;
const DEFAULT_EPISODE_NUMBER: i32 = 0;

/// Everything the orchestrator needs to commit a video session.
#[derive(Debug, Clone)]
pub struct ResolvedVideoSource {
    pub item_name: String,
    pub episode_title: String,
    pub video_track: i32,
    pub audio_track: i32,
    pub container: String,
    pub url: String,
    pub media_source_id: Option<String>,
    pub play_session_id: Option<String>,
    pub subtitle: SubtitleSelection,
    pub intro: Option<serde_json::Value>,
}

/// Negotiates the delivery of a video item with the server.
///
/// Issues the playback-info request, picks the primary media source, resolves
/// subtitles and the delivery URL (direct stream unless the source declares a
/// transcoding path), and fetches intro-skip metadata best-effort.
#[instrument(skip(api, item), fields(item_id = %item.id))]
pub async fn resolve_video_source(
    api: &dyn PlaybackApi,
    item: &MediaItem,
    user_id: &str,
) -> Result<ResolvedVideoSource, PlaybackError> {
    let declared = item.media_sources.first().ok_or_else(|| {
        PlaybackError::SourceResolution(format!("Item {} has no media sources", item.id))
    })?;

    let request = PlaybackInfoRequest {
        item_id: item.id.clone(),
        user_id: user_id.to_string(),
        media_source_id: declared.id.clone(),
        audio_stream_index: declared
            .default_audio_stream_index
            .unwrap_or(DEFAULT_AUDIO_STREAM_INDEX),
        subtitle_stream_index: declared
            .default_subtitle_stream_index
            .unwrap_or(DEFAULT_SUBTITLE_STREAM_INDEX),
        start_time_ticks: item.resume_position_ticks(),
        device_profile: DeviceProfile::default(),
    };

    let response = api.get_playback_info(&request).await.map_err(|e| {
        PlaybackError::SourceResolution(format!("Playback info request failed: {}", e))
    })?;

    let source = response.media_sources.first().ok_or_else(|| {
        PlaybackError::SourceResolution("Playback info response has no media sources".to_string())
    })?;

    // Episodes display under their series name.
    let (item_name, episode_title) = if item.series_id.is_some() {
        (
            item.series_name.clone().unwrap_or_else(|| item.name.clone()),
            format!(
                "S{}:E{} {}",
                item.parent_index_number.unwrap_or(DEFAULT_SEASON_NUMBER),
                item.index_number.unwrap_or(DEFAULT_EPISODE_NUMBER),
                item.name
            ),
        )
    } else {
        (item.name.clone(), String::new())
    };

    let subtitle_request = match source.default_subtitle_stream_index {
        Some(index) => SubtitleRequest::Track(index),
        None => SubtitleRequest::NoSubtitle,
    };
    let subtitle = select_subtitle(subtitle_request, &source.media_streams);

    // Direct stream is the default; the transcode override below must stay
    // after it since it replaces the URL entirely.
    let mut url = api.direct_stream_url(source).map_err(|e| {
        PlaybackError::SourceResolution(format!("Failed to build stream URL: {}", e))
    })?;
    if source.supports_transcoding {
        if let Some(path) = source.transcoding_url.as_deref().filter(|p| !p.is_empty()) {
            debug!(target: RESOLVER_LOG_TARGET, "Source requires transcoding, using server path: {}", path);
            url = api.transcode_stream_url(path);
        }
    }

    let video_track = source
        .media_streams
        .iter()
        .find(|s| s.is_video())
        .map(|s| s.index)
        .ok_or_else(|| {
            PlaybackError::SourceResolution(format!(
                "Media source for item {} has no video stream",
                item.id
            ))
        })?;

    // Best-effort: a missing server plugin or failed call degrades to "no
    // intro metadata" and never aborts resolution.
    let intro = match api.get_intro_segments(&item.id).await {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(target: RESOLVER_LOG_TARGET, "Failed to fetch intro segments for {}: {}", item.id, e);
            None
        }
    };

    Ok(ResolvedVideoSource {
        item_name,
        episode_title,
        video_track,
        audio_track: source
            .default_audio_stream_index
            .unwrap_or(DEFAULT_AUDIO_STREAM_INDEX),
        container: source
            .container
            .clone()
            .unwrap_or_else(|| DEFAULT_CONTAINER.to_string()),
        url,
        media_source_id: source.id.clone(),
        play_session_id: response.play_session_id.clone(),
        subtitle,
        intro,
    })
}
