//! Subtitle track selection

use crate::jellyfin::models_playback::MediaStream;

/// Which subtitle track a selection refers to.
///
/// The remote API encodes this as an integer; `-2` and `-1` are kept only at
/// the wire boundary via [`SubtitleTrack::to_wire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleTrack {
    /// The media source carries no subtitle streams at all.
    Unavailable,
    /// Subtitles exist but were explicitly turned off.
    Disabled,
    /// A concrete stream index within the media source.
    Track(i32),
}

impl SubtitleTrack {
    /// Integer encoding used at the API boundary.
    pub fn to_wire(self) -> i32 {
        match self {
            SubtitleTrack::Unavailable => -2,
            SubtitleTrack::Disabled => -1,
            SubtitleTrack::Track(index) => index,
        }
    }

    pub fn from_wire(index: i32) -> Self {
        match index {
            -2 => SubtitleTrack::Unavailable,
            -1 => SubtitleTrack::Disabled,
            index => SubtitleTrack::Track(index),
        }
    }
}

/// Caller's requested subtitle choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleRequest {
    /// A concrete stream index.
    Track(i32),
    /// Explicitly no subtitle.
    NoSubtitle,
}

/// Resolved subtitle state for the active media source.
///
/// `all_tracks` always comes from the media source that produced the
/// selection, so the UI can offer track switching without another server
/// round-trip.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleSelection {
    pub track: SubtitleTrack,
    pub enabled: bool,
    pub format: Option<String>,
    pub all_tracks: Vec<MediaStream>,
    pub url: Option<String>,
}

/// Resolves a subtitle request against the streams of a media source.
///
/// A source without subtitle streams yields [`SubtitleTrack::Unavailable`],
/// which is distinct from an explicit [`SubtitleRequest::NoSubtitle`]. A
/// requested index with no matching stream still yields an enabled selection
/// with no url or format; the playback surface treats that as nothing
/// renderable.
pub fn select_subtitle(requested: SubtitleRequest, streams: &[MediaStream]) -> SubtitleSelection {
    let available: Vec<MediaStream> = streams.iter().filter(|s| s.is_subtitle()).cloned().collect();

    if available.is_empty() {
        return SubtitleSelection {
            track: SubtitleTrack::Unavailable,
            enabled: false,
            format: None,
            all_tracks: available,
            url: None,
        };
    }

    match requested {
        SubtitleRequest::NoSubtitle => SubtitleSelection {
            track: SubtitleTrack::Disabled,
            enabled: false,
            format: None,
            all_tracks: available,
            url: None,
        },
        SubtitleRequest::Track(index) => {
            let matched = available.iter().find(|s| s.index == index);
            SubtitleSelection {
                track: SubtitleTrack::Track(index),
                enabled: true,
                format: matched.and_then(|s| s.codec.clone()),
                url: matched.and_then(|s| s.delivery_url.clone()),
                all_tracks: available,
            }
        }
    }
}
