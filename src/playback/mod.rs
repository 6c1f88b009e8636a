//! Playback session orchestration
//!
//! The orchestrator owns the play queue and the committed session state. An
//! `advance` resolves the requested queue position, negotiates delivery with
//! the server for video items, reports the outgoing session as stopped and
//! commits the new session and queue cursor together. Session state is
//! exposed through `tokio::sync::watch` read views and written only here.

pub mod queue;
pub mod reporter;
pub mod resolver;
pub mod session;
pub mod subtitles;

pub use queue::{AdvanceTarget, Queue};
pub use session::{ActiveMediaSource, AudioNowPlaying, PlaybackSession};
pub use subtitles::{select_subtitle, SubtitleRequest, SubtitleSelection, SubtitleTrack};

use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::sync::Mutex as TokioMutex;
use tracing::{info, instrument, warn};

use crate::jellyfin::api::{JellyfinError, PlaybackApi};
use crate::jellyfin::models::MediaItem;
use crate::playback::reporter::{OutgoingSession, PlaybackReporter};
use crate::playback::resolver::resolve_video_source;

const PLAYBACK_LOG_TARGET: &str = "jellyplay::playback";

/// Error types for playback session transitions
#[derive(Debug)]
pub enum PlaybackError {
    /// Requested queue position is out of range or the queue is empty.
    QueueExhausted,
    /// Negotiation failed or its response was unusable; nothing was committed.
    SourceResolution(String),
    /// Transport or credential failure outside negotiation.
    Api(JellyfinError),
    /// Another advance is still pending; the caller may retry once it settles.
    AdvanceInProgress,
}

impl fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackError::QueueExhausted => write!(f, "No item found in queue"),
            PlaybackError::SourceResolution(msg) => write!(f, "Source resolution failed: {}", msg),
            PlaybackError::Api(e) => write!(f, "API error: {}", e),
            PlaybackError::AdvanceInProgress => write!(f, "An advance is already in progress"),
        }
    }
}

impl Error for PlaybackError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PlaybackError::Api(e) => Some(e),
            _ => None,
        }
    }
}

impl From<JellyfinError> for PlaybackError {
    fn from(err: JellyfinError) -> Self {
        PlaybackError::Api(err)
    }
}

/// Clears the pending flag when an advance finishes, also on early error
/// returns.
struct AdvancePending<'a>(&'a AtomicBool);

impl<'a> AdvancePending<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, PlaybackError> {
        if flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            Ok(AdvancePending(flag))
        } else {
            Err(PlaybackError::AdvanceInProgress)
        }
    }
}

impl Drop for AdvancePending<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Coordinates queue position, source resolution, stop reporting and the
/// committed session state.
pub struct PlaybackOrchestrator {
    api: Arc<dyn PlaybackApi>,
    reporter: PlaybackReporter,
    queue: TokioMutex<Queue>,
    session_tx: watch::Sender<Option<PlaybackSession>>,
    audio_tx: watch::Sender<Option<AudioNowPlaying>>,
    advance_pending: AtomicBool,
}

impl PlaybackOrchestrator {
    pub fn new(api: Arc<dyn PlaybackApi>) -> Self {
        let (session_tx, _) = watch::channel(None);
        let (audio_tx, _) = watch::channel(None);
        PlaybackOrchestrator {
            reporter: PlaybackReporter::new(api.clone()),
            api,
            queue: TokioMutex::new(Queue::default()),
            session_tx,
            audio_tx,
            advance_pending: AtomicBool::new(false),
        }
    }

    /// Read-only view of the committed video session.
    pub fn session_updates(&self) -> watch::Receiver<Option<PlaybackSession>> {
        self.session_tx.subscribe()
    }

    /// Read-only view of the audio now-playing projection.
    pub fn audio_updates(&self) -> watch::Receiver<Option<AudioNowPlaying>> {
        self.audio_tx.subscribe()
    }

    pub fn current_session(&self) -> Option<PlaybackSession> {
        self.session_tx.borrow().clone()
    }

    pub fn now_playing_audio(&self) -> Option<AudioNowPlaying> {
        self.audio_tx.borrow().clone()
    }

    /// Replaces the queue wholesale, e.g. when the user starts a playlist or
    /// plays a single item standalone.
    pub async fn set_queue(&self, items: Vec<MediaItem>, current_index: usize) {
        let mut queue = self.queue.lock().await;
        queue.replace(items, current_index);
    }

    pub async fn queue_snapshot(&self) -> Queue {
        self.queue.lock().await.clone()
    }

    pub fn is_advance_pending(&self) -> bool {
        self.advance_pending.load(Ordering::Acquire)
    }

    /// Moves playback to another queue position.
    ///
    /// The queue cursor and session state are committed together or not at
    /// all; any failure leaves both untouched. Overlapping calls are rejected
    /// with [`PlaybackError::AdvanceInProgress`] so two racing resolutions
    /// cannot tear the committed session.
    #[instrument(skip(self))]
    pub async fn advance(&self, target: AdvanceTarget) -> Result<(), PlaybackError> {
        let _pending = AdvancePending::acquire(&self.advance_pending)?;

        let user_id = self
            .api
            .user_id()
            .map(str::to_string)
            .ok_or_else(|| JellyfinError::Authentication("User ID not set".to_string()))?;

        // Snapshot the outgoing state first; the stop report must describe
        // the session being left, never the one about to commit.
        let (outgoing, item, target_index) = {
            let queue = self.queue.lock().await;
            let target_index = queue
                .resolve_target(target)
                .ok_or(PlaybackError::QueueExhausted)?;
            let item = queue
                .get(target_index)
                .cloned()
                .ok_or(PlaybackError::QueueExhausted)?;
            let (media_source_id, play_session_id) = match self.session_tx.borrow().as_ref() {
                Some(session) => (
                    session.media_source.id.clone(),
                    session.play_session_id.clone(),
                ),
                None => (None, None),
            };
            let outgoing = OutgoingSession {
                item_id: queue.current().map(|i| i.id.clone()),
                media_source_id,
                play_session_id,
            };
            (outgoing, item, target_index)
        };

        if item.id.is_empty() {
            warn!(target: PLAYBACK_LOG_TARGET, "Item at index {} has no identity", target_index);
            return Err(PlaybackError::QueueExhausted);
        }

        if item.is_audio() {
            let url = self.api.audio_stream_url(&item.id)?;
            info!(target: PLAYBACK_LOG_TARGET, "Playing audio item {} at index {}", item.id, target_index);
            let mut queue = self.queue.lock().await;
            queue.set_current_index(target_index);
            self.audio_tx.send_replace(Some(AudioNowPlaying {
                url,
                item,
                playlist_item_id: None,
            }));
            return Ok(());
        }

        let resolved = resolve_video_source(self.api.as_ref(), &item, &user_id).await?;

        // Non-fatal for the advance; runs in the background on the captured
        // pre-commit state.
        self.reporter.report_stopped(outgoing);

        let start_position = item.resume_position_ticks();
        let item_duration = item.run_time_ticks.unwrap_or(0);
        let session = PlaybackSession {
            item_name: resolved.item_name,
            episode_title: resolved.episode_title,
            media_source: ActiveMediaSource {
                video_track: resolved.video_track,
                audio_track: resolved.audio_track,
                container: resolved.container,
                id: resolved.media_source_id,
                subtitle: resolved.subtitle,
            },
            playback_url: resolved.url,
            user_id,
            start_position,
            item_duration,
            item,
            play_session_id: resolved.play_session_id,
            intro: resolved.intro,
        };

        // Commit cursor and session together.
        let mut queue = self.queue.lock().await;
        queue.set_current_index(target_index);
        self.session_tx.send_replace(Some(session));
        info!(target: PLAYBACK_LOG_TARGET, "Committed playback session for queue index {}", target_index);
        Ok(())
    }

    /// Recomputes the active subtitle selection against the tracks retained
    /// in the current session. No server round-trip.
    pub fn change_subtitle_track(&self, request: SubtitleRequest) {
        self.session_tx.send_modify(|session| {
            if let Some(session) = session.as_mut() {
                let all_tracks = std::mem::take(&mut session.media_source.subtitle.all_tracks);
                session.media_source.subtitle = select_subtitle(request, &all_tracks);
            }
        });
    }

    /// Flips the subtitle enable state. A no-op when the source has no
    /// subtitles at all, which can never be toggled on.
    pub fn toggle_subtitle_track(&self) {
        self.session_tx.send_modify(|session| {
            if let Some(session) = session.as_mut() {
                let subtitle = &mut session.media_source.subtitle;
                if subtitle.track != SubtitleTrack::Unavailable {
                    subtitle.enabled = !subtitle.enabled;
                }
            }
        });
    }
}
