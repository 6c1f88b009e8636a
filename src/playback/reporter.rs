//! Fire-and-forget playback stop reporting

use std::sync::Arc;
use tracing::{debug, error, info};

use crate::jellyfin::api::PlaybackApi;
use crate::jellyfin::models_playback::PlaybackStopInfo;

const REPORTER_LOG_TARGET: &str = "jellyplay::playback::reporter";

/// Identity of the session being left behind. Captured before the new
/// session commits; the reporter must never read post-commit state.
#[derive(Debug, Clone, Default)]
pub struct OutgoingSession {
    pub item_id: Option<String>,
    pub media_source_id: Option<String>,
    pub play_session_id: Option<String>,
}

/// Notifies the server that the previous item's session ended.
pub struct PlaybackReporter {
    api: Arc<dyn PlaybackApi>,
}

impl PlaybackReporter {
    pub fn new(api: Arc<dyn PlaybackApi>) -> Self {
        Self { api }
    }

    /// Reports the outgoing session as stopped in a background task. Never
    /// blocks the caller; failures are logged and not retried.
    pub fn report_stopped(&self, outgoing: OutgoingSession) {
        if outgoing.item_id.is_none() && outgoing.play_session_id.is_none() {
            debug!(target: REPORTER_LOG_TARGET, "No outgoing session to report.");
            return;
        }

        let api = self.api.clone();
        let info = PlaybackStopInfo {
            failed: false,
            item_id: outgoing.item_id,
            media_source_id: outgoing.media_source_id,
            play_session_id: outgoing.play_session_id,
        };
        tokio::spawn(async move {
            match api.report_playback_stopped(&info).await {
                Ok(()) => {
                    info!(target: REPORTER_LOG_TARGET, "Reported playback stop for item {:?}.", info.item_id)
                }
                Err(e) => {
                    error!(target: REPORTER_LOG_TARGET, "Failed to report playback stop for item {:?}: {}", info.item_id, e)
                }
            }
        });
    }
}
