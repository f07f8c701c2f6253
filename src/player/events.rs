//! Raw page/player events and the loop that feeds them to the tracker
//!
//! Player callbacks (time updates, duration lookups) and page actions (case
//! checkboxes) arrive as [`PlaybackEvent`]s on a channel. The loop applies
//! them to the tracker strictly in arrival order and reports anything the UI
//! should redraw as a [`TrackerUpdate`].

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::PlayerControls;
use crate::page::video_id_from_embed_url;
use crate::tracker::{CompletionOutcome, WatchStateTracker};

/// Event coming from the page or an embedded player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlaybackEvent {
    /// An embed was found; the id is taken from its URL
    EmbedFound { src: String },
    /// A video with a known id was found
    VideoIdentified {
        video_id: String,
        #[serde(default)]
        duration: Option<f64>,
    },
    /// The player answered a duration lookup
    DurationResolved { video_id: String, seconds: f64 },
    /// Periodic playback position with the fraction played
    TimeUpdate {
        video_id: String,
        seconds: f64,
        percent: f64,
    },
    /// A case's "viewed" checkbox was clicked
    CaseToggled { case_id: String },
}

/// Something the UI should reflect
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "update", rename_all = "snake_case")]
pub enum TrackerUpdate {
    /// Found an embed and started tracking it
    VideoTracked { video_id: String },
    /// A completion was counted toward today's stats
    VideoCounted { video_id: String, first_time: bool },
    /// A case changed viewed state
    CaseChanged { case_id: String, viewed: bool },
}

/// Apply one event to the tracker
pub fn apply_event(tracker: &mut WatchStateTracker, event: PlaybackEvent) -> Option<TrackerUpdate> {
    match event {
        PlaybackEvent::EmbedFound { src } => {
            let Some(video_id) = video_id_from_embed_url(&src) else {
                tracing::debug!("No video id in embed URL: {}", src);
                return None;
            };
            tracker
                .video_identified(&video_id, None)
                .then_some(TrackerUpdate::VideoTracked { video_id })
        }
        PlaybackEvent::VideoIdentified { video_id, duration } => {
            tracker.video_identified(&video_id, duration);
            None
        }
        PlaybackEvent::DurationResolved { video_id, seconds } => {
            tracker.set_duration(&video_id, seconds);
            None
        }
        PlaybackEvent::TimeUpdate {
            video_id,
            seconds,
            percent,
        } => {
            tracker.position_tick(&video_id, seconds);
            if percent <= tracker.settings().completion_threshold {
                return None;
            }
            match tracker.completion_threshold_crossed(&video_id, percent) {
                CompletionOutcome::Counted { first_time } => Some(TrackerUpdate::VideoCounted {
                    video_id,
                    first_time,
                }),
                _ => None,
            }
        }
        PlaybackEvent::CaseToggled { case_id } => tracker
            .toggle_case_viewed(&case_id)
            .map(|viewed| TrackerUpdate::CaseChanged { case_id, viewed }),
    }
}

/// Drain `events` into the tracker until every sender is dropped
///
/// Updates are sent best-effort; a closed `updates` receiver does not stop
/// tracking. Returns the number of events applied.
pub async fn run_event_loop(
    tracker: &mut WatchStateTracker,
    mut events: mpsc::Receiver<PlaybackEvent>,
    updates: mpsc::Sender<TrackerUpdate>,
) -> usize {
    let mut applied = 0;
    while let Some(event) = events.recv().await {
        applied += 1;
        if let Some(update) = apply_event(tracker, event) {
            let _ = updates.send(update).await;
        }
    }
    tracing::debug!(session = %tracker.session_id(), "Event stream closed after {} events", applied);
    applied
}

/// Ask the player for its duration and forward it as an event
///
/// Failure leaves the duration unknown; completions then credit zero seconds.
pub async fn resolve_duration(player: &dyn PlayerControls, events: &mpsc::Sender<PlaybackEvent>) {
    match player.duration().await {
        Ok(seconds) => {
            let _ = events
                .send(PlaybackEvent::DurationResolved {
                    video_id: player.video_id().to_string(),
                    seconds,
                })
                .await;
        }
        Err(e) => {
            tracing::info!("Failed to get duration for video {}: {}", player.video_id(), e);
        }
    }
}
