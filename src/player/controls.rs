//! Best-effort player controls
//!
//! Each helper issues one or more capability calls and logs any failure
//! instead of returning it. A `None` result means the control did nothing
//! useful; callers leave their button state alone in that case.

use super::{PlayerControls, PlayerError};
use crate::config::PlayerSettings;

/// Playback state after a play/pause toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Playing,
    Paused,
}

fn best_effort<T>(video_id: &str, action: &str, result: Result<T, PlayerError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(video_id, "Error {}: {}", action, e);
            None
        }
    }
}

/// Play (and unmute) a paused video, or pause a playing one
pub async fn toggle_play_pause(player: &dyn PlayerControls) -> Option<PlayState> {
    let id = player.video_id();
    let paused = best_effort(id, "reading paused state", player.is_paused().await)?;

    if paused {
        best_effort(id, "starting playback", player.play().await)?;
        best_effort(id, "unmuting", player.set_muted(false).await);
        Some(PlayState::Playing)
    } else {
        best_effort(id, "pausing", player.pause().await)?;
        Some(PlayState::Paused)
    }
}

/// Flip mute, returning the new muted state
pub async fn toggle_mute(player: &dyn PlayerControls) -> Option<bool> {
    let id = player.video_id();
    let muted = best_effort(id, "reading mute state", player.is_muted().await)?;
    best_effort(id, "toggling mute", player.set_muted(!muted).await)?;
    Some(!muted)
}

/// Rate following `current` in `steps`, wrapping around
///
/// A rate not in `steps` restarts the cycle at the first step.
pub fn next_speed(current: f64, steps: &[f64]) -> f64 {
    let Some(&first) = steps.first() else {
        return current;
    };
    match steps.iter().position(|s| (s - current).abs() < 1e-6) {
        Some(i) => steps[(i + 1) % steps.len()],
        None => first,
    }
}

/// Advance the playback rate one step, returning the rate now set
pub async fn cycle_speed(player: &dyn PlayerControls, steps: &[f64]) -> Option<f64> {
    let id = player.video_id();
    let current = best_effort(id, "reading playback rate", player.playback_rate().await)?;
    let next = next_speed(current, steps);
    best_effort(id, "setting playback rate", player.set_playback_rate(next).await)?;
    Some(next)
}

/// Enter picture-in-picture (unmuted and playing) or leave it
///
/// Returns whether the player is in picture-in-picture afterwards.
pub async fn toggle_picture_in_picture(player: &dyn PlayerControls) -> Option<bool> {
    let id = player.video_id();
    let active = best_effort(id, "reading picture-in-picture state", player.is_picture_in_picture().await)?;

    if active {
        best_effort(id, "leaving picture-in-picture", player.exit_picture_in_picture().await)?;
        return Some(false);
    }

    best_effort(id, "unmuting", player.set_muted(false).await);
    best_effort(id, "requesting picture-in-picture", player.request_picture_in_picture().await)?;
    best_effort(id, "starting playback", player.play().await);
    Some(true)
}

pub async fn enter_fullscreen(player: &dyn PlayerControls) -> bool {
    best_effort(player.video_id(), "requesting fullscreen", player.request_fullscreen().await).is_some()
}

/// Reaction to the player entering picture-in-picture on its own
pub async fn on_enter_picture_in_picture(player: &dyn PlayerControls) {
    let id = player.video_id();
    best_effort(id, "unmuting", player.set_muted(false).await);
    best_effort(id, "starting playback", player.play().await);
}

/// Reaction to the player leaving picture-in-picture
pub async fn on_leave_picture_in_picture(player: &dyn PlayerControls) {
    best_effort(player.video_id(), "pausing", player.pause().await);
}

/// Initial setup for a player found on the page
///
/// `index` is the player's position on the page; only the first one autoplays.
pub async fn prepare_player(player: &dyn PlayerControls, settings: &PlayerSettings, index: usize) {
    let id = player.video_id();
    best_effort(
        id,
        "setting playback rate",
        player.set_playback_rate(settings.default_playback_rate).await,
    );

    if settings.autoplay_first_video && index == 0 {
        best_effort(id, "unmuting", player.set_muted(false).await);
        best_effort(id, "starting playback", player.play().await);
    }

    best_effort(id, "setting volume", player.set_volume(settings.default_volume).await);
}
