//! Embedded player boundary
//!
//! The player is a capability source the tracker never depends on directly.
//! Page glue implements [`PlayerControls`] over whatever player API it has;
//! every call is async and may fail. The helpers in [`controls`] wrap those
//! calls best-effort (log and carry on), and [`events`] turns the player's
//! raw callbacks into tracker calls.

pub mod controls;
pub mod events;

pub use controls::{
    PlayState, cycle_speed, enter_fullscreen, next_speed, on_enter_picture_in_picture,
    on_leave_picture_in_picture, prepare_player, toggle_mute, toggle_picture_in_picture,
    toggle_play_pause,
};
pub use events::{PlaybackEvent, TrackerUpdate, apply_event, resolve_duration, run_event_loop};

use async_trait::async_trait;

/// Error type for player capability calls
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlayerError {
    #[error("Player rejected call: {0}")]
    Rejected(String),

    #[error("Player not ready")]
    NotReady,

    #[error("Not supported by this player: {0}")]
    Unsupported(&'static str),
}

/// Control and query surface of one embedded player
#[async_trait]
pub trait PlayerControls: Send + Sync {
    /// Identifier of the video loaded in this player
    fn video_id(&self) -> &str;

    async fn duration(&self) -> Result<f64, PlayerError>;
    async fn current_time(&self) -> Result<f64, PlayerError>;

    async fn is_paused(&self) -> Result<bool, PlayerError>;
    async fn play(&self) -> Result<(), PlayerError>;
    async fn pause(&self) -> Result<(), PlayerError>;

    async fn is_muted(&self) -> Result<bool, PlayerError>;
    async fn set_muted(&self, muted: bool) -> Result<(), PlayerError>;

    async fn playback_rate(&self) -> Result<f64, PlayerError>;
    async fn set_playback_rate(&self, rate: f64) -> Result<(), PlayerError>;

    async fn set_volume(&self, volume: f64) -> Result<(), PlayerError>;

    async fn request_fullscreen(&self) -> Result<(), PlayerError>;

    async fn is_picture_in_picture(&self) -> Result<bool, PlayerError>;
    async fn request_picture_in_picture(&self) -> Result<(), PlayerError>;
    async fn exit_picture_in_picture(&self) -> Result<(), PlayerError>;
}
