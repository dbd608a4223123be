//! Core types for Lumen

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Playback state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Session created, no source requested yet
    Idle,
    /// A source is loading (initial load, quality switch or fallback)
    Loading,
    /// Metadata known, playback not started
    Ready,
    /// Content is playing
    Playing,
    /// Playback paused
    Paused,
    /// Playback reached the end of the content
    Ended,
    /// Unrecoverable source failure
    Error,
}

impl PlaybackState {
    /// Check if transition to target state is valid
    pub fn can_transition_to(&self, target: PlaybackState) -> bool {
        use PlaybackState::*;
        matches!(
            (self, target),
            // From Idle
            (Idle, Loading) |
            // From Loading
            (Loading, Ready) | (Loading, Error) |
            // From Ready
            (Ready, Playing) | (Ready, Paused) | (Ready, Ended) | (Ready, Loading) | (Ready, Error) |
            // From Playing
            (Playing, Paused) | (Playing, Ended) | (Playing, Loading) | (Playing, Error) |
            // From Paused
            (Paused, Playing) | (Paused, Ended) | (Paused, Loading) | (Paused, Error) |
            // From Ended
            (Ended, Playing) | (Ended, Paused) | (Ended, Loading) | (Ended, Error) |
            // From Error, only a new source leaves it
            (Error, Loading)
        )
    }

    /// Coarse load state exposed to hosts
    pub fn load_state(&self) -> LoadState {
        match self {
            PlaybackState::Idle => LoadState::Idle,
            PlaybackState::Loading => LoadState::Loading,
            PlaybackState::Ready
            | PlaybackState::Playing
            | PlaybackState::Paused
            | PlaybackState::Ended => LoadState::Ready,
            PlaybackState::Error => LoadState::Error,
        }
    }
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Idle => write!(f, "idle"),
            PlaybackState::Loading => write!(f, "loading"),
            PlaybackState::Ready => write!(f, "ready"),
            PlaybackState::Playing => write!(f, "playing"),
            PlaybackState::Paused => write!(f, "paused"),
            PlaybackState::Ended => write!(f, "ended"),
            PlaybackState::Error => write!(f, "error"),
        }
    }
}

/// Load state as seen by the UI; an error affordance is rendered only for `Error`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Error,
}

/// One rendition in the quality ladder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityProfile {
    /// Display label, e.g. "720p"
    pub label: String,
    /// Resolution string, e.g. "1280x720"
    #[serde(default)]
    pub resolution: String,
    /// Bitrate in bits per second
    #[serde(default)]
    pub bitrate_bps: u64,
    /// Source URL handed to the surface
    pub source_url: String,
    /// Has transcoding finished for this rendition
    #[serde(default = "default_true")]
    pub is_processed: bool,
}

impl QualityProfile {
    /// Create a new quality profile
    pub fn new(label: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            resolution: String::new(),
            bitrate_bps: 0,
            source_url: source_url.into(),
            is_processed: true,
        }
    }

    /// Set the resolution string
    pub fn with_resolution(mut self, resolution: impl Into<String>) -> Self {
        self.resolution = resolution.into();
        self
    }

    /// Set the bitrate
    pub fn with_bitrate(mut self, bitrate_bps: u64) -> Self {
        self.bitrate_bps = bitrate_bps;
        self
    }

    /// Case-insensitive label comparison
    pub fn matches_label(&self, label: &str) -> bool {
        self.label.eq_ignore_ascii_case(label)
    }
}

/// Subtitle track supplied with the asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtitleTrack {
    /// BCP-47 language code (e.g., "en", "es")
    pub language: String,
    /// Human-readable label
    pub label: String,
    /// URL to the track file
    pub url: String,
    /// Is this the default track
    #[serde(default)]
    pub is_default: bool,
    /// Is this an auto-generated track (e.g., ASR)
    #[serde(default)]
    pub is_auto_generated: bool,
}

impl SubtitleTrack {
    /// Create a new subtitle track
    pub fn new(
        language: impl Into<String>,
        label: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            language: language.into(),
            label: label.into(),
            url: url.into(),
            is_default: false,
            is_auto_generated: false,
        }
    }

    /// Set as default track
    pub fn with_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }

    /// Mark as auto-generated
    pub fn with_auto_generated(mut self, is_auto: bool) -> Self {
        self.is_auto_generated = is_auto;
        self
    }

    /// BCP-47 tags compare case-insensitively
    pub fn matches_language(&self, language: &str) -> bool {
        self.language.eq_ignore_ascii_case(language)
    }
}

/// Display mode of a text track on the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackMode {
    Disabled,
    Showing,
}

/// Live state of one playback instance
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSession {
    pub id: SessionId,
    pub state: PlaybackState,
    pub current_time: f64,
    /// 0 until known
    pub duration: f64,
    /// Play intent; survives a reload in flight
    pub is_playing: bool,
    pub is_muted: bool,
    pub volume: f64,
    pub playback_rate: f64,
    pub rate_locked: bool,
    pub buffered_fraction: f64,
    pub is_seeking: bool,
    pub selected_quality: Option<String>,
    pub active_subtitle: Option<String>,
    pub last_error: Option<String>,
}

impl PlaybackSession {
    /// Create a fresh session for content of the given duration
    pub fn new(duration: f64) -> Self {
        Self {
            id: SessionId::new(),
            state: PlaybackState::Idle,
            current_time: 0.0,
            duration: if duration.is_finite() { duration.max(0.0) } else { 0.0 },
            is_playing: false,
            is_muted: false,
            volume: crate::config::DEFAULT_VOLUME,
            playback_rate: 1.0,
            rate_locked: false,
            buffered_fraction: 0.0,
            is_seeking: false,
            selected_quality: None,
            active_subtitle: None,
            last_error: None,
        }
    }

    /// Coarse load state
    pub fn load_state(&self) -> LoadState {
        self.state.load_state()
    }

    /// `current_time / duration`, 0 when duration is unknown
    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 {
            self.current_time / self.duration
        } else {
            0.0
        }
    }
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self::new(0.0)
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_transitions() {
        assert!(PlaybackState::Idle.can_transition_to(PlaybackState::Loading));
        assert!(PlaybackState::Loading.can_transition_to(PlaybackState::Ready));
        assert!(PlaybackState::Playing.can_transition_to(PlaybackState::Loading));
        assert!(PlaybackState::Error.can_transition_to(PlaybackState::Loading));

        assert!(!PlaybackState::Idle.can_transition_to(PlaybackState::Playing));
        assert!(!PlaybackState::Loading.can_transition_to(PlaybackState::Ended));
        assert!(!PlaybackState::Error.can_transition_to(PlaybackState::Playing));
    }

    #[test]
    fn test_load_state_mapping() {
        assert_eq!(PlaybackState::Paused.load_state(), LoadState::Ready);
        assert_eq!(PlaybackState::Ended.load_state(), LoadState::Ready);
        assert_eq!(PlaybackState::Loading.load_state(), LoadState::Loading);
        assert_eq!(PlaybackState::Error.load_state(), LoadState::Error);
    }

    #[test]
    fn test_profile_deserialize_defaults() {
        let profile: QualityProfile =
            serde_json::from_str(r#"{"label":"720p","sourceUrl":"https://cdn.example.com/720.mp4"}"#)
                .unwrap();
        assert_eq!(profile.bitrate_bps, 0);
        assert!(profile.is_processed);
        assert!(profile.matches_label("720P"));
    }

    #[test]
    fn test_session_progress() {
        let mut session = PlaybackSession::new(120.0);
        assert_eq!(session.progress(), 0.0);
        session.current_time = 60.0;
        assert_eq!(session.progress(), 0.5);

        let empty = PlaybackSession::new(f64::NAN);
        assert_eq!(empty.duration, 0.0);
        assert_eq!(empty.progress(), 0.0);
    }
}
