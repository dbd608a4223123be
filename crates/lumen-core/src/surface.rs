//! Media surface seam
//!
//! The surface decodes and renders one source URL at a time. The controller
//! drives it through [`MediaSurface`] and learns about its progress only
//! through [`SurfaceEvent`]s delivered in order.

use crate::{
    buffer::{last_range_end, BufferedRange},
    types::TrackMode,
};
use serde::{Deserialize, Serialize};

/// Capabilities the controller needs from a playback surface
pub trait MediaSurface: Send {
    /// Point the surface at a new source and start loading it
    fn load(&mut self, url: &str);

    /// Start or resume playback
    fn play(&mut self);

    /// Pause playback
    fn pause(&mut self);

    /// Seek to a position in seconds
    fn seek(&mut self, time: f64);

    /// Set output volume (0.0 - 1.0)
    fn set_volume(&mut self, volume: f64);

    /// Mute independently of volume
    fn set_muted(&mut self, muted: bool);

    /// Set playback rate
    fn set_playback_rate(&mut self, rate: f64);

    /// Set the display mode of the text track at `index`
    fn set_track_mode(&mut self, index: usize, mode: TrackMode);

    /// End of the last buffered range, in seconds
    fn buffered_end(&self) -> Option<f64>;

    /// Whether the surface keeps its position across `load`.
    /// When false the controller reissues the seek after the reload.
    fn preserves_position_on_load(&self) -> bool {
        false
    }
}

/// Notifications emitted by the surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SurfaceEvent {
    /// Metadata for `url` is available
    Loaded { url: String, duration: f64 },
    /// Playback position advanced
    TimeUpdate { time: f64 },
    /// More data was buffered; query `buffered_end`
    Progress,
    /// A seek completed at `time`
    Seeked { time: f64 },
    Played,
    Paused,
    Ended,
    /// `url` failed to load or decode
    Error { url: String },
}

impl SurfaceEvent {
    /// Source URL the event is tied to, if any
    pub fn url(&self) -> Option<&str> {
        match self {
            SurfaceEvent::Loaded { url, .. } | SurfaceEvent::Error { url } => Some(url),
            _ => None,
        }
    }
}

/// A command received by a [`ScriptedSurface`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum SurfaceCommand {
    Load { url: String },
    Play,
    Pause,
    Seek { time: f64 },
    SetVolume { volume: f64 },
    SetMuted { muted: bool },
    SetPlaybackRate { rate: f64 },
    SetTrackMode { index: usize, mode: TrackMode },
}

/// In-memory surface that records commands instead of rendering.
///
/// Used for headless hosts and tests; events are fed to the controller by
/// the caller.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSurface {
    commands: Vec<SurfaceCommand>,
    buffered: Vec<BufferedRange>,
    current_url: Option<String>,
    preserves_position: bool,
}

impl ScriptedSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Surface that keeps its position across reloads
    pub fn preserving_position() -> Self {
        Self {
            preserves_position: true,
            ..Self::default()
        }
    }

    /// Replace the buffered ranges the surface reports
    pub fn set_buffered(&mut self, ranges: Vec<BufferedRange>) {
        self.buffered = ranges;
    }

    /// All commands received so far
    pub fn commands(&self) -> &[SurfaceCommand] {
        &self.commands
    }

    /// Drain the command log
    pub fn take_commands(&mut self) -> Vec<SurfaceCommand> {
        std::mem::take(&mut self.commands)
    }

    /// URL of the last `load`
    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    /// Last mode set for a track, if any
    pub fn track_mode(&self, index: usize) -> Option<TrackMode> {
        self.commands.iter().rev().find_map(|c| match c {
            SurfaceCommand::SetTrackMode { index: i, mode } if *i == index => Some(*mode),
            _ => None,
        })
    }
}

impl MediaSurface for ScriptedSurface {
    fn load(&mut self, url: &str) {
        self.current_url = Some(url.to_string());
        self.buffered.clear();
        self.commands.push(SurfaceCommand::Load { url: url.to_string() });
    }

    fn play(&mut self) {
        self.commands.push(SurfaceCommand::Play);
    }

    fn pause(&mut self) {
        self.commands.push(SurfaceCommand::Pause);
    }

    fn seek(&mut self, time: f64) {
        self.commands.push(SurfaceCommand::Seek { time });
    }

    fn set_volume(&mut self, volume: f64) {
        self.commands.push(SurfaceCommand::SetVolume { volume });
    }

    fn set_muted(&mut self, muted: bool) {
        self.commands.push(SurfaceCommand::SetMuted { muted });
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.commands.push(SurfaceCommand::SetPlaybackRate { rate });
    }

    fn set_track_mode(&mut self, index: usize, mode: TrackMode) {
        self.commands.push(SurfaceCommand::SetTrackMode { index, mode });
    }

    fn buffered_end(&self) -> Option<f64> {
        last_range_end(&self.buffered)
    }

    fn preserves_position_on_load(&self) -> bool {
        self.preserves_position
    }
}
