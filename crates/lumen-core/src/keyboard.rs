//! Keyboard shortcuts and the player command set

use crate::config::{SEEK_STEP_SECONDS, VOLUME_STEP};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::str::FromStr;

/// Commands the UI can issue to the controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlayerCommand {
    Play,
    Pause,
    TogglePlay,
    SeekTo { time: f64 },
    /// Relative seek in seconds
    SeekBy { delta: f64 },
    SetVolume { volume: f64 },
    /// Relative volume change
    AdjustVolume { delta: f64 },
    ToggleMute,
    SetPlaybackRate { rate: f64 },
    SwitchQuality { label: String },
    SetSubtitle { language: Option<String> },
    /// Delegated to the host
    ToggleFullscreen,
    /// Timeline pointer gestures, x in pixels
    TimelineClick { x: f64 },
    TimelineDown { x: f64 },
    TimelineMove { x: f64 },
    TimelineUp { x: f64 },
    /// Pointer left the window mid-gesture
    TimelineCancel,
}

/// A key press, named after DOM `KeyboardEvent.key` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Space,
    ArrowRight,
    ArrowLeft,
    ArrowUp,
    ArrowDown,
    Character(char),
    Other,
}

impl FromStr for Key {
    type Err = Infallible;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let key = match name {
            " " | "Space" | "Spacebar" => Key::Space,
            "ArrowRight" => Key::ArrowRight,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Character(c),
                    _ => Key::Other,
                }
            }
        };
        Ok(key)
    }
}

/// Fixed key to command table
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyboardInputMapper;

impl KeyboardInputMapper {
    pub fn new() -> Self {
        Self
    }

    /// Command bound to `key`, if any
    pub fn map(&self, key: Key) -> Option<PlayerCommand> {
        match key {
            Key::Space => Some(PlayerCommand::TogglePlay),
            Key::ArrowRight => Some(PlayerCommand::SeekBy { delta: SEEK_STEP_SECONDS }),
            Key::ArrowLeft => Some(PlayerCommand::SeekBy { delta: -SEEK_STEP_SECONDS }),
            Key::ArrowUp => Some(PlayerCommand::AdjustVolume { delta: VOLUME_STEP }),
            Key::ArrowDown => Some(PlayerCommand::AdjustVolume { delta: -VOLUME_STEP }),
            Key::Character('f' | 'F') => Some(PlayerCommand::ToggleFullscreen),
            Key::Character('m' | 'M') => Some(PlayerCommand::ToggleMute),
            Key::Character(' ') => Some(PlayerCommand::TogglePlay),
            Key::Character(_) | Key::Other => None,
        }
    }
}
