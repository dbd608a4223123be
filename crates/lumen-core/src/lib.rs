//! Lumen Core - Adaptive Playback Controller
//!
//! This crate provides the engine behind the Lumen lesson player:
//! - Playback state machine reconciling surface events with user commands
//! - Quality ladder selection, switching and error-triggered fallback
//! - Single-active subtitle track selection
//! - Timeline seek gestures and buffered-fraction tracking
//! - Keyboard shortcut mapping
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          Lumen Core                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐          │
//! │  │   Quality    │  │   Subtitle   │  │   Seek /     │          │
//! │  │   Manager    │  │   Manager    │  │   Buffer     │          │
//! │  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘          │
//! │         │                 │                 │                   │
//! │         └─────────────────┼─────────────────┘                   │
//! │                           │                                     │
//! │                    ┌──────┴──────┐                              │
//! │                    │  Playback   │◄──── commands / keys         │
//! │                    │ Controller  │                              │
//! │                    └──────┬──────┘                              │
//! │                           │                                     │
//! │  ┌──────────────┐  ┌──────┴──────┐  ┌──────────────┐           │
//! │  │   Observer   │  │   Surface   │  │    State     │           │
//! │  │  Callbacks   │  │   Events    │  │  Broadcast   │           │
//! │  └──────────────┘  └─────────────┘  └──────────────┘           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use lumen_core::{PlaybackController, PlayerConfig, QualityProfile, ScriptedSurface, SurfaceEvent};
//!
//! let config = PlayerConfig::default()
//!     .with_qualities(vec![
//!         QualityProfile::new("240p", "https://cdn.example.com/240.mp4"),
//!         QualityProfile::new("720p", "https://cdn.example.com/720.mp4"),
//!     ])
//!     .with_duration(120.0);
//!
//! let mut player = PlaybackController::new(config, ScriptedSurface::new()).unwrap();
//! player.handle_event(SurfaceEvent::Loaded {
//!     url: "https://cdn.example.com/720.mp4".into(),
//!     duration: 120.0,
//! });
//! player.seek_to(999.0);
//! assert_eq!(player.session().current_time, 120.0);
//! ```

pub mod error;
pub mod types;
pub mod config;
pub mod surface;
pub mod buffer;
pub mod seek;
pub mod subtitles;
pub mod quality;
pub mod keyboard;
pub mod init;
pub mod observer;
pub mod controller;

pub use error::{Error, Result};
pub use types::*;
pub use config::PlayerConfig;
pub use surface::{MediaSurface, ScriptedSurface, SurfaceCommand, SurfaceEvent};
pub use buffer::BufferTracker;
pub use seek::{SeekAction, SeekController, SeekPhase, TrackGeometry};
pub use subtitles::SubtitleTrackManager;
pub use quality::{PendingReload, QualityManager, ReloadReason};
pub use keyboard::{Key, KeyboardInputMapper, PlayerCommand};
pub use init::{InitialSelection, InitializationResolver};
pub use observer::{NoopObserver, ObservedEvent, PlaybackObserver, RecordingObserver};
pub use controller::{ControllerInput, PlaybackController};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
