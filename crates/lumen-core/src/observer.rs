//! Callbacks emitted to the hosting UI

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Receiver of playback callbacks. Every method defaults to a no-op.
pub trait PlaybackObserver: Send {
    /// Position advanced
    fn on_time_update(&mut self, _current_time: f64, _duration: f64) {}

    /// Played fraction, 0 while duration is unknown
    fn on_progress(&mut self, _fraction: f64) {}

    fn on_play(&mut self) {}

    fn on_pause(&mut self) {}

    fn on_ended(&mut self) {}

    /// Host should toggle fullscreen
    fn on_fullscreen_toggle(&mut self) {}

    /// Playback failed with no fallback left
    fn on_error(&mut self, _error: &Error) {}
}

/// Observer that ignores every callback
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PlaybackObserver for NoopObserver {}

/// A callback as seen by [`RecordingObserver`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ObservedEvent {
    TimeUpdate { current_time: f64, duration: f64 },
    Progress { fraction: f64 },
    Play,
    Pause,
    Ended,
    FullscreenToggle,
    Error { code: String, message: String },
}

/// Observer that records callbacks; clones share one log
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<ObservedEvent>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded callbacks
    pub fn events(&self) -> Vec<ObservedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Drain recorded callbacks
    pub fn take(&self) -> Vec<ObservedEvent> {
        self.events
            .lock()
            .map(|mut e| std::mem::take(&mut *e))
            .unwrap_or_default()
    }

    fn record(&self, event: ObservedEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl PlaybackObserver for RecordingObserver {
    fn on_time_update(&mut self, current_time: f64, duration: f64) {
        self.record(ObservedEvent::TimeUpdate { current_time, duration });
    }

    fn on_progress(&mut self, fraction: f64) {
        self.record(ObservedEvent::Progress { fraction });
    }

    fn on_play(&mut self) {
        self.record(ObservedEvent::Play);
    }

    fn on_pause(&mut self) {
        self.record(ObservedEvent::Pause);
    }

    fn on_ended(&mut self) {
        self.record(ObservedEvent::Ended);
    }

    fn on_fullscreen_toggle(&mut self) {
        self.record(ObservedEvent::FullscreenToggle);
    }

    fn on_error(&mut self, error: &Error) {
        self.record(ObservedEvent::Error {
            code: error.error_code().to_string(),
            message: error.to_string(),
        });
    }
}
