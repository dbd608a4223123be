//! Timeline pointer handling
//!
//! Converts pointer positions on the progress bar into seek targets and
//! tells clicks apart from drags.

use tracing::debug;

/// Distance in pixels a pressed pointer must travel before it counts as a drag
pub const DRAG_THRESHOLD_PX: f64 = 3.0;

/// Maximum distance between a requested seek and a reported time for the
/// surface to count as having confirmed it
pub const SEEK_CONFIRM_TOLERANCE: f64 = 0.5;

/// Horizontal placement of the timeline track, in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackGeometry {
    pub left: f64,
    pub width: f64,
}

impl TrackGeometry {
    pub fn new(left: f64, width: f64) -> Self {
        Self { left, width }
    }

    /// `clamp((x - left) / width, 0, 1)`; 0 for a degenerate track
    pub fn fraction_at(&self, x: f64) -> f64 {
        if self.width <= 0.0 || !self.width.is_finite() || !x.is_finite() {
            return 0.0;
        }
        ((x - self.left) / self.width).clamp(0.0, 1.0)
    }

    /// Target time for pointer `x` on content of `duration` seconds
    pub fn time_at(&self, x: f64, duration: f64) -> f64 {
        self.fraction_at(x) * duration.max(0.0)
    }
}

impl Default for TrackGeometry {
    fn default() -> Self {
        Self { left: 0.0, width: 0.0 }
    }
}

/// What the controller should do in response to a pointer event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeekAction {
    /// Nothing to do
    None,
    /// Single click: seek immediately
    Seek(f64),
    /// Drag in progress: seek and keep the seeking window open
    Scrub(f64),
    /// Drag released: final seek, window closes once the surface confirms
    Commit(f64),
}

/// Seeking window states
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SeekPhase {
    #[default]
    Idle,
    /// Pointer held and moving; surface time updates are suppressed
    Scrubbing { target: f64 },
    /// Drag committed; waiting for the surface to report `target`
    Settling { target: f64 },
}

impl SeekPhase {
    pub fn is_seeking(&self) -> bool {
        !matches!(self, SeekPhase::Idle)
    }

    /// Apply a surface-reported time. Returns true when the time may
    /// overwrite the session position.
    pub fn accept_time(&mut self, time: f64) -> bool {
        match *self {
            SeekPhase::Idle => true,
            SeekPhase::Scrubbing { .. } => false,
            SeekPhase::Settling { target } => {
                if (time - target).abs() <= SEEK_CONFIRM_TOLERANCE {
                    *self = SeekPhase::Idle;
                    true
                } else {
                    false
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Idle,
    Pressed { x: f64 },
    Dragging,
}

/// Pointer gesture tracker for the timeline
#[derive(Debug, Clone)]
pub struct SeekController {
    geometry: TrackGeometry,
    gesture: Gesture,
}

impl SeekController {
    pub fn new(geometry: TrackGeometry) -> Self {
        Self {
            geometry,
            gesture: Gesture::Idle,
        }
    }

    /// Update the track placement, e.g. after a resize
    pub fn set_geometry(&mut self, geometry: TrackGeometry) {
        self.geometry = geometry;
    }

    pub fn geometry(&self) -> TrackGeometry {
        self.geometry
    }

    /// Is a drag currently in progress
    pub fn is_dragging(&self) -> bool {
        self.gesture == Gesture::Dragging
    }

    /// Single click without a press/release pair
    pub fn click(&mut self, x: f64, duration: f64) -> SeekAction {
        self.gesture = Gesture::Idle;
        SeekAction::Seek(self.geometry.time_at(x, duration))
    }

    /// Pointer pressed on the track
    pub fn pointer_down(&mut self, x: f64) -> SeekAction {
        self.gesture = Gesture::Pressed { x };
        SeekAction::None
    }

    /// Pointer moved; starts or continues a drag
    pub fn pointer_move(&mut self, x: f64, duration: f64) -> SeekAction {
        match self.gesture {
            Gesture::Idle => SeekAction::None,
            Gesture::Pressed { x: start } if (x - start).abs() < DRAG_THRESHOLD_PX => {
                SeekAction::None
            }
            Gesture::Pressed { .. } | Gesture::Dragging => {
                self.gesture = Gesture::Dragging;
                let time = self.geometry.time_at(x, duration);
                debug!(x = x, time = time, "Scrubbing");
                SeekAction::Scrub(time)
            }
        }
    }

    /// Pointer released; a press that never became a drag is a click
    pub fn pointer_up(&mut self, x: f64, duration: f64) -> SeekAction {
        let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);
        let time = self.geometry.time_at(x, duration);
        match gesture {
            Gesture::Idle => SeekAction::None,
            Gesture::Pressed { .. } => SeekAction::Seek(time),
            Gesture::Dragging => SeekAction::Commit(time),
        }
    }

    /// Abandon the gesture, e.g. when the pointer leaves the window
    pub fn cancel(&mut self) {
        self.gesture = Gesture::Idle;
    }
}

impl Default for SeekController {
    fn default() -> Self {
        Self::new(TrackGeometry::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_clamps() {
        let geometry = TrackGeometry::new(100.0, 400.0);
        assert_eq!(geometry.fraction_at(100.0), 0.0);
        assert_eq!(geometry.fraction_at(300.0), 0.5);
        assert_eq!(geometry.fraction_at(50.0), 0.0);
        assert_eq!(geometry.fraction_at(900.0), 1.0);
        assert_eq!(TrackGeometry::new(0.0, 0.0).fraction_at(10.0), 0.0);
    }

    #[test]
    fn test_click_seeks_immediately() {
        let mut seek = SeekController::new(TrackGeometry::new(0.0, 200.0));
        assert_eq!(seek.click(50.0, 120.0), SeekAction::Seek(30.0));
    }

    #[test]
    fn test_press_release_without_move_is_click() {
        let mut seek = SeekController::new(TrackGeometry::new(0.0, 200.0));
        assert_eq!(seek.pointer_down(100.0), SeekAction::None);
        assert_eq!(seek.pointer_move(101.0, 120.0), SeekAction::None);
        assert_eq!(seek.pointer_up(101.0, 120.0), SeekAction::Seek(60.6));
    }

    #[test]
    fn test_drag_scrubs_then_commits() {
        let mut seek = SeekController::new(TrackGeometry::new(0.0, 200.0));
        seek.pointer_down(0.0);
        assert_eq!(seek.pointer_move(40.0, 100.0), SeekAction::Scrub(20.0));
        assert!(seek.is_dragging());
        assert_eq!(seek.pointer_move(80.0, 100.0), SeekAction::Scrub(40.0));
        assert_eq!(seek.pointer_up(100.0, 100.0), SeekAction::Commit(50.0));
        assert!(!seek.is_dragging());
    }

    #[test]
    fn test_move_without_press_is_ignored() {
        let mut seek = SeekController::new(TrackGeometry::new(0.0, 200.0));
        assert_eq!(seek.pointer_move(40.0, 100.0), SeekAction::None);
        assert_eq!(seek.pointer_up(40.0, 100.0), SeekAction::None);
    }

    #[test]
    fn test_settling_waits_for_confirmation() {
        let mut phase = SeekPhase::Settling { target: 50.0 };
        assert!(phase.is_seeking());
        assert!(!phase.accept_time(12.0));
        assert!(phase.accept_time(50.2));
        assert_eq!(phase, SeekPhase::Idle);
        assert!(phase.accept_time(51.0));
    }

    #[test]
    fn test_scrubbing_suppresses_all_times() {
        let mut phase = SeekPhase::Scrubbing { target: 10.0 };
        assert!(!phase.accept_time(10.0));
        assert!(phase.is_seeking());
    }
}
