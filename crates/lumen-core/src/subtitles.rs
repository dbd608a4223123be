//! Subtitle track selection
//!
//! At most one track is ever showing. Every activation pushes the mode of
//! every track to the surface, whether or not the selection changed.

use crate::{
    error::Error,
    surface::MediaSurface,
    types::{SubtitleTrack, TrackMode},
};
use tracing::{info, warn};

/// Owns the subtitle list of a session and its single active track
#[derive(Debug, Clone)]
pub struct SubtitleTrackManager {
    tracks: Vec<SubtitleTrack>,
    modes: Vec<TrackMode>,
    active: Option<usize>,
}

impl SubtitleTrackManager {
    /// Create a manager with every track disabled
    pub fn new(tracks: Vec<SubtitleTrack>) -> Self {
        let modes = vec![TrackMode::Disabled; tracks.len()];
        Self {
            tracks,
            modes,
            active: None,
        }
    }

    /// Pick the startup track.
    ///
    /// Disabled captions always yield `None`. Otherwise the preferred
    /// language wins, then the default track, then the first track.
    pub fn select_initial<'a>(
        tracks: &'a [SubtitleTrack],
        preferred_language: Option<&str>,
        enabled_by_default: bool,
    ) -> Option<&'a SubtitleTrack> {
        if !enabled_by_default {
            return None;
        }

        preferred_language
            .and_then(|lang| tracks.iter().find(|t| t.matches_language(lang)))
            .or_else(|| tracks.iter().find(|t| t.is_default))
            .or_else(|| tracks.first())
    }

    /// Activate the track for `language`, or disable all tracks with `None`.
    ///
    /// Returns the track now showing. An unknown language leaves every
    /// track disabled.
    pub fn set_active(
        &mut self,
        language: Option<&str>,
        surface: &mut dyn MediaSurface,
    ) -> Option<&SubtitleTrack> {
        let target = language.and_then(|lang| self.tracks.iter().position(|t| t.matches_language(lang)));

        if let (Some(lang), None) = (language, target) {
            let err = Error::UnknownSubtitle {
                language: lang.to_string(),
            };
            warn!(error = %err, "Disabling subtitles");
        }

        for (index, mode) in self.modes.iter_mut().enumerate() {
            *mode = if Some(index) == target {
                TrackMode::Showing
            } else {
                TrackMode::Disabled
            };
            surface.set_track_mode(index, *mode);
        }
        self.active = target;

        let active = target.map(|i| &self.tracks[i]);
        info!(
            language = active.map(|t| t.language.as_str()).unwrap_or("off"),
            "Subtitle track activated"
        );
        active
    }

    /// Currently showing track
    pub fn active(&self) -> Option<&SubtitleTrack> {
        self.active.map(|i| &self.tracks[i])
    }

    /// All tracks in caller order
    pub fn tracks(&self) -> &[SubtitleTrack] {
        &self.tracks
    }

    /// Mode of each track, parallel to `tracks()`
    pub fn modes(&self) -> &[TrackMode] {
        &self.modes
    }
}
