//! Quality ladder management
//!
//! Handles:
//! - Initial quality selection
//! - On-demand quality switches
//! - Error-triggered fallback across the ladder
//!
//! A switch or fallback is a two-step operation: the surface is pointed at
//! the new source here, and the resume step runs when the surface reports
//! `Loaded` for that URL. Until then the reload is recorded as a
//! [`PendingReload`]. A newer reload replaces an older one.

use crate::{
    config::DEFAULT_QUALITY_LABEL,
    error::{Error, Result},
    surface::MediaSurface,
    types::{PlaybackSession, QualityProfile},
};
use tracing::{debug, info, instrument, warn};

/// Why a source is being loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadReason {
    /// First load of the session
    Initial,
    /// User-requested quality change
    Switch,
    /// Automatic substitution after a load error
    Fallback,
}

/// A load that has been requested but not yet confirmed by the surface
#[derive(Debug, Clone, PartialEq)]
pub struct PendingReload {
    /// Source being loaded
    pub url: String,
    /// Position to restore once loaded
    pub resume_at: f64,
    /// Resume playback once loaded; tracks play/pause issued meanwhile
    pub resume: bool,
    pub reason: ReloadReason,
}

/// Owns the quality ladder and the selected rendition
#[derive(Debug, Clone)]
pub struct QualityManager {
    profiles: Vec<QualityProfile>,
    selected: Option<usize>,
    /// Used when the ladder is empty
    source_url: String,
    pending: Option<PendingReload>,
    /// URLs that failed since the last successful load
    failed_urls: Vec<String>,
}

impl QualityManager {
    /// Create a manager and pick the initial quality
    pub fn new(
        profiles: Vec<QualityProfile>,
        preferred_label: Option<&str>,
        source_url: impl Into<String>,
    ) -> Self {
        let selected = Self::initial_index(&profiles, preferred_label);
        Self {
            profiles,
            selected,
            source_url: source_url.into(),
            pending: None,
            failed_urls: Vec::new(),
        }
    }

    /// Pick the startup quality: the preferred label (case-insensitive),
    /// else "720p", else the first profile.
    pub fn select_initial<'a>(
        profiles: &'a [QualityProfile],
        preferred_label: Option<&str>,
    ) -> Option<&'a QualityProfile> {
        Self::initial_index(profiles, preferred_label).map(|i| &profiles[i])
    }

    fn initial_index(profiles: &[QualityProfile], preferred_label: Option<&str>) -> Option<usize> {
        if profiles.is_empty() {
            return None;
        }

        preferred_label
            .and_then(|label| profiles.iter().position(|p| p.matches_label(label)))
            .or_else(|| profiles.iter().position(|p| p.matches_label(DEFAULT_QUALITY_LABEL)))
            .or(Some(0))
    }

    /// All profiles in caller order
    pub fn profiles(&self) -> &[QualityProfile] {
        &self.profiles
    }

    /// Currently selected profile
    pub fn selected(&self) -> Option<&QualityProfile> {
        self.selected.map(|i| &self.profiles[i])
    }

    /// URL the surface is (or should be) playing
    pub fn active_url(&self) -> &str {
        self.selected()
            .map(|p| p.source_url.as_str())
            .unwrap_or(&self.source_url)
    }

    /// Quality switching needs at least two profiles
    pub fn can_switch(&self) -> bool {
        self.profiles.len() > 1
    }

    /// Load in flight, if any
    pub fn pending(&self) -> Option<&PendingReload> {
        self.pending.as_ref()
    }

    pub fn is_reloading(&self) -> bool {
        self.pending.is_some()
    }

    /// Record a play/pause issued while a load is in flight.
    /// Returns false when nothing is loading.
    pub fn set_resume_intent(&mut self, resume: bool) -> bool {
        match self.pending.as_mut() {
            Some(pending) => {
                pending.resume = resume;
                true
            }
            None => false,
        }
    }

    /// Record a seek issued while a load is in flight.
    /// Returns false when nothing is loading.
    pub fn set_resume_position(&mut self, time: f64) -> bool {
        match self.pending.as_mut() {
            Some(pending) => {
                pending.resume_at = time;
                true
            }
            None => false,
        }
    }

    /// Start the first load of the session
    pub fn load_initial(&mut self, surface: &mut dyn MediaSurface, resume: bool) -> String {
        let url = self.active_url().to_string();
        info!(url = %url, quality = ?self.selected().map(|p| &p.label), "Loading source");
        surface.load(&url);
        self.pending = Some(PendingReload {
            url: url.clone(),
            resume_at: 0.0,
            resume,
            reason: ReloadReason::Initial,
        });
        url
    }

    /// Switch to the profile labelled `label`.
    ///
    /// Returns `Ok(None)` when the switch is a no-op (same label, or a
    /// ladder too short to switch within).
    #[instrument(skip(self, surface, session))]
    pub fn switch_to(
        &mut self,
        label: &str,
        surface: &mut dyn MediaSurface,
        session: &PlaybackSession,
    ) -> Result<Option<&QualityProfile>> {
        let index = self
            .profiles
            .iter()
            .position(|p| p.matches_label(label))
            .ok_or_else(|| Error::UnknownQuality {
                label: label.to_string(),
            })?;

        if !self.can_switch() || Some(index) == self.selected {
            debug!(label = label, "Quality switch is a no-op");
            return Ok(None);
        }

        self.reload(index, ReloadReason::Switch, surface, session);
        Ok(self.selected())
    }

    /// First profile whose URL differs from `failing_url` and has not
    /// failed since the last successful load
    pub fn fallback_candidate(&self, failing_url: &str) -> Option<usize> {
        self.profiles.iter().position(|p| {
            p.source_url != failing_url && !self.failed_urls.iter().any(|u| *u == p.source_url)
        })
    }

    /// React to a load failure of `failing_url`.
    ///
    /// On success the surface is already reloading the returned profile.
    /// `None` means no fallback exists and the failure is terminal.
    #[instrument(skip(self, surface, session))]
    pub fn on_playback_error(
        &mut self,
        failing_url: &str,
        surface: &mut dyn MediaSurface,
        session: &PlaybackSession,
    ) -> Option<QualityProfile> {
        if !self.failed_urls.iter().any(|u| u == failing_url) {
            self.failed_urls.push(failing_url.to_string());
        }

        let Some(index) = self.fallback_candidate(failing_url) else {
            warn!(
                url = failing_url,
                failed = self.failed_urls.len(),
                "No untried fallback quality available"
            );
            return None;
        };

        self.reload(index, ReloadReason::Fallback, surface, session);
        self.selected().cloned()
    }

    /// Take the pending reload if `url` is the source being loaded
    pub fn complete_reload(&mut self, url: &str) -> Option<PendingReload> {
        if self.pending.as_ref().is_some_and(|p| p.url == url) {
            self.failed_urls.clear();
            self.pending.take()
        } else {
            None
        }
    }

    /// Drop any load in flight, e.g. after a terminal error
    pub fn abandon_reload(&mut self) -> Option<PendingReload> {
        self.pending.take()
    }

    fn reload(
        &mut self,
        index: usize,
        reason: ReloadReason,
        surface: &mut dyn MediaSurface,
        session: &PlaybackSession,
    ) {
        // a superseded reload still owns the position and intent to restore
        let (resume_at, resume) = match self.pending.take() {
            Some(prev) if prev.reason != ReloadReason::Initial => (prev.resume_at, prev.resume),
            Some(prev) => (session.current_time, prev.resume),
            None => (session.current_time, session.is_playing),
        };

        let from = self.selected().map(|p| p.label.clone());
        self.selected = Some(index);
        let profile = &self.profiles[index];

        info!(
            from = ?from,
            to = %profile.label,
            url = %profile.source_url,
            reason = ?reason,
            resume_at = resume_at,
            resume = resume,
            "Reloading source"
        );

        surface.load(&profile.source_url);
        self.pending = Some(PendingReload {
            url: profile.source_url.clone(),
            resume_at,
            resume,
            reason,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{ScriptedSurface, SurfaceCommand};

    fn ladder() -> Vec<QualityProfile> {
        vec![
            QualityProfile::new("240p", "urlA"),
            QualityProfile::new("720p", "urlB"),
            QualityProfile::new("1080p", "urlC"),
        ]
    }

    #[test]
    fn test_select_initial_prefers_label() {
        let profiles = ladder();
        let pick = QualityManager::select_initial(&profiles, Some("1080P")).unwrap();
        assert_eq!(pick.source_url, "urlC");
    }

    #[test]
    fn test_select_initial_falls_back_to_720p() {
        let profiles = ladder();
        let pick = QualityManager::select_initial(&profiles, Some("4K")).unwrap();
        assert_eq!(pick.label, "720p");
        let pick = QualityManager::select_initial(&profiles, None).unwrap();
        assert_eq!(pick.label, "720p");
    }

    #[test]
    fn test_select_initial_falls_back_to_first() {
        let profiles = vec![
            QualityProfile::new("360p", "a"),
            QualityProfile::new("480p", "b"),
        ];
        let pick = QualityManager::select_initial(&profiles, Some("1080p")).unwrap();
        assert_eq!(pick.label, "360p");
        assert!(QualityManager::select_initial(&[], Some("1080p")).is_none());
    }

    #[test]
    fn test_switch_reloads_and_captures_intent() {
        let mut manager = QualityManager::new(ladder(), None, "");
        let mut surface = ScriptedSurface::new();
        let mut session = PlaybackSession::new(120.0);
        session.is_playing = true;
        session.current_time = 42.0;

        let selected = manager.switch_to("1080p", &mut surface, &session).unwrap();
        assert_eq!(selected.unwrap().source_url, "urlC");
        assert_eq!(surface.commands(), &[SurfaceCommand::Load { url: "urlC".into() }]);

        let pending = manager.pending().unwrap();
        assert_eq!(pending.resume_at, 42.0);
        assert!(pending.resume);
        assert_eq!(pending.reason, ReloadReason::Switch);
    }

    #[test]
    fn test_switch_same_label_is_noop() {
        let mut manager = QualityManager::new(ladder(), None, "");
        let mut surface = ScriptedSurface::new();
        let session = PlaybackSession::new(120.0);

        assert!(manager.switch_to("720p", &mut surface, &session).unwrap().is_none());
        assert!(surface.commands().is_empty());
        assert!(!manager.is_reloading());
    }

    #[test]
    fn test_switch_unknown_label() {
        let mut manager = QualityManager::new(ladder(), None, "");
        let mut surface = ScriptedSurface::new();
        let session = PlaybackSession::new(120.0);

        let err = manager.switch_to("8K", &mut surface, &session).unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_QUALITY");
    }

    #[test]
    fn test_single_profile_disables_switching() {
        let mut manager = QualityManager::new(vec![QualityProfile::new("480p", "only")], None, "");
        let mut surface = ScriptedSurface::new();
        let session = PlaybackSession::new(60.0);

        assert!(!manager.can_switch());
        assert!(manager.switch_to("480p", &mut surface, &session).unwrap().is_none());
        assert!(manager.on_playback_error("only", &mut surface, &session).is_none());
        assert!(surface.commands().is_empty());
    }

    #[test]
    fn test_fallback_never_returns_failing_url() {
        let profiles = ladder();
        for failing in profiles.iter().map(|p| p.source_url.clone()) {
            let mut manager = QualityManager::new(profiles.clone(), None, "");
            let mut surface = ScriptedSurface::new();
            let session = PlaybackSession::new(120.0);

            let fallback = manager.on_playback_error(&failing, &mut surface, &session).unwrap();
            assert_ne!(fallback.source_url, failing);
        }
    }

    #[test]
    fn test_fallback_picks_first_non_failing() {
        let mut manager = QualityManager::new(ladder(), None, "");
        let mut surface = ScriptedSurface::new();
        let session = PlaybackSession::new(120.0);

        let fallback = manager.on_playback_error("urlB", &mut surface, &session).unwrap();
        assert_eq!(fallback.label, "240p");
        assert_eq!(manager.active_url(), "urlA");
        assert_eq!(manager.pending().unwrap().reason, ReloadReason::Fallback);
    }

    #[test]
    fn test_fallback_ladder_exhausts() {
        let mut manager = QualityManager::new(ladder(), None, "");
        let mut surface = ScriptedSurface::new();
        let session = PlaybackSession::new(120.0);

        let first = manager.on_playback_error("urlB", &mut surface, &session).unwrap();
        assert_eq!(first.source_url, "urlA");
        let second = manager.on_playback_error("urlA", &mut surface, &session).unwrap();
        assert_eq!(second.source_url, "urlC");
        assert!(manager.on_playback_error("urlC", &mut surface, &session).is_none());

        let loads: Vec<_> = surface
            .commands()
            .iter()
            .filter_map(|c| match c {
                SurfaceCommand::Load { url } => Some(url.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(loads, ["urlA", "urlC"]);
    }

    #[test]
    fn test_successful_load_resets_attempts() {
        let mut manager = QualityManager::new(ladder(), None, "");
        let mut surface = ScriptedSurface::new();
        let session = PlaybackSession::new(120.0);

        manager.on_playback_error("urlB", &mut surface, &session).unwrap();
        assert!(manager.complete_reload("urlA").is_some());
        manager.on_playback_error("urlA", &mut surface, &session).unwrap();
        assert!(manager.complete_reload("urlB").is_some());
        assert!(manager.on_playback_error("urlB", &mut surface, &session).is_some());
    }

    #[test]
    fn test_superseding_reload_keeps_first_resume_point() {
        let mut manager = QualityManager::new(ladder(), None, "");
        let mut surface = ScriptedSurface::new();
        let mut session = PlaybackSession::new(120.0);
        session.current_time = 30.0;
        session.is_playing = true;

        manager.switch_to("1080p", &mut surface, &session).unwrap();
        session.current_time = 0.0;
        manager.switch_to("240p", &mut surface, &session).unwrap();

        let pending = manager.pending().unwrap();
        assert_eq!(pending.url, "urlA");
        assert_eq!(pending.resume_at, 30.0);
        assert!(manager.complete_reload("urlC").is_none());
        assert!(manager.complete_reload("urlA").is_some());
    }

    #[test]
    fn test_empty_ladder_uses_source_url() {
        let mut manager = QualityManager::new(Vec::new(), Some("720p"), "https://cdn.example.com/raw.mp4");
        let mut surface = ScriptedSurface::new();
        let session = PlaybackSession::new(0.0);

        assert_eq!(manager.active_url(), "https://cdn.example.com/raw.mp4");
        assert!(manager
            .on_playback_error("https://cdn.example.com/raw.mp4", &mut surface, &session)
            .is_none());
    }
}
