//! Playback Controller - Owns the playback state machine
//!
//! Coordinates:
//! - Startup selections
//! - User commands (play/pause, seek, volume, rate, quality, subtitles)
//! - Surface event reconciliation, in delivery order
//! - Quality fallback on load errors
//! - State broadcast and host callbacks
//!
//! Two windows let the controller ignore surface input: while the user is
//! scrubbing (or a committed scrub is unconfirmed) reported times do not
//! overwrite the position, and any event tied to a URL other than the
//! active source is discarded.

use crate::{
    buffer::BufferTracker,
    config::{PlayerConfig, LOCKED_PLAYBACK_RATE},
    error::{Error, Result},
    init::InitializationResolver,
    keyboard::{Key, KeyboardInputMapper, PlayerCommand},
    observer::{NoopObserver, PlaybackObserver},
    quality::{PendingReload, QualityManager},
    seek::{SeekAction, SeekController, SeekPhase, TrackGeometry},
    subtitles::SubtitleTrackManager,
    surface::{MediaSurface, SurfaceEvent},
    types::*,
};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument, warn};

/// Anything the controller can be fed through its inbound channel
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerInput {
    Surface(SurfaceEvent),
    Command(PlayerCommand),
    Key(Key),
}

/// Playback controller driving one media surface
pub struct PlaybackController<S: MediaSurface> {
    /// Canonical session state
    session: PlaybackSession,
    /// Exclusively owned surface
    surface: S,
    quality: QualityManager,
    subtitles: SubtitleTrackManager,
    buffer: BufferTracker,
    seek: SeekController,
    seek_phase: SeekPhase,
    keyboard: KeyboardInputMapper,
    observer: Box<dyn PlaybackObserver>,
    /// Session snapshot broadcaster
    state_tx: watch::Sender<PlaybackSession>,
}

impl<S: MediaSurface> PlaybackController<S> {
    /// Create a controller and start loading the initial source
    pub fn new(config: PlayerConfig, surface: S) -> Result<Self> {
        Self::with_observer(config, surface, Box::new(NoopObserver))
    }

    /// Create a controller reporting callbacks to `observer`
    pub fn with_observer(
        config: PlayerConfig,
        mut surface: S,
        observer: Box<dyn PlaybackObserver>,
    ) -> Result<Self> {
        config.validate()?;

        let selection = InitializationResolver::resolve(&config);
        let mut session = PlaybackSession::new(config.duration);
        session.rate_locked = selection.rate_locked;

        if let Some(volume) = selection.volume {
            session.volume = volume;
            surface.set_volume(volume);
        }
        if selection.rate_locked {
            surface.set_playback_rate(LOCKED_PLAYBACK_RATE);
        }

        let mut subtitles = SubtitleTrackManager::new(config.subtitles);
        session.active_subtitle = subtitles
            .set_active(selection.subtitle.as_deref(), &mut surface)
            .map(|t| t.language.clone());

        let mut quality = QualityManager::new(
            config.qualities,
            config.preferred_quality.as_deref(),
            config.source_url,
        );
        session.selected_quality = quality.selected().map(|p| p.label.clone());

        let (state_tx, _) = watch::channel(session.clone());

        info!(
            session_id = %session.id,
            quality = ?session.selected_quality,
            subtitle = ?session.active_subtitle,
            rate_locked = session.rate_locked,
            "Playback session created"
        );

        quality.load_initial(&mut surface, false);

        let mut controller = Self {
            session,
            surface,
            quality,
            subtitles,
            buffer: BufferTracker::new(),
            seek: SeekController::default(),
            seek_phase: SeekPhase::Idle,
            keyboard: KeyboardInputMapper::new(),
            observer,
            state_tx,
        };
        controller.transition(PlaybackState::Loading);
        controller.publish();
        Ok(controller)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Current session snapshot
    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn state(&self) -> PlaybackState {
        self.session.state
    }

    pub fn load_state(&self) -> LoadState {
        self.session.load_state()
    }

    /// Subscribe to session snapshots
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSession> {
        self.state_tx.subscribe()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn available_qualities(&self) -> &[QualityProfile] {
        self.quality.profiles()
    }

    pub fn selected_quality(&self) -> Option<&QualityProfile> {
        self.quality.selected()
    }

    /// URL the surface should currently be playing
    pub fn active_url(&self) -> &str {
        self.quality.active_url()
    }

    pub fn can_switch_quality(&self) -> bool {
        self.quality.can_switch()
    }

    /// Load in flight, if any
    pub fn pending_reload(&self) -> Option<&PendingReload> {
        self.quality.pending()
    }

    pub fn subtitle_tracks(&self) -> &[SubtitleTrack] {
        self.subtitles.tracks()
    }

    pub fn active_subtitle(&self) -> Option<&SubtitleTrack> {
        self.subtitles.active()
    }

    /// Mode of each subtitle track, parallel to `subtitle_tracks()`
    pub fn subtitle_modes(&self) -> &[TrackMode] {
        self.subtitles.modes()
    }

    pub fn seek_phase(&self) -> SeekPhase {
        self.seek_phase
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Start or resume playback
    #[instrument(skip(self))]
    pub fn play(&mut self) {
        if self.session.state == PlaybackState::Error {
            warn!("Cannot play after an unrecoverable error");
            return;
        }

        if self.quality.set_resume_intent(true) {
            debug!("Play deferred until the source has loaded");
            self.session.is_playing = true;
            self.publish();
            return;
        }

        if self.session.is_playing {
            return;
        }

        if self.session.state == PlaybackState::Ended {
            self.session.current_time = 0.0;
            self.surface.seek(0.0);
        }

        self.session.is_playing = true;
        self.surface.play();
        self.transition(PlaybackState::Playing);
        self.publish();
    }

    /// Pause playback
    #[instrument(skip(self))]
    pub fn pause(&mut self) {
        if self.session.state == PlaybackState::Error {
            return;
        }

        if self.quality.set_resume_intent(false) {
            debug!("Resume cancelled for the source being loaded");
            self.session.is_playing = false;
            self.surface.pause();
            self.publish();
            return;
        }

        if !self.session.is_playing {
            return;
        }

        self.session.is_playing = false;
        self.surface.pause();
        if self.session.state == PlaybackState::Playing {
            self.transition(PlaybackState::Paused);
        }
        self.publish();
    }

    pub fn toggle_play(&mut self) {
        if self.session.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Seek to `time`, clamped to [0, duration]. Returns the applied position.
    #[instrument(skip(self))]
    pub fn seek_to(&mut self, time: f64) -> f64 {
        if !time.is_finite() {
            warn!(time = time, "Ignoring non-finite seek target");
            return self.session.current_time;
        }

        let target = self.clamp_time(time);
        debug!(from = self.session.current_time, to = target, "Seeking");
        self.session.current_time = target;
        // a new seek replaces any earlier drag target
        self.seek_phase = SeekPhase::Idle;

        // the resume step seeks once the new source is ready
        if !self.quality.set_resume_position(target) {
            self.surface.seek(target);
        }

        if self.session.state == PlaybackState::Ended && target < self.session.duration {
            self.transition(PlaybackState::Paused);
        }

        self.publish();
        target
    }

    /// Relative seek
    pub fn seek_by(&mut self, delta: f64) -> f64 {
        self.seek_to(self.session.current_time + delta)
    }

    /// Set volume, clamped to [0, 1]. Mute is left untouched.
    #[instrument(skip(self))]
    pub fn set_volume(&mut self, volume: f64) {
        if !volume.is_finite() {
            warn!(volume = volume, "Ignoring non-finite volume");
            return;
        }
        let volume = volume.clamp(0.0, 1.0);
        self.session.volume = volume;
        self.surface.set_volume(volume);
        self.publish();
    }

    /// Relative volume change
    pub fn adjust_volume(&mut self, delta: f64) {
        self.set_volume(self.session.volume + delta);
    }

    #[instrument(skip(self))]
    pub fn toggle_mute(&mut self) {
        self.session.is_muted = !self.session.is_muted;
        self.surface.set_muted(self.session.is_muted);
        self.publish();
    }

    /// Change playback rate. Returns the rate in effect afterwards; locked
    /// sessions and invalid rates leave it unchanged.
    #[instrument(skip(self))]
    pub fn set_playback_rate(&mut self, rate: f64) -> f64 {
        if self.session.rate_locked {
            let err = Error::UnsupportedOperation("playback rate is locked".to_string());
            debug!(requested = rate, error = %err, "Rate change ignored");
            return self.session.playback_rate;
        }
        if !(rate.is_finite() && rate > 0.0) {
            warn!(requested = rate, "Ignoring invalid playback rate");
            return self.session.playback_rate;
        }

        self.session.playback_rate = rate;
        self.surface.set_playback_rate(rate);
        self.publish();
        rate
    }

    /// Switch to the quality labelled `label`. Returns true when a reload
    /// started.
    #[instrument(skip(self))]
    pub fn switch_quality(&mut self, label: &str) -> bool {
        match self.try_switch_quality(label) {
            Ok(started) => started,
            Err(e) => {
                warn!(error = %e, "Quality switch rejected");
                false
            }
        }
    }

    /// Like [`switch_quality`](Self::switch_quality), surfacing unknown labels
    pub fn try_switch_quality(&mut self, label: &str) -> Result<bool> {
        let switched = self
            .quality
            .switch_to(label, &mut self.surface, &self.session)?
            .map(|p| p.label.clone());

        let Some(label) = switched else {
            return Ok(false);
        };

        self.session.selected_quality = Some(label);
        self.session.last_error = None;
        self.reset_buffer();
        self.transition(PlaybackState::Loading);
        self.publish();
        Ok(true)
    }

    /// Show the subtitle track for `language`, or none
    #[instrument(skip(self))]
    pub fn set_subtitle(&mut self, language: Option<&str>) {
        self.session.active_subtitle = self
            .subtitles
            .set_active(language, &mut self.surface)
            .map(|t| t.language.clone());
        self.publish();
    }

    /// Update the timeline track placement used for pointer seeks
    pub fn set_timeline_geometry(&mut self, left: f64, width: f64) {
        self.seek.set_geometry(TrackGeometry::new(left, width));
    }

    pub fn timeline_click(&mut self, x: f64) {
        let action = self.seek.click(x, self.session.duration);
        self.apply_seek_action(action);
    }

    pub fn timeline_down(&mut self, x: f64) {
        let action = self.seek.pointer_down(x);
        self.apply_seek_action(action);
    }

    pub fn timeline_move(&mut self, x: f64) {
        let action = self.seek.pointer_move(x, self.session.duration);
        self.apply_seek_action(action);
    }

    pub fn timeline_up(&mut self, x: f64) {
        let action = self.seek.pointer_up(x, self.session.duration);
        self.apply_seek_action(action);
    }

    /// Abandon a timeline gesture; the position stays where the drag left it
    pub fn timeline_cancel(&mut self) {
        if self.seek.is_dragging() && matches!(self.seek_phase, SeekPhase::Scrubbing { .. }) {
            self.seek_phase = SeekPhase::Idle;
            self.publish();
        }
        self.seek.cancel();
    }

    /// Apply a UI command
    pub fn dispatch(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::Play => self.play(),
            PlayerCommand::Pause => self.pause(),
            PlayerCommand::TogglePlay => self.toggle_play(),
            PlayerCommand::SeekTo { time } => {
                self.seek_to(time);
            }
            PlayerCommand::SeekBy { delta } => {
                self.seek_by(delta);
            }
            PlayerCommand::SetVolume { volume } => self.set_volume(volume),
            PlayerCommand::AdjustVolume { delta } => self.adjust_volume(delta),
            PlayerCommand::ToggleMute => self.toggle_mute(),
            PlayerCommand::SetPlaybackRate { rate } => {
                self.set_playback_rate(rate);
            }
            PlayerCommand::SwitchQuality { label } => {
                self.switch_quality(&label);
            }
            PlayerCommand::SetSubtitle { language } => self.set_subtitle(language.as_deref()),
            PlayerCommand::ToggleFullscreen => self.observer.on_fullscreen_toggle(),
            PlayerCommand::TimelineClick { x } => self.timeline_click(x),
            PlayerCommand::TimelineDown { x } => self.timeline_down(x),
            PlayerCommand::TimelineMove { x } => self.timeline_move(x),
            PlayerCommand::TimelineUp { x } => self.timeline_up(x),
            PlayerCommand::TimelineCancel => self.timeline_cancel(),
        }
    }

    /// Map a key press and apply its command
    pub fn handle_key(&mut self, key: Key) {
        match self.keyboard.map(key) {
            Some(command) => self.dispatch(command),
            None => debug!(?key, "Unbound key"),
        }
    }

    // =========================================================================
    // Surface events
    // =========================================================================

    /// Reconcile one surface event into the session
    pub fn handle_event(&mut self, event: SurfaceEvent) {
        if let Some(url) = event.url() {
            if url != self.quality.active_url() {
                debug!(url = url, active = self.quality.active_url(), "Discarding stale surface event");
                return;
            }
        }

        match event {
            SurfaceEvent::Loaded { url, duration } => self.on_loaded(&url, duration),
            SurfaceEvent::TimeUpdate { time } => self.on_time_update(time),
            SurfaceEvent::Progress => self.on_buffer_progress(),
            SurfaceEvent::Seeked { time } => self.on_seeked(time),
            SurfaceEvent::Played => self.on_played(),
            SurfaceEvent::Paused => self.on_paused(),
            SurfaceEvent::Ended => self.on_ended(),
            SurfaceEvent::Error { url } => self.on_surface_error(&url),
        }

        self.publish();
    }

    /// Apply any inbound input
    pub fn apply(&mut self, input: ControllerInput) {
        match input {
            ControllerInput::Surface(event) => self.handle_event(event),
            ControllerInput::Command(command) => self.dispatch(command),
            ControllerInput::Key(key) => self.handle_key(key),
        }
    }

    /// Process inputs in delivery order until the channel closes
    pub async fn run(&mut self, mut inputs: mpsc::UnboundedReceiver<ControllerInput>) {
        while let Some(input) = inputs.recv().await {
            self.apply(input);
        }
        debug!(session_id = %self.session.id, "Input channel closed");
    }

    fn on_loaded(&mut self, url: &str, duration: f64) {
        if duration.is_finite() && duration > 0.0 {
            self.session.duration = duration;
        }
        self.session.buffered_fraction = self.buffer.rescale(self.session.duration);

        if matches!(self.session.state, PlaybackState::Idle | PlaybackState::Loading) {
            self.transition(PlaybackState::Ready);
        }

        if self.session.rate_locked {
            self.session.playback_rate = LOCKED_PLAYBACK_RATE;
            self.surface.set_playback_rate(LOCKED_PLAYBACK_RATE);
        }

        let Some(pending) = self.quality.complete_reload(url) else {
            debug!(url = url, "Metadata refreshed");
            return;
        };

        info!(url = url, duration = self.session.duration, reason = ?pending.reason, "Source loaded");

        if pending.resume_at > 0.0 {
            let resume_at = self.clamp_time(pending.resume_at);
            self.session.current_time = resume_at;
            if !self.surface.preserves_position_on_load() {
                self.surface.seek(resume_at);
            }
        }

        // intent as of now, not as of the reload request
        if pending.resume {
            self.session.is_playing = true;
            self.surface.play();
            self.transition(PlaybackState::Playing);
        } else {
            self.session.is_playing = false;
        }
    }

    fn on_time_update(&mut self, time: f64) {
        if !time.is_finite() {
            return;
        }
        // the outgoing source no longer owns the position
        if self.quality.is_reloading() {
            debug!(time = time, "Time update ignored during reload");
            return;
        }
        if !self.seek_phase.accept_time(time) {
            debug!(time = time, phase = ?self.seek_phase, "Time update suppressed while seeking");
            return;
        }

        self.session.current_time = time.max(0.0);
        self.observer
            .on_time_update(self.session.current_time, self.session.duration);
        self.observer.on_progress(self.session.progress());
    }

    fn on_buffer_progress(&mut self) {
        let end = self.surface.buffered_end();
        self.session.buffered_fraction = self.buffer.update(end, self.session.duration);
    }

    fn on_seeked(&mut self, time: f64) {
        if self.quality.is_reloading() || matches!(self.seek_phase, SeekPhase::Scrubbing { .. }) {
            return;
        }
        self.seek_phase = SeekPhase::Idle;
        if time.is_finite() {
            self.session.current_time = self.clamp_time(time);
        }
    }

    fn on_played(&mut self) {
        if self.session.state == PlaybackState::Error {
            debug!("Ignoring play event in error state");
            return;
        }

        self.session.is_playing = true;
        if matches!(
            self.session.state,
            PlaybackState::Ready | PlaybackState::Paused | PlaybackState::Ended
        ) {
            self.transition(PlaybackState::Playing);
        }
        self.observer.on_play();
    }

    fn on_paused(&mut self) {
        // a source swap pauses the surface; the reload keeps the intent
        if !self.quality.is_reloading() {
            self.session.is_playing = false;
            if self.session.state == PlaybackState::Playing {
                self.transition(PlaybackState::Paused);
            }
        }
        self.observer.on_pause();
    }

    fn on_ended(&mut self) {
        if self.quality.is_reloading() {
            debug!("Ignoring end of previous source during reload");
            return;
        }

        self.session.is_playing = false;
        if matches!(
            self.session.state,
            PlaybackState::Ready | PlaybackState::Playing | PlaybackState::Paused
        ) {
            self.transition(PlaybackState::Ended);
        }
        self.observer.on_ended();
    }

    fn on_surface_error(&mut self, url: &str) {
        let load_error = Error::load(url);
        warn!(
            error = %load_error,
            recoverable = load_error.is_recoverable() && self.quality.can_switch(),
            "Surface reported a load error"
        );

        match self
            .quality
            .on_playback_error(url, &mut self.surface, &self.session)
        {
            Some(profile) => {
                info!(quality = %profile.label, url = %profile.source_url, "Falling back to another quality");
                self.session.selected_quality = Some(profile.label);
                self.reset_buffer();
                self.transition(PlaybackState::Loading);
            }
            None => {
                self.quality.abandon_reload();
                let terminal = Error::NoFallbackAvailable {
                    url: url.to_string(),
                };
                self.session.is_playing = false;
                self.session.last_error = Some(terminal.to_string());
                self.transition(PlaybackState::Error);
                self.observer.on_error(&terminal);
            }
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn apply_seek_action(&mut self, action: SeekAction) {
        match action {
            SeekAction::None => return,
            SeekAction::Seek(time) => {
                self.seek_to(time);
            }
            SeekAction::Scrub(time) => {
                let target = self.seek_to(time);
                self.seek_phase = SeekPhase::Scrubbing { target };
            }
            SeekAction::Commit(time) => {
                let target = self.seek_to(time);
                self.seek_phase = SeekPhase::Settling { target };
            }
        }
        self.publish();
    }

    fn clamp_time(&self, time: f64) -> f64 {
        time.clamp(0.0, self.session.duration.max(0.0))
    }

    fn reset_buffer(&mut self) {
        self.buffer.reset();
        self.session.buffered_fraction = 0.0;
    }

    /// Transition to a new state
    fn set_state(&mut self, new_state: PlaybackState) -> Result<()> {
        let current = self.session.state;
        if current == new_state {
            return Ok(());
        }

        if !current.can_transition_to(new_state) {
            return Err(Error::InvalidStateTransition {
                from: current.to_string(),
                to: new_state.to_string(),
            });
        }

        self.session.state = new_state;
        info!(from = %current, to = %new_state, "State transition");
        Ok(())
    }

    fn transition(&mut self, new_state: PlaybackState) {
        if let Err(e) = self.set_state(new_state) {
            warn!(error = %e, "Ignoring state transition");
        }
    }

    fn publish(&mut self) {
        self.session.is_seeking = self.seek_phase.is_seeking();
        self.state_tx.send_replace(self.session.clone());
    }
}
