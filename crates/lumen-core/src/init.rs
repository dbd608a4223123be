//! Startup configuration resolution

use crate::{
    config::PlayerConfig,
    quality::QualityManager,
    subtitles::SubtitleTrackManager,
};
use serde::Serialize;
use tracing::debug;

/// Selections applied once when a session starts
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialSelection {
    /// Label of the initial quality; `None` plays `sourceUrl` directly
    pub quality: Option<String>,
    /// URL handed to the surface first
    pub source_url: String,
    /// Language of the initial subtitle track
    pub subtitle: Option<String>,
    /// Volume to apply; `None` keeps the surface default
    pub volume: Option<f64>,
    pub rate_locked: bool,
}

/// Resolves a [`PlayerConfig`] into startup selections
pub struct InitializationResolver;

impl InitializationResolver {
    pub fn resolve(config: &PlayerConfig) -> InitialSelection {
        let quality = QualityManager::select_initial(
            &config.qualities,
            config.preferred_quality.as_deref(),
        );
        let subtitle = SubtitleTrackManager::select_initial(
            &config.subtitles,
            config.caption_language.as_deref(),
            config.captions_enabled,
        );

        let selection = InitialSelection {
            quality: quality.map(|q| q.label.clone()),
            source_url: quality
                .map(|q| q.source_url.clone())
                .unwrap_or_else(|| config.source_url.clone()),
            subtitle: subtitle.map(|s| s.language.clone()),
            volume: config.initial_volume.map(|v| v.clamp(0.0, 1.0)),
            rate_locked: config.lock_playback_rate,
        };

        debug!(?selection, "Initial selection resolved");
        selection
    }
}
