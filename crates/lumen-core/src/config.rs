//! Session construction configuration

use crate::{
    error::{Error, Result},
    types::{QualityProfile, SubtitleTrack},
};
use serde::{Deserialize, Serialize};

/// Seek step for arrow keys, in seconds
pub const SEEK_STEP_SECONDS: f64 = 5.0;

/// Volume step for arrow keys
pub const VOLUME_STEP: f64 = 0.1;

/// Label preferred when no explicit quality is configured
pub const DEFAULT_QUALITY_LABEL: &str = "720p";

/// Surface default volume
pub const DEFAULT_VOLUME: f64 = 1.0;

/// Rate forced while the rate lock is active
pub const LOCKED_PLAYBACK_RATE: f64 = 1.0;

/// Configuration supplied when a playback session is created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerConfig {
    /// Source used when no quality ladder is supplied
    #[serde(default)]
    pub source_url: String,
    /// Quality ladder, in caller order
    #[serde(default)]
    pub qualities: Vec<QualityProfile>,
    /// Subtitle tracks, in caller order
    #[serde(default)]
    pub subtitles: Vec<SubtitleTrack>,
    /// Known content duration in seconds (0 if unknown)
    #[serde(default)]
    pub duration: f64,
    /// Initial volume; surface default when absent
    #[serde(default)]
    pub initial_volume: Option<f64>,
    /// Preferred quality label
    #[serde(default)]
    pub preferred_quality: Option<String>,
    /// Show captions at startup
    #[serde(default = "default_captions_enabled")]
    pub captions_enabled: bool,
    /// Preferred caption language
    #[serde(default)]
    pub caption_language: Option<String>,
    /// Force playback rate to 1.0
    #[serde(default)]
    pub lock_playback_rate: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            source_url: String::new(),
            qualities: Vec::new(),
            subtitles: Vec::new(),
            duration: 0.0,
            initial_volume: None,
            preferred_quality: None,
            captions_enabled: default_captions_enabled(),
            caption_language: None,
            lock_playback_rate: false,
        }
    }
}

impl PlayerConfig {
    /// Create a configuration for a single source
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            ..Default::default()
        }
    }

    /// Parse a JSON configuration document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: PlayerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the controller cannot start from
    pub fn validate(&self) -> Result<()> {
        if self.source_url.is_empty() && self.qualities.is_empty() {
            return Err(Error::InvalidConfig(
                "either sourceUrl or at least one quality is required".to_string(),
            ));
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "duration must be a non-negative number, got {}",
                self.duration
            )));
        }
        if let Some(volume) = self.initial_volume {
            if !volume.is_finite() {
                return Err(Error::InvalidConfig(format!(
                    "initialVolume must be finite, got {}",
                    volume
                )));
            }
        }
        if let Some(profile) = self.qualities.iter().find(|q| q.source_url.is_empty()) {
            return Err(Error::InvalidConfig(format!(
                "quality {} has no sourceUrl",
                profile.label
            )));
        }
        Ok(())
    }

    pub fn with_qualities(mut self, qualities: Vec<QualityProfile>) -> Self {
        self.qualities = qualities;
        self
    }

    pub fn with_subtitles(mut self, subtitles: Vec<SubtitleTrack>) -> Self {
        self.subtitles = subtitles;
        self
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_initial_volume(mut self, volume: f64) -> Self {
        self.initial_volume = Some(volume);
        self
    }

    pub fn with_preferred_quality(mut self, label: impl Into<String>) -> Self {
        self.preferred_quality = Some(label.into());
        self
    }

    pub fn with_captions(mut self, enabled: bool, language: Option<&str>) -> Self {
        self.captions_enabled = enabled;
        self.caption_language = language.map(str::to_string);
        self
    }

    pub fn with_rate_lock(mut self, locked: bool) -> Self {
        self.lock_playback_rate = locked;
        self
    }
}

fn default_captions_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = PlayerConfig::default();
        assert!(config.captions_enabled);
        assert!(!config.lock_playback_rate);
        assert_eq!(config.initial_volume, None);
    }

    #[test]
    fn test_parse_camel_case() {
        let json = r#"{
            "sourceUrl": "https://cdn.example.com/lesson.mp4",
            "qualities": [
                {"label": "240p", "sourceUrl": "https://cdn.example.com/240.mp4", "bitrateBps": 400000},
                {"label": "720p", "sourceUrl": "https://cdn.example.com/720.mp4", "isProcessed": false}
            ],
            "subtitles": [
                {"language": "en", "label": "English", "url": "https://cdn.example.com/en.vtt", "isDefault": true}
            ],
            "duration": 120,
            "initialVolume": 0.4,
            "captionLanguage": "en",
            "lockPlaybackRate": true
        }"#;

        let config = PlayerConfig::from_json(json).unwrap();
        assert_eq!(config.qualities.len(), 2);
        assert_eq!(config.qualities[0].bitrate_bps, 400_000);
        assert!(!config.qualities[1].is_processed);
        assert!(config.subtitles[0].is_default);
        assert_eq!(config.duration, 120.0);
        assert_eq!(config.initial_volume, Some(0.4));
        assert!(config.captions_enabled);
        assert!(config.lock_playback_rate);
    }

    #[test]
    fn test_validate_rejects_empty_source() {
        let err = PlayerConfig::from_json("{}").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_validate_rejects_negative_duration() {
        let config = PlayerConfig::new("https://cdn.example.com/a.mp4").with_duration(-1.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_volume_is_accepted() {
        let config = PlayerConfig::new("https://cdn.example.com/a.mp4").with_initial_volume(3.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_malformed_json() {
        let err = PlayerConfig::from_json("{not json").unwrap_err();
        assert_eq!(err.error_code(), "JSON");
    }
}
