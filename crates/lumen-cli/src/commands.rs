//! CLI command implementations

use crate::output::{format_time, quality_table, to_json, OutputFormat};
use anyhow::Context;
use lumen_core::{
    ControllerInput, InitialSelection, InitializationResolver, Key, PlaybackController,
    PlaybackSession, PlayerCommand, PlayerConfig, QualityProfile, ScriptedSurface, SubtitleTrack,
    SurfaceCommand, SurfaceEvent,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::mpsc;
use tracing::info;

/// One entry of a simulation script
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ScriptStep {
    Event { event: SurfaceEvent },
    Command { command: PlayerCommand },
    Key { key: String },
}

impl From<ScriptStep> for ControllerInput {
    fn from(step: ScriptStep) -> Self {
        match step {
            ScriptStep::Event { event } => ControllerInput::Surface(event),
            ScriptStep::Command { command } => ControllerInput::Command(command),
            ScriptStep::Key { key } => ControllerInput::Key(key.parse().unwrap_or(Key::Other)),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InspectReport {
    selection: InitialSelection,
    qualities: Vec<QualityProfile>,
    subtitles: Vec<SubtitleTrack>,
    can_switch_quality: bool,
}

/// Final state of a simulated session
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    pub steps: usize,
    pub session: PlaybackSession,
    pub active_url: String,
    pub commands: Vec<SurfaceCommand>,
}

/// Read and validate a session config
pub fn load_config(path: &Path) -> anyhow::Result<PlayerConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = PlayerConfig::from_json(&json)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(config)
}

/// Parse a JSON array of script steps
pub fn parse_script(json: &str) -> anyhow::Result<Vec<ScriptStep>> {
    let steps: Vec<ScriptStep> = serde_json::from_str(json).context("parsing script")?;
    Ok(steps)
}

/// Print the startup selections for a config
pub fn inspect(config_path: &Path, format: &str) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let selection = InitializationResolver::resolve(&config);

    let report = InspectReport {
        can_switch_quality: config.qualities.len() > 1,
        selection,
        qualities: config.qualities,
        subtitles: config.subtitles,
    };

    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", to_json(&report)),
        OutputFormat::Text => {
            let selection = &report.selection;
            println!("Session config: {}", config_path.display());
            println!("\nStartup:");
            println!("  Source:       {}", selection.source_url);
            println!("  Quality:      {}", selection.quality.as_deref().unwrap_or("-"));
            println!("  Subtitle:     {}", selection.subtitle.as_deref().unwrap_or("off"));
            match selection.volume {
                Some(v) => println!("  Volume:       {:.2}", v),
                None => println!("  Volume:       surface default"),
            }
            println!("  Rate locked:  {}", selection.rate_locked);

            if report.qualities.is_empty() {
                println!("\nNo quality ladder; switching and fallback disabled");
            } else {
                println!("\nQualities:");
                println!("{}", quality_table(&report.qualities, selection.quality.as_deref()));
            }

            if !report.subtitles.is_empty() {
                println!("\nSubtitles:");
                for (i, track) in report.subtitles.iter().enumerate() {
                    println!(
                        "  {}. {} ({}){}{}",
                        i + 1,
                        track.label,
                        track.language,
                        if track.is_default { " default" } else { "" },
                        if track.is_auto_generated { " auto" } else { "" },
                    );
                }
            }
        }
    }

    Ok(())
}

/// Run `steps` through a controller over a scripted surface
pub async fn run_script(
    config: PlayerConfig,
    steps: Vec<ScriptStep>,
) -> anyhow::Result<SimulationReport> {
    let mut controller = PlaybackController::new(config, ScriptedSurface::new())?;
    let step_count = steps.len();

    let (tx, rx) = mpsc::unbounded_channel();
    for step in steps {
        tx.send(ControllerInput::from(step))?;
    }
    drop(tx);

    controller.run(rx).await;
    info!(steps = step_count, state = %controller.state(), "Simulation finished");

    Ok(SimulationReport {
        steps: step_count,
        session: controller.session().clone(),
        active_url: controller.active_url().to_string(),
        commands: controller.surface().commands().to_vec(),
    })
}

/// Replay a script and print the resulting session
pub async fn simulate(config_path: &Path, script_path: &Path, format: &str) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let script = std::fs::read_to_string(script_path)
        .with_context(|| format!("reading script {}", script_path.display()))?;
    let steps = parse_script(&script)?;

    let report = run_script(config, steps).await?;

    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", to_json(&report)),
        OutputFormat::Text => {
            let session = &report.session;
            println!("Simulated {} steps", report.steps);
            println!("\nSession {}:", session.id);
            println!("  State:     {}", session.state);
            println!(
                "  Position:  {} / {}",
                format_time(session.current_time),
                format_time(session.duration)
            );
            println!("  Playing:   {}", session.is_playing);
            println!(
                "  Volume:    {:.2}{}",
                session.volume,
                if session.is_muted { " (muted)" } else { "" }
            );
            println!("  Rate:      {}x", session.playback_rate);
            println!("  Buffered:  {:.0}%", session.buffered_fraction * 100.0);
            println!("  Quality:   {}", session.selected_quality.as_deref().unwrap_or("-"));
            println!("  Subtitle:  {}", session.active_subtitle.as_deref().unwrap_or("off"));
            println!("  Source:    {}", report.active_url);
            if let Some(error) = &session.last_error {
                println!("  Error:     {}", error);
            }

            println!("\nSurface commands:");
            for (i, command) in report.commands.iter().enumerate() {
                println!("  {:>3}. {:?}", i + 1, command);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::PlaybackState;
    use std::io::Write;

    const CONFIG: &str = r#"{
        "qualities": [
            {"label": "240p", "sourceUrl": "urlA"},
            {"label": "720p", "sourceUrl": "urlB"},
            {"label": "1080p", "sourceUrl": "urlC"}
        ],
        "subtitles": [
            {"language": "en", "label": "English", "url": "en.vtt", "isDefault": true}
        ],
        "duration": 120
    }"#;

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CONFIG.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.qualities.len(), 3);
        assert!(config.captions_enabled);
    }

    #[test]
    fn test_load_config_rejects_empty_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"duration": 10}"#).unwrap();
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_parse_script_steps() {
        let steps = parse_script(
            r#"[
                {"event": {"type": "loaded", "url": "urlB", "duration": 120}},
                {"command": {"type": "play"}},
                {"key": "ArrowRight"}
            ]"#,
        )
        .unwrap();

        assert_eq!(steps.len(), 3);
        assert!(matches!(
            ControllerInput::from(steps[2].clone()),
            ControllerInput::Key(Key::ArrowRight)
        ));
    }

    #[tokio::test]
    async fn test_run_script_fallback() {
        let config = PlayerConfig::from_json(CONFIG).unwrap();
        let steps = parse_script(
            r#"[
                {"event": {"type": "loaded", "url": "urlB", "duration": 120}},
                {"command": {"type": "play"}},
                {"event": {"type": "timeUpdate", "time": 47}},
                {"event": {"type": "error", "url": "urlB"}},
                {"event": {"type": "loaded", "url": "urlA", "duration": 120}}
            ]"#,
        )
        .unwrap();

        let report = run_script(config, steps).await.unwrap();
        assert_eq!(report.steps, 5);
        assert_eq!(report.active_url, "urlA");
        assert_eq!(report.session.state, PlaybackState::Playing);
        assert_eq!(report.session.current_time, 47.0);
        assert_eq!(report.session.selected_quality.as_deref(), Some("240p"));
    }
}
