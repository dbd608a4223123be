//! Basic playback session example
//!
//! Drives a controller over an in-memory surface: startup selection,
//! keyboard input, a quality switch and an error-triggered fallback.
//!
//! Run with: cargo run -p lumen-core --example basic_session

use lumen_core::{
    Key, PlaybackController, PlayerConfig, QualityProfile, RecordingObserver, ScriptedSurface,
    SubtitleTrack, SurfaceEvent,
};

fn main() -> lumen_core::Result<()> {
    println!("Lumen Core - Basic Session Example");
    println!("==================================\n");

    let config = PlayerConfig::default()
        .with_qualities(vec![
            QualityProfile::new("240p", "https://cdn.example.com/lesson/240.mp4")
                .with_resolution("426x240")
                .with_bitrate(400_000),
            QualityProfile::new("720p", "https://cdn.example.com/lesson/720.mp4")
                .with_resolution("1280x720")
                .with_bitrate(2_800_000),
            QualityProfile::new("1080p", "https://cdn.example.com/lesson/1080.mp4")
                .with_resolution("1920x1080")
                .with_bitrate(5_000_000),
        ])
        .with_subtitles(vec![
            SubtitleTrack::new("en", "English", "https://cdn.example.com/lesson/en.vtt")
                .with_default(true),
            SubtitleTrack::new("es", "Español", "https://cdn.example.com/lesson/es.vtt"),
        ])
        .with_duration(120.0)
        .with_initial_volume(0.8);

    let recorder = RecordingObserver::new();
    let mut player = PlaybackController::with_observer(
        config,
        ScriptedSurface::new(),
        Box::new(recorder.clone()),
    )?;

    println!("Startup:");
    println!("--------");
    println!("  Quality:  {:?}", player.session().selected_quality);
    println!("  Subtitle: {:?}", player.session().active_subtitle);
    println!("  Source:   {}", player.active_url());
    println!("  State:    {}", player.state());
    println!();

    let url = player.active_url().to_string();
    player.handle_event(SurfaceEvent::Loaded { url, duration: 120.0 });
    player.handle_key(Key::Space);
    player.handle_event(SurfaceEvent::Played);
    player.handle_event(SurfaceEvent::TimeUpdate { time: 40.0 });
    player.handle_key(Key::ArrowRight);
    player.handle_key(Key::ArrowDown);

    println!("After keyboard input:");
    println!("---------------------");
    println!("  Position: {:.1}s", player.session().current_time);
    println!("  Volume:   {:.1}", player.session().volume);
    println!("  State:    {}", player.state());
    println!();

    // Switch up, then lose the new rendition
    player.switch_quality("1080p");
    player.handle_event(SurfaceEvent::Error {
        url: "https://cdn.example.com/lesson/1080.mp4".into(),
    });
    let fallback_url = player.active_url().to_string();
    player.handle_event(SurfaceEvent::Loaded {
        url: fallback_url.clone(),
        duration: 120.0,
    });

    println!("After fallback:");
    println!("---------------");
    println!("  Quality:  {:?}", player.session().selected_quality);
    println!("  Source:   {}", fallback_url);
    println!("  Position: {:.1}s", player.session().current_time);
    println!("  Playing:  {}", player.session().is_playing);
    println!();

    println!("Surface commands:");
    println!("-----------------");
    for command in player.surface().commands() {
        println!("  {:?}", command);
    }
    println!();

    println!("Callbacks:");
    println!("----------");
    for event in recorder.events() {
        println!("  {:?}", event);
    }

    Ok(())
}
