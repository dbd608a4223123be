//! Benchmark tests for lumen-core operations
//!
//! Run with: cargo bench -p lumen-core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use lumen_core::buffer::BufferTracker;
use lumen_core::{
    InitializationResolver, KeyboardInputMapper, Key, PlaybackController, PlayerConfig,
    QualityManager, QualityProfile, ScriptedSurface, SubtitleTrack, SurfaceEvent,
};

// ============================================================================
// Helpers
// ============================================================================

fn create_ladder(count: usize) -> Vec<QualityProfile> {
    (0..count)
        .map(|i| {
            let height = 240 + i * 120;
            QualityProfile::new(
                format!("{}p", height),
                format!("https://cdn.example.com/lesson/{}p.mp4", height),
            )
            .with_bitrate(400_000 + i as u64 * 600_000)
        })
        .collect()
}

fn create_config(rungs: usize) -> PlayerConfig {
    PlayerConfig::default()
        .with_qualities(create_ladder(rungs))
        .with_subtitles(vec![
            SubtitleTrack::new("en", "English", "https://cdn.example.com/en.vtt").with_default(true),
            SubtitleTrack::new("es", "Español", "https://cdn.example.com/es.vtt"),
            SubtitleTrack::new("fr", "Français", "https://cdn.example.com/fr.vtt"),
        ])
        .with_duration(600.0)
        .with_preferred_quality("1080p")
}

fn ready_controller(rungs: usize) -> PlaybackController<ScriptedSurface> {
    let mut controller = PlaybackController::new(create_config(rungs), ScriptedSurface::new())
        .expect("valid config");
    let url = controller.active_url().to_string();
    controller.handle_event(SurfaceEvent::Loaded { url, duration: 600.0 });
    controller
}

// ============================================================================
// Selection Benchmarks
// ============================================================================

fn bench_initial_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("Initial Selection");

    for &rungs in &[3, 6, 12] {
        let config = create_config(rungs);
        group.bench_with_input(BenchmarkId::new("resolve", rungs), &config, |b, config| {
            b.iter(|| black_box(InitializationResolver::resolve(black_box(config))))
        });
    }

    let profiles = create_ladder(12);
    group.bench_function("select_initial_missing_label", |b| {
        b.iter(|| black_box(QualityManager::select_initial(&profiles, Some("4K"))))
    });

    group.finish();
}

// ============================================================================
// Event Reconciliation Benchmarks
// ============================================================================

fn bench_time_updates(c: &mut Criterion) {
    let mut group = c.benchmark_group("Event Reconciliation");

    group.bench_function("time_update", |b| {
        let mut controller = ready_controller(4);
        controller.play();
        let mut t = 0.0;
        b.iter(|| {
            t = (t + 0.25) % 600.0;
            controller.handle_event(SurfaceEvent::TimeUpdate { time: black_box(t) });
        })
    });

    group.bench_function("buffer_progress", |b| {
        let mut controller = ready_controller(4);
        controller
            .surface_mut()
            .set_buffered(vec![(0.0, 30.0), (45.0, 120.0)]);
        b.iter(|| controller.handle_event(black_box(SurfaceEvent::Progress)))
    });

    group.bench_function("stale_event_discard", |b| {
        let mut controller = ready_controller(4);
        b.iter(|| {
            controller.handle_event(SurfaceEvent::Error {
                url: black_box("https://cdn.example.com/stale.mp4".to_string()),
            })
        })
    });

    group.finish();
}

fn bench_buffer_fraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("Buffer Fraction");

    for &ranges in &[1usize, 8, 64] {
        let buffered: Vec<(f64, f64)> = (0..ranges)
            .map(|i| (i as f64 * 10.0, i as f64 * 10.0 + 5.0))
            .collect();
        group.bench_with_input(BenchmarkId::new("update_from_ranges", ranges), &buffered, |b, buffered| {
            let mut tracker = BufferTracker::new();
            b.iter(|| black_box(tracker.update_from_ranges(buffered, 600.0)))
        });
    }

    group.finish();
}

// ============================================================================
// Command Benchmarks
// ============================================================================

fn bench_quality_switch(c: &mut Criterion) {
    let mut group = c.benchmark_group("Quality Switch");

    group.bench_function("switch_and_load", |b| {
        let mut controller = ready_controller(4);
        let labels = ["240p", "600p"];
        let mut i = 0;
        b.iter(|| {
            let label = labels[i % 2];
            i += 1;
            controller.switch_quality(label);
            let url = controller.active_url().to_string();
            controller.handle_event(SurfaceEvent::Loaded { url, duration: 600.0 });
            controller.surface_mut().take_commands();
        })
    });

    group.bench_function("subtitle_switch", |b| {
        let mut controller = ready_controller(4);
        let languages = [Some("es"), Some("fr"), None];
        let mut i = 0;
        b.iter(|| {
            controller.set_subtitle(languages[i % 3]);
            i += 1;
            controller.surface_mut().take_commands();
        })
    });

    group.finish();
}

fn bench_keyboard(c: &mut Criterion) {
    let mapper = KeyboardInputMapper::new();
    let keys = [Key::Space, Key::ArrowRight, Key::ArrowDown, Key::Character('m'), Key::Other];

    c.bench_function("keyboard_map", |b| {
        b.iter(|| {
            for key in keys {
                black_box(mapper.map(black_box(key)));
            }
        })
    });
}

criterion_group!(
    benches,
    bench_initial_selection,
    bench_time_updates,
    bench_buffer_fraction,
    bench_quality_switch,
    bench_keyboard,
);
criterion_main!(benches);
