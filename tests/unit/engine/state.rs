use super::*;
use crate::animation::ease::Ease;
use crate::color::model::Rgb;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::BTreeSet;

fn mono_config() -> EngineConfig {
    EngineConfig {
        shape_width: 10.0,
        shape_height: 10.0,
        gradients: vec![Swatch::new("mono", &["#000000", "#ffffff"]).unwrap()],
        animation_timing: 100.0,
        color_animation_timing: 100.0,
        lightness_easing: Ease::Linear.into(),
        gradient_transition_easing: Ease::Linear.into(),
        max_lightness_change: 20.0,
        ..EngineConfig::default()
    }
}

fn engine(cfg: EngineConfig, canvas: Canvas) -> Engine {
    Engine::new(cfg, canvas, Box::new(StdRng::seed_from_u64(11))).unwrap()
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[test]
fn dimensions_round_up() {
    assert_eq!(grid_dimensions(Canvas::new(20, 10), 10.0, 10.0), (2, 1));
    assert_eq!(grid_dimensions(Canvas::new(21, 11), 10.0, 10.0), (3, 2));
    assert_eq!(grid_dimensions(Canvas::new(0, 0), 10.0, 10.0), (0, 0));
    assert_eq!(grid_dimensions(Canvas::new(5, 5), 0.0, 10.0), (0, 1));
}

#[test]
fn small_viewport_builds_one_row_with_sentinels() {
    let e = engine(mono_config(), Canvas::new(20, 10));
    assert_eq!(e.grid().rows(), 1);
    assert_eq!(e.grid().slots_per_row(), 4);
    assert!(
        e.grid()
            .shapes()
            .all(|s| s.original_color == Hsl::new(0.0, 0.0, 0.0))
    );
}

#[test]
fn invalid_config_fails_at_construction() {
    let cfg = EngineConfig {
        gradients: Vec::new(),
        ..mono_config()
    };
    let err = Engine::new(cfg, Canvas::new(10, 10), Box::new(StdRng::seed_from_u64(0)))
        .unwrap_err();
    assert!(matches!(err, TesseraError::Validation(_)));
}

#[test]
fn first_tick_has_zero_delta_and_backwards_time_is_ignored() {
    let mut e = engine(mono_config(), Canvas::new(30, 30));
    e.tick(ms(5000));
    assert_eq!(e.hold_elapsed(), Duration::ZERO);

    e.tick(ms(5040));
    assert_eq!(e.hold_elapsed(), ms(40));

    e.tick(ms(1000));
    assert_eq!(e.hold_elapsed(), ms(40));
    e.tick(ms(1010));
    assert_eq!(e.hold_elapsed(), ms(50));
}

#[test]
fn hold_timer_starts_a_transition_only_after_exceeding_the_timing() {
    let mut e = engine(mono_config(), Canvas::new(30, 30));
    e.tick(ms(0));
    e.tick(ms(100));
    assert!(!e.is_transitioning());
    assert_eq!(e.hold_elapsed(), ms(100));

    e.tick(ms(101));
    assert!(e.is_transitioning());
    assert_eq!(e.hold_elapsed(), Duration::ZERO);
    assert_eq!(e.transition_elapsed(), Duration::ZERO);
    assert_eq!(e.transition_progress(), Some(0.0));
    assert!(e.grid().shapes().all(|s| s.color == s.original_color));

    e.tick(ms(151));
    assert_eq!(e.transition_elapsed(), ms(50));
    assert!(e.transition_progress().is_some_and(|p| (p - 0.5).abs() < 1e-9));
}

#[test]
fn initial_swatch_is_drawn_from_the_rng() {
    let mut seen = BTreeSet::new();
    for seed in 0..64 {
        let e = Engine::new(
            EngineConfig::default(),
            Canvas::new(40, 40),
            Box::new(StdRng::seed_from_u64(seed)),
        )
        .unwrap();
        let expected = PaletteSampler::new(e.current_swatch().stops(), e.grid().rows());
        assert_eq!(e.sampler(), &expected);
        let anchor = row_anchor(&expected, 0);
        let first_row = e.grid().rows_iter().next().unwrap();
        assert!(first_row.iter().all(|s| s.original_color == anchor));
        seen.insert(e.swatch_index());
    }
    assert!(seen.len() > 1, "{seen:?}");

    let a = Engine::new(mono_config(), Canvas::new(10, 10), Box::new(StdRng::seed_from_u64(5)));
    let b = Engine::new(mono_config(), Canvas::new(10, 10), Box::new(StdRng::seed_from_u64(5)));
    assert_eq!(a.unwrap().swatch_index(), b.unwrap().swatch_index());
}

#[test]
fn transition_commits_and_resets_both_timers() {
    let mut e = engine(mono_config(), Canvas::new(30, 30));
    e.tick(ms(0));
    e.tick(ms(101));
    assert!(e.is_transitioning());

    e.tick(ms(202));
    assert!(!e.is_transitioning());
    assert_eq!(e.hold_elapsed(), Duration::ZERO);
    assert_eq!(e.transition_elapsed(), Duration::ZERO);
    for (y, row) in e.grid().rows_iter().enumerate() {
        let anchor = row_anchor(e.sampler(), y);
        assert!(
            row.iter()
                .all(|s| s.original_color == anchor && s.color == anchor)
        );
    }
}

#[test]
fn only_one_transition_runs_at_a_time() {
    let cfg = EngineConfig {
        color_animation_timing: 100.0,
        ..mono_config()
    };
    let mut e = engine(cfg, Canvas::new(30, 30));
    e.tick(ms(0));
    e.tick(ms(101));
    assert!(e.is_transitioning());
    let started = e.transition_elapsed();

    // Hold keeps counting while the transition runs but does not restart it.
    e.tick(ms(150));
    assert!(e.is_transitioning());
    assert_eq!(e.transition_elapsed(), started + ms(49));
}

#[test]
fn colors_blend_toward_the_target_during_a_transition() {
    let cfg = EngineConfig {
        gradients: vec![
            Swatch::new("dark", &["#000000", "#000000"]).unwrap(),
            Swatch::new("light", &["#ffffff", "#ffffff"]).unwrap(),
        ],
        max_lightness_change: 0.0,
        ..mono_config()
    };
    let mut e = engine(cfg, Canvas::new(10, 10));
    for shape in e.grid.shapes_mut() {
        shape.original_color = Hsl::new(0.0, 0.0, 0.0);
    }
    e.sampler = PaletteSampler::new(&[Rgb::new(255, 255, 255)], 1);
    e.anchor_index = 0;
    e.swatch_index = 1;
    e.transitioning = true;
    e.transition = ms(50);
    e.update_colors();

    for shape in e.grid().shapes() {
        assert!((shape.color.l - 50.0).abs() < 1e-9, "{}", shape.color);
        assert_eq!(shape.original_color.l, 0.0);
        assert!((shape.displayed.l - 50.0).abs() < 1e-9);
    }
    assert_eq!(e.current_swatch().name(), "light");
}

#[test]
fn blend_endpoints_are_exact() {
    let original = Hsl::new(200.0, 60.0, 20.0);
    let target = Hsl::new(200.0, 60.0, 60.0);

    let start = blend_toward(original, target, Opacity::OPAQUE, 0.0);
    assert_eq!(start.l, 20.0);
    let end = blend_toward(original, target, Opacity::TRANSPARENT, 1.0);
    assert_eq!(end.l, 60.0);
    let mid = blend_toward(target, original, Opacity::new(0.5).unwrap(), 0.5);
    assert_eq!(mid.l, 40.0);
}

#[test]
fn resize_keeps_phase_and_resamples_on_row_change() {
    let mut e = engine(mono_config(), Canvas::new(40, 20));
    let offsets: Vec<Duration> = e.grid().shapes().map(|s| s.animation_offset).collect();
    assert_eq!(e.sampler().domain(), 2);

    e.resize(Canvas::new(60, 20));
    assert_eq!(e.grid().cols(), 6);
    assert_eq!(e.sampler().domain(), 2);
    for y in 0..2 {
        for slot in 0..6 {
            assert_eq!(
                e.grid().slot(y, slot).map(|s| s.animation_offset),
                Some(offsets[y * 6 + slot])
            );
        }
    }

    e.resize(Canvas::new(60, 50));
    assert_eq!(e.grid().rows(), 5);
    assert_eq!(e.sampler().domain(), 5);
    assert_eq!(e.canvas(), Canvas::new(60, 50));
}

#[test]
fn shapes_added_mid_transition_fade_with_their_neighbours() {
    let cfg = EngineConfig {
        gradients: vec![
            Swatch::new("red", &["#ff0000", "#ff0000"]).unwrap(),
            Swatch::new("blue", &["#0000ff", "#0000ff"]).unwrap(),
        ],
        max_lightness_change: 0.0,
        ..mono_config()
    };
    let red = Hsl::new(0.0, 100.0, 50.0);
    let mut e = engine(cfg, Canvas::new(20, 10));
    for shape in e.grid.shapes_mut() {
        shape.original_color = red;
    }
    e.sampler = PaletteSampler::new(&[Rgb::new(0, 0, 255)], 1);
    e.anchor_index = 0;
    e.swatch_index = 1;
    e.transitioning = true;
    e.transition = Duration::ZERO;

    e.resize(Canvas::new(50, 20));
    assert_eq!((e.grid().cols(), e.grid().rows()), (5, 2));
    assert_eq!(e.sampler().domain(), 2);
    for shape in e.grid().shapes() {
        assert_eq!(shape.original_color, red);
        assert_eq!(shape.color, red);
    }

    e.transition = ms(101);
    e.advance(Duration::ZERO);
    assert!(!e.is_transitioning());
    let blue = row_anchor(e.sampler(), 0);
    assert!(e.grid().shapes().all(|s| s.original_color == blue));
}

#[test]
fn oversized_grids_are_rejected() {
    let cfg = EngineConfig {
        shape_width: 1e-6,
        ..mono_config()
    };
    let err = Engine::new(cfg, Canvas::new(100, 100), Box::new(StdRng::seed_from_u64(0)))
        .unwrap_err();
    assert!(matches!(err, TesseraError::Validation(_)));
    assert!(err.to_string().contains("limit"));

    let tiny = EngineConfig {
        shape_width: 1.0,
        shape_height: 1.0,
        ..mono_config()
    };
    let mut e = engine(tiny, Canvas::new(10, 10));
    e.resize(Canvas::new(5000, 5000));
    assert_eq!(e.canvas(), Canvas::new(10, 10));
    assert_eq!((e.grid().cols(), e.grid().rows()), (10, 10));

    e.resize(Canvas::new(300, 300));
    assert_eq!(e.grid().rows(), 300);
}

#[test]
fn zero_sized_canvas_keeps_timers_running() {
    let mut e = engine(mono_config(), Canvas::new(0, 0));
    assert!(e.grid().is_empty());
    e.tick(ms(0));
    e.tick(ms(101));
    assert!(e.is_transitioning());

    e.resize(Canvas::new(10, 10));
    assert_eq!(e.grid().rows(), 1);
    e.tick(ms(120));
    assert!(e.grid().shapes().all(|s| s.progress == ms(19)));
}

#[test]
fn lightness_oscillates_around_the_anchor() {
    let cfg = EngineConfig {
        gradients: vec![Swatch::new("grey", &["#808080", "#808080"]).unwrap()],
        ..mono_config()
    };
    let mut e = engine(cfg, Canvas::new(50, 50));
    e.tick(ms(0));
    for step in 1..40 {
        e.tick(ms(step * 7));
        for s in e.grid().shapes() {
            let base = s.color.l;
            let half = (base * s.max_lightness_change - base) / 2.0;
            assert!(s.displayed.l >= base - half - 1e-9 && s.displayed.l <= base + half + 1e-9);
        }
    }
}
