use super::*;
use crate::engine::config::EngineConfig;
use crate::render::routine::{Square, Triangle};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn close(a: [u8; 4], b: [u8; 4], tol: u8) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| x.abs_diff(*y) <= tol)
}

#[test]
fn stop_offsets_follow_the_wash_layout() {
    assert_eq!(wash_stop_offset(0, 2), 0.0);
    assert_eq!(wash_stop_offset(1, 2), 1.0);
    assert_eq!(wash_stop_offset(1, 3), 2.0 / 3.0);
    assert_eq!(wash_stop_offset(2, 3), 1.0);
    assert_eq!(wash_stop_offset(1, 4), 0.5);
}

#[test]
fn wash_color_interpolates_between_stops() {
    let stops = [Rgb::new(0, 0, 0), Rgb::new(200, 100, 0)];
    assert_eq!(wash_color_at(&stops, 0.0), [0, 0, 0]);
    assert_eq!(wash_color_at(&stops, 0.5), [100, 50, 0]);
    assert_eq!(wash_color_at(&stops, 1.0), [200, 100, 0]);
    assert_eq!(wash_color_at(&[], 0.5), [0, 0, 0]);

    let three = [Rgb::new(0, 0, 0), Rgb::new(90, 90, 90), Rgb::new(255, 255, 255)];
    assert_eq!(wash_color_at(&three, 1.0 / 3.0), [45, 45, 45]);
    assert_eq!(wash_color_at(&three, 2.0 / 3.0), [90, 90, 90]);
}

#[test]
fn wash_fills_rows_top_to_bottom() {
    let swatch = Swatch::new("bw", &["#000000", "#ffffff"]).unwrap();
    let mut r = CpuRenderer::new();
    let frame = r
        .paint(Canvas::new(3, 4), 0, |p| p.draw_background_wash(&swatch))
        .unwrap();
    assert_eq!(frame.data.len(), 3 * 4 * 4);
    assert!(frame.premultiplied);

    let expected = [32u8, 96, 159, 223];
    for (y, v) in expected.iter().enumerate() {
        for x in 0..3 {
            let px = frame.pixel(x, y as u32).unwrap();
            assert!(close(px, [*v, *v, *v, 255], 2), "({x},{y}) = {px:?}");
        }
    }
}

#[test]
fn draw_shape_fills_the_polygon_with_the_given_color() {
    let swatch = Swatch::new("bw", &["#000000", "#000000"]).unwrap();
    let mut r = CpuRenderer::new();
    let frame = r
        .paint(Canvas::new(8, 8), 0, |p| {
            p.draw_background_wash(&swatch)?;
            p.draw_shape(
                Hsl::new(0.0, 100.0, 50.0),
                &[
                    Point::new(0.0, 0.0),
                    Point::new(4.0, 0.0),
                    Point::new(4.0, 8.0),
                    Point::new(0.0, 8.0),
                ],
            );
            // Degenerate input is ignored.
            p.draw_shape(Hsl::new(120.0, 100.0, 50.0), &[Point::new(5.0, 5.0)]);
            Ok(())
        })
        .unwrap();

    assert_eq!(frame.pixel(1, 4), Some([255, 0, 0, 255]));
    assert_eq!(frame.pixel(6, 4), Some([0, 0, 0, 255]));
    assert_eq!(frame.pixel(5, 5), Some([0, 0, 0, 255]));
}

#[test]
fn empty_or_oversized_canvas_is_a_render_error() {
    let mut r = CpuRenderer::new();
    let err = r.paint(Canvas::new(0, 10), 0, |_| Ok(())).unwrap_err();
    assert!(matches!(err, TesseraError::Render(_)));
    let err = r.paint(Canvas::new(70_000, 1), 0, |_| Ok(())).unwrap_err();
    assert!(matches!(err, TesseraError::Render(_)));
}

#[test]
fn draw_errors_propagate_and_the_renderer_stays_usable() {
    let mut r = CpuRenderer::new();
    let err = r
        .paint(Canvas::new(4, 4), 0, |_| Err(TesseraError::render("boom")))
        .unwrap_err();
    assert!(err.to_string().contains("boom"));

    let swatch = Swatch::new("w", &["#ffffff", "#ffffff"]).unwrap();
    let frame = r
        .paint(Canvas::new(4, 4), 0, |p| p.draw_background_wash(&swatch))
        .unwrap();
    assert_eq!(frame.pixel(2, 2), Some([255, 255, 255, 255]));
}

fn grey_engine(shape_type: &str, canvas: Canvas) -> Engine {
    let cfg = EngineConfig {
        shape_width: 10.0,
        shape_height: 10.0,
        gradients: vec![Swatch::new("grey", &["#808080", "#808080"]).unwrap()],
        max_lightness_change: 0.0,
        shape_type: shape_type.to_owned(),
        ..EngineConfig::default()
    };
    Engine::new(cfg, canvas, Box::new(StdRng::seed_from_u64(3))).unwrap()
}

#[test]
fn rendering_a_flat_palette_gives_a_flat_frame() {
    let mut r = CpuRenderer::new();
    for routine in [&Triangle as &dyn ShapeRoutine, &Square] {
        let engine = grey_engine("triangle", Canvas::new(40, 30));
        let frame = r.render(&engine, routine, 0).unwrap();
        assert_eq!((frame.width, frame.height), (40, 30));
        for px in frame.data.chunks_exact(4) {
            assert!(close([px[0], px[1], px[2], px[3]], [128, 128, 128, 255], 1), "{px:?}");
        }
    }
}

#[test]
fn blur_keeps_a_flat_frame_flat_and_reuses_buffers() {
    let mut r = CpuRenderer::new();
    let engine = grey_engine("square", Canvas::new(16, 12));
    let a = r.render(&engine, &Square, 3).unwrap();
    let b = r.render(&engine, &Square, 3).unwrap();
    assert_eq!(a, b);
    assert!(a.data.chunks_exact(4).all(|px| px[3] == 255));
}
