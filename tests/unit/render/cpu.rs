use super::*;

fn white() -> Rgba8 {
    Rgba8::rgba(255, 255, 255, 255)
}

#[test]
fn background_fills_every_pixel() {
    let mut r = CpuRenderer::new(CpuRenderOpts {
        background: Some(Rgba8::rgba(255, 0, 0, 255)),
        ..CpuRenderOpts::default()
    });
    let frame = r.render((8, 6), &[]).unwrap();
    assert_eq!((frame.width, frame.height), (8, 6));
    assert_eq!(frame.data.len(), 8 * 6 * 4);
    assert!(frame.data.chunks_exact(4).all(|px| px == [255, 0, 0, 255]));
}

#[test]
fn transparent_canvas_without_background() {
    let mut r = CpuRenderer::new(CpuRenderOpts::default());
    let frame = r.render((4, 4), &[]).unwrap();
    assert!(frame.data.iter().all(|&b| b == 0));
}

#[test]
fn circle_covers_its_center_only() {
    let mut r = CpuRenderer::new(CpuRenderOpts::default());
    let prims = [DrawPrimitive::Circle {
        center: Point::new(16.0, 16.0),
        radius: 6.0,
        alpha: 1.0,
        color: white(),
    }];
    let frame = r.render((32, 32), &prims).unwrap();
    assert_eq!(frame.pixel(16, 16), Some([255, 255, 255, 255]));
    assert_eq!(frame.pixel(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(frame.pixel(31, 31), Some([0, 0, 0, 0]));
}

#[test]
fn zero_alpha_draws_nothing() {
    let mut r = CpuRenderer::new(CpuRenderOpts::default());
    let prims = [
        DrawPrimitive::Circle {
            center: Point::new(8.0, 8.0),
            radius: 4.0,
            alpha: 0.0,
            color: white(),
        },
        DrawPrimitive::Stroke {
            points: vec![Point::new(0.0, 8.0), Point::new(16.0, 8.0)],
            width: 4.0,
            alpha: 0.0,
            color: white(),
            pen_tip: None,
        },
    ];
    let frame = r.render((16, 16), &prims).unwrap();
    assert!(frame.data.iter().all(|&b| b == 0));
}

#[test]
fn stroke_covers_the_line_between_points() {
    let mut r = CpuRenderer::new(CpuRenderOpts::default());
    let prims = [DrawPrimitive::Stroke {
        points: vec![Point::new(4.0, 16.0), Point::new(28.0, 16.0)],
        width: 6.0,
        alpha: 1.0,
        color: white(),
        pen_tip: None,
    }];
    let frame = r.render((32, 32), &prims).unwrap();
    assert_eq!(frame.pixel(16, 15), Some([255, 255, 255, 255]));
    assert_eq!(frame.pixel(16, 2), Some([0, 0, 0, 0]));
}

#[test]
fn single_point_stroke_draws_a_dot() {
    let mut r = CpuRenderer::new(CpuRenderOpts::default());
    let prims = [DrawPrimitive::Stroke {
        points: vec![Point::new(10.0, 10.0)],
        width: 8.0,
        alpha: 1.0,
        color: white(),
        pen_tip: None,
    }];
    let frame = r.render((20, 20), &prims).unwrap();
    assert_eq!(frame.pixel(10, 10), Some([255, 255, 255, 255]));
    assert_eq!(frame.pixel(19, 19), Some([0, 0, 0, 0]));
}

#[test]
fn pen_tip_glow_reaches_past_the_stroke() {
    let mut r = CpuRenderer::new(CpuRenderOpts::default());
    let prims = [DrawPrimitive::Stroke {
        points: vec![Point::new(4.0, 16.0), Point::new(16.0, 16.0)],
        width: 2.0,
        alpha: 1.0,
        color: white(),
        pen_tip: Some(PenTip {
            center: Point::new(16.0, 16.0),
            radius: 4.0,
        }),
    }];
    let frame = r.render((32, 32), &prims).unwrap();
    let halo = frame.pixel(16, 22).unwrap();
    assert!(halo[3] > 0 && halo[3] < 255, "halo alpha {}", halo[3]);
    assert_eq!(frame.pixel(16, 28), Some([0, 0, 0, 0]));
}

#[test]
fn scale_multiplies_output_size() {
    let mut r = CpuRenderer::new(CpuRenderOpts {
        scale: 2.0,
        background: None,
    });
    let prims = [DrawPrimitive::Circle {
        center: Point::new(5.0, 5.0),
        radius: 2.0,
        alpha: 1.0,
        color: white(),
    }];
    let frame = r.render((10, 10), &prims).unwrap();
    assert_eq!((frame.width, frame.height), (20, 20));
    assert_eq!(frame.pixel(10, 10), Some([255, 255, 255, 255]));
}

#[test]
fn invalid_scale_and_oversize_canvas_are_errors() {
    let mut r = CpuRenderer::new(CpuRenderOpts {
        scale: 0.0,
        background: None,
    });
    assert!(matches!(
        r.render((10, 10), &[]),
        Err(GridtraceError::Render(_))
    ));

    let mut r = CpuRenderer::new(CpuRenderOpts::default());
    assert!(r.render((70_000, 10), &[]).is_err());
}

#[test]
fn straight_alpha_conversion_undoes_premultiply() {
    let frame = FrameRgba {
        width: 2,
        height: 1,
        data: vec![64, 0, 32, 128, 10, 20, 30, 255],
    };
    assert_eq!(frame.to_straight_rgba(), vec![128, 0, 64, 128, 10, 20, 30, 255]);
    assert_eq!(frame.pixel(1, 0), Some([10, 20, 30, 255]));
    assert_eq!(frame.pixel(2, 0), None);
}
