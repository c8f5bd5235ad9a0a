use super::*;
use crate::eval::timeline::Cursor;
use crate::foundation::core::{GridPos, GridSpec};
use crate::model::project::{AutoConnection, Connection, Dot, Frame};
use crate::palette::color::{ColorCache, Palette};
use crate::{EvaluatedFrame, Evaluator};

fn project() -> Project {
    Project {
        grid: GridSpec {
            size: 6,
            spacing_px: 10.0,
            margin_px: 5.0,
        },
        palette: Palette::new(["#ffffff"]),
        frames: vec![Frame {
            dots: vec![Dot::new("a", 0, 0, 0), Dot::new("b", 2, 0, 0)],
            connections: vec![Connection::new("ab", "a", "b", 0, 0)],
            ..Frame::default()
        }],
        auto_connections: vec![AutoConnection::new(
            "r",
            GridPos::new(0, 3),
            GridPos::new(3, 3),
            0,
        )],
        ..Project::default()
    }
}

fn eval(p: &Project, elapsed_ms: f64) -> EvaluatedFrame {
    Evaluator::eval(p, Cursor::new(0, elapsed_ms), &mut ColorCache::new())
}

#[test]
fn painter_order_is_lines_then_routes_then_dots() {
    let p = project();
    let prims = compile_primitives(&eval(&p, 700.0), &p);
    let kinds: Vec<&str> = prims
        .iter()
        .map(|d| match d {
            DrawPrimitive::Circle { .. } => "circle",
            DrawPrimitive::Stroke { .. } => "stroke",
        })
        .collect();
    assert_eq!(kinds, vec!["stroke", "stroke", "circle", "circle"]);
}

#[test]
fn cells_map_to_pixel_centers() {
    let p = project();
    let prims = compile_primitives(&eval(&p, 700.0), &p);
    let DrawPrimitive::Stroke { points, pen_tip, .. } = &prims[0] else {
        panic!("expected connection stroke first");
    };
    assert_eq!(points, &vec![Point::new(5.0, 5.0), Point::new(25.0, 5.0)]);
    assert!(pen_tip.is_none());

    let DrawPrimitive::Circle { center, radius, .. } = &prims[3] else {
        panic!("expected dot last");
    };
    assert_eq!(*center, Point::new(25.0, 5.0));
    assert_eq!(*radius, p.style.dot_radius_px);
}

#[test]
fn tracing_segment_carries_a_pen_tip() {
    let p = project();
    let prims = compile_primitives(&eval(&p, 300.0), &p);
    let DrawPrimitive::Stroke { points, pen_tip, .. } = &prims[0] else {
        panic!("expected connection stroke first");
    };
    let tip = pen_tip.expect("pen tip while tracing");
    assert_eq!(points.last(), Some(&tip.center));
    assert!((tip.center.x - 15.0).abs() < 1e-9);
    assert_eq!(tip.radius, p.style.pen_tip_radius_px);
}

#[test]
fn routes_are_mapped_with_the_grid() {
    let p = project();
    let prims = compile_primitives(&eval(&p, 500.0), &p);
    let DrawPrimitive::Stroke {
        points, pen_tip, ..
    } = &prims[1]
    else {
        panic!("expected auto-connection stroke");
    };
    assert_eq!(points.first(), Some(&Point::new(5.0, 35.0)));
    assert_eq!(pen_tip.map(|t| t.center), points.last().copied());
}

#[test]
fn empty_evaluation_emits_nothing() {
    let p = Project::default();
    assert!(compile_primitives(&EvaluatedFrame::default(), &p).is_empty());
}
