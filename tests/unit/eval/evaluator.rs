use super::*;
use crate::eval::autoconn::AutoPhase;
use crate::foundation::core::GridPos;
use crate::model::project::{AutoConnection, Connection, Dot, Frame};
use crate::palette::color::Palette;

fn frame(dots: &[(&str, i32, i32)], conns: &[(&str, &str, &str, i64)]) -> Frame {
    Frame {
        dots: dots.iter().map(|&(id, x, y)| Dot::new(id, x, y, 0)).collect(),
        connections: conns
            .iter()
            .map(|&(id, from, to, order)| Connection::new(id, from, to, 0, order))
            .collect(),
        ..Frame::default()
    }
}

fn diff_project() -> Project {
    Project {
        palette: Palette::new(["#e0e0e0"]),
        frames: vec![
            frame(&[("A", 0, 0), ("B", 1, 0)], &[("AB", "A", "B", 0)]),
            frame(&[("A", 0, 0)], &[]),
        ],
        ..Project::default()
    }
}

fn eval(p: &Project, index: usize, elapsed_ms: f64) -> EvaluatedFrame {
    Evaluator::eval(p, Cursor::new(index, elapsed_ms), &mut ColorCache::new())
}

#[test]
fn same_inputs_give_same_output() {
    let p = diff_project();
    let mut colors = ColorCache::new();
    for t in [0.0, 123.0, 850.0, 1000.0] {
        let a = Evaluator::eval(&p, Cursor::new(0, t), &mut colors);
        let b = Evaluator::eval(&p, Cursor::new(0, t), &mut ColorCache::new());
        assert_eq!(a, b);
    }
}

#[test]
fn removed_dot_and_connection_are_gone_at_frame_end() {
    let p = diff_project();

    let mid = eval(&p, 0, 850.0);
    let ids: Vec<&str> = mid.dots.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["A", "B"]);
    assert!(mid.dots[1].leaving);
    assert_eq!(mid.segments.len(), 1);
    assert!(mid.segments[0].leaving);

    let end = eval(&p, 0, 1000.0);
    let ids: Vec<&str> = end.dots.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["A"]);
    assert!(end.segments.is_empty());
}

#[test]
fn kept_dots_are_opaque_at_both_frame_edges() {
    let p = diff_project();
    let end = eval(&p, 0, 1000.0);
    let start = eval(&p, 1, 0.0);
    assert_eq!(end.dots[0].alpha, 1.0);
    assert_eq!(start.dots[0].alpha, 1.0);
    assert!(!start.dots[0].entering);
    assert_eq!(end.dots[0].pos, start.dots[0].pos);
}

#[test]
fn cursor_is_clamped() {
    let p = diff_project();
    let out = eval(&p, 9, 99_999.0);
    assert_eq!(out.frame_index, 1);
    assert_eq!(out.elapsed_ms, 1000.0);
    assert_eq!(out.progress, 1.0);
    assert_eq!(out.clock_ms, 2000.0);
}

#[test]
fn auto_connections_run_on_the_sequence_clock() {
    let mut p = diff_project();
    p.grid.size = 8;
    p.auto_connections.push(AutoConnection {
        trace_in_ms: 500.0,
        start_time_ms: 1500.0,
        ..AutoConnection::new("r", GridPos::new(0, 5), GridPos::new(7, 5), 0)
    });

    assert!(eval(&p, 0, 1000.0).auto_connections.is_empty());

    let out = eval(&p, 1, 600.0);
    assert_eq!(out.clock_ms, 1600.0);
    assert_eq!(out.auto_connections.len(), 1);
    match out.auto_connections[0].phase {
        AutoPhase::TraceIn { progress } => assert!((progress - 0.2).abs() < 1e-9),
        other => panic!("unexpected phase {other:?}"),
    }
}

#[test]
fn active_frame_dots_are_route_obstacles() {
    let mut p = Project {
        frames: vec![frame(&[("blocker", 2, 0)], &[])],
        ..Project::default()
    };
    p.grid.size = 5;
    p.auto_connections.push(AutoConnection {
        trace_in_ms: 0.0,
        ..AutoConnection::new("r", GridPos::new(0, 0), GridPos::new(4, 0), 0)
    });
    let out = eval(&p, 0, 500.0);
    let route = &out.auto_connections[0].route;
    assert!(!route.contains(&GridPos::new(2, 0)));
}

#[test]
fn empty_project_still_resolves_auto_connections() {
    let mut p = Project::default();
    p.auto_connections.push(AutoConnection {
        trace_in_ms: 100.0,
        ..AutoConnection::new("r", GridPos::new(0, 0), GridPos::new(3, 3), 0)
    });
    let out = eval(&p, 0, 250.0);
    assert!(out.dots.is_empty() && out.segments.is_empty());
    assert_eq!(out.clock_ms, 250.0);
    assert_eq!(out.auto_connections.len(), 1);
    assert_eq!(out.auto_connections[0].phase, AutoPhase::Stay);
    assert_eq!(out.auto_connections[0].color, crate::Rgba8::FALLBACK);

    let out = eval(&p, 0, f64::INFINITY);
    assert_eq!(out.clock_ms, 0.0);
    assert!(out.auto_connections.is_empty());
}

#[test]
fn visible_alphas_stay_in_unit_range() {
    let p = diff_project();
    for index in 0..p.frames.len() {
        for step in 0..=40 {
            let out = eval(&p, index, f64::from(step) * 25.0);
            for d in &out.dots {
                assert!(d.alpha > 0.0 && d.alpha <= 1.0);
            }
            for s in &out.segments {
                assert!(s.alpha > 0.0 && s.alpha <= 1.0);
                assert!(s.reveal > 0.0 && s.reveal <= 1.0);
            }
        }
    }
}
