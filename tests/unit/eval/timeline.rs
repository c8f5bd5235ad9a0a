use super::*;
use crate::animation::ease::Ease;
use crate::model::project::{Dot, Group, GroupOverrides};
use crate::palette::color::Palette;

fn frame(dots: &[(&str, i32, i32)]) -> Frame {
    Frame {
        dots: dots.iter().map(|&(id, x, y)| Dot::new(id, x, y, 0)).collect(),
        ..Frame::default()
    }
}

fn project(frames: Vec<Frame>) -> Project {
    Project {
        palette: Palette::new(["#ff0000", "#00ff00"]),
        frames,
        ..Project::default()
    }
}

fn dots_at(p: &Project, index: usize, elapsed_ms: f64) -> Vec<ResolvedDot> {
    let clock = FrameClock::new(&p.frames[index], index, elapsed_ms);
    resolve_dots(p, &clock, &mut ColorCache::new())
}

fn by_id<'a>(dots: &'a [ResolvedDot], id: &str) -> &'a ResolvedDot {
    dots.iter().find(|d| d.id == id).unwrap()
}

#[test]
fn clock_clamps_elapsed_into_frame() {
    let f = Frame::with_duration(1000.0);
    assert_eq!(FrameClock::new(&f, 0, 5000.0).elapsed, 1000.0);
    assert_eq!(FrameClock::new(&f, 0, -20.0).elapsed, 0.0);
    assert_eq!(FrameClock::new(&f, 0, f64::NAN).elapsed, 0.0);

    let eased = Frame {
        easing: Ease::InQuad,
        ..Frame::with_duration(1000.0)
    };
    let c = FrameClock::new(&eased, 0, 500.0);
    assert_eq!(c.progress, 0.5);
    assert!((c.eased_progress - 0.25).abs() < 1e-12);
    assert!((c.eased_elapsed - 250.0).abs() < 1e-9);
}

#[test]
fn zero_duration_frame_has_finite_progress() {
    let f = Frame::with_duration(0.0);
    let c = FrameClock::new(&f, 0, 10.0);
    assert_eq!(c.elapsed, 0.0);
    assert!(c.progress.is_finite());
}

#[test]
fn neighbor_wraps_only_when_looping() {
    let frames = vec![
        Frame::with_duration(1.0),
        Frame::with_duration(2.0),
        Frame::with_duration(3.0),
    ];
    assert!(neighbor(&frames, 0, Side::Prev, false).is_none());
    assert!(neighbor(&frames, 2, Side::Next, false).is_none());
    assert_eq!(
        neighbor(&frames, 0, Side::Prev, true).map(|f| f.duration_ms),
        Some(3.0)
    );
    assert_eq!(
        neighbor(&frames, 2, Side::Next, true).map(|f| f.duration_ms),
        Some(1.0)
    );
    assert_eq!(
        neighbor(&frames, 1, Side::Next, false).map(|f| f.duration_ms),
        Some(3.0)
    );
    assert!(neighbor(&[], 0, Side::Next, true).is_none());
}

#[test]
fn link_key_ignores_direction() {
    let (a, b) = (GridPos::new(0, 0), GridPos::new(3, 1));
    assert_eq!(LinkKey::new(a, b), LinkKey::new(b, a));
    assert_ne!(LinkKey::new(a, b), LinkKey::new(a, GridPos::new(3, 2)));
}

#[test]
fn stagger_is_bounded_by_fade_and_frame_share() {
    let mut f = frame(&[("a", 0, 0), ("b", 1, 0), ("c", 2, 0)]);
    assert_eq!(effective_stagger(&f), 40.0);

    f.fade_in_ms = 100.0;
    assert_eq!(effective_stagger(&f), 25.0);

    let many: Vec<(String, i32)> = (0..20).map(|i| (format!("d{i}"), i)).collect();
    let crowded = Frame {
        dots: many.iter().map(|(id, x)| Dot::new(id.clone(), *x, 0, 0)).collect(),
        ..Frame::default()
    };
    assert_eq!(effective_stagger(&crowded), 20.0);
    assert!(effective_stagger(&crowded) * crowded.dots.len() as f64 <= 400.0);

    f.stagger_ms = 0.0;
    assert_eq!(effective_stagger(&f), 0.0);
    assert_eq!(effective_stagger(&Frame::default()), 0.0);
}

#[test]
fn dot_missing_from_next_frame_fades_out() {
    let p = project(vec![
        frame(&[("a", 0, 0), ("b", 1, 0)]),
        frame(&[("a", 0, 0)]),
    ]);

    let end = dots_at(&p, 0, 1000.0);
    let b = by_id(&end, "b");
    assert!(b.leaving);
    assert_eq!(b.alpha, 0.0);
    assert_eq!(b.scale, 0.6);
    let a = by_id(&end, "a");
    assert!(!a.leaving);
    assert_eq!(a.alpha, 1.0);

    let mid = dots_at(&p, 0, 850.0);
    assert!((by_id(&mid, "b").fade_out - 0.5).abs() < 1e-9);
}

#[test]
fn entering_dots_are_staggered_in_frame_order() {
    let p = project(vec![frame(&[("a", 0, 0), ("b", 1, 0), ("c", 2, 0)])]);
    let dots = dots_at(&p, 0, 40.0);
    let delays: Vec<f64> = dots.iter().map(|d| d.delay_ms).collect();
    assert_eq!(delays, vec![0.0, 40.0, 80.0]);
    assert!(dots.iter().all(|d| d.entering));
    assert!((dots[0].fade_in - 40.0 / 300.0).abs() < 1e-9);
    assert_eq!(dots[1].fade_in, 0.0);
    assert_eq!(dots[2].alpha, 0.0);
}

#[test]
fn boundary_flags_select_empty_or_identical_neighbor() {
    let mut p = project(vec![frame(&[("a", 0, 0)])]);
    p.settings.fade_in_dots = false;

    let start = dots_at(&p, 0, 0.0);
    assert!(!start[0].entering);
    assert_eq!(start[0].alpha, 1.0);

    let end = dots_at(&p, 0, 1000.0);
    assert!(end[0].leaving);
    assert_eq!(end[0].alpha, 0.0);

    p.settings.fade_out_dots = false;
    let end = dots_at(&p, 0, 1000.0);
    assert!(!end[0].leaving);
    assert_eq!(end[0].alpha, 1.0);
}

#[test]
fn looping_single_frame_is_its_own_neighbor() {
    let mut p = project(vec![frame(&[("a", 0, 0), ("b", 4, 4)])]);
    p.settings.loop_playback = true;
    for t in [0.0, 500.0, 1000.0] {
        for d in dots_at(&p, 0, t) {
            assert!(!d.entering && !d.leaving);
            assert_eq!(d.alpha, 1.0);
        }
    }
}

#[test]
fn looping_first_frame_diffs_against_last() {
    let mut p = project(vec![frame(&[("a", 0, 0)]), frame(&[("b", 1, 1)])]);
    p.settings.loop_playback = true;
    let dots = dots_at(&p, 0, 0.0);
    assert!(dots[0].entering);
    assert_eq!(dots[0].alpha, 0.0);
}

#[test]
fn animate_dots_off_skips_fades() {
    let mut f = frame(&[("a", 0, 0)]);
    f.animate_dots = false;
    let p = project(vec![f]);
    for t in [0.0, 1000.0] {
        let d = &dots_at(&p, 0, t)[0];
        assert!(!d.entering && !d.leaving);
        assert_eq!(d.alpha, 1.0);
        assert_eq!(d.scale, 1.0);
    }
}

#[test]
fn overrides_rank_dot_over_group_over_frame() {
    let mut f = frame(&[("a", 0, 0), ("b", 5, 5)]);
    f.stagger_ms = 0.0;
    f.groups.push(Group {
        id: "g".to_owned(),
        dot_ids: vec!["a".to_owned(), "b".to_owned()],
        overrides: GroupOverrides {
            fade_in_ms: Some(100.0),
            ..GroupOverrides::default()
        },
        ..Group::default()
    });
    f.dots[1].fade_in_ms = Some(200.0);
    let p = project(vec![f]);

    let dots = dots_at(&p, 0, 50.0);
    assert!((by_id(&dots, "a").fade_in - 0.5).abs() < 1e-9);
    assert!((by_id(&dots, "b").fade_in - 0.25).abs() < 1e-9);
}

#[test]
fn kept_dot_blends_color_from_previous_frame() {
    let mut second = frame(&[("a", 0, 0)]);
    second.dots[0].color = 1;
    let mut p = project(vec![frame(&[("a", 0, 0)]), second]);
    p.palette = Palette::new(["#000000", "#ffffff"]);

    let start = dots_at(&p, 1, 0.0);
    assert_eq!(start[0].color, Rgba8::rgba(0, 0, 0, 255));
    assert!(!start[0].entering);

    let mid = dots_at(&p, 1, 150.0);
    assert_eq!(mid[0].color, Rgba8::rgba(128, 128, 128, 255));

    let done = dots_at(&p, 1, 600.0);
    assert_eq!(done[0].color, Rgba8::rgba(255, 255, 255, 255));
}

#[test]
fn unknown_palette_index_uses_fallback_color() {
    let mut f = frame(&[("a", 0, 0)]);
    f.dots[0].color = 99;
    let p = project(vec![f]);
    assert_eq!(dots_at(&p, 0, 500.0)[0].color, Rgba8::FALLBACK);
}

#[test]
fn alpha_and_scale_stay_in_range() {
    let p = project(vec![
        frame(&[("a", 0, 0), ("b", 1, 0), ("c", 2, 2)]),
        frame(&[("a", 0, 0), ("d", 3, 3)]),
    ]);
    for index in 0..2 {
        for step in 0..=20 {
            for d in dots_at(&p, index, f64::from(step) * 50.0) {
                assert!((0.0..=1.0).contains(&d.alpha));
                assert_eq!(d.alpha, d.fade_in.min(d.fade_out));
                assert!((d.scale - (0.6 + 0.4 * d.alpha)).abs() < 1e-12);
            }
        }
    }
}
