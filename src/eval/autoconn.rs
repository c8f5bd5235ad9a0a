use std::collections::HashSet;

use kurbo::Point;

use crate::{
    foundation::core::{GridPos, Rgba8},
    foundation::math::{clamp01, divisor_ms},
    model::project::{AutoConnection, Frame, Project, TraceDirection},
    palette::color::ColorCache,
    path::astar::find_path,
};

/// Continuous sequence clock: durations of every frame before `index` plus `elapsed_ms`.
pub fn sequence_clock(frames: &[Frame], index: usize, elapsed_ms: f64) -> f64 {
    let before: f64 = frames.iter().take(index).map(|f| f.duration_ms).sum();
    before + elapsed_ms
}

/// Lifecycle phase of an auto-connection at a clock value.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub enum AutoPhase {
    /// Clock is before the start time.
    NotStarted,
    /// Being traced in; `progress` runs `0 → 1`.
    TraceIn {
        /// Phase progress.
        progress: f64,
    },
    /// Fully visible.
    Stay,
    /// Being traced out; `progress` runs `0 → 1`.
    TraceOut {
        /// Phase progress.
        progress: f64,
    },
    /// Finished; never visible again.
    Ended,
}

impl AutoPhase {
    /// Phase of `auto` at `clock_ms`.
    pub fn at(auto: &AutoConnection, clock_ms: f64) -> Self {
        let t = clock_ms - auto.start_time_ms;
        if t.is_nan() || t < 0.0 {
            return Self::NotStarted;
        }
        if t < auto.trace_in_ms {
            return Self::TraceIn {
                progress: clamp01(t / divisor_ms(auto.trace_in_ms)),
            };
        }
        let Some(stay_ms) = auto.stay_ms else {
            return Self::Stay;
        };
        let t = t - auto.trace_in_ms;
        if t < stay_ms {
            return Self::Stay;
        }
        let t = t - stay_ms;
        match auto.trace_out_ms {
            Some(out_ms) if t < out_ms => Self::TraceOut {
                progress: clamp01(t / divisor_ms(out_ms)),
            },
            _ => Self::Ended,
        }
    }

    /// Whether any part of the route can be visible in this phase.
    pub fn is_visible(self) -> bool {
        matches!(
            self,
            Self::TraceIn { .. } | Self::Stay | Self::TraceOut { .. }
        )
    }
}

/// Edge of the visible window carrying the pen tip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TipEdge {
    Start,
    End,
}

/// Visible fraction `[start, end]` of a route, plus where the pen tip sits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ArcWindow {
    pub(crate) start: f64,
    pub(crate) end: f64,
    pub(crate) tip: Option<TipEdge>,
}

pub(crate) fn arc_window(auto: &AutoConnection, phase: AutoPhase) -> Option<ArcWindow> {
    let w = match (phase, auto.trace_in_direction, auto.trace_out_direction) {
        (AutoPhase::TraceIn { progress }, TraceDirection::Forward, _) => ArcWindow {
            start: 0.0,
            end: progress,
            tip: Some(TipEdge::End),
        },
        (AutoPhase::TraceIn { progress }, TraceDirection::Reverse, _) => ArcWindow {
            start: 1.0 - progress,
            end: 1.0,
            tip: Some(TipEdge::Start),
        },
        (AutoPhase::Stay, _, _) => ArcWindow {
            start: 0.0,
            end: 1.0,
            tip: None,
        },
        (AutoPhase::TraceOut { progress }, _, TraceDirection::Forward) => ArcWindow {
            start: 0.0,
            end: 1.0 - progress,
            tip: Some(TipEdge::End),
        },
        (AutoPhase::TraceOut { progress }, _, TraceDirection::Reverse) => ArcWindow {
            start: progress,
            end: 1.0,
            tip: Some(TipEdge::Start),
        },
        (AutoPhase::NotStarted | AutoPhase::Ended, _, _) => return None,
    };
    Some(w)
}

/// Sub-polyline covering arc lengths `[start_len, end_len]`, with interpolated ends.
pub fn clip_polyline(points: &[Point], start_len: f64, end_len: f64) -> Vec<Point> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };
    if points.len() == 1 {
        return vec![first];
    }
    if end_len < start_len {
        return Vec::new();
    }

    let mut out = Vec::new();
    let mut walked = 0.0;
    for w in points.windows(2) {
        let (a, b) = (w[0], w[1]);
        let len = a.distance(b);
        let (s0, s1) = (walked, walked + len);
        walked = s1;
        if s1 < start_len || s0 > end_len {
            continue;
        }
        let at = |s: f64| {
            if len > 0.0 {
                a.lerp(b, clamp01((s - s0) / len))
            } else {
                a
            }
        };
        if out.is_empty() {
            out.push(at(start_len.max(s0)));
        }
        let tail = at(end_len.min(s1));
        if out.last() != Some(&tail) {
            out.push(tail);
        }
    }
    out
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// An auto-connection resolved for one instant.
pub struct ResolvedAutoConnection {
    /// Auto-connection id.
    pub id: String,
    /// Current phase.
    pub phase: AutoPhase,
    /// Full pathfinder route.
    pub route: Vec<GridPos>,
    /// Visible portion of the route in cell units.
    pub points: Vec<Point>,
    /// Pen-tip position in cell units during trace phases.
    pub pen_tip: Option<Point>,
    /// Stroke color.
    pub color: Rgba8,
}

/// Resolve every visible auto-connection at `clock_ms`, routing around `obstacles`.
pub(crate) fn resolve_auto_connections(
    project: &Project,
    clock_ms: f64,
    obstacles: &HashSet<GridPos>,
    colors: &mut ColorCache,
) -> Vec<ResolvedAutoConnection> {
    let mut out = Vec::new();
    for auto in &project.auto_connections {
        let phase = AutoPhase::at(auto, clock_ms);
        let Some(window) = arc_window(auto, phase) else {
            continue;
        };
        let Some(route) = find_path(auto.start, auto.end, project.grid.size, obstacles) else {
            tracing::trace!(auto = %auto.id, "no route for auto-connection");
            continue;
        };

        let polyline: Vec<Point> = route
            .iter()
            .map(|c| Point::new(f64::from(c.x), f64::from(c.y)))
            .collect();
        let total: f64 = polyline.windows(2).map(|w| w[0].distance(w[1])).sum();
        let (start_len, end_len) = (window.start * total, window.end * total);
        if total > 0.0 && end_len - start_len <= 0.0 {
            continue;
        }
        let points = clip_polyline(&polyline, start_len, end_len);
        let pen_tip = match window.tip {
            Some(TipEdge::Start) => points.first().copied(),
            Some(TipEdge::End) => points.last().copied(),
            None => None,
        };
        out.push(ResolvedAutoConnection {
            id: auto.id.clone(),
            phase,
            route,
            points,
            pen_tip,
            color: colors.resolve(&project.palette, auto.color),
        });
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/eval/autoconn.rs"]
mod tests;
