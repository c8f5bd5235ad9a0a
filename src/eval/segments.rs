use std::collections::HashMap;

use kurbo::Point;

use crate::{
    eval::timeline::{FrameClock, LinkKey, Presence, Side, link_keys, neighbor_state},
    foundation::core::{GridPos, Rgba8},
    foundation::math::{clamp01, divisor_ms, lerp_point},
    model::project::{Connection, Frame, Project},
    palette::color::ColorCache,
};

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// One connection oriented along its path.
pub struct TraceSegment {
    /// Connection id.
    pub connection_id: String,
    /// Index into the frame's connection list.
    pub connection_index: usize,
    /// Position in the renumbered trace order.
    pub sequence: usize,
    /// Cell the pen starts from.
    pub from: GridPos,
    /// Cell the pen moves to.
    pub to: GridPos,
    /// Length in cell units.
    pub length: f64,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
/// Contiguous run of segments drawn as one pen trace.
pub struct TracePath {
    /// Segments in trace order.
    pub segments: Vec<TraceSegment>,
    /// Sum of segment lengths.
    pub total_length: f64,
}

impl TracePath {
    fn shares_endpoint(&self, a: GridPos, b: GridPos) -> bool {
        self.segments
            .last()
            .is_some_and(|last| [last.from, last.to].iter().any(|p| *p == a || *p == b))
    }

    fn push(&mut self, mut seg: TraceSegment) {
        if let [only] = self.segments.as_mut_slice() {
            // A lone first segment is flipped when the chain continues from its start.
            if only.to != seg.from && only.to != seg.to {
                std::mem::swap(&mut only.from, &mut only.to);
            }
        }
        if let Some(last) = self.segments.last() {
            let anchor = if last.to == seg.from || last.to == seg.to {
                last.to
            } else {
                last.from
            };
            if seg.to == anchor && seg.from != anchor {
                std::mem::swap(&mut seg.from, &mut seg.to);
            }
        }
        self.total_length += seg.length;
        self.segments.push(seg);
    }
}

/// Group a frame's connections into contiguous trace paths.
///
/// Connections are stably sorted by `order` and renumbered; walking that sequence, a
/// connection joins the current path when it shares an endpoint cell with the path's last
/// segment, otherwise it starts a new path. Connections with an endpoint id missing from
/// the frame are skipped.
pub fn build_paths(frame: &Frame) -> Vec<TracePath> {
    let by_id: HashMap<&str, GridPos> = frame
        .dots
        .iter()
        .map(|d| (d.id.as_str(), d.pos()))
        .collect();

    let mut ordered: Vec<(usize, &Connection)> = frame.connections.iter().enumerate().collect();
    ordered.sort_by_key(|(_, c)| c.order);

    let mut paths: Vec<TracePath> = Vec::new();
    let mut sequence = 0usize;
    for (connection_index, c) in ordered {
        let (Some(&from), Some(&to)) = (by_id.get(c.from.as_str()), by_id.get(c.to.as_str()))
        else {
            tracing::trace!(connection = %c.id, "skipping connection with missing endpoint");
            continue;
        };
        let seg = TraceSegment {
            connection_id: c.id.clone(),
            connection_index,
            sequence,
            from,
            to,
            length: from.distance(to),
        };
        sequence += 1;

        match paths.last_mut() {
            Some(path) if path.shares_endpoint(from, to) => path.push(seg),
            _ => {
                let mut path = TracePath::default();
                path.push(seg);
                paths.push(path);
            }
        }
    }
    paths
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// A connection segment resolved for one instant.
pub struct ResolvedSegment {
    /// Connection id.
    pub connection_id: String,
    /// Index of the trace path this segment belongs to.
    pub path_index: usize,
    /// Renumbered trace order.
    pub sequence: usize,
    /// Start cell.
    pub from: GridPos,
    /// Drawn end point in cell units; short of `to` while the segment is being traced.
    pub tip: Point,
    /// End cell.
    pub to: GridPos,
    /// Drawn fraction of the segment in `(0, 1]`.
    pub reveal: f64,
    /// Opacity in `(0, 1]`.
    pub alpha: f64,
    /// Stroke color.
    pub color: Rgba8,
    /// Absent from the previous state.
    pub entering: bool,
    /// Absent from the next state.
    pub leaving: bool,
    /// The pen is currently on this segment.
    pub pen_tip: bool,
}

/// Effective timing of one trace path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PathTiming {
    pub(crate) delay_ms: f64,
    pub(crate) duration_ms: f64,
}

pub(crate) fn path_timing(frame: &Frame, path_index: usize, path: &TracePath) -> PathTiming {
    let connections: Vec<&Connection> = path
        .segments
        .iter()
        .filter_map(|s| frame.connections.get(s.connection_index))
        .collect();
    let group_duration = connections.iter().find_map(|c| {
        frame
            .group_for_connection(&c.id)
            .and_then(|g| g.overrides.connection_duration_ms)
    });
    let duration_ms = connections
        .iter()
        .find_map(|c| c.duration_ms)
        .or(group_duration)
        .unwrap_or(frame.connection_duration_ms);

    let stagger = connections
        .first()
        .and_then(|c| frame.group_for_connection(&c.id))
        .and_then(|g| g.overrides.connection_stagger_ms)
        .unwrap_or(frame.connection_stagger_ms);

    PathTiming {
        delay_ms: path_index as f64 * stagger,
        duration_ms: divisor_ms(duration_ms),
    }
}

/// Per-segment reveal windows `(start, duration)` relative to the path start.
pub(crate) fn segment_windows(path: &TracePath, path_duration_ms: f64) -> Vec<(f64, f64)> {
    let count = path.segments.len().max(1) as f64;
    let mut start = 0.0;
    path.segments
        .iter()
        .map(|s| {
            let share = if path.total_length > 0.0 {
                s.length / path.total_length
            } else {
                1.0 / count
            };
            let window = (start, path_duration_ms * share);
            start += window.1;
            window
        })
        .collect()
}

/// Resolve the visible connection segments of the active frame.
pub(crate) fn resolve_segments(
    project: &Project,
    clock: &FrameClock<'_>,
    colors: &mut ColorCache,
) -> Vec<ResolvedSegment> {
    let frame = clock.frame;
    let settings = &project.settings;
    let prev = Presence::from_state(
        neighbor_state(
            &project.frames,
            clock.index,
            Side::Prev,
            settings,
            settings.fade_in_connections,
        ),
        link_keys,
    );
    let next = Presence::from_state(
        neighbor_state(
            &project.frames,
            clock.index,
            Side::Next,
            settings,
            settings.fade_out_connections,
        ),
        link_keys,
    );

    let mut out = Vec::new();
    for (path_index, path) in build_paths(frame).iter().enumerate() {
        let timing = path_timing(frame, path_index, path);
        let local_t = clock.eased_elapsed - timing.delay_ms;
        let windows = segment_windows(path, timing.duration_ms);

        for (seg, (start, duration)) in path.segments.iter().zip(windows) {
            let Some(connection) = frame.connections.get(seg.connection_index) else {
                continue;
            };
            let key = LinkKey::new(seg.from, seg.to);
            let (entering, leaving) = if frame.animate_connections {
                (!prev.contains(&key), !next.contains(&key))
            } else {
                (false, false)
            };

            let reveal = if !entering {
                1.0
            } else if local_t <= start {
                0.0
            } else if duration > 0.0 {
                clamp01((local_t - start) / duration)
            } else {
                1.0
            };
            if reveal <= 0.0 {
                continue;
            }

            let alpha = if leaving {
                let fade_out_ms = frame
                    .group_for_connection(&connection.id)
                    .and_then(|g| g.overrides.fade_out_ms)
                    .unwrap_or(frame.connection_fade_out_ms);
                clamp01((clock.duration - clock.eased_elapsed) / divisor_ms(fade_out_ms))
            } else {
                1.0
            };
            if alpha <= 0.0 {
                continue;
            }

            let from = Point::new(f64::from(seg.from.x), f64::from(seg.from.y));
            let to = Point::new(f64::from(seg.to.x), f64::from(seg.to.y));
            out.push(ResolvedSegment {
                connection_id: seg.connection_id.clone(),
                path_index,
                sequence: seg.sequence,
                from: seg.from,
                tip: lerp_point(from, to, reveal),
                to: seg.to,
                reveal,
                alpha,
                color: colors.resolve(&project.palette, connection.color),
                entering,
                leaving,
                pen_tip: reveal < 1.0,
            });
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/eval/segments.rs"]
mod tests;
