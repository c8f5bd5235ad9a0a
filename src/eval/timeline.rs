use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::{
    foundation::core::{GridPos, Rgba8},
    foundation::math::{clamp01, divisor_ms, window_progress},
    model::project::{Frame, PlaybackSettings, Project},
    palette::color::ColorCache,
};

/// Host-supplied playhead: which frame is active and how far into it playback is.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Cursor {
    /// Active frame index; clamped to the last frame.
    pub frame_index: usize,
    /// Elapsed time inside the active frame; clamped to `[0, duration]`.
    pub elapsed_ms: f64,
}

impl Cursor {
    /// Cursor at `elapsed_ms` into frame `frame_index`.
    pub fn new(frame_index: usize, elapsed_ms: f64) -> Self {
        Self {
            frame_index,
            elapsed_ms,
        }
    }
}

/// Per-call timing of the active frame.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FrameClock<'a> {
    pub(crate) frame: &'a Frame,
    pub(crate) index: usize,
    pub(crate) duration: f64,
    pub(crate) elapsed: f64,
    pub(crate) progress: f64,
    pub(crate) eased_progress: f64,
    pub(crate) eased_elapsed: f64,
}

impl<'a> FrameClock<'a> {
    pub(crate) fn new(frame: &'a Frame, index: usize, elapsed_ms: f64) -> Self {
        let duration = frame.duration_ms;
        let elapsed = if elapsed_ms.is_finite() {
            elapsed_ms.clamp(0.0, duration)
        } else {
            0.0
        };
        let progress = clamp01(elapsed / divisor_ms(duration));
        let eased_progress = frame.easing.apply(progress);
        Self {
            frame,
            index,
            duration,
            elapsed,
            progress,
            eased_progress,
            eased_elapsed: eased_progress * duration,
        }
    }
}

/// Which neighbor a boundary lookup concerns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    Prev,
    Next,
}

/// Real neighbor frame, with wrap-around only when looping.
pub(crate) fn neighbor<'a>(
    frames: &'a [Frame],
    index: usize,
    side: Side,
    looping: bool,
) -> Option<&'a Frame> {
    let last = frames.len().checked_sub(1)?;
    match side {
        Side::Prev if index > 0 => frames.get(index - 1),
        Side::Next if index < last => frames.get(index + 1),
        _ if looping => match side {
            Side::Prev => frames.get(last),
            Side::Next => frames.first(),
        },
        _ => None,
    }
}

/// State a frame is diffed against on one side.
#[derive(Clone, Copy, Debug)]
pub(crate) enum NeighborState<'a> {
    /// Diff against a real frame.
    Frame(&'a Frame),
    /// Missing neighbor treated as empty: everything enters or leaves.
    Empty,
    /// Missing neighbor treated as identical: nothing animates.
    SameAsCurrent,
}

/// Apply the boundary-fade policy for one element kind on one side.
pub(crate) fn neighbor_state<'a>(
    frames: &'a [Frame],
    index: usize,
    side: Side,
    settings: &PlaybackSettings,
    fade_at_boundary: bool,
) -> NeighborState<'a> {
    match neighbor(frames, index, side, settings.loop_playback) {
        Some(f) => NeighborState::Frame(f),
        None if fade_at_boundary => NeighborState::Empty,
        None => NeighborState::SameAsCurrent,
    }
}

/// Membership test against a neighbor state.
#[derive(Clone, Debug)]
pub(crate) enum Presence<K> {
    Everything,
    Nothing,
    Only(HashSet<K>),
}

impl<K: Eq + Hash> Presence<K> {
    pub(crate) fn from_state(
        state: NeighborState<'_>,
        keys: impl FnOnce(&Frame) -> HashSet<K>,
    ) -> Self {
        match state {
            NeighborState::Frame(f) => Self::Only(keys(f)),
            NeighborState::Empty => Self::Nothing,
            NeighborState::SameAsCurrent => Self::Everything,
        }
    }

    pub(crate) fn contains(&self, k: &K) -> bool {
        match self {
            Self::Everything => true,
            Self::Nothing => false,
            Self::Only(set) => set.contains(k),
        }
    }
}

pub(crate) fn dot_positions(frame: &Frame) -> HashSet<GridPos> {
    frame.dots.iter().map(|d| d.pos()).collect()
}

/// Cross-frame identity of a connection: the unordered pair of its endpoint cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct LinkKey(GridPos, GridPos);

impl LinkKey {
    pub(crate) fn new(a: GridPos, b: GridPos) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }
}

pub(crate) fn link_keys(frame: &Frame) -> HashSet<LinkKey> {
    let by_id: HashMap<&str, GridPos> = frame
        .dots
        .iter()
        .map(|d| (d.id.as_str(), d.pos()))
        .collect();
    frame
        .connections
        .iter()
        .filter_map(|c| {
            let a = by_id.get(c.from.as_str())?;
            let b = by_id.get(c.to.as_str())?;
            Some(LinkKey::new(*a, *b))
        })
        .collect()
}

/// Entry stagger actually applied to dots of `frame`.
///
/// Zero when configured as zero; otherwise bounded so the whole cascade fits in both a
/// quarter of the fade-in and 40% of the frame.
pub fn effective_stagger(frame: &Frame) -> f64 {
    if frame.stagger_ms == 0.0 || frame.dots.is_empty() {
        return 0.0;
    }
    let fade_in = divisor_ms(frame.fade_in_ms);
    let per_dot = frame.duration_ms * 0.4 / frame.dots.len() as f64;
    frame.stagger_ms.min(fade_in / 4.0).min(per_dot).max(0.0)
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// A dot resolved for one instant.
pub struct ResolvedDot {
    /// Dot id.
    pub id: String,
    /// Cell.
    pub pos: GridPos,
    /// Absent from the previous state.
    pub entering: bool,
    /// Absent from the next state.
    pub leaving: bool,
    /// Stagger delay before the fade-in starts.
    pub delay_ms: f64,
    /// Fade-in factor in `[0, 1]`.
    pub fade_in: f64,
    /// Fade-out factor in `[0, 1]`.
    pub fade_out: f64,
    /// `min(fade_in, fade_out)`.
    pub alpha: f64,
    /// Visual scale `0.6 + 0.4 * alpha`.
    pub scale: f64,
    /// Color after any cross-frame blend.
    pub color: Rgba8,
}

/// Resolve every dot of the active frame, including fully transparent ones.
pub(crate) fn resolve_dots(
    project: &Project,
    clock: &FrameClock<'_>,
    colors: &mut ColorCache,
) -> Vec<ResolvedDot> {
    let frame = clock.frame;
    let settings = &project.settings;
    let prev_state = neighbor_state(
        &project.frames,
        clock.index,
        Side::Prev,
        settings,
        settings.fade_in_dots,
    );
    let next_state = neighbor_state(
        &project.frames,
        clock.index,
        Side::Next,
        settings,
        settings.fade_out_dots,
    );
    let prev = Presence::from_state(prev_state, dot_positions);
    let next = Presence::from_state(next_state, dot_positions);

    let prev_colors: HashMap<GridPos, usize> = match prev_state {
        NeighborState::Frame(f) => f.dots.iter().map(|d| (d.pos(), d.color)).collect(),
        _ => HashMap::new(),
    };
    let color_t = frame
        .color_transition_easing
        .apply(window_progress(clock.elapsed, frame.color_transition_ms));

    let stagger = effective_stagger(frame);
    let mut out = Vec::with_capacity(frame.dots.len());
    for (i, dot) in frame.dots.iter().enumerate() {
        let pos = dot.pos();
        let (entering, leaving) = if frame.animate_dots {
            (!prev.contains(&pos), !next.contains(&pos))
        } else {
            (false, false)
        };

        let group = frame.group_for_dot(&dot.id).map(|g| g.overrides);
        let fade_in_ms = dot
            .fade_in_ms
            .or(group.and_then(|g| g.fade_in_ms))
            .unwrap_or(frame.fade_in_ms);
        let fade_out_ms = dot
            .fade_out_ms
            .or(group.and_then(|g| g.fade_out_ms))
            .unwrap_or(frame.fade_out_ms);

        let delay_ms = if entering { i as f64 * stagger } else { 0.0 };
        let fade_in = if entering {
            clamp01((clock.eased_elapsed - delay_ms) / divisor_ms(fade_in_ms))
        } else {
            1.0
        };
        let fade_out = if leaving {
            clamp01((clock.duration - clock.eased_elapsed) / divisor_ms(fade_out_ms))
        } else {
            1.0
        };
        let alpha = fade_in.min(fade_out);

        let target = colors.resolve(&project.palette, dot.color);
        let color = match prev_colors.get(&pos) {
            Some(&prev_color) if !entering && prev_color != dot.color => colors
                .resolve(&project.palette, prev_color)
                .lerp(target, color_t),
            _ => target,
        };

        out.push(ResolvedDot {
            id: dot.id.clone(),
            pos,
            entering,
            leaving,
            delay_ms,
            fade_in,
            fade_out,
            alpha,
            scale: 0.6 + 0.4 * alpha,
            color,
        });
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/eval/timeline.rs"]
mod tests;
