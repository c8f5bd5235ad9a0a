use std::collections::HashSet;

use crate::{
    eval::autoconn::{ResolvedAutoConnection, resolve_auto_connections, sequence_clock},
    eval::segments::{ResolvedSegment, resolve_segments},
    eval::timeline::{Cursor, FrameClock, ResolvedDot, dot_positions, resolve_dots},
    model::project::Project,
    palette::color::ColorCache,
};

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
/// Everything visible at one playhead position, before pixel mapping.
pub struct EvaluatedFrame {
    /// Active frame index after clamping.
    pub frame_index: usize,
    /// Intra-frame elapsed time after clamping.
    pub elapsed_ms: f64,
    /// Raw intra-frame progress in `[0, 1]`.
    pub progress: f64,
    /// Progress after the frame's easing.
    pub eased_progress: f64,
    /// Continuous sequence clock driving auto-connections.
    pub clock_ms: f64,
    /// Visible dots in frame order.
    pub dots: Vec<ResolvedDot>,
    /// Visible connection segments in trace order.
    pub segments: Vec<ResolvedSegment>,
    /// Visible auto-connections in declaration order.
    pub auto_connections: Vec<ResolvedAutoConnection>,
}

/// Stateless resolver from project and playhead to visible geometry.
pub struct Evaluator;

impl Evaluator {
    /// Resolve what is visible at `cursor`.
    ///
    /// This is a pure function of its inputs; `colors` only memoizes palette parsing. Malformed
    /// elements are skipped and never fail the call.
    #[tracing::instrument(skip(project, colors))]
    pub fn eval(project: &Project, cursor: Cursor, colors: &mut ColorCache) -> EvaluatedFrame {
        let Some(last) = project.frames.len().checked_sub(1) else {
            let elapsed_ms = if cursor.elapsed_ms.is_finite() {
                cursor.elapsed_ms.max(0.0)
            } else {
                0.0
            };
            return EvaluatedFrame {
                elapsed_ms,
                clock_ms: elapsed_ms,
                auto_connections: resolve_auto_connections(
                    project,
                    elapsed_ms,
                    &HashSet::new(),
                    colors,
                ),
                ..EvaluatedFrame::default()
            };
        };

        let index = cursor.frame_index.min(last);
        let frame = &project.frames[index];
        let clock = FrameClock::new(frame, index, cursor.elapsed_ms);

        let dots = resolve_dots(project, &clock, colors)
            .into_iter()
            .filter(|d| d.alpha > 0.0)
            .collect();
        let segments = resolve_segments(project, &clock, colors);

        let clock_ms = sequence_clock(&project.frames, index, clock.elapsed);
        let obstacles = dot_positions(frame);
        let auto_connections = resolve_auto_connections(project, clock_ms, &obstacles, colors);

        EvaluatedFrame {
            frame_index: index,
            elapsed_ms: clock.elapsed,
            progress: clock.progress,
            eased_progress: clock.eased_progress,
            clock_ms,
            dots,
            segments,
            auto_connections,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/eval/evaluator.rs"]
mod tests;
