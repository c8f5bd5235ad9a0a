//! Gridtrace is a timeline interpolation and pathfinding engine for dot-and-line grid animations.
//!
//! A project is an ordered list of keyframes. Each keyframe is a full snapshot of colored dots on
//! a square grid plus the lines connecting them. The engine answers one question: what is visible
//! at a given point of the timeline?
//!
//! - Load and sanitize a [`Project`]
//! - Resolve a [`Cursor`] into an [`EvaluatedFrame`] with [`Evaluator`]
//! - Compile it into [`DrawPrimitive`]s, rasterize with [`CpuRenderer`], or stream a whole
//!   timeline into a [`FrameSink`] through a [`RenderSession`]
//! - Drive real-time playback with [`Playback`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod encode;
pub(crate) mod eval;
pub(crate) mod model;
pub(crate) mod palette;
pub(crate) mod path;
pub(crate) mod playback;
pub(crate) mod render;
pub(crate) mod session;

pub use crate::foundation::core::{GridPos, GridSpec, Point, Rgba8, Vec2};
pub use crate::foundation::error::{GridtraceError, GridtraceResult};

pub use crate::animation::ease::Ease;
pub use crate::encode::png::{PngSequenceSink, write_png};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::eval::autoconn::{
    AutoPhase, ResolvedAutoConnection, clip_polyline, sequence_clock,
};
pub use crate::eval::evaluator::{EvaluatedFrame, Evaluator};
pub use crate::eval::segments::{ResolvedSegment, TracePath, TraceSegment, build_paths};
pub use crate::eval::timeline::{Cursor, ResolvedDot, effective_stagger};
pub use crate::model::project::{
    AutoConnection, Connection, Dot, Frame, Group, GroupOverrides, PlaybackSettings, Project,
    Style, TraceDirection,
};
pub use crate::model::sanitize::SanitizeReport;
pub use crate::palette::color::{ColorCache, Palette, parse_color};
pub use crate::path::astar::{MAX_GRID_SIZE, find_path, octile_distance, path_cost};
pub use crate::playback::controller::{Playback, PlaybackEvent, PlaybackState, cursor_at};
pub use crate::render::cpu::{CpuRenderOpts, CpuRenderer, FrameRgba};
pub use crate::render::primitives::{DrawPrimitive, PenTip, compile_primitives};
pub use crate::session::render_session::{RenderSession, RenderSessionOpts, RenderStats};
