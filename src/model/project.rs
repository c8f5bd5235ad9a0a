use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::{
    animation::ease::Ease,
    foundation::core::{GridPos, GridSpec},
    foundation::error::{GridtraceError, GridtraceResult},
    model::def::ProjectDef,
    model::sanitize::{SanitizeReport, sanitize, sanitize_with_report},
    palette::color::Palette,
};

#[derive(Clone, Debug, Default, serde::Serialize)]
/// A validated animation project.
///
/// Values of this type only come out of [`Project::from_reader`] (or are built in code), so every
/// engine stage assumes its invariants: durations are finite and non-negative, dot ids are
/// unique within a frame, and colors are palette indices.
pub struct Project {
    /// Grid geometry.
    pub grid: GridSpec,
    /// Render knobs.
    pub style: Style,
    /// Palette referenced by color indices.
    pub palette: Palette,
    /// Global playback and boundary-fade settings.
    pub settings: PlaybackSettings,
    /// Ordered keyframes.
    pub frames: Vec<Frame>,
    /// Frame-independent traced routes.
    pub auto_connections: Vec<AutoConnection>,
}

impl Project {
    /// Parse and sanitize a project from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> GridtraceResult<Self> {
        let def: ProjectDef = serde_json::from_reader(r)
            .map_err(|e| GridtraceError::validation(format!("parse project JSON: {e}")))?;
        Ok(sanitize(def))
    }

    /// Like [`Project::from_reader`], also returning what sanitizing changed.
    pub fn from_reader_with_report<R: std::io::Read>(
        r: R,
    ) -> GridtraceResult<(Self, SanitizeReport)> {
        let def: ProjectDef = serde_json::from_reader(r)
            .map_err(|e| GridtraceError::validation(format!("parse project JSON: {e}")))?;
        Ok(sanitize_with_report(def))
    }

    /// Parse and sanitize a project from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> GridtraceResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            GridtraceError::validation(format!("open project JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Parse and sanitize a project from a JSON string.
    pub fn from_json_str(s: &str) -> GridtraceResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Sum of all frame durations in milliseconds.
    pub fn total_duration_ms(&self) -> f64 {
        self.frames.iter().map(|f| f.duration_ms).sum()
    }
}

#[derive(Clone, Debug, serde::Serialize)]
/// Render knobs shared by every frame.
pub struct Style {
    /// Dot radius at full scale.
    pub dot_radius_px: f64,
    /// Stroke width for connections and auto-connections.
    pub line_width_px: f64,
    /// Radius of the pen-tip marker core.
    pub pen_tip_radius_px: f64,
    /// Canvas clear color string.
    pub background: String,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            dot_radius_px: 6.0,
            line_width_px: 3.0,
            pen_tip_radius_px: 4.0,
            background: "#101014".to_owned(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
/// Loop flag and the four independent boundary-fade flags.
pub struct PlaybackSettings {
    /// Wrap from the last frame back to the first.
    pub loop_playback: bool,
    /// Fade dots in on the first frame when not looping.
    pub fade_in_dots: bool,
    /// Fade dots out on the last frame when not looping.
    pub fade_out_dots: bool,
    /// Trace connections in on the first frame when not looping.
    pub fade_in_connections: bool,
    /// Fade connections out on the last frame when not looping.
    pub fade_out_connections: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            loop_playback: false,
            fade_in_dots: true,
            fade_out_dots: true,
            fade_in_connections: true,
            fade_out_connections: true,
        }
    }
}

#[derive(Clone, Debug, serde::Serialize)]
/// One keyframe: a full snapshot of dots and connections plus its timing knobs.
pub struct Frame {
    /// Frame label.
    pub id: String,
    /// Visible dots.
    pub dots: Vec<Dot>,
    /// Connections between dots of this frame.
    pub connections: Vec<Connection>,
    /// Override bundles for subsets of this frame's elements.
    pub groups: Vec<Group>,
    /// Frame length.
    pub duration_ms: f64,
    /// Curve applied to intra-frame progress.
    pub easing: Ease,
    /// Default dot fade-in.
    pub fade_in_ms: f64,
    /// Default dot fade-out.
    pub fade_out_ms: f64,
    /// Configured per-dot entry stagger.
    pub stagger_ms: f64,
    /// Default total reveal duration of one connection path.
    pub connection_duration_ms: f64,
    /// Delay between the starts of consecutive connection paths.
    pub connection_stagger_ms: f64,
    /// Default fade-out of leaving connections.
    pub connection_fade_out_ms: f64,
    /// Length of the color blend for dots that keep their position.
    pub color_transition_ms: f64,
    /// Curve applied to the color blend.
    pub color_transition_easing: Ease,
    /// Whether dots fade in and out across frames.
    pub animate_dots: bool,
    /// Whether connections trace in and fade out across frames.
    pub animate_connections: bool,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            id: String::new(),
            dots: Vec::new(),
            connections: Vec::new(),
            groups: Vec::new(),
            duration_ms: 1000.0,
            easing: Ease::Linear,
            fade_in_ms: 300.0,
            fade_out_ms: 300.0,
            stagger_ms: 40.0,
            connection_duration_ms: 600.0,
            connection_stagger_ms: 120.0,
            connection_fade_out_ms: 300.0,
            color_transition_ms: 300.0,
            color_transition_easing: Ease::Linear,
            animate_dots: true,
            animate_connections: true,
        }
    }
}

impl Frame {
    /// Empty frame with the given duration and default knobs.
    pub fn with_duration(duration_ms: f64) -> Self {
        Self {
            duration_ms,
            ..Self::default()
        }
    }

    /// First group listing `dot_id`.
    pub fn group_for_dot(&self, dot_id: &str) -> Option<&Group> {
        self.groups
            .iter()
            .find(|g| g.dot_ids.iter().any(|id| id == dot_id))
    }

    /// First group listing `connection_id`.
    pub fn group_for_connection(&self, connection_id: &str) -> Option<&Group> {
        self.groups
            .iter()
            .find(|g| g.connection_ids.iter().any(|id| id == connection_id))
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// A grid-anchored point.
pub struct Dot {
    /// Identifier, unique within its frame.
    pub id: String,
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// Palette index.
    pub color: usize,
    /// Per-dot fade-in override.
    pub fade_in_ms: Option<f64>,
    /// Per-dot fade-out override.
    pub fade_out_ms: Option<f64>,
}

impl Dot {
    /// Dot without timing overrides.
    pub fn new(id: impl Into<String>, x: i32, y: i32, color: usize) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            color,
            fade_in_ms: None,
            fade_out_ms: None,
        }
    }

    /// Cell occupied by the dot.
    pub fn pos(&self) -> GridPos {
        GridPos::new(self.x, self.y)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// A line between two dots of the same frame.
pub struct Connection {
    /// Identifier.
    pub id: String,
    /// Source dot id.
    pub from: String,
    /// Target dot id.
    pub to: String,
    /// Palette index.
    pub color: usize,
    /// Author-defined trace sequence key.
    pub order: i64,
    /// Per-connection override of its path's total reveal duration.
    pub duration_ms: Option<f64>,
}

impl Connection {
    /// Connection without a duration override.
    pub fn new(
        id: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        color: usize,
        order: i64,
    ) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            color,
            order,
            duration_ms: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
/// Named id-set with optional timing overrides.
///
/// Group values rank between frame defaults and per-element overrides.
pub struct Group {
    /// Group name.
    pub id: String,
    /// Member dot ids.
    pub dot_ids: Vec<String>,
    /// Member connection ids.
    pub connection_ids: Vec<String>,
    /// Timing overrides.
    pub overrides: GroupOverrides,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
/// Optional timing overrides carried by a [`Group`].
pub struct GroupOverrides {
    /// Dot fade-in.
    pub fade_in_ms: Option<f64>,
    /// Dot and connection fade-out.
    pub fade_out_ms: Option<f64>,
    /// Connection path reveal duration.
    pub connection_duration_ms: Option<f64>,
    /// Connection path stagger.
    pub connection_stagger_ms: Option<f64>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
/// Which end of a route a trace phase starts from.
pub enum TraceDirection {
    /// From the start cell toward the end cell.
    #[default]
    Forward,
    /// From the end cell toward the start cell.
    Reverse,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// A frame-independent trace between two cells, routed around dots by the pathfinder.
pub struct AutoConnection {
    /// Identifier.
    pub id: String,
    /// Route start cell.
    pub start: GridPos,
    /// Route end cell.
    pub end: GridPos,
    /// Palette index.
    pub color: usize,
    /// Length of the trace-in phase.
    pub trace_in_ms: f64,
    /// Direction of the trace-in phase.
    pub trace_in_direction: TraceDirection,
    /// Length of the stay phase; `None` stays forever.
    pub stay_ms: Option<f64>,
    /// Length of the trace-out phase; `None` skips it.
    pub trace_out_ms: Option<f64>,
    /// Direction of the trace-out phase.
    pub trace_out_direction: TraceDirection,
    /// Start time on the sequence clock.
    pub start_time_ms: f64,
}

impl AutoConnection {
    /// Forward trace-in that stays forever.
    pub fn new(id: impl Into<String>, start: GridPos, end: GridPos, color: usize) -> Self {
        Self {
            id: id.into(),
            start,
            end,
            color,
            trace_in_ms: 1000.0,
            trace_in_direction: TraceDirection::Forward,
            stay_ms: None,
            trace_out_ms: None,
            trace_out_direction: TraceDirection::Forward,
            start_time_ms: 0.0,
        }
    }
}
