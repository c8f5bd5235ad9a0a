use std::collections::HashSet;

use crate::{
    animation::ease::Ease,
    foundation::core::{GridPos, GridSpec},
    model::def::{
        AutoConnectionDef, CellDef, ConnectionDef, DotDef, FrameDef, GridDef, GroupDef, Num,
        ProjectDef, SettingsDef, StyleDef,
    },
    model::project::{
        AutoConnection, Connection, Dot, Frame, Group, GroupOverrides, PlaybackSettings, Project,
        Style, TraceDirection,
    },
    palette::color::Palette,
    path::astar::MAX_GRID_SIZE,
};

/// Counts of what loading repaired or dropped, see [`Project::from_reader_with_report`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct SanitizeReport {
    /// Elements removed because they could not be repaired.
    pub dropped: usize,
    /// Fields replaced by a default or clamped value.
    pub repaired: usize,
}

impl SanitizeReport {
    /// Whether the document was accepted unchanged.
    pub fn is_clean(&self) -> bool {
        self.dropped == 0 && self.repaired == 0
    }
}

/// Turn a lenient document into a validated [`Project`].
///
/// Never fails; see [`sanitize_with_report`] for what was changed.
pub(crate) fn sanitize(def: ProjectDef) -> Project {
    sanitize_with_report(def).0
}

#[tracing::instrument(skip(def))]
pub(crate) fn sanitize_with_report(def: ProjectDef) -> (Project, SanitizeReport) {
    let mut cx = Cx::default();

    let grid = cx.grid(def.grid.0.unwrap_or_default());
    let style = cx.style(def.style.0.unwrap_or_default());
    let palette = Palette {
        entries: def
            .palette
            .into_iter()
            .map(|e| {
                e.0.unwrap_or_else(|| {
                    cx.report.repaired += 1;
                    String::new()
                })
            })
            .collect(),
    };
    let settings = cx.settings(def.settings.0.unwrap_or_default());

    let mut frames = Vec::with_capacity(def.frames.len());
    for (frame_index, frame) in def.frames.into_iter().enumerate() {
        match frame.0 {
            Some(frame) => frames.push(cx.frame(frame_index, frame)),
            None => cx.report.dropped += 1,
        }
    }

    let mut auto_connections = Vec::with_capacity(def.auto_connections.len());
    for (index, auto) in def.auto_connections.into_iter().enumerate() {
        match auto.0.and_then(|a| cx.auto_connection(index, a)) {
            Some(a) => auto_connections.push(a),
            None => cx.report.dropped += 1,
        }
    }

    let report = cx.report;
    if report != SanitizeReport::default() {
        tracing::debug!(
            dropped = report.dropped,
            repaired = report.repaired,
            "sanitized project input"
        );
    }

    (
        Project {
            grid,
            style,
            palette,
            settings,
            frames,
            auto_connections,
        },
        report,
    )
}

#[derive(Default)]
struct Cx {
    report: SanitizeReport,
}

impl Cx {
    /// Non-negative duration, or `default` when absent or invalid.
    fn duration(&mut self, v: Num, default: f64) -> f64 {
        match v.0 {
            Some(v) if v >= 0.0 => v,
            Some(_) => {
                self.report.repaired += 1;
                default
            }
            None => default,
        }
    }

    /// Non-negative override; invalid values count as repaired and read as unset.
    fn override_ms(&mut self, v: Num) -> Option<f64> {
        match v.0 {
            Some(v) if v >= 0.0 => Some(v),
            Some(_) => {
                self.report.repaired += 1;
                None
            }
            None => None,
        }
    }

    fn positive(&mut self, v: Num, default: f64) -> f64 {
        match v.0 {
            Some(v) if v > 0.0 => v,
            Some(_) => {
                self.report.repaired += 1;
                default
            }
            None => default,
        }
    }

    fn color_index(&mut self, v: Num) -> usize {
        match v.0 {
            Some(v) if v >= 0.0 => v.floor().min(usize::MAX as f64) as usize,
            Some(_) => {
                self.report.repaired += 1;
                usize::MAX
            }
            None => 0,
        }
    }

    fn ease(&mut self, name: Option<String>) -> Ease {
        let Some(name) = name else {
            return Ease::Linear;
        };
        Ease::from_name(&name).unwrap_or_else(|| {
            self.report.repaired += 1;
            Ease::Linear
        })
    }

    fn direction(&mut self, name: Option<String>) -> TraceDirection {
        match name.as_deref().map(|s| s.trim().to_ascii_lowercase()) {
            None => TraceDirection::Forward,
            Some(s) if s == "forward" => TraceDirection::Forward,
            Some(s) if s == "reverse" || s == "backward" => TraceDirection::Reverse,
            Some(_) => {
                self.report.repaired += 1;
                TraceDirection::Forward
            }
        }
    }

    fn cell(&mut self, v: f64) -> i32 {
        let r = v.round();
        if r != v {
            self.report.repaired += 1;
        }
        r.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
    }

    fn grid(&mut self, def: GridDef) -> GridSpec {
        let d = GridSpec::default();
        let size = match def.size.0 {
            Some(v) if v >= 1.0 => (v.round() as u64).min(u64::from(MAX_GRID_SIZE)) as u32,
            Some(_) => {
                self.report.repaired += 1;
                d.size
            }
            None => d.size,
        };
        GridSpec {
            size,
            spacing_px: self.positive(def.spacing_px, d.spacing_px),
            margin_px: self.duration(def.margin_px, d.margin_px),
        }
    }

    fn style(&mut self, def: StyleDef) -> Style {
        let d = Style::default();
        Style {
            dot_radius_px: self.positive(def.dot_radius_px, d.dot_radius_px),
            line_width_px: self.positive(def.line_width_px, d.line_width_px),
            pen_tip_radius_px: self.positive(def.pen_tip_radius_px, d.pen_tip_radius_px),
            background: def.background.0.unwrap_or(d.background),
        }
    }

    fn settings(&mut self, def: SettingsDef) -> PlaybackSettings {
        let d = PlaybackSettings::default();
        PlaybackSettings {
            loop_playback: def.loop_playback.0.unwrap_or(d.loop_playback),
            fade_in_dots: def.fade_in_dots.0.unwrap_or(d.fade_in_dots),
            fade_out_dots: def.fade_out_dots.0.unwrap_or(d.fade_out_dots),
            fade_in_connections: def.fade_in_connections.0.unwrap_or(d.fade_in_connections),
            fade_out_connections: def.fade_out_connections.0.unwrap_or(d.fade_out_connections),
        }
    }

    fn frame(&mut self, frame_index: usize, def: FrameDef) -> Frame {
        let d = Frame::default();

        let mut seen = HashSet::new();
        let mut dots = Vec::with_capacity(def.dots.len());
        for (i, dot) in def.dots.into_iter().enumerate() {
            let Some(dot) = dot.0.and_then(|dot| self.dot(i, dot)) else {
                self.report.dropped += 1;
                continue;
            };
            if !seen.insert(dot.id.clone()) {
                tracing::trace!(frame = frame_index, dot = %dot.id, "duplicate dot id dropped");
                self.report.dropped += 1;
                continue;
            }
            dots.push(dot);
        }

        let mut connections = Vec::with_capacity(def.connections.len());
        for (i, c) in def.connections.into_iter().enumerate() {
            match c.0.and_then(|c| self.connection(i, c)) {
                Some(c) => connections.push(c),
                None => self.report.dropped += 1,
            }
        }

        let mut groups = Vec::with_capacity(def.groups.len());
        for (i, g) in def.groups.into_iter().enumerate() {
            match g.0 {
                Some(g) => groups.push(self.group(i, g)),
                None => self.report.dropped += 1,
            }
        }

        Frame {
            id: def.id.0.unwrap_or_else(|| format!("frame-{frame_index}")),
            dots,
            connections,
            groups,
            duration_ms: self.duration(def.duration_ms, d.duration_ms),
            easing: self.ease(def.easing.0),
            fade_in_ms: self.duration(def.fade_in_ms, d.fade_in_ms),
            fade_out_ms: self.duration(def.fade_out_ms, d.fade_out_ms),
            stagger_ms: self.duration(def.stagger_ms, d.stagger_ms),
            connection_duration_ms: self
                .duration(def.connection_duration_ms, d.connection_duration_ms),
            connection_stagger_ms: self
                .duration(def.connection_stagger_ms, d.connection_stagger_ms),
            connection_fade_out_ms: self
                .duration(def.connection_fade_out_ms, d.connection_fade_out_ms),
            color_transition_ms: self.duration(def.color_transition_ms, d.color_transition_ms),
            color_transition_easing: self.ease(def.color_transition_easing.0),
            animate_dots: def.animate_dots.0.unwrap_or(d.animate_dots),
            animate_connections: def.animate_connections.0.unwrap_or(d.animate_connections),
        }
    }

    fn dot(&mut self, index: usize, def: DotDef) -> Option<Dot> {
        let (Some(x), Some(y)) = (def.x.0, def.y.0) else {
            return None;
        };
        let id = def.id.0.unwrap_or_else(|| {
            self.report.repaired += 1;
            format!("#dot-{index}")
        });
        Some(Dot {
            id,
            x: self.cell(x),
            y: self.cell(y),
            color: self.color_index(def.color),
            fade_in_ms: self.override_ms(def.fade_in_ms),
            fade_out_ms: self.override_ms(def.fade_out_ms),
        })
    }

    fn connection(&mut self, index: usize, def: ConnectionDef) -> Option<Connection> {
        let (Some(from), Some(to)) = (def.from.0, def.to.0) else {
            return None;
        };
        let id = def.id.0.unwrap_or_else(|| {
            self.report.repaired += 1;
            format!("#connection-{index}")
        });
        let order = match def.order.0 {
            Some(o) => o.round().clamp(i64::MIN as f64, i64::MAX as f64) as i64,
            None => index as i64,
        };
        Some(Connection {
            id,
            from,
            to,
            color: self.color_index(def.color),
            order,
            duration_ms: self.override_ms(def.duration_ms),
        })
    }

    fn group(&mut self, index: usize, def: GroupDef) -> Group {
        let o = def.overrides.0.unwrap_or_default();
        Group {
            id: def.id.0.unwrap_or_else(|| format!("#group-{index}")),
            dot_ids: def.dot_ids.into_iter().filter_map(|i| i.0).collect(),
            connection_ids: def.connection_ids.into_iter().filter_map(|i| i.0).collect(),
            overrides: GroupOverrides {
                fade_in_ms: self.override_ms(o.fade_in_ms),
                fade_out_ms: self.override_ms(o.fade_out_ms),
                connection_duration_ms: self.override_ms(o.connection_duration_ms),
                connection_stagger_ms: self.override_ms(o.connection_stagger_ms),
            },
        }
    }

    fn grid_pos(&mut self, cell: CellDef) -> GridPos {
        GridPos::new(self.cell(cell.x), self.cell(cell.y))
    }

    fn auto_connection(&mut self, index: usize, def: AutoConnectionDef) -> Option<AutoConnection> {
        let (Some(start), Some(end)) = (def.start.0, def.end.0) else {
            return None;
        };
        let d = AutoConnection::new(String::new(), GridPos::default(), GridPos::default(), 0);
        Some(AutoConnection {
            id: def.id.0.unwrap_or_else(|| format!("#auto-{index}")),
            start: self.grid_pos(start),
            end: self.grid_pos(end),
            color: self.color_index(def.color),
            trace_in_ms: self.duration(def.trace_in_ms, d.trace_in_ms),
            trace_in_direction: self.direction(def.trace_in_direction.0),
            stay_ms: self.override_ms(def.stay_ms),
            trace_out_ms: self.override_ms(def.trace_out_ms),
            trace_out_direction: self.direction(def.trace_out_direction.0),
            start_time_ms: def.start_time_ms.0.unwrap_or(0.0),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/sanitize.rs"]
mod tests;
