use kurbo::Point;

use crate::{
    eval::evaluator::EvaluatedFrame,
    foundation::core::Rgba8,
    model::project::Project,
};

/// Glowing marker drawn at the moving end of a stroke.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PenTip {
    /// Pixel-space center.
    pub center: Point,
    /// Core radius in pixels.
    pub radius: f64,
}

/// Backend-agnostic drawing command in pixel space.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawPrimitive {
    /// Filled dot.
    Circle {
        /// Pixel-space center.
        center: Point,
        /// Radius in pixels, already scaled.
        radius: f64,
        /// Opacity in `[0, 1]`.
        alpha: f64,
        /// Fill color.
        color: Rgba8,
    },
    /// Open polyline with round caps and joins.
    Stroke {
        /// Pixel-space vertices; a single point draws a round dot.
        points: Vec<Point>,
        /// Line width in pixels.
        width: f64,
        /// Opacity in `[0, 1]`.
        alpha: f64,
        /// Stroke color.
        color: Rgba8,
        /// Marker at the moving end, if the stroke is being traced.
        pen_tip: Option<PenTip>,
    },
}

/// Map an evaluated frame to pixel-space primitives in painter's order.
///
/// Connections come first, then auto-connections, then dots, so dots always sit on top of
/// the lines that join them.
pub fn compile_primitives(eval: &EvaluatedFrame, project: &Project) -> Vec<DrawPrimitive> {
    let grid = &project.grid;
    let style = &project.style;
    let mut out =
        Vec::with_capacity(eval.segments.len() + eval.auto_connections.len() + eval.dots.len());

    for seg in &eval.segments {
        let tip = grid.point_px(seg.tip);
        out.push(DrawPrimitive::Stroke {
            points: vec![grid.cell_center(seg.from), tip],
            width: style.line_width_px,
            alpha: seg.alpha,
            color: seg.color,
            pen_tip: seg.pen_tip.then_some(PenTip {
                center: tip,
                radius: style.pen_tip_radius_px,
            }),
        });
    }

    for auto in &eval.auto_connections {
        if auto.points.is_empty() {
            continue;
        }
        out.push(DrawPrimitive::Stroke {
            points: auto.points.iter().map(|p| grid.point_px(*p)).collect(),
            width: style.line_width_px,
            alpha: 1.0,
            color: auto.color,
            pen_tip: auto.pen_tip.map(|p| PenTip {
                center: grid.point_px(p),
                radius: style.pen_tip_radius_px,
            }),
        });
    }

    for dot in &eval.dots {
        out.push(DrawPrimitive::Circle {
            center: grid.cell_center(dot.pos),
            radius: style.dot_radius_px * dot.scale,
            alpha: dot.alpha,
            color: dot.color,
        });
    }

    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/primitives.rs"]
mod tests;
