pub use kurbo::{Point, Vec2};

/// Integer cell coordinate on the authoring grid.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct GridPos {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl GridPos {
    /// Create a cell coordinate.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset by a step, saturating at the `i32` range.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Euclidean distance in cell units.
    pub fn distance(self, other: Self) -> f64 {
        let dx = f64::from(other.x) - f64::from(self.x);
        let dy = f64::from(other.y) - f64::from(self.y);
        dx.hypot(dy)
    }
}

/// Maps grid cells to pixel space.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GridSpec {
    /// Number of cells per side; valid cells are `0..size` on both axes.
    pub size: u32,
    /// Distance in pixels between adjacent cell centers.
    pub spacing_px: f64,
    /// Offset in pixels of cell `(0, 0)` from the canvas origin.
    pub margin_px: f64,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            size: 32,
            spacing_px: 24.0,
            margin_px: 24.0,
        }
    }
}

impl GridSpec {
    /// Pixel-space center of a cell.
    pub fn cell_center(&self, cell: GridPos) -> Point {
        Point::new(
            self.margin_px + f64::from(cell.x) * self.spacing_px,
            self.margin_px + f64::from(cell.y) * self.spacing_px,
        )
    }

    /// Pixel-space position of a fractional cell-unit point.
    pub fn point_px(&self, p: Point) -> Point {
        Point::new(
            self.margin_px + p.x * self.spacing_px,
            self.margin_px + p.y * self.spacing_px,
        )
    }

    /// Canvas extent in pixels that fits every cell plus the margin on both sides.
    pub fn canvas_px(&self) -> (u32, u32) {
        let span = f64::from(self.size.saturating_sub(1)) * self.spacing_px;
        let side = (span + 2.0 * self.margin_px).ceil().max(1.0) as u32;
        (side, side)
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Rgba8 {
    /// Color used whenever a palette reference cannot be resolved.
    pub const FALLBACK: Self = Self::rgba(0x88, 0x88, 0x88, 0xff);

    /// Build from components.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Component-wise linear blend; `t` is clamped to `[0, 1]`.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        fn lerp_u8(a: u8, b: u8, t: f64) -> u8 {
            let a = f64::from(a);
            let b = f64::from(b);
            (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
        }

        let t = crate::foundation::math::clamp01(t);
        Self {
            r: lerp_u8(self.r, other.r, t),
            g: lerp_u8(self.g, other.g, t),
            b: lerp_u8(self.b, other.b, t),
            a: lerp_u8(self.a, other.a, t),
        }
    }

    /// Same color with alpha scaled by `opacity`, clamped to `[0, 1]`.
    pub fn with_opacity(self, opacity: f64) -> Self {
        let a = f64::from(self.a) * crate::foundation::math::clamp01(opacity);
        Self {
            a: a.round().clamp(0.0, 255.0) as u8,
            ..self
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
