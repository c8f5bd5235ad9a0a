use kurbo::{BezPath, Cap, Circle, Join, PathEl, Point, Shape, Stroke, StrokeOpts};

use crate::{
    foundation::core::Rgba8,
    foundation::error::{GridtraceError, GridtraceResult},
    render::primitives::{DrawPrimitive, PenTip},
};

const TOLERANCE: f64 = 0.1;
const HALO_RADIUS_SCALE: f64 = 2.0;
const HALO_ALPHA: f64 = 0.35;

/// A rendered frame as RGBA8 pixels.
///
/// Pixels are **premultiplied alpha**, tightly packed and row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRgba {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 bytes.
    pub data: Vec<u8>,
}

impl FrameRgba {
    /// Premultiplied pixel at `(x, y)`, if inside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Copy of the pixel data with alpha un-premultiplied, as image encoders expect.
    pub fn to_straight_rgba(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(4) {
            let a = px[3];
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + u16::from(a) / 2) / u16::from(a)).min(255) as u8;
            }
        }
        out
    }
}

/// Options for [`CpuRenderer`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CpuRenderOpts {
    /// Uniform pixel scale applied to the logical canvas.
    pub scale: f64,
    /// Clear color; `None` leaves the canvas transparent.
    pub background: Option<Rgba8>,
}

impl Default for CpuRenderOpts {
    fn default() -> Self {
        Self {
            scale: 1.0,
            background: None,
        }
    }
}

/// CPU rasterizer for [`DrawPrimitive`] lists, powered by `vello_cpu`.
///
/// The raster context is reused across calls with the same output size.
pub struct CpuRenderer {
    opts: CpuRenderOpts,
    ctx: Option<vello_cpu::RenderContext>,
}

impl CpuRenderer {
    /// Create a renderer.
    pub fn new(opts: CpuRenderOpts) -> Self {
        Self { opts, ctx: None }
    }

    /// Rasterize `primitives` onto a logical canvas of `canvas` pixels.
    ///
    /// The output is `canvas * scale`, rounded up. Fails only when the scale is not a
    /// positive finite number or the output does not fit a raster surface.
    #[tracing::instrument(skip(self, primitives), fields(primitives = primitives.len()))]
    pub fn render(
        &mut self,
        canvas: (u32, u32),
        primitives: &[DrawPrimitive],
    ) -> GridtraceResult<FrameRgba> {
        let scale = self.opts.scale;
        let (width, height) = output_size(canvas, scale)?;

        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();

        if let Some(bg) = self.opts.background {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(bg.r, bg.g, bg.b, bg.a));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(width),
                f64::from(height),
            ));
        }

        ctx.set_transform(vello_cpu::kurbo::Affine::scale(scale));
        for p in primitives {
            draw_primitive(&mut ctx, p);
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.render_to_pixmap(&mut pixmap);
        let data = pixmap.data_as_u8_slice().to_vec();
        self.ctx = Some(ctx);

        Ok(FrameRgba {
            width: u32::from(width),
            height: u32::from(height),
            data,
        })
    }
}

/// Output surface size for a logical canvas at `scale`.
pub(crate) fn output_size(canvas: (u32, u32), scale: f64) -> GridtraceResult<(u16, u16)> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(GridtraceError::render(format!(
            "render scale must be a positive finite number, got {scale}"
        )));
    }
    Ok((
        surface_side(canvas.0, scale, "width")?,
        surface_side(canvas.1, scale, "height")?,
    ))
}

fn surface_side(logical: u32, scale: f64, what: &str) -> GridtraceResult<u16> {
    let px = (f64::from(logical) * scale).ceil().max(1.0);
    if px > f64::from(u16::MAX) {
        return Err(GridtraceError::render(format!(
            "output {what} {px} exceeds {}",
            u16::MAX
        )));
    }
    Ok(px as u16)
}

fn draw_primitive(ctx: &mut vello_cpu::RenderContext, p: &DrawPrimitive) {
    match p {
        DrawPrimitive::Circle {
            center,
            radius,
            alpha,
            color,
        } => fill_circle(ctx, *center, *radius, *color, *alpha),
        DrawPrimitive::Stroke {
            points,
            width,
            alpha,
            color,
            pen_tip,
        } => {
            match points.as_slice() {
                [] => {}
                [only] => fill_circle(ctx, *only, width / 2.0, *color, *alpha),
                [first, rest @ ..] => {
                    let mut line = BezPath::new();
                    line.move_to(*first);
                    for p in rest {
                        line.line_to(*p);
                    }
                    let style = Stroke::new(*width)
                        .with_caps(Cap::Round)
                        .with_join(Join::Round);
                    let outline = kurbo::stroke(
                        line.elements().iter().copied(),
                        &style,
                        &StrokeOpts::default(),
                        TOLERANCE,
                    );
                    fill_path(ctx, &outline, *color, *alpha);
                }
            }
            if let Some(tip) = pen_tip {
                draw_pen_tip(ctx, tip, *color, *alpha);
            }
        }
    }
}

fn draw_pen_tip(ctx: &mut vello_cpu::RenderContext, tip: &PenTip, color: Rgba8, alpha: f64) {
    fill_circle(
        ctx,
        tip.center,
        tip.radius * HALO_RADIUS_SCALE,
        color,
        alpha * HALO_ALPHA,
    );
    fill_circle(ctx, tip.center, tip.radius, color, alpha);
}

fn fill_circle(
    ctx: &mut vello_cpu::RenderContext,
    center: Point,
    radius: f64,
    color: Rgba8,
    alpha: f64,
) {
    if radius.is_nan() || radius <= 0.0 {
        return;
    }
    let path = Circle::new(center, radius).to_path(TOLERANCE);
    fill_path(ctx, &path, color, alpha);
}

fn fill_path(ctx: &mut vello_cpu::RenderContext, path: &BezPath, color: Rgba8, alpha: f64) {
    let c = color.with_opacity(alpha);
    if c.a == 0 {
        return;
    }
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
    ctx.fill_path(&bezpath_to_cpu(path));
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    let pt = |p: Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
