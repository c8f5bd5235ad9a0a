use rayon::prelude::*;

use crate::{
    encode::sink::{FrameSink, SinkConfig},
    eval::evaluator::{EvaluatedFrame, Evaluator},
    eval::timeline::Cursor,
    foundation::core::Rgba8,
    foundation::error::{GridtraceError, GridtraceResult},
    model::project::Project,
    palette::color::ColorCache,
    playback::controller::cursor_at,
    render::cpu::{CpuRenderOpts, CpuRenderer, FrameRgba, output_size},
    render::primitives::{DrawPrimitive, compile_primitives},
};

/// Options controlling [`RenderSession::render_sequence`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderSessionOpts {
    /// Sampling rate of the rendered sequence.
    pub fps: f64,
    /// Enable frame-level parallelism (rayon), using a dedicated thread pool.
    pub parallel: bool,
    /// Frames rendered per parallel batch before they are handed to the sink.
    pub chunk_size: usize,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
}

impl Default for RenderSessionOpts {
    fn default() -> Self {
        Self {
            fps: 30.0,
            parallel: false,
            chunk_size: 64,
            threads: None,
        }
    }
}

/// Sequence render statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames pushed to the sink.
    pub frames_total: u64,
    /// Frames rendered on worker threads.
    pub frames_parallel: u64,
}

/// Owns a validated project together with its per-session color cache.
///
/// Every entry point is a pure function of the project and the cursor; the session only
/// exists so palette parsing is memoized across calls without global state.
pub struct RenderSession {
    project: Project,
    colors: ColorCache,
    opts: RenderSessionOpts,
}

impl RenderSession {
    /// Start a session over `project`.
    pub fn new(project: Project, opts: RenderSessionOpts) -> Self {
        Self {
            project,
            colors: ColorCache::new(),
            opts,
        }
    }

    /// The project being rendered.
    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Logical canvas size in pixels.
    pub fn canvas_px(&self) -> (u32, u32) {
        self.project.grid.canvas_px()
    }

    /// The project's background color, if its style string parses.
    pub fn style_background(&mut self) -> Option<Rgba8> {
        self.colors.parse(&self.project.style.background)
    }

    /// Resolve what is visible at `cursor`.
    pub fn eval(&mut self, cursor: Cursor) -> EvaluatedFrame {
        Evaluator::eval(&self.project, cursor, &mut self.colors)
    }

    /// Pixel-space primitives at `cursor`.
    pub fn primitives(&mut self, cursor: Cursor) -> Vec<DrawPrimitive> {
        let eval = self.eval(cursor);
        compile_primitives(&eval, &self.project)
    }

    /// Pretty JSON of [`RenderSession::eval`], or of the pixel-space primitives when
    /// `primitives` is set.
    pub fn dump_json(&mut self, cursor: Cursor, primitives: bool) -> GridtraceResult<String> {
        let json = if primitives {
            serde_json::to_string_pretty(&self.primitives(cursor))
        } else {
            serde_json::to_string_pretty(&self.eval(cursor))
        };
        json.map_err(|e| GridtraceError::serde(format!("serialize frame at {cursor:?}: {e}")))
    }

    /// Render a single frame with the CPU backend.
    #[tracing::instrument(skip(self))]
    pub fn render_frame(
        &mut self,
        cursor: Cursor,
        render_opts: CpuRenderOpts,
    ) -> GridtraceResult<FrameRgba> {
        let prims = self.primitives(cursor);
        CpuRenderer::new(render_opts).render(self.canvas_px(), &prims)
    }

    /// Number of frames [`RenderSession::render_sequence`] produces at the session fps.
    pub fn frame_count(&self) -> GridtraceResult<u64> {
        let fps = self.opts.fps;
        if !fps.is_finite() || fps <= 0.0 {
            return Err(GridtraceError::validation(format!(
                "fps must be a positive finite number, got {fps}"
            )));
        }
        let frames = (self.project.total_duration_ms() * fps / 1000.0).ceil();
        Ok(frames.max(1.0) as u64)
    }

    /// Sample the whole timeline at the session fps and stream frames into `sink`.
    ///
    /// Frame `k` shows sequence time `k / fps`. The sink always receives frames in index
    /// order; with `parallel` enabled each chunk is rendered on a dedicated rayon pool first.
    #[tracing::instrument(skip(self, sink))]
    pub fn render_sequence(
        &mut self,
        render_opts: CpuRenderOpts,
        sink: &mut dyn FrameSink,
    ) -> GridtraceResult<RenderStats> {
        let frame_count = self.frame_count()?;
        let step_ms = 1000.0 / self.opts.fps;
        let (canvas_w, canvas_h) = self.canvas_px();
        let (out_w, out_h) = output_size((canvas_w, canvas_h), render_opts.scale)?;

        sink.begin(SinkConfig {
            width: u32::from(out_w),
            height: u32::from(out_h),
            fps: self.opts.fps,
            frame_count,
        })?;

        let mut stats = RenderStats::default();
        if self.opts.parallel {
            let pool = build_thread_pool(self.opts.threads)?;
            let chunk = self.opts.chunk_size.max(1) as u64;
            let project = &self.project;
            let mut start = 0u64;
            while start < frame_count {
                let end = (start + chunk).min(frame_count);
                let rendered: Vec<GridtraceResult<FrameRgba>> = pool.install(|| {
                    (start..end)
                        .into_par_iter()
                        .map_init(
                            || (ColorCache::new(), CpuRenderer::new(render_opts)),
                            |(colors, renderer), k| {
                                let cursor = cursor_at(&project.frames, k as f64 * step_ms);
                                let eval = Evaluator::eval(project, cursor, colors);
                                let prims = compile_primitives(&eval, project);
                                renderer.render((canvas_w, canvas_h), &prims)
                            },
                        )
                        .collect()
                });
                for (k, frame) in (start..end).zip(rendered) {
                    sink.push_frame(k, &frame?)?;
                    stats.frames_total += 1;
                    stats.frames_parallel += 1;
                }
                start = end;
            }
        } else {
            let mut renderer = CpuRenderer::new(render_opts);
            for k in 0..frame_count {
                let cursor = cursor_at(&self.project.frames, k as f64 * step_ms);
                let prims = self.primitives(cursor);
                let frame = renderer.render((canvas_w, canvas_h), &prims)?;
                sink.push_frame(k, &frame)?;
                stats.frames_total += 1;
            }
        }

        sink.end()?;
        tracing::debug!(frames = stats.frames_total, "sequence rendered");
        Ok(stats)
    }
}

fn build_thread_pool(threads: Option<usize>) -> GridtraceResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(GridtraceError::validation(
            "render_sequence 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| GridtraceError::render(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/session/render_session.rs"]
mod tests;
