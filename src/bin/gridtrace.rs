use std::{
    io::Write as _,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "gridtrace", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print what is visible at a playhead position as JSON.
    Resolve(ResolveArgs),
    /// Render a single playhead position as a PNG.
    Frame(FrameArgs),
    /// Render the whole timeline as a numbered PNG sequence.
    Sequence(SequenceArgs),
}

#[derive(Parser, Debug)]
struct ResolveArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame index (0-based).
    #[arg(long, default_value_t = 0)]
    frame: usize,

    /// Elapsed time within the frame, in milliseconds.
    #[arg(long, default_value_t = 0.0)]
    time: f64,

    /// Emit pixel-space draw primitives instead of the evaluated frame.
    #[arg(long)]
    primitives: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame index (0-based).
    #[arg(long, default_value_t = 0)]
    frame: usize,

    /// Elapsed time within the frame, in milliseconds.
    #[arg(long, default_value_t = 0.0)]
    time: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    raster: RasterArgs,
}

#[derive(Parser, Debug)]
struct SequenceArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory receiving `frame_NNNNN.png` files.
    #[arg(long)]
    out_dir: PathBuf,

    /// Sampling rate.
    #[arg(long, default_value_t = 30.0)]
    fps: f64,

    /// Render frames on a rayon thread pool.
    #[arg(long)]
    parallel: bool,

    /// Worker thread count for `--parallel`.
    #[arg(long, env = "GRIDTRACE_THREADS")]
    threads: Option<usize>,

    #[command(flatten)]
    raster: RasterArgs,
}

#[derive(clap::Args, Debug)]
struct RasterArgs {
    /// Uniform pixel scale.
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Clear color; defaults to the project's style background.
    #[arg(long)]
    background: Option<String>,

    /// Leave the canvas transparent.
    #[arg(long, conflicts_with = "background")]
    transparent: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Resolve(args) => cmd_resolve(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Sequence(args) => cmd_sequence(args),
    }
}

fn read_project(path: &Path) -> anyhow::Result<gridtrace::Project> {
    let (project, report) = std::fs::File::open(path)
        .map_err(anyhow::Error::from)
        .and_then(|f| {
            gridtrace::Project::from_reader_with_report(std::io::BufReader::new(f))
                .map_err(anyhow::Error::from)
        })
        .with_context(|| format!("load project '{}'", path.display()))?;
    if !report.is_clean() {
        tracing::warn!(?report, "project was sanitized");
    }
    Ok(project)
}

fn render_opts(
    session: &mut gridtrace::RenderSession,
    args: &RasterArgs,
) -> anyhow::Result<gridtrace::CpuRenderOpts> {
    let background = if args.transparent {
        None
    } else {
        match &args.background {
            Some(raw) => Some(
                gridtrace::parse_color(raw)
                    .with_context(|| format!("invalid --background color '{raw}'"))?,
            ),
            None => session.style_background(),
        }
    };
    Ok(gridtrace::CpuRenderOpts {
        scale: args.scale,
        background,
    })
}

fn cmd_resolve(args: ResolveArgs) -> anyhow::Result<()> {
    let project = read_project(&args.in_path)?;
    let mut session =
        gridtrace::RenderSession::new(project, gridtrace::RenderSessionOpts::default());
    let cursor = gridtrace::Cursor::new(args.frame, args.time);

    let json = session.dump_json(cursor, args.primitives)?;

    let mut out = std::io::stdout().lock();
    writeln!(out, "{json}").context("write stdout")?;
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let project = read_project(&args.in_path)?;
    let mut session =
        gridtrace::RenderSession::new(project, gridtrace::RenderSessionOpts::default());
    let opts = render_opts(&mut session, &args.raster)?;

    let frame = session.render_frame(gridtrace::Cursor::new(args.frame, args.time), opts)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    gridtrace::write_png(&args.out, &frame)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_sequence(args: SequenceArgs) -> anyhow::Result<()> {
    let project = read_project(&args.in_path)?;
    let mut session = gridtrace::RenderSession::new(
        project,
        gridtrace::RenderSessionOpts {
            fps: args.fps,
            parallel: args.parallel,
            threads: args.threads,
            ..gridtrace::RenderSessionOpts::default()
        },
    );
    let opts = render_opts(&mut session, &args.raster)?;

    let mut sink = gridtrace::PngSequenceSink::new(&args.out_dir);
    let stats = session.render_sequence(opts, &mut sink)?;

    eprintln!(
        "wrote {} frames to {}",
        stats.frames_total,
        args.out_dir.display()
    );
    Ok(())
}
