use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    time::{Duration, Instant},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use jiggle::Surface as _;

#[derive(Parser, Debug)]
#[command(name = "jiggle", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single animation frame as a PNG.
    Frame(FrameArgs),
    /// Export the animation as a video (requires `ffmpeg` on PATH).
    Export(ExportArgs),
    /// Replay a script and print the resulting stroke set as JSON.
    Vectorize(VectorizeArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input sketch script JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Animation time in seconds.
    #[arg(long, default_value_t = 0.0)]
    time: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input sketch script JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory receiving the exported file.
    #[arg(long)]
    out_dir: PathBuf,

    /// Bitrate tier; overrides the script config.
    #[arg(long, value_enum)]
    quality: Option<jiggle::ExportQuality>,

    /// Clip length in seconds; overrides the script config.
    #[arg(long)]
    duration: Option<u32>,

    /// Frame rate; overrides the script config.
    #[arg(long)]
    fps: Option<u32>,
}

#[derive(Parser, Debug)]
struct VectorizeArgs {
    /// Input sketch script JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output JSON path. Prints to stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args).map(|()| ExitCode::SUCCESS),
        Command::Export(args) => cmd_export(args),
        Command::Vectorize(args) => cmd_vectorize(args).map(|()| ExitCode::SUCCESS),
    }
}

fn load_sketch(path: &Path) -> anyhow::Result<jiggle::Sketch> {
    let script = jiggle::SketchScript::load(path)?;
    let sketch =
        jiggle::replay(&script).with_context(|| format!("replay script '{}'", path.display()))?;
    Ok(sketch)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        args.time.is_finite() && args.time >= 0.0,
        "--time must be finite and >= 0"
    );
    let sketch = load_sketch(&args.in_path)?;

    let mut surface = jiggle::CpuSurface::new(sketch.canvas())?;
    jiggle::render_scene(
        &mut surface,
        sketch.strokes(),
        None,
        args.time,
        sketch.params(),
        sketch.background(),
    );
    let mut frame = surface.read_frame()?;
    frame.unpremultiply();

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

/// Failures the notifier has already printed end in `ExitCode::FAILURE` rather than an error.
fn cmd_export(args: ExportArgs) -> anyhow::Result<ExitCode> {
    let mut sketch = load_sketch(&args.in_path)?;
    {
        let settings = sketch.export_settings_mut();
        if let Some(q) = args.quality {
            settings.quality = q;
        }
        if let Some(d) = args.duration {
            settings.duration_secs = d;
        }
        if let Some(f) = args.fps {
            settings.fps = f;
        }
    }

    let runtime = jiggle::FfmpegRuntime::probe(sketch.background());
    let mut notifier = jiggle::StderrNotifier;
    let mut sink = jiggle::FileExportSink::new(args.out_dir.clone());

    if sketch
        .start_export(&runtime, Instant::now(), &mut notifier)
        .is_err()
    {
        return Ok(ExitCode::FAILURE);
    }
    loop {
        match sketch.pump_export(Instant::now(), &mut sink, &mut notifier) {
            jiggle::ExportStatus::Waiting => std::thread::sleep(Duration::from_millis(5)),
            jiggle::ExportStatus::Rendering { rendered, total } => {
                if rendered % 30 == 0 {
                    tracing::info!(rendered, total, "exporting");
                }
            }
            jiggle::ExportStatus::Completed { filename, frames } => {
                eprintln!(
                    "wrote {} ({frames} frames)",
                    args.out_dir.join(filename).display()
                );
                return Ok(ExitCode::SUCCESS);
            }
            jiggle::ExportStatus::Failed { .. } => return Ok(ExitCode::FAILURE),
            jiggle::ExportStatus::Idle => anyhow::bail!("export stopped unexpectedly"),
        }
    }
}

fn cmd_vectorize(args: VectorizeArgs) -> anyhow::Result<()> {
    let sketch = load_sketch(&args.in_path)?;
    let json =
        serde_json::to_string_pretty(sketch.strokes()).context("serialize stroke set JSON")?;

    match args.out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            std::fs::write(&path, json)
                .with_context(|| format!("write strokes '{}'", path.display()))?;
            eprintln!(
                "wrote {} ({} strokes)",
                path.display(),
                sketch.strokes().len()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}
