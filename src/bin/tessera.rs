use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use rand::SeedableRng as _;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tessera", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render a clip as an MP4 (requires `ffmpeg` on PATH) or a PNG sequence.
    Render(RenderArgs),
    /// List the gradient swatches of a configuration.
    Swatches(SwatchesArgs),
    /// Print the default configuration as JSON.
    Config,
}

#[derive(Parser, Debug)]
struct EngineArgs {
    /// Engine configuration JSON. Defaults apply to omitted fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// RNG seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,

    /// Override the configured blur radius (pixels).
    #[arg(long)]
    blur: Option<f64>,

    /// Viewport width in pixels.
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Viewport height in pixels.
    #[arg(long, default_value_t = 720)]
    height: u32,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    engine: EngineArgs,

    /// Time of the frame, in milliseconds since the animation started.
    #[arg(long, default_value_t = 0)]
    at_ms: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    engine: EngineArgs,

    /// Clip length in seconds.
    #[arg(long, default_value_t = 10.0)]
    seconds: f64,

    /// Frames per second.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Output MP4 path.
    #[arg(long, required_unless_present = "png_dir")]
    out: Option<PathBuf>,

    /// Write numbered PNGs into this directory instead of encoding an MP4.
    #[arg(long, conflicts_with = "out")]
    png_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct SwatchesArgs {
    /// Engine configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
        Command::Swatches(args) => cmd_swatches(args),
        Command::Config => cmd_config(),
    }
}

fn read_config(path: Option<&Path>) -> anyhow::Result<tessera::EngineConfig> {
    let Some(path) = path else {
        return Ok(tessera::EngineConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read config '{}'", path.display()))?;
    tessera::EngineConfig::from_json_str(&json)
        .with_context(|| format!("parse config '{}'", path.display()))
}

fn make_handle(args: &EngineArgs) -> anyhow::Result<tessera::EngineHandle> {
    let mut config = read_config(args.config.as_deref())?;
    if let Some(blur) = args.blur {
        config.blur_radius = blur;
    }
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let handle = tessera::EngineHandle::initialize(
        config,
        tessera::Canvas::new(args.width, args.height),
        &tessera::ShapeRegistry::default(),
        Box::new(rng),
    )?;
    Ok(handle)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut handle = make_handle(&args.engine)?;

    let mut frame = handle.on_frame(Duration::ZERO);
    if args.at_ms > 0 {
        frame = handle.on_frame(Duration::from_millis(args.at_ms));
    }
    let frame = frame.context("frame was not painted (see log output)")?;

    tessera::encode::sink::write_png(&args.out, &frame, [0, 0, 0])
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        args.seconds.is_finite() && args.seconds > 0.0,
        "--seconds must be positive"
    );
    let fps = tessera::Fps::new(args.fps, 1)?;
    let mut handle = make_handle(&args.engine)?;
    let mut source =
        tessera::FixedRateSource::for_duration(fps, Duration::from_secs_f64(args.seconds));
    let cancel = tessera::CancelToken::new();

    let (stats, written) = match (&args.png_dir, &args.out) {
        (Some(dir), _) => {
            let mut sink = tessera::PngSequenceSink::new(dir);
            let stats = tessera::run_loop(&mut handle, &mut source, &mut sink, &cancel)?;
            (stats, dir.clone())
        }
        (None, Some(out)) => {
            let out = tessera::encode::ffmpeg::mp4_path(out);
            let mut sink = tessera::FfmpegSink::new(tessera::FfmpegSinkOpts::new(&out));
            let stats = tessera::run_loop(&mut handle, &mut source, &mut sink, &cancel)?;
            (stats, out)
        }
        (None, None) => anyhow::bail!("either --out or --png-dir is required"),
    };
    handle.dispose();

    eprintln!(
        "wrote {} ({} frames, {} skipped)",
        written.display(),
        stats.frames_rendered,
        stats.frames_skipped
    );
    Ok(())
}

fn cmd_swatches(args: SwatchesArgs) -> anyhow::Result<()> {
    let config = read_config(args.config.as_deref())?;
    for swatch in &config.gradients {
        let stops: Vec<String> = swatch.stops().iter().map(|c| c.to_hex()).collect();
        println!("{}: {}", swatch.name(), stops.join(" -> "));
    }
    Ok(())
}

fn cmd_config() -> anyhow::Result<()> {
    println!("{}", tessera::EngineConfig::default().to_json_pretty()?);
    Ok(())
}
