use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use posterframe::{
    CpuPosterRasterizer, FsMediaProvider, MediaProvider, PosterConfig, PosterExportModel,
    PosterRasterizer, fit_frame,
};

#[derive(Parser, Debug)]
#[command(name = "posterframe", version)]
struct Cli {
    /// JSON config file; defaults plus `POSTERFRAME_*` variables when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rasterize an exported layout to PNG.
    Render(RenderArgs),
    /// List media directories and videos.
    List(ListArgs),
    /// Print how a frame is letterboxed into a canvas.
    Fit(FitArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Export model JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory; overrides the config.
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ListArgs {
    /// Directory relative to a library root; roots are listed when omitted.
    #[arg(long)]
    path: Option<String>,
}

#[derive(Parser, Debug)]
struct FitArgs {
    /// Source size as WIDTHxHEIGHT.
    #[arg(long, value_parser = parse_size)]
    original: (f64, f64),

    /// Canvas size as WIDTHxHEIGHT.
    #[arg(long, value_parser = parse_size, default_value = "800x500")]
    canvas: (f64, f64),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    let cfg = match &cli.config {
        Some(path) => PosterConfig::from_path(path)?,
        None => PosterConfig::from_env()?,
    };
    match cli.cmd {
        Command::Render(args) => cmd_render(&cfg, args),
        Command::List(args) => cmd_list(&cfg, args),
        Command::Fit(args) => cmd_fit(args),
    }
}

fn cmd_render(cfg: &PosterConfig, args: RenderArgs) -> anyhow::Result<()> {
    let model = PosterExportModel::from_path(&args.in_path)
        .with_context(|| format!("load export model '{}'", args.in_path.display()))?;
    let out_dir = args.out_dir.unwrap_or_else(|| cfg.output_dir.clone());
    let provider = FsMediaProvider::new(cfg.media_options());
    let mut rasterizer = CpuPosterRasterizer::new(provider, cfg.font_library(), out_dir);
    let saved = rasterizer.render(&model)?;
    println!("{}", serde_json::to_string_pretty(&saved)?);
    Ok(())
}

fn cmd_list(cfg: &PosterConfig, args: ListArgs) -> anyhow::Result<()> {
    let provider = FsMediaProvider::new(cfg.media_options());
    let entries = provider.list_entries(args.path.as_deref())?;
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}

fn cmd_fit(args: FitArgs) -> anyhow::Result<()> {
    let (ow, oh) = args.original;
    let (cw, ch) = args.canvas;
    let info = fit_frame(ow, oh, cw, ch);
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

fn parse_size(s: &str) -> Result<(f64, f64), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got \"{s}\""))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|e| format!("bad dimension \"{v}\": {e}"))
    };
    Ok((parse(w)?, parse(h)?))
}
