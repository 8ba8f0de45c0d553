//! haldlut — apply Hald CLUT color grades from the command line.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use haldlut_core::{BackendPreference, HaldLayout};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod library;

#[derive(Parser)]
#[command(name = "haldlut")]
#[command(author, version, about = "Apply Hald CLUT color grades to images")]
#[command(long_about = "
Apply Hald CLUT color grades to images.

Examples:
  haldlut list ./luts                              # Available LUTs
  haldlut info ./luts/warm.png                     # LUT geometry
  haldlut apply photo.jpg -l warm -o out.png       # Grade with a library LUT
  haldlut apply photo.jpg -l warm.png -o out.png -s 0.6 --backend software
  haldlut backends                                 # Probe GPU availability
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// JSON engine config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Number of worker threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// List the Hald LUTs in a directory
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show the geometry of a Hald LUT image
    #[command(visible_alias = "i")]
    Info(InfoArgs),

    /// Grade an image with a Hald LUT
    #[command(visible_alias = "a")]
    Apply(ApplyArgs),

    /// Report which cube backends are available
    Backends,
}

#[derive(Args)]
pub struct ListArgs {
    /// LUT directory (default: $HALDLUT_LUT_DIR or ./luts)
    pub dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct InfoArgs {
    /// LUT file, or a name from the library
    pub lut: String,

    /// LUT library directory used to resolve names
    #[arg(long)]
    pub library: Option<PathBuf>,

    /// Cube dimension to check the image against
    #[arg(short, long)]
    pub dimension: Option<u32>,

    /// Pixel layout of the Hald image
    #[arg(long, value_enum, default_value = "tiled")]
    pub layout: LayoutArg,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ApplyArgs {
    /// Input image
    pub input: PathBuf,

    /// LUT file, or a name from the library
    #[arg(short, long)]
    pub lut: String,

    /// Output image (format from extension)
    #[arg(short, long)]
    pub output: PathBuf,

    /// LUT library directory used to resolve names
    #[arg(long)]
    pub library: Option<PathBuf>,

    /// Cube dimension (default: inferred from the LUT image)
    #[arg(short, long)]
    pub dimension: Option<u32>,

    /// Blend strength, 0.0 = original, 1.0 = fully graded
    #[arg(short, long, default_value = "1.0")]
    pub strength: f32,

    /// Cube backend: auto, software or gpu
    #[arg(short, long)]
    pub backend: Option<BackendPreference>,

    /// Keep the software path on one thread
    #[arg(long)]
    pub no_parallel: bool,

    /// Pixel layout of the Hald image
    #[arg(long, value_enum, default_value = "tiled")]
    pub layout: LayoutArg,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LayoutArg {
    /// 8×8 tiles of (r, g) pairs, b fastest
    Tiled,
    /// One row-major run, r fastest
    Linear,
}

impl From<LayoutArg> for HaldLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Tiled => HaldLayout::Tiled8x8,
            LayoutArg::Linear => HaldLayout::Linear,
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = if verbose > 0 {
        EnvFilter::new(level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::List(args) => commands::list::run(args),
        Commands::Info(args) => commands::info::run(args),
        Commands::Apply(args) => commands::apply::run(args, cli.config.as_deref()),
        Commands::Backends => commands::backends::run(),
    }
}
