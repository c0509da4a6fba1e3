mod logging;

use clap::{Parser, Subcommand};
use photo_collage::collage::{self, CollageOptions};
use photo_collage::config::{self, CollageConfig};
use photo_collage::imaging::RustBackend;
use photo_collage::output;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "photo-collage")]
#[command(about = "Arrange a folder of photos into a single framed grid image")]
#[command(long_about = "\
Arrange a folder of photos into a single framed grid image

Every JPEG and PNG under FOLDER is collected, recursively. HEIC, HEIF and AVIF
files are converted to a JPEG next to the original first. Images are placed
in path order into a grid of at most 3x3 cells:

  1-4 images    2x2
  5-6 images    3x2
  7+ images     3x3 (images past the ninth are left out)

Each image is resized to the cell size and drawn with a dark blue border,
on a transparent canvas with a gap of frame-width pixels between cells.

Settings are read from FOLDER/collage.toml when present. Run
'photo-collage gen-config' to print a documented example.")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

/// Flags shared by commands that plan a layout.
#[derive(clap::Args, Clone)]
struct LayoutArgs {
    /// Folder to scan for images
    #[arg(default_value = ".")]
    folder: PathBuf,

    /// Config file to use instead of FOLDER/collage.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Cell size before scaling, e.g. 300x300
    #[arg(long, value_parser = parse_size)]
    base_size: Option<[u32; 2]>,

    /// Cell size multiplier
    #[arg(long)]
    scale: Option<f64>,

    /// Gap between cells and around the edge, in pixels
    #[arg(long)]
    frame_width: Option<u32>,

    /// Border drawn around each image, in pixels
    #[arg(long)]
    border_size: Option<u32>,
}

#[derive(Subcommand)]
enum Command {
    /// Collect images and write the collage
    Build {
        #[command(flatten)]
        layout: LayoutArgs,

        /// Path of the PNG to write
        #[arg(short, long, default_value = "output_collage.png")]
        output: PathBuf,
    },
    /// Collect images and show the planned layout without writing a collage
    Scan {
        #[command(flatten)]
        layout: LayoutArgs,
    },
    /// Print a stock collage.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json_logs);

    match cli.command {
        Command::Build {
            layout,
            output: output_path,
        } => {
            let config = resolve_config(&layout)?;
            let options = CollageOptions::from_config(&layout.folder, output_path, &config);
            let backend = RustBackend::new();

            println!("==> Collecting images from {}", layout.folder.display());
            let report = collage::create_collage(&backend, &options)?;
            output::print_collect_output(&report.survey, &layout.folder);
            output::print_layout_output(&report.survey.plan);
            output::print_compose_output(&report.composition, &layout.folder);
        }
        Command::Scan { layout } => {
            let config = resolve_config(&layout)?;
            let options = CollageOptions::from_config(&layout.folder, "", &config);
            let backend = RustBackend::new();

            println!("==> Collecting images from {}", layout.folder.display());
            let survey = collage::survey(&backend, &options)?;
            output::print_collect_output(&survey, &layout.folder);
            output::print_layout_output(&survey.plan);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the config file, then apply command-line overrides and re-validate.
fn resolve_config(args: &LayoutArgs) -> Result<CollageConfig, config::ConfigError> {
    let mut config = match &args.config {
        Some(path) => config::load_config_file(path)?,
        None => config::load_config(&args.folder)?,
    };
    if let Some(size) = args.base_size {
        config.layout.base_image_size = size;
    }
    if let Some(scale) = args.scale {
        config.layout.scale_factor = scale;
    }
    if let Some(frame) = args.frame_width {
        config.layout.frame_width = frame;
    }
    if let Some(border) = args.border_size {
        config.layout.border_size = border;
    }
    config.validate()?;
    Ok(config)
}

/// Parse `WIDTHxHEIGHT`, e.g. `300x200`.
fn parse_size(s: &str) -> Result<[u32; 2], String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid dimension '{v}': {e}"))
    };
    Ok([parse(w)?, parse(h)?])
}
