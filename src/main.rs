use anyhow::{Context, Result};
use clap::Parser;
use forward_shading::app::{print_layouts, run_cli};
use forward_shading::io::config::Config;
use log::info;
use std::path::PathBuf;

/// Headless forward renderer with directional-light shadows.
#[derive(Parser, Debug)]
#[command(name = "forward-shading", version)]
struct Cli {
    /// Scene configuration file (TOML). Built-in defaults when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output image path, overrides `render.output`.
    #[arg(short, long, value_name = "FILE")]
    output: Option<String>,

    /// Log the binding layout of each pipeline variant before rendering.
    #[arg(long)]
    print_layout: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading config: {}", path.display());
            Config::load(path).with_context(|| format!("could not load {}", path.display()))?
        }
        None => {
            info!("Using default config");
            Config::default()
        }
    };

    if let Some(output) = cli.output {
        config.render.output = output;
    }

    if cli.print_layout {
        print_layouts(&config);
    }

    run_cli(&config)
}
