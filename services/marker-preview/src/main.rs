//! Marker preview tool.
//!
//! Renders single markers and transition frame sequences to PNG, and plays
//! transitions against an in-memory map surface to show the instance
//! choreography in the logs.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use commands::{RenderArgs, TransitionArgs};
use marker_common::MarkerConfig;

#[derive(Parser, Debug)]
#[command(name = "marker-preview")]
#[command(about = "Render map markers and marker transitions to PNG")]
struct Args {
    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// YAML or JSON configuration file
    #[arg(long, env = "MARKER_CONFIG")]
    config: Option<PathBuf>,

    /// TrueType font for label text (overrides the config file)
    #[arg(long, env = "MARKER_FONT")]
    font: Option<PathBuf>,

    /// Display density (pixels per dp)
    #[arg(long, default_value = "2.0")]
    density: f32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one marker to a PNG file
    Render(RenderArgs),
    /// Render transition frames and simulate the transition
    Transition(TransitionArgs),
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn init_tracing(level: Level, json: bool) -> Result<()> {
    let builder = FmtSubscriber::builder().with_max_level(level);
    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn load_config(args: &Args) -> Result<MarkerConfig> {
    let mut config = match &args.config {
        Some(path) => MarkerConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => MarkerConfig::default(),
    };
    if let Some(font) = &args.font {
        config.font_path = Some(font.clone());
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(parse_level(&args.log_level), args.json_logs)?;

    let config = load_config(&args)?;
    info!(
        density = args.density,
        font = ?config.font_path,
        cache_mb = config.cache.max_bytes() / (1024 * 1024),
        "Starting marker preview"
    );

    match &args.command {
        Command::Render(render) => commands::render(&config, args.density, render),
        Command::Transition(transition) => commands::transition(&config, args.density, transition),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("nonsense"), Level::INFO);
    }

    #[test]
    fn test_args_parse_render() {
        let args = Args::try_parse_from([
            "marker-preview",
            "--density",
            "3",
            "render",
            "--label",
            "R$ 420",
            "--pointer",
            "--out",
            "m.png",
        ])
        .unwrap();
        assert_eq!(args.density, 3.0);
        match args.command {
            Command::Render(render) => {
                assert_eq!(render.spec.label, "R$ 420");
                assert!(render.spec.pointer);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
