//! postclean - turns exported blog posts into dated, static-site-ready markdown.

mod cli;
mod config;
mod logger;
mod transform;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands, clean::clean_posts, show::show_post};
use config::CleanerConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    match &cli.command {
        Commands::Clean { args } => {
            let config = CleanerConfig::load(&cli.config, args)?;
            if let Some(path) = &config.config_path {
                debug!("config"; "using {}", path.display());
            }
            clean_posts(&config).map(|_| ())
        }
        Commands::Show { file, verbose } => show_post(file, *verbose),
    }
}
