//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Clean exported blog posts into dated, static-site-ready markdown
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: postclean.toml)
    #[arg(short = 'C', long, global = true, default_value = "postclean.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Clean every markdown post of the input directory
    #[command(visible_alias = "c")]
    Clean {
        #[command(flatten)]
        args: CleanArgs,
    },

    /// Print the cleaned form of a single post without writing anything
    #[command(visible_alias = "s")]
    Show {
        /// Post to clean
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,

        /// Output verbose debug logs
        #[arg(short, long)]
        verbose: bool,
    },
}

/// Arguments of the clean command
#[derive(clap::Args, Debug, Clone, Default)]
pub struct CleanArgs {
    /// Input directory holding the exported `*.md` posts
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub input: Option<PathBuf>,

    /// Output directory for cleaned posts (created if missing)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Report posts with broken metadata and continue instead of stopping
    #[arg(short, long)]
    pub keep_going: bool,

    /// Clean and report without writing any file
    #[arg(long)]
    pub dry: bool,

    /// Output verbose debug logs
    #[arg(short, long)]
    pub verbose: bool,
}
