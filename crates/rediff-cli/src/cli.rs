use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "rediff",
    about = "rediff: character and line diffs, patch creation and fuzzy patch application",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Character-level diff of two files
    Chars(PairArgs),
    /// Line-level diff of two files
    Lines(PairArgs),
    /// Write a patch turning OLD into NEW
    MakePatch(MakePatchArgs),
    /// Apply a patch to a file
    Apply(ApplyArgs),
}

#[derive(Args)]
pub struct PairArgs {
    pub old: PathBuf,
    pub new: PathBuf,
}

#[derive(Args)]
pub struct MakePatchArgs {
    pub old: PathBuf,
    pub new: PathBuf,
    /// Write the patch here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ApplyArgs {
    pub file: PathBuf,
    pub patch: PathBuf,
    /// Write the patched text here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
