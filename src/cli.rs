use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tempfetch")]
#[command(version)]
#[command(about = "Fetch temporary files only when another resource needs them", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show resources in apply order and which downloads are needed
    Plan(PlanArgs),

    /// Converge the resources in a manifest
    Apply(ApplyArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct PlanArgs {
    /// Manifest file (.toml or .json)
    pub manifest: PathBuf,
}

#[derive(Args)]
pub struct ApplyArgs {
    /// Manifest file (.toml or .json)
    pub manifest: PathBuf,

    /// Show what would change without applying
    #[arg(long)]
    pub dry_run: bool,

    /// Resources to apply concurrently within a level (default: from config)
    #[arg(short, long, env = "TEMPFETCH_JOBS")]
    pub jobs: Option<usize>,

    /// Don't ask for confirmation
    #[arg(short, long)]
    pub yes: bool,
}
