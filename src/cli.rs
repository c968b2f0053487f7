use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Hyetos precipitation-statistics toolkit.
#[derive(Parser)]
#[command(
    name = "hyetos",
    version,
    about = "Precipitation statistics for CMIP6-style model output"
)]
pub struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// The two analysis pipelines.
#[derive(Subcommand)]
pub enum Command {
    /// Joint precipitation-temperature histogram with scaling curves.
    Joint(RunArgs),
    /// Diurnal cycle and precipitation intensity spectra.
    Climatology(RunArgs),
}

/// Arguments shared by both pipelines.
#[derive(clap::Args)]
pub struct RunArgs {
    /// Project configuration (TOML).
    #[arg(short, long, default_value = "hyetos.toml")]
    pub config: PathBuf,

    /// Write outputs here instead of the configured directory.
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,
}
