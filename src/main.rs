mod cli;
mod climatology_cmd;
mod config;
mod convert;
mod joint_cmd;
mod logging;
mod output;

use std::process;

use clap::Parser;

use crate::cli::{Cli, Command};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let outcome = match cli.command {
        Command::Joint(args) => joint_cmd::run(args),
        Command::Climatology(args) => climatology_cmd::run(args),
    };
    if let Err(e) = outcome {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
