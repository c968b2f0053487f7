use std::io;

use tracing_subscriber::EnvFilter;

/// Workspace crates whose log output follows the CLI verbosity.
const WORKSPACE_CRATES: &[&str] = &[
    "hyetos",
    "hyetos_catalog",
    "hyetos_climatology",
    "hyetos_exec",
    "hyetos_grid",
    "hyetos_hist",
    "hyetos_time",
];

/// Maps `-v` counts onto a level directive (warn, info, debug, trace).
fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Builds a filter opening the workspace crates at `level` while holding
/// dependencies at warn.
fn workspace_filter(level: &str) -> String {
    let mut filter = String::from("warn");
    for krate in WORKSPACE_CRATES {
        filter.push(',');
        filter.push_str(krate);
        filter.push('=');
        filter.push_str(level);
    }
    filter
}

/// Initialize tracing from the CLI verbosity count.
///
/// `RUST_LOG` overrides the flag when set. Logs go to stderr so piped
/// output stays clean.
pub fn init(verbosity: u8) {
    let fallback = workspace_filter(level_for(verbosity));
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}
