use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

/// Diagnostics settings. Stdout carries only the status line, so all of this
/// applies to stderr.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub verbosity: u8,
    pub use_color: bool,
}

pub fn detect_color(color_flag: bool) -> bool {
    if !color_flag {
        return false;
    }
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    std::io::stderr().is_terminal()
}

fn default_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the stderr log subscriber. `RUST_LOG` overrides `-v`.
pub fn init_logging(opts: &OutputOptions) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(opts.verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(opts.use_color)
        .with_writer(std::io::stderr)
        .init();
}
