//! Logging setup on `tracing` and `tracing-subscriber`
//!
//! Events go to stderr so command output on stdout stays clean for pipes.
//! `RUST_LOG` overrides the level chosen from the command line.

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log level for the `-v` / `-q` flags
///
/// Quiet wins over verbose. No flag gives `warn`, one `-v` gives `debug`
/// and two give `trace`.
pub fn level_for(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // Other crates never go below warn
        let base = if level == Level::ERROR { "error" } else { "warn" };
        let level = level.as_str().to_lowercase();
        EnvFilter::new(format!("{base},partstracker={level},ptrack={level}"))
    })
}

/// Install the global subscriber; later calls are ignored
pub fn init(verbose: u8, quiet: bool) {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    let _ = tracing_subscriber::registry()
        .with(build_env_filter(level_for(verbose, quiet)))
        .with(layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_flags() {
        assert_eq!(level_for(0, false), Level::WARN);
        assert_eq!(level_for(1, false), Level::DEBUG);
        assert_eq!(level_for(3, false), Level::TRACE);
        assert_eq!(level_for(2, true), Level::ERROR);
    }
}
