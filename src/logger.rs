use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Level selected by the `--quiet` / `--verbose` flags.
pub fn level_for(quiet: bool, verbose: bool) -> Level {
    if quiet {
        Level::WARN
    } else if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

/// Install the global fmt subscriber. `RUST_LOG` takes precedence over the flags.
pub fn init(quiet: bool, verbose: bool) {
    let level = level_for(quiet, verbose);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    // A second init (e.g. in tests) is not an error worth surfacing.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
