use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a filter directive, e.g. `astrocorpus_source=debug`.
pub const LOG_ENV: &str = "ASTROCORPUS_LOG";

/// Install a process-wide fmt subscriber.
///
/// `ASTROCORPUS_LOG` takes precedence over `default_level`. Returns `false`
/// when a global subscriber was already set; the existing one is kept.
pub fn init_logging(default_level: &str) -> bool {
    let fallback = parse_level(default_level);
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(fallback.as_str().to_ascii_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

/// Parse a level name case-insensitively; anything unrecognized is `INFO`.
pub fn parse_level(level: &str) -> Level {
    level.trim().parse().unwrap_or(Level::INFO)
}
