//! tracing subscriber setup for the binary.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is not set.
pub fn default_filter(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "multisum=warn",
        1 => "multisum=debug",
        _ => "multisum=trace",
    }
}

/// Install the global subscriber, logging to stderr.
///
/// `RUST_LOG` wins over the verbosity flags. Calling this twice is harmless.
pub fn init(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose, quiet)));

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose > 1),
        )
        .try_init();

    if let Err(e) = result {
        tracing::debug!(error = %e, "tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_wins_over_verbose() {
        assert_eq!(default_filter(2, true), "error");
    }

    #[test]
    fn verbosity_levels_map_to_filters() {
        assert_eq!(default_filter(0, false), "multisum=warn");
        assert_eq!(default_filter(1, false), "multisum=debug");
        assert_eq!(default_filter(5, false), "multisum=trace");
    }

    #[test]
    fn init_twice_does_not_panic() {
        init(0, true);
        init(1, false);
    }
}
