//! Log output for the `ddsgen` binary

use tracing_subscriber::EnvFilter;

/// Level used when `RUST_LOG` is not set.
pub fn default_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "warn";
    }
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber, writing to stderr. `RUST_LOG` takes
/// precedence over the command-line verbosity.
pub fn init_logging(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose, quiet)));

    // Ignore the error if a subscriber is already installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use test_case::test_case;

    #[test_case(0, false, "info" ; "default")]
    #[test_case(1, false, "debug" ; "verbose")]
    #[test_case(3, false, "trace" ; "very verbose")]
    #[test_case(2, true, "warn" ; "quiet wins")]
    fn default_level___flags___pick_level(verbose: u8, quiet: bool, expected: &str) {
        assert_eq!(default_level(verbose, quiet), expected);
    }
}
