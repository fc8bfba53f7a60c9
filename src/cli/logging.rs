//! Tracing subscriber setup for the binary

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs a stderr subscriber filtered by `RUST_LOG`, defaulting to
/// `warn` (or `debug` in verbose mode). Does nothing if a subscriber is
/// already installed.
pub fn init(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_is_harmless() {
        init(false);
        init(true);
        tracing::debug!("logging initialized");
    }
}
