// Tracing subscriber setup for the binary. The library only emits events;
// the CLI decides where they go.

use tracing_subscriber::EnvFilter;

/// Default directive when `RUST_LOG` is unset.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "background_erase=debug"
    } else {
        "warn"
    }
}

/// Install a stderr subscriber. `RUST_LOG` overrides the level chosen by
/// `-v`. Calling this twice is harmless.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
