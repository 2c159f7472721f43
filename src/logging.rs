use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initializes the process-wide `tracing` subscriber once, the way
/// `ferrex-server`'s `main` does it: an `EnvFilter` built from `directive`
/// (itself already resolved from `RUST_LOG`/`log.filter` by
/// `helion-config`), plus a plain formatting layer.
///
/// The core crates never call this — they only emit `tracing` events — so a
/// library embedding `helion-core` directly is free to install its own
/// subscriber instead.
pub fn init(directive: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_new(directive)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
