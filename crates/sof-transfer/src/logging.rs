//! Process-wide tracing setup for binaries embedding the transfer SDK.

/// Default directives applied when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info,reqwest=warn,hyper_util=warn";

/// Installs a `fmt` subscriber filtered by `RUST_LOG`.
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init_tracing() {
    if tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .try_init()
        .is_err()
    {
        // Tracing was already initialized by embedding host.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_initialization_is_tolerated() {
        init_tracing();
        init_tracing();
        tracing::info!("tracing initialized twice");
    }
}
