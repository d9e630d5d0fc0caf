use tracing_subscriber::EnvFilter;

/// Installs the global `fmt` subscriber, honouring `RUST_LOG` and falling
/// back to `default_filter`. Returns `false` when a subscriber was already
/// installed; calling it twice is harmless.
pub fn init_tracing(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_a_noop() {
        init_tracing("warn");
        assert!(!init_tracing("debug"));
    }
}
