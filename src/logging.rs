use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. `RUST_LOG` wins over the verbosity flag.
pub fn init(verbose: bool) {
    let default_directive = if verbose { "reeltrack=debug" } else { "reeltrack=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    // a second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
