use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber once, at process entry.
///
/// The run summary and error lines are the only operator feedback a cron
/// invocation gets, so the default level is info. `RUST_LOG` overrides the
/// verbosity flag entirely.
pub fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "taograb=info",
        1 => "taograb=debug",
        _ => "taograb=trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
