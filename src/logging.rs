use std::io;

/// Initialize the global subscriber. Logs go to stderr so `ask`, `math` and
/// `quiz` can print clean JSON on stdout.
pub fn setup_logging(verbose_level: u8) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        // Use RUST_LOG if set
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        tracing_subscriber::EnvFilter::new(default_filter(verbose_level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .with_writer(io::stderr)
        .init();
}

// Map verbosity count to filters
fn default_filter(verbose_level: u8) -> &'static str {
    match verbose_level {
        0 => "warn,tutor_router=info",
        1 => "info,tutor_router=debug",
        _ => "debug,tutor_router=trace",
    }
}
