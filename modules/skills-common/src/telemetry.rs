use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Logs go to stderr; stdout carries only
/// JSON records. Level comes from `RUST_LOG` (default `error`), and
/// `LOG_FORMAT=json` switches to structured output.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = if std::env::var("LOG_FORMAT").is_ok_and(|v| v == "json") {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if let Err(e) = result {
        eprintln!("warning: tracing already initialized: {e}");
    }
}
