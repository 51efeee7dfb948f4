use tracing_subscriber::EnvFilter;

/// Installs the stderr subscriber. `RUST_LOG` takes precedence over the
/// `--log-level` flag; a bare level like `debug` is scoped to this crate so
/// dependency chatter stays at warn.
pub fn init(log_level: &str) {
    let directives = if log_level.contains('=') || log_level.contains(',') {
        log_level.to_string()
    } else {
        format!("warn,sqlite_browser={log_level}")
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&directives))
        .unwrap_or_else(|_| EnvFilter::new("warn,sqlite_browser=info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
