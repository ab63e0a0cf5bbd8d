use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Log to stderr, keeping stdout for the sync summary.
///
/// `RUST_LOG` takes precedence over `verbose`.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

/// Warnings only, except the one line per remote call, which is always kept.
fn default_directives(verbose: bool) -> String {
    if verbose {
        "ttsync=debug,ttsync_core=debug,ttsync_provider_google=debug".to_string()
    } else {
        "ttsync=warn,ttsync_core=warn,ttsync_core::sync=info,ttsync_provider_google=warn"
            .to_string()
    }
}
