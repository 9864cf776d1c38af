//! Logging setup shared by the binaries.

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence. Otherwise the binary and the Kairo crates log at
/// `default_level`, together with `tower_http` request traces.
/// Output goes to stderr so a CLI can keep stdout for chat lines.
pub fn setup_logger(bin_name: &str, default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let bin_target = bin_name.replace('-', "_");
        EnvFilter::new(format!(
            "{bin_target}={default_level},kairo_server={default_level},kairo_client={default_level},kairo_shared={default_level},tower_http={default_level}"
        ))
    });

    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("logger already initialized: {e}");
    }
}
