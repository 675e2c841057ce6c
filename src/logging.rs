use std::{fs::File, path::Path, sync::Mutex};

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub const INSTALLER_LOG: &str = "/tmp/arch-installer.log";
pub const CONFIGURE_LOG: &str = "/tmp/arch-configure.log";

/// Sends `tracing` events to `log_file` so they never interleave with the
/// interactive terminal. `RUST_LOG` overrides the default `info` filter.
/// Falls back to stderr at `warn` when the file cannot be created.
pub fn init(log_file: &Path) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match File::create(log_file) {
        Ok(file) => {
            let installed = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false)
                .try_init();
            if installed.is_ok() {
                info!(version = env!("CARGO_PKG_VERSION"), "logging started");
            }
        }
        Err(err) => {
            let installed = tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::new("warn"))
                .with_writer(std::io::stderr)
                .try_init();
            if installed.is_ok() {
                warn!(path = %log_file.display(), %err, "cannot open log file");
            }
        }
    }
}
