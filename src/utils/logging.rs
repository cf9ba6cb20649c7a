//! Diagnostics go to a file so the full-screen viewer is never drawn over.
//! Without `--log` nothing is installed and every `tracing` macro is a no-op.

use std::error::Error;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "SCROLLFOLD_LOG";
const DEFAULT_DIRECTIVE: &str = "warn";

/// Filter from `SCROLLFOLD_LOG` directives, `warn` when unset or invalid.
pub fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|raw| !raw.trim().is_empty())
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

pub fn init_file_logging(path: &Path) -> Result<(), Box<dyn Error>> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| format!("Failed to open log file {}: {e}", path.display()))?;

    let directives = std::env::var(LOG_ENV_VAR).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(directives.as_deref()))
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| format!("Failed to install logger: {e}"))?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "logging started");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn filter_defaults_to_warn() {
        assert_eq!(log_filter(None).to_string(), "warn");
        assert_eq!(log_filter(Some("  ")).to_string(), "warn");
    }

    #[test]
    fn filter_uses_given_directives() {
        assert_eq!(
            log_filter(Some("scrollfold=debug")).to_string(),
            "scrollfold=debug"
        );
    }

    #[test]
    fn invalid_directives_fall_back_to_warn() {
        assert_eq!(log_filter(Some("scrollfold=[")).to_string(), "warn");
    }

    #[test]
    fn unopenable_log_path_is_an_error() {
        let dir = TempDir::new().expect("temp dir");
        let err = init_file_logging(dir.path()).expect_err("directory is not a log file");
        assert!(err.to_string().contains("Failed to open log file"));
    }
}
