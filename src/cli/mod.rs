//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod settings;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::core::config::data::path_display;
use crate::core::config::{Config, ConfigOrchestrator};
use crate::core::prefs::ConfigPreferenceStore;
use crate::core::transcript_file::load_transcript;
use crate::ui::theme::Theme;
use crate::ui::view_loop::{run_view, ViewOptions};
use crate::utils::clipboard::SystemClipboard;
use crate::utils::logging::init_file_logging;
use settings::{SetContext, SettingError, SettingRegistry};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ngit: ",
    env!("VERGEN_GIT_DESCRIBE"),
    "\nbuilt: ",
    env!("VERGEN_BUILD_TIMESTAMP"),
    "\nrustc: ",
    env!("VERGEN_RUSTC_SEMVER"),
);

/// Default delay between replayed chunks, in milliseconds.
const DEFAULT_CHUNK_MS: u64 = 40;

#[derive(Parser)]
#[command(name = "scrollfold")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "A terminal viewer for agent transcripts with per-type display state")]
#[command(
    long_about = "Scrollfold renders agent transcripts (JSON Lines, one message per line) in a \
full-screen terminal view. Display preferences are kept per message type: hide a type to \
collapse every message of it to a one-line preview, or show it at full height. Tall messages \
are otherwise limited to a scrollable window that follows new output.\n\n\
Controls:\n\
  j/k, Up/Down      Select a message\n\
  h                 Hide or show the selected message's type\n\
  f                 Toggle full height for the selected message's type\n\
  g                 Toggle fixed message height for all types\n\
  c                 Copy the selected message\n\
  [ / ]             Scroll inside a height-limited message\n\
  PgUp/PgDn         Scroll the transcript\n\
  Mouse             Click a control to use it, click a message to copy it\n\
  q, Ctrl+C         Quit\n\n\
Logging:\n\
  --log <FILE> writes diagnostics to FILE; SCROLLFOLD_LOG sets the filter (default: warn)."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Write diagnostics to the specified file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Use this config file instead of the platform default
    #[arg(short = 'c', long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Browse a transcript file
    View {
        /// JSON Lines transcript to open
        file: PathBuf,
        /// Stream messages in chunk by chunk instead of loading them at once
        #[arg(long)]
        replay: bool,
        /// Delay between replayed chunks in milliseconds
        #[arg(long, value_name = "N", default_value_t = DEFAULT_CHUNK_MS)]
        chunk_ms: u64,
    },
    /// Set configuration values, or list them when no key is given
    Set {
        /// Configuration key to set
        key: Option<String>,
        /// Value(s) to set for the key
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
        /// Message type for type-keyed settings (optional)
        value: Option<String>,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if let Some(path) = &args.log {
        init_file_logging(path)?;
    }

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(Config::default_config_path);
    let orchestrator = Arc::new(ConfigOrchestrator::new(config_path));

    match args.command {
        Commands::View {
            file,
            replay,
            chunk_ms,
        } => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(view(orchestrator, file, replay, chunk_ms))
        }
        Commands::Set { key, value } => {
            run_setting(&orchestrator, |registry, ctx| match key {
                None => {
                    print_all(registry, ctx.config, ctx.orchestrator);
                    Ok(None)
                }
                Some(key) => {
                    let handler = registry
                        .get(&key)
                        .ok_or_else(|| SettingError::UnknownKey(key.clone()))?;
                    handler.set(&value, ctx).map(Some)
                }
            });
            Ok(())
        }
        Commands::Unset { key, value } => {
            run_setting(&orchestrator, |registry, ctx| {
                let handler = registry
                    .get(&key)
                    .ok_or_else(|| SettingError::UnknownKey(key.clone()))?;
                handler.unset(value.as_deref(), ctx).map(Some)
            });
            Ok(())
        }
    }
}

async fn view(
    orchestrator: Arc<ConfigOrchestrator>,
    file: PathBuf,
    replay: bool,
    chunk_ms: u64,
) -> Result<(), Box<dyn Error>> {
    let config = orchestrator.load_with_cache()?;
    let records = load_transcript(&file)?;
    let theme = config
        .theme
        .as_deref()
        .map_or_else(Theme::dark_default, Theme::from_name);

    let options = ViewOptions {
        records,
        source: path_display(&file),
        replay,
        chunk_delay: Duration::from_millis(chunk_ms),
        theme,
        cell_height_fallback: config.cell_height(),
    };
    let store = ConfigPreferenceStore::new(orchestrator);
    run_view(store, options, &SystemClipboard).await
}

/// Run one set/unset operation, print its outcome, and exit non-zero on
/// failure.
fn run_setting<F>(orchestrator: &ConfigOrchestrator, op: F)
where
    F: FnOnce(&SettingRegistry, &SetContext<'_>) -> Result<Option<String>, SettingError>,
{
    let registry = SettingRegistry::new();
    let result = orchestrator
        .load_with_cache()
        .map_err(|e| SettingError::ConfigError(e.to_string()))
        .and_then(|config| {
            let ctx = SetContext {
                config: &config,
                orchestrator,
            };
            op(&registry, &ctx)
        });

    match result {
        Ok(Some(message)) => println!("{message}"),
        Ok(None) => {}
        Err(err) => {
            err.print();
            std::process::exit(err.exit_code());
        }
    }
}

fn print_all(registry: &SettingRegistry, config: &Config, orchestrator: &ConfigOrchestrator) {
    println!(
        "Current configuration ({}):",
        path_display(orchestrator.path())
    );
    for key in registry.keys_display_order() {
        if let Some(handler) = registry.get(key) {
            println!("{}", handler.format(config));
        }
    }
}
