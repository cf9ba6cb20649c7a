//! Settings management for CLI set/unset commands.
//!
//! Each configuration key has a [`SettingHandler`]. Two handler shapes cover
//! every key:
//!
//! - Boolean settings (e.g., `fixed-height`)
//! - Type-keyed boolean settings (e.g., `hidden tool on`, `full-height agent off`)

pub mod error;
pub mod handlers;
pub mod helpers;
pub mod registry;

pub use error::SettingError;
pub use registry::SettingRegistry;

use crate::core::config::data::Config;
use crate::core::config::ConfigOrchestrator;

/// Context provided to setting handlers during set/unset operations.
pub struct SetContext<'a> {
    pub config: &'a Config,
    pub orchestrator: &'a ConfigOrchestrator,
}

/// Trait for handling a configuration setting.
///
/// Each implementation handles a specific configuration key,
/// providing set, unset, and format operations.
pub trait SettingHandler: Send + Sync {
    /// Returns the configuration key this handler manages.
    fn key(&self) -> &'static str;

    /// Set the configuration value.
    ///
    /// # Arguments
    /// * `args` - The arguments provided after the key (may be empty)
    /// * `ctx` - Context containing the config snapshot and its orchestrator
    ///
    /// # Returns
    /// A success message to display, or an error.
    fn set(&self, args: &[String], ctx: &SetContext<'_>) -> Result<String, SettingError>;

    /// Unset (clear) the configuration value.
    ///
    /// # Arguments
    /// * `args` - Optional argument (e.g., the message type for type-keyed settings)
    /// * `ctx` - Context containing the config snapshot and its orchestrator
    fn unset(&self, args: Option<&str>, ctx: &SetContext<'_>) -> Result<String, SettingError>;

    /// Format the current value for display in `scrollfold set` output.
    fn format(&self, config: &Config) -> String;
}
