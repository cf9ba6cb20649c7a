use crate::core::message::MessageType;
use crate::core::prefs::TypePreference;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Persisted display preferences, one table per message type plus the
/// global height policy.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Constrain tall messages to a scrollable height (unset means on)
    pub fixed_height: Option<bool>,
    #[serde(default)]
    pub types: BTreeMap<MessageType, TypePreference>,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub display: DisplayConfig,
    /// Terminal cell height in pixels, used when the terminal does not report
    /// its pixel size.
    pub cell_height: Option<u16>,
    /// Theme name ("dark" or "light")
    pub theme: Option<String>,
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
