//! Per-type display preferences and the stores that persist them.
//!
//! Preferences are keyed by [`MessageType`], never by message instance. A
//! store has no error path: a failed write is logged and the next read
//! returns whatever is actually persisted, which is the default when
//! nothing ever was.

use crate::core::config::ConfigOrchestrator;
use crate::core::message::MessageType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

/// User intent shared by every message of one type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypePreference {
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub full_height: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceField {
    Hidden,
    FullHeight,
}

impl PreferenceField {
    pub fn read(self, pref: TypePreference) -> bool {
        match self {
            PreferenceField::Hidden => pref.hidden,
            PreferenceField::FullHeight => pref.full_height,
        }
    }
}

/// Session-wide switch for scroll-constrained message heights. When
/// disabled every visible message renders expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalHeightPolicy {
    pub fixed_height: bool,
}

impl Default for GlobalHeightPolicy {
    fn default() -> Self {
        Self { fixed_height: true }
    }
}

pub trait PreferenceStore {
    fn get(&self, ty: MessageType) -> TypePreference;

    fn set(&mut self, ty: MessageType, field: PreferenceField, value: bool);

    fn height_policy(&self) -> GlobalHeightPolicy;

    fn set_height_policy(&mut self, policy: GlobalHeightPolicy);
}

/// Session-only store.
#[derive(Debug, Default, Clone)]
pub struct MemoryPreferenceStore {
    types: BTreeMap<MessageType, TypePreference>,
    policy: GlobalHeightPolicy,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: GlobalHeightPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, ty: MessageType) -> TypePreference {
        self.types.get(&ty).copied().unwrap_or_default()
    }

    fn set(&mut self, ty: MessageType, field: PreferenceField, value: bool) {
        let pref = self.types.entry(ty).or_default();
        match field {
            PreferenceField::Hidden => pref.hidden = value,
            PreferenceField::FullHeight => pref.full_height = value,
        }
    }

    fn height_policy(&self) -> GlobalHeightPolicy {
        self.policy
    }

    fn set_height_policy(&mut self, policy: GlobalHeightPolicy) {
        self.policy = policy;
    }
}

/// Store backed by the `[display]` section of the config file. Every read
/// goes through the orchestrator cache, so edits made by `scrollfold set`
/// in another shell are picked up on the next toggle.
pub struct ConfigPreferenceStore {
    config: Arc<ConfigOrchestrator>,
}

impl ConfigPreferenceStore {
    pub fn new(config: Arc<ConfigOrchestrator>) -> Self {
        Self { config }
    }
}

impl PreferenceStore for ConfigPreferenceStore {
    fn get(&self, ty: MessageType) -> TypePreference {
        match self.config.load_with_cache() {
            Ok(config) => config.type_preference(ty),
            Err(err) => {
                warn!(%ty, error = %err, "falling back to default display preference");
                TypePreference::default()
            }
        }
    }

    fn set(&mut self, ty: MessageType, field: PreferenceField, value: bool) {
        let result = self.config.mutate(|config| {
            config.set_type_field(ty, field, value);
            Ok(())
        });
        if let Err(err) = result {
            warn!(%ty, ?field, value, error = %err, "display preference not persisted");
        }
    }

    fn height_policy(&self) -> GlobalHeightPolicy {
        match self.config.load_with_cache() {
            Ok(config) => GlobalHeightPolicy {
                fixed_height: config.fixed_height(),
            },
            Err(err) => {
                warn!(error = %err, "falling back to default height policy");
                GlobalHeightPolicy::default()
            }
        }
    }

    fn set_height_policy(&mut self, policy: GlobalHeightPolicy) {
        let result = self.config.mutate(|config| {
            config.display.fixed_height = Some(policy.fixed_height);
            Ok(())
        });
        if let Err(err) = result {
            warn!(error = %err, "height policy not persisted");
        }
    }
}
