//! Per-type display state for transcript messages.
//!
//! Every message carries a [`MessageType`](crate::core::message::MessageType)
//! and every type carries one [`TypePreference`](crate::core::prefs::TypePreference).
//! The [`DisplayEngine`] keeps the rendered messages consistent with those
//! preferences: collapsing hidden types to a preview line, expanding
//! full-height types, and otherwise sizing each message by its measured
//! height. Streaming messages are re-measured, debounced, as their content
//! grows.

pub mod classifier;
pub mod controls;
pub mod engine;
pub mod handle;
pub mod preview;
pub mod scheduler;
pub mod state;
pub mod transcript;
pub mod watcher;

pub use classifier::{HeightClassifier, LayoutProbe, NoLayout};
pub use controls::{ControlAction, ControlKind, ControlSet};
pub use engine::DisplayEngine;
pub use handle::MessageHandle;
pub use state::DisplayClass;
pub use transcript::Transcript;

#[cfg(test)]
mod tests;
