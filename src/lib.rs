//! Scrollfold is a terminal viewer for agent transcripts that keeps display
//! state per message type.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the message model, the config file, and the preference
//!   stores that persist per-type display choices.
//! - [`display`] keeps every rendered message consistent with its type's
//!   preference and re-measures streaming messages as they grow.
//! - [`ui`] formats and lays out messages for the terminal, measures them for
//!   the display engine, and runs the interactive view loop.
//! - [`cli`] parses arguments and implements the `view`, `set`, and `unset`
//!   commands.
//!
//! The binary (`src/main.rs`) routes straight through [`crate::cli::main`].

pub mod cli;
pub mod core;
pub mod display;
pub mod ui;
pub mod utils;
