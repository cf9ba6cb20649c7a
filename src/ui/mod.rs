//! Terminal UI layer for browsing transcripts.
//!
//! The UI module owns formatting, layout, rendering, and loop control for
//! the text user interface.
//!
//! Key submodules include:
//! - [`view_loop`]: the interaction loop that feeds input and replayed
//!   content into the [`crate::display::DisplayEngine`].
//! - [`layout`] and [`renderer`]: view composition and frame output.
//! - [`probe`]: the terminal implementation of
//!   [`LayoutProbe`](crate::display::LayoutProbe).
//! - [`format`] and [`theme`]: content sanitizing and color policy.
//!
//! Ownership boundary: this layer presents and captures interaction state,
//! while [`crate::display`] owns per-message display state.

pub mod format;
pub mod layout;
pub mod probe;
pub mod renderer;
pub mod theme;
pub mod view_loop;
pub mod view_state;
