//! Setting handlers for different configuration patterns.

pub mod boolean;
pub mod type_keyed;

pub use boolean::*;
pub use type_keyed::*;
