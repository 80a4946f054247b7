//! Persistence for the trained artifact bundle.

pub mod artifacts;

pub use artifacts::*;
