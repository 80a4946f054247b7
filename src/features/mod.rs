//! The train/serve feature-consistency pipeline.
//!
//! This is the one part of the system with a real invariant to violate:
//! a feature vector produced at inference time must be structurally identical
//! (length and column order) to the matrix the model was fitted on.
//!
//! - `schema`: the frozen, ordered column list (single source of truth)
//! - `encoder`: raw record -> encoded row, aligned to a schema
//! - `scaler`: fitted per-column standardization with a zero-variance guard

pub mod encoder;
pub mod scaler;
pub mod schema;

pub use encoder::*;
pub use scaler::*;
pub use schema::*;
