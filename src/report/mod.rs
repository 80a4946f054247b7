//! Evaluation metrics and terminal reporting.
//!
//! Formatting lives here, away from the math and pipeline code, so output
//! changes stay localized.

pub mod format;
pub mod metrics;

pub use format::*;
pub use metrics::*;
