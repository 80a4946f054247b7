//! `house-prices` library crate.
//!
//! The binary (`hp`) is a thin wrapper around this library so that:
//!
//! - the training pipeline and serving chain are testable without spawning
//!   processes
//! - the HTTP API, the TUI, and the one-shot CLI all share one
//!   encode -> scale -> predict implementation

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod features;
pub mod io;
pub mod model;
pub mod report;
pub mod serve;
pub mod tui;
