//! Serving adapters over the trained artifact bundle.
//!
//! - `context`: the immutable `ServingContext` and the per-request error
//!   taxonomy shared by every front-end (HTTP, TUI, one-shot CLI)
//! - `http`: the axum JSON API + embedded demo page

pub mod context;
pub mod http;

pub use context::*;
pub use http::{run as run_server, ServeConfig};
