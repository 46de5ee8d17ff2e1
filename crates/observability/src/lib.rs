//! `stockbook-observability` — shared tracing setup.
//!
//! Close runs, lock overrides and blocked-close rejections all emit
//! structured tracing events; this crate owns how those events leave the
//! process.

pub mod tracing;

pub use tracing::{init, init_json};
