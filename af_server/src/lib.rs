//! HTTP server for the ActsFile authentication API.
//!
//! The binary in `main.rs` wires these modules together; they are exposed as
//! a library so integration tests (and the client test-suite) can build the
//! router in-process.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
