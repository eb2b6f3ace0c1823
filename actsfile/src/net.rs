//! Wire contract between the ActsFile server and its clients.
//!
//! JSON envelopes and route paths shared by `af_server` and `af_client`.

/// Request/response envelopes and route constants.
pub mod messages;
