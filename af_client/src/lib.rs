//! Client library for the ActsFile auth server.
//!
//! [`auth_context::AuthContext`] is the entry point for UI code: it restores
//! a persisted session, runs login and registration, and publishes the
//! current user. The layers underneath can be used on their own:
//!
//! - [`api_client`]: typed HTTP calls with deadlines and envelope decoding
//! - [`auth_service`]: session lifecycle over an [`session_store::SessionStore`]
//! - [`diagnostics`]: connectivity probes and user-facing advice
//! - [`commands`]: parser for the `af_client` prompt

pub mod api_client;
pub mod auth_context;
pub mod auth_service;
pub mod commands;
pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod session_store;
