//! # ActsFile
//!
//! Account and session core for ActsFile, a social app for recording
//! personal contributions ("acts") against the UN Sustainable Development
//! Goals and the African Union's Agenda 2063.
//!
//! ## Core Modules
//!
//! - [`auth`]: users, signed session tokens, credential hashing, the auth manager
//! - [`db`]: repository trait and the in-memory user store
//! - [`net`]: JSON envelopes and routes shared by server and client
//!
//! ## Example
//!
//! ```
//! use actsfile::auth::TokenCodec;
//! use chrono::Duration;
//! use uuid::Uuid;
//!
//! let codec = TokenCodec::new("a_long_random_signing_secret_value");
//! let id = Uuid::new_v4();
//! let token = codec.issue(id, "a@b.com", Duration::hours(1)).unwrap();
//! assert_eq!(codec.parse(&token).unwrap().sub, id);
//! ```

/// Accounts, tokens and credentials.
pub mod auth;

/// User storage.
pub mod db;

/// Wire contract shared with clients.
pub mod net;
pub use net::messages;
