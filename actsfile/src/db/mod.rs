//! User storage.
//!
//! Storage is reached through the [`UserRepository`] trait so the auth layer
//! can be exercised against any backend. Only the in-memory backend exists.

pub mod repository;

pub use repository::{InMemoryUserRepository, UserRepository};
