//! # papertok_core
//!
//! Core domain logic for PaperTok: session tokens, the TTL cache, the arXiv
//! source, user storage and the account and paper services built on them.

pub mod arxiv;
pub mod auth;
pub mod cache;
pub mod migrate;
pub mod models;
pub mod papers;
pub mod userauth;
pub mod users;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
