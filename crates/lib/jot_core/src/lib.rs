//! # jot_core
//!
//! Core domain logic for Jot.

pub mod auth;
pub mod db;
pub mod migrate;
pub mod models;
pub mod notes;
pub mod uuid;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
