//! SQLite persistence for gapcert.
//!
//! One serialized write connection (BEGIN IMMEDIATE transactions) plus a
//! round-robin pool of read-only connections. Every mutable table carries
//! a `version` column; updates go through the version guard in
//! [`versioned`] so concurrent writers can never silently overwrite each
//! other.

pub mod connection;
pub mod listing;
pub mod migrations;
pub mod queries;
pub mod retention;
pub mod versioned;

/// Seconds since the Unix epoch.
pub fn now_epoch() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
