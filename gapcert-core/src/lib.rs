//! Core domain model for gapcert: entities, error taxonomy, configuration.
//!
//! This crate has no I/O. Persistence lives in `gapcert-storage`, the
//! workflow services in `gapcert-service`, the HTTP surface in
//! `gapcert-server`.

pub mod config;
pub mod errors;
pub mod types;
