//! Workflow services for gapcert.
//!
//! Every mutation follows the same discipline: one BEGIN IMMEDIATE
//! transaction wrapping the version-guarded write and its audit record,
//! so a committed change is never unaudited and a stale write never
//! lands. Roles arrive as an explicit [`gapcert_core::types::Principal`]
//! on every call; there is no ambient session.

pub mod aggregation;
pub mod audit;
pub mod audit_logs;
pub mod certificates;
pub mod farms;
pub mod inspections;
pub mod lifecycle;
