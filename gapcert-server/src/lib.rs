//! HTTP surface: axum routes translating the REST contract into service
//! calls and typed domain errors into fixed status codes.

pub mod http;
pub mod state;
