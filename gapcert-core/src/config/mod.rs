//! Configuration system for gapcert.
//! TOML-based, 3-layer resolution: env > project file > defaults.

pub mod certification_config;
pub mod gapcert_config;
pub mod server_config;

pub use certification_config::CertificationConfig;
pub use gapcert_config::GapcertConfig;
pub use server_config::ServerConfig;
