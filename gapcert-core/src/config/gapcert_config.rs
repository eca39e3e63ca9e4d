//! Top-level gapcert configuration with 3-layer resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{CertificationConfig, ServerConfig};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`GAPCERT_*`)
/// 2. Project config (`gapcert.toml` in the working directory)
/// 3. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GapcertConfig {
    pub server: ServerConfig,
    pub certification: CertificationConfig,
}

impl GapcertConfig {
    /// Load configuration with 3-layer resolution.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let project_config_path = root.join("gapcert.toml");
        if project_config_path.exists() {
            let content = std::fs::read_to_string(&project_config_path).map_err(|_| {
                ConfigError::FileNotFound {
                    path: project_config_path.display().to_string(),
                }
            })?;
            let file_config: GapcertConfig =
                toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                    path: project_config_path.display().to_string(),
                    message: e.to_string(),
                })?;
            Self::merge(&mut config, &file_config);
        }

        Self::apply_env_overrides(&mut config);
        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: GapcertConfig =
            toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
                path: "<string>".to_string(),
                message: e.to_string(),
            })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(config: &GapcertConfig) -> Result<(), ConfigError> {
        if let Some(threshold) = config.certification.secondary_compliance_min_percent {
            if threshold > 100 {
                return Err(ConfigError::ValidationFailed {
                    field: "certification.secondary_compliance_min_percent".to_string(),
                    message: "must be between 0 and 100".to_string(),
                });
            }
        }
        if let Some(months) = config.certification.certificate_validity_months {
            if months == 0 {
                return Err(ConfigError::ValidationFailed {
                    field: "certification.certificate_validity_months".to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        if let Some(days) = config.certification.audit_retention_days {
            if days == 0 {
                return Err(ConfigError::ValidationFailed {
                    field: "certification.audit_retention_days".to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        if let Some(limit) = config.server.max_page_limit {
            if limit == 0 {
                return Err(ConfigError::ValidationFailed {
                    field: "server.max_page_limit".to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Merge `other` into `base`, where `other` values win when present.
    fn merge(base: &mut GapcertConfig, other: &GapcertConfig) {
        if other.server.bind_addr.is_some() {
            base.server.bind_addr = other.server.bind_addr.clone();
        }
        if other.server.db_path.is_some() {
            base.server.db_path = other.server.db_path.clone();
        }
        if other.server.max_page_limit.is_some() {
            base.server.max_page_limit = other.server.max_page_limit;
        }
        if other.certification.secondary_compliance_min_percent.is_some() {
            base.certification.secondary_compliance_min_percent =
                other.certification.secondary_compliance_min_percent;
        }
        if other.certification.certificate_validity_months.is_some() {
            base.certification.certificate_validity_months =
                other.certification.certificate_validity_months;
        }
        if other.certification.audit_retention_days.is_some() {
            base.certification.audit_retention_days =
                other.certification.audit_retention_days;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `GAPCERT_BIND_ADDR`, `GAPCERT_DB_PATH`, etc.
    fn apply_env_overrides(config: &mut GapcertConfig) {
        if let Ok(val) = std::env::var("GAPCERT_BIND_ADDR") {
            config.server.bind_addr = Some(val);
        }
        if let Ok(val) = std::env::var("GAPCERT_DB_PATH") {
            config.server.db_path = Some(val);
        }
        if let Ok(val) = std::env::var("GAPCERT_MAX_PAGE_LIMIT") {
            if let Ok(v) = val.parse::<u32>() {
                config.server.max_page_limit = Some(v);
            }
        }
        if let Ok(val) = std::env::var("GAPCERT_SECONDARY_COMPLIANCE_MIN") {
            if let Ok(v) = val.parse::<u32>() {
                config.certification.secondary_compliance_min_percent = Some(v);
            }
        }
        if let Ok(val) = std::env::var("GAPCERT_CERT_VALIDITY_MONTHS") {
            if let Ok(v) = val.parse::<u32>() {
                config.certification.certificate_validity_months = Some(v);
            }
        }
        if let Ok(val) = std::env::var("GAPCERT_AUDIT_RETENTION_DAYS") {
            if let Ok(v) = val.parse::<u32>() {
                config.certification.audit_retention_days = Some(v);
            }
        }
    }
}
