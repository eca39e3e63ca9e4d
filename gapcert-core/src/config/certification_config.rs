//! Business constants of the certification policy.
//!
//! The observed system fixes these (≥60 % secondary compliance, 2-year
//! certificate validity, 365-day audit retention); they are configuration
//! here so the policy can change without touching the aggregation or
//! validation logic.

use serde::{Deserialize, Serialize};

const DEFAULT_SECONDARY_COMPLIANCE_MIN: u32 = 60;
const DEFAULT_VALIDITY_MONTHS: u32 = 24;
const DEFAULT_AUDIT_RETENTION_DAYS: u32 = 365;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CertificationConfig {
    /// Inclusive minimum secondary-requirement compliance percentage for a
    /// passing inspection.
    pub secondary_compliance_min_percent: Option<u32>,
    /// Maximum certificate validity window, in calendar months.
    pub certificate_validity_months: Option<u32>,
    /// Default age cutoff for the audit retention sweep.
    pub audit_retention_days: Option<u32>,
}

impl CertificationConfig {
    pub fn compliance_threshold(&self) -> u32 {
        self.secondary_compliance_min_percent
            .unwrap_or(DEFAULT_SECONDARY_COMPLIANCE_MIN)
    }

    pub fn validity_months(&self) -> u32 {
        self.certificate_validity_months
            .unwrap_or(DEFAULT_VALIDITY_MONTHS)
    }

    pub fn retention_days(&self) -> u32 {
        self.audit_retention_days
            .unwrap_or(DEFAULT_AUDIT_RETENTION_DAYS)
    }
}
