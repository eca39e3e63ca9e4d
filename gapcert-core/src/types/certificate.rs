//! Certificates issued from passed inspections.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Wire-contract cap on the free-text cancellation detail.
pub const MAX_CANCEL_DETAIL_LEN: usize = 255;

/// Derived lifecycle state of a certificate. Not stored — computed from
/// the `active`/`cancel_request` flags so the two can never disagree with
/// the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateState {
    Issued,
    CancellationRequested,
    Revoked,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub id: i64,
    pub inspection_id: i64,
    pub certificate_no: String,
    pub effective_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub active: bool,
    pub cancel_request: bool,
    pub cancel_request_detail: Option<String>,
    /// References to supporting files held by the external file store.
    pub files: Vec<String>,
    pub version: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Certificate {
    pub fn state(&self) -> CertificateState {
        if !self.active {
            CertificateState::Revoked
        } else if self.cancel_request {
            CertificateState::CancellationRequested
        } else {
            CertificateState::Issued
        }
    }
}
