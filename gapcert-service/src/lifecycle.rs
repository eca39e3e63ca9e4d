//! Pure transition rules for the two lifecycles.
//!
//! Inspections: `AwaitingSchedule → AwaitingInspection →
//! Inspected{AwaitingResult} → Inspected{Pass|Fail}`; nothing regresses,
//! the two final shapes are terminal.
//!
//! Certificates: `Issued → CancellationRequested → Revoked`.

use gapcert_core::types::{CertificateState, InspectionResult, InspectionStatus};

/// Whether evaluations may still be recorded (partial saves included).
pub fn can_record_evaluation(status: InspectionStatus) -> bool {
    matches!(status, InspectionStatus::AwaitingInspection)
}

/// Whether the visit can be marked complete (→ `Inspected{AwaitingResult}`).
pub fn can_complete(status: InspectionStatus) -> bool {
    matches!(status, InspectionStatus::AwaitingInspection)
}

/// Whether the result can be finalized (computed and persisted).
pub fn can_finalize(status: InspectionStatus, result: Option<InspectionResult>) -> bool {
    status == InspectionStatus::Inspected && result == Some(InspectionResult::AwaitingResult)
}

/// Whether a farmer may open a cancellation request.
pub fn can_request_cancellation(state: CertificateState) -> bool {
    state == CertificateState::Issued
}

/// Whether the cancellation detail may still be edited.
pub fn can_edit_cancellation_detail(state: CertificateState) -> bool {
    state == CertificateState::CancellationRequested
}

/// Whether the committee may revoke.
pub fn can_revoke(state: CertificateState) -> bool {
    state == CertificateState::CancellationRequested
}
