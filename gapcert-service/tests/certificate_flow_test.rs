//! Certificate lifecycle end-to-end: issuance preconditions, the
//! cancellation sub-workflow, and revocation guards.

mod common;

use chrono::NaiveDate;
use common::*;
use gapcert_core::errors::DomainError;
use gapcert_core::types::CertificateState;
use gapcert_service::certificates::{CancellationDetail, IssueCertificate};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn issue_req(inspection_id: i64) -> IssueCertificate {
    IssueCertificate {
        inspection_id,
        effective_date: date(2026, 9, 1),
        expiry_date: date(2028, 9, 1),
        files: vec!["s3://certs/report.pdf".to_string()],
    }
}

#[test]
fn issue_succeeds_from_passed_inspection() {
    let fx = setup();
    let farm_id = create_farm(&fx);
    let inspection_id = passed_inspection(&fx, farm_id);

    let certificate_id = fx
        .certificates
        .issue(&committee(), issue_req(inspection_id))
        .unwrap();
    let cert = fx.certificates.get(&committee(), certificate_id).unwrap();
    assert_eq!(cert.state(), CertificateState::Issued);
    assert_eq!(cert.version, 1);
    assert!(cert.certificate_no.starts_with("GAP-2026-"));
}

#[test]
fn issue_rejects_non_terminal_and_failed_inspections() {
    let fx = setup();
    let farm_id = create_farm(&fx);

    // Still awaiting its visit — not terminal.
    let in_progress = schedule_inspection(&fx, farm_id);
    let err = fx
        .certificates
        .issue(&committee(), issue_req(in_progress))
        .unwrap_err();
    assert!(matches!(err, DomainError::IllegalTransition { .. }));

    // Drive it to a terminal Fail (1 of 2 secondary = 50 %).
    evaluate_all(&fx, in_progress, 1);
    let inspection = fx.inspections.complete(&auditor(), in_progress, 1).unwrap();
    fx.inspections
        .finalize(&auditor(), in_progress, inspection.version)
        .unwrap();
    let err = fx
        .certificates
        .issue(&committee(), issue_req(in_progress))
        .unwrap_err();
    assert!(matches!(err, DomainError::IllegalTransition { .. }));
}

#[test]
fn issue_enforces_validity_window() {
    let fx = setup();
    let farm_id = create_farm(&fx);
    let inspection_id = passed_inspection(&fx, farm_id);

    // expiry before effective
    let err = fx
        .certificates
        .issue(
            &committee(),
            IssueCertificate {
                expiry_date: date(2026, 8, 31),
                ..issue_req(inspection_id)
            },
        )
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));

    // exactly the 2-year cap is allowed
    assert!(fx
        .certificates
        .issue(
            &committee(),
            IssueCertificate {
                effective_date: date(2026, 9, 1),
                expiry_date: date(2028, 9, 1),
                ..issue_req(inspection_id)
            },
        )
        .is_ok());
}

#[test]
fn issue_rejects_one_day_past_the_cap() {
    let fx = setup();
    let farm_id = create_farm(&fx);
    let inspection_id = passed_inspection(&fx, farm_id);

    let err = fx
        .certificates
        .issue(
            &committee(),
            IssueCertificate {
                effective_date: date(2026, 9, 1),
                expiry_date: date(2028, 9, 2),
                ..issue_req(inspection_id)
            },
        )
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));
}

#[test]
fn issue_requires_files_and_committee_role() {
    let fx = setup();
    let farm_id = create_farm(&fx);
    let inspection_id = passed_inspection(&fx, farm_id);

    let err = fx
        .certificates
        .issue(
            &committee(),
            IssueCertificate {
                files: vec![],
                ..issue_req(inspection_id)
            },
        )
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));

    let err = fx
        .certificates
        .issue(&auditor(), issue_req(inspection_id))
        .unwrap_err();
    assert!(matches!(err, DomainError::Authorization { .. }));
}

#[test]
fn issue_is_rejected_when_inspection_already_has_certificate() {
    let fx = setup();
    let farm_id = create_farm(&fx);
    let inspection_id = passed_inspection(&fx, farm_id);
    fx.certificates
        .issue(&committee(), issue_req(inspection_id))
        .unwrap();

    let err = fx
        .certificates
        .issue(&committee(), issue_req(inspection_id))
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));
}

#[test]
fn cancellation_flow_reaches_revoked() {
    let fx = setup();
    let farm_id = create_farm(&fx);
    let inspection_id = passed_inspection(&fx, farm_id);
    let certificate_id = fx
        .certificates
        .issue(&committee(), issue_req(inspection_id))
        .unwrap();

    let cert = fx
        .certificates
        .request_cancellation(
            &farmer(),
            certificate_id,
            CancellationDetail {
                detail: "Land sold to a neighbour".to_string(),
                version: 1,
            },
        )
        .unwrap();
    assert_eq!(cert.state(), CertificateState::CancellationRequested);
    assert_eq!(cert.version, 2);

    // Farmer may edit the detail while the request is open.
    let cert = fx
        .certificates
        .update_cancellation_detail(
            &farmer(),
            certificate_id,
            CancellationDetail {
                detail: "Land sold; plot converted to oil palm".to_string(),
                version: 2,
            },
        )
        .unwrap();
    assert_eq!(cert.version, 3);

    let cert = fx
        .certificates
        .revoke(&committee(), certificate_id, 3)
        .unwrap();
    assert_eq!(cert.state(), CertificateState::Revoked);
    assert!(!cert.active);
}

#[test]
fn revoke_requires_open_cancellation_request() {
    let fx = setup();
    let farm_id = create_farm(&fx);
    let inspection_id = passed_inspection(&fx, farm_id);
    let certificate_id = fx
        .certificates
        .issue(&committee(), issue_req(inspection_id))
        .unwrap();

    // Straight from Issued: illegal.
    let err = fx
        .certificates
        .revoke(&committee(), certificate_id, 1)
        .unwrap_err();
    assert!(matches!(err, DomainError::IllegalTransition { .. }));
}

#[test]
fn cancellation_detail_is_validated() {
    let fx = setup();
    let farm_id = create_farm(&fx);
    let inspection_id = passed_inspection(&fx, farm_id);
    let certificate_id = fx
        .certificates
        .issue(&committee(), issue_req(inspection_id))
        .unwrap();

    let err = fx
        .certificates
        .request_cancellation(
            &farmer(),
            certificate_id,
            CancellationDetail {
                detail: "x".repeat(256),
                version: 1,
            },
        )
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));

    let err = fx
        .certificates
        .request_cancellation(
            &farmer(),
            certificate_id,
            CancellationDetail {
                detail: "   ".to_string(),
                version: 1,
            },
        )
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));
}

#[test]
fn only_the_owning_farmer_may_request_cancellation() {
    let fx = setup();
    let farm_id = create_farm(&fx);
    let inspection_id = passed_inspection(&fx, farm_id);
    let certificate_id = fx
        .certificates
        .issue(&committee(), issue_req(inspection_id))
        .unwrap();

    let err = fx
        .certificates
        .request_cancellation(
            &other_farmer(),
            certificate_id,
            CancellationDetail {
                detail: "not mine".to_string(),
                version: 1,
            },
        )
        .unwrap_err();
    assert!(matches!(err, DomainError::Authorization { .. }));
}

#[test]
fn stale_revoke_conflicts_and_state_is_unchanged() {
    let fx = setup();
    let farm_id = create_farm(&fx);
    let inspection_id = passed_inspection(&fx, farm_id);
    let certificate_id = fx
        .certificates
        .issue(&committee(), issue_req(inspection_id))
        .unwrap();
    fx.certificates
        .request_cancellation(
            &farmer(),
            certificate_id,
            CancellationDetail {
                detail: "closing the farm".to_string(),
                version: 1,
            },
        )
        .unwrap();

    // Committee still holds version 1; the farmer's request moved it to 2.
    let err = fx
        .certificates
        .revoke(&committee(), certificate_id, 1)
        .unwrap_err();
    assert!(matches!(err, DomainError::VersionConflict { .. }));

    let cert = fx.certificates.get(&committee(), certificate_id).unwrap();
    assert_eq!(cert.state(), CertificateState::CancellationRequested);
    assert!(cert.active);
}
