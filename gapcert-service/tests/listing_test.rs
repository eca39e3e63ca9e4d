//! List shaping across the services: role scoping, filtered totals,
//! sort whitelisting.

mod common;

use common::*;
use gapcert_core::errors::DomainError;
use gapcert_core::types::listing::{PageRequest, SortOrder};
use gapcert_storage::queries::certificates::CertificateFilter;
use gapcert_storage::queries::farms::FarmFilter;
use gapcert_storage::queries::inspections::InspectionFilter;

#[test]
fn farmer_only_sees_their_own_farms() {
    let fx = setup();
    create_farm(&fx);
    fx.farms
        .create(&other_farmer(), farm_data(), vec![])
        .unwrap();

    let page = fx
        .farms
        .list(&farmer(), FarmFilter::default(), PageRequest::default())
        .unwrap();
    assert_eq!(page.paginator.total, 1);
    assert_eq!(page.results[0].owner_user_id, farmer().user_id);

    // Auditors see everything.
    let page = fx
        .farms
        .list(&auditor(), FarmFilter::default(), PageRequest::default())
        .unwrap();
    assert_eq!(page.paginator.total, 2);
}

#[test]
fn farmer_scoping_survives_a_forged_filter() {
    let fx = setup();
    create_farm(&fx);
    let (farm_b, _) = fx
        .farms
        .create(&other_farmer(), farm_data(), vec![])
        .unwrap();

    // A farmer asking for someone else's scope still gets their own.
    let filter = FarmFilter {
        owner_user_id: Some(farm_b.owner_user_id),
        ..FarmFilter::default()
    };
    let page = fx
        .farms
        .list(&farmer(), filter, PageRequest::default())
        .unwrap();
    assert_eq!(page.paginator.total, 1);
    assert_eq!(page.results[0].owner_user_id, farmer().user_id);
}

#[test]
fn pagination_total_is_the_filtered_count() {
    let fx = setup();
    for _ in 0..3 {
        create_farm_variant(&fx);
    }

    let page = fx
        .farms
        .list(
            &farmer(),
            FarmFilter::default(),
            PageRequest {
                limit: 2,
                offset: 0,
                ..PageRequest::default()
            },
        )
        .unwrap();
    assert_eq!(page.results.len(), 2);
    assert_eq!(page.paginator.total, 3);
    assert_eq!(page.paginator.limit, 2);

    let page = fx
        .farms
        .list(
            &farmer(),
            FarmFilter::default(),
            PageRequest {
                limit: 2,
                offset: 2,
                ..PageRequest::default()
            },
        )
        .unwrap();
    assert_eq!(page.results.len(), 1);
    assert_eq!(page.paginator.total, 3);
}

#[test]
fn unknown_sort_field_is_a_validation_error() {
    let fx = setup();
    create_farm(&fx);

    let err = fx
        .farms
        .list(
            &farmer(),
            FarmFilter::default(),
            PageRequest {
                sort_field: Some("ownerUserId; DROP TABLE rubber_farms".to_string()),
                sort_order: Some(SortOrder::Asc),
                ..PageRequest::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));
}

#[test]
fn inspection_list_scopes_to_farm_owner() {
    let fx = setup();
    let farm_id = create_farm(&fx);
    schedule_inspection(&fx, farm_id);

    let page = fx
        .inspections
        .list(&farmer(), InspectionFilter::default(), PageRequest::default())
        .unwrap();
    assert_eq!(page.paginator.total, 1);

    let page = fx
        .inspections
        .list(
            &other_farmer(),
            InspectionFilter::default(),
            PageRequest::default(),
        )
        .unwrap();
    assert_eq!(page.paginator.total, 0);
}

#[test]
fn certificate_list_filters_by_active_flag() {
    let fx = setup();
    let farm_id = create_farm(&fx);
    let inspection_id = passed_inspection(&fx, farm_id);
    fx.certificates
        .issue(
            &committee(),
            gapcert_service::certificates::IssueCertificate {
                inspection_id,
                effective_date: chrono::NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
                expiry_date: chrono::NaiveDate::from_ymd_opt(2028, 9, 1).unwrap(),
                files: vec!["s3://certs/report.pdf".to_string()],
            },
        )
        .unwrap();

    let active_only = CertificateFilter {
        active: Some(true),
        ..CertificateFilter::default()
    };
    let page = fx
        .certificates
        .list(&committee(), active_only, PageRequest::default())
        .unwrap();
    assert_eq!(page.paginator.total, 1);

    let revoked_only = CertificateFilter {
        active: Some(false),
        ..CertificateFilter::default()
    };
    let page = fx
        .certificates
        .list(&committee(), revoked_only, PageRequest::default())
        .unwrap();
    assert_eq!(page.paginator.total, 0);
}

/// create_farm but tolerant of being called repeatedly for one owner.
fn create_farm_variant(fx: &Fixture) -> i64 {
    let (farm, _) = fx
        .farms
        .create(&farmer(), farm_data(), vec![])
        .unwrap();
    farm.id
}
