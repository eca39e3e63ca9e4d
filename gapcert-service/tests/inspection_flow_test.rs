//! Inspection lifecycle end-to-end: schedule guards, evaluation saves,
//! completion gating, computed finalization, and no regressions.

mod common;

use chrono::{Duration, Utc};
use common::*;
use gapcert_core::errors::DomainError;
use gapcert_core::types::{EvaluationResult, InspectionResult, InspectionStatus};
use gapcert_service::inspections::{SaveEvaluation, ScheduleInspection};

#[test]
fn schedule_creates_awaiting_inspection_with_checklist() {
    let fx = setup();
    let farm_id = create_farm(&fx);
    let inspection_id = schedule_inspection(&fx, farm_id);

    let detail = fx.inspections.get(&auditor(), inspection_id).unwrap();
    assert_eq!(detail.inspection.status, InspectionStatus::AwaitingInspection);
    assert_eq!(detail.inspection.result, None);
    assert_eq!(detail.inspection.version, 1);
    assert_eq!(detail.additional_auditor_ids, vec![202]);
    // 2 items × 2 requirements from the seeded templates
    assert_eq!(detail.items.len(), 2);
    assert_eq!(detail.requirements.len(), 4);
    assert!(detail
        .requirements
        .iter()
        .all(|r| r.evaluation_result.is_none()));
}

#[test]
fn schedule_rejects_farm_with_inspection_in_progress() {
    let fx = setup();
    let farm_id = create_farm(&fx);
    schedule_inspection(&fx, farm_id);

    let err = fx
        .inspections
        .schedule(
            &auditor(),
            ScheduleInspection {
                rubber_farm_id: farm_id,
                inspection_type_id: fx.inspection_type_id,
                inspection_date_and_time: Utc::now() + Duration::days(2),
                additional_auditor_ids: vec![],
            },
        )
        .unwrap_err();
    assert!(matches!(err, DomainError::IllegalTransition { .. }));
}

#[test]
fn schedule_allows_new_inspection_once_previous_is_terminal() {
    let fx = setup();
    let farm_id = create_farm(&fx);
    passed_inspection(&fx, farm_id);

    // terminal Pass frees the farm for a new round
    let second = fx.inspections.schedule(
        &auditor(),
        ScheduleInspection {
            rubber_farm_id: farm_id,
            inspection_type_id: fx.inspection_type_id,
            inspection_date_and_time: Utc::now() + Duration::days(30),
            additional_auditor_ids: vec![],
        },
    );
    assert!(second.is_ok());
}

#[test]
fn schedule_rejects_past_date_and_unknown_farm() {
    let fx = setup();
    let farm_id = create_farm(&fx);

    let err = fx
        .inspections
        .schedule(
            &auditor(),
            ScheduleInspection {
                rubber_farm_id: farm_id,
                inspection_type_id: fx.inspection_type_id,
                inspection_date_and_time: Utc::now() - Duration::hours(1),
                additional_auditor_ids: vec![],
            },
        )
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));

    let err = fx
        .inspections
        .schedule(
            &auditor(),
            ScheduleInspection {
                rubber_farm_id: 9999,
                inspection_type_id: fx.inspection_type_id,
                inspection_date_and_time: Utc::now() + Duration::days(1),
                additional_auditor_ids: vec![],
            },
        )
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[test]
fn schedule_requires_auditor_role() {
    let fx = setup();
    let farm_id = create_farm(&fx);
    let err = fx
        .inspections
        .schedule(
            &farmer(),
            ScheduleInspection {
                rubber_farm_id: farm_id,
                inspection_type_id: fx.inspection_type_id,
                inspection_date_and_time: Utc::now() + Duration::days(1),
                additional_auditor_ids: vec![],
            },
        )
        .unwrap_err();
    assert!(matches!(err, DomainError::Authorization { .. }));
}

#[test]
fn partial_saves_allowed_but_completion_demands_full_checklist() {
    let fx = setup();
    let farm_id = create_farm(&fx);
    let inspection_id = schedule_inspection(&fx, farm_id);

    // Evaluate all but one requirement.
    let reqs = fx
        .inspections
        .get(&auditor(), inspection_id)
        .unwrap()
        .requirements;
    for req in reqs.iter().take(reqs.len() - 1) {
        fx.inspections
            .save_evaluation(
                &auditor(),
                req.id,
                SaveEvaluation {
                    evaluation_result: EvaluationResult::Yes,
                    evaluation_method: Some("document review".to_string()),
                    note: None,
                    version: req.version,
                },
            )
            .unwrap();
    }

    let err = fx
        .inspections
        .complete(&auditor(), inspection_id, 1)
        .unwrap_err();
    assert!(matches!(err, DomainError::IllegalTransition { .. }));

    // Fill the last one; completion now succeeds.
    let last = reqs.last().unwrap();
    fx.inspections
        .save_evaluation(
            &auditor(),
            last.id,
            SaveEvaluation {
                evaluation_result: EvaluationResult::Yes,
                evaluation_method: Some("site visit".to_string()),
                note: None,
                version: last.version,
            },
        )
        .unwrap();
    let inspection = fx
        .inspections
        .complete(&auditor(), inspection_id, 1)
        .unwrap();
    assert_eq!(inspection.status, InspectionStatus::Inspected);
    assert_eq!(inspection.result, Some(InspectionResult::AwaitingResult));
    assert_eq!(inspection.version, 2);
}

#[test]
fn stale_evaluation_save_conflicts() {
    let fx = setup();
    let farm_id = create_farm(&fx);
    let inspection_id = schedule_inspection(&fx, farm_id);
    let reqs = fx
        .inspections
        .get(&auditor(), inspection_id)
        .unwrap()
        .requirements;
    let req = &reqs[0];

    let save = |version| {
        fx.inspections.save_evaluation(
            &auditor(),
            req.id,
            SaveEvaluation {
                evaluation_result: EvaluationResult::Yes,
                evaluation_method: None,
                note: None,
                version,
            },
        )
    };
    save(1).unwrap();
    let err = save(1).unwrap_err();
    assert!(matches!(err, DomainError::VersionConflict { .. }));
}

#[test]
fn finalize_computes_pass_from_evaluations() {
    let fx = setup();
    let farm_id = create_farm(&fx);
    let inspection_id = schedule_inspection(&fx, farm_id);
    evaluate_all(&fx, inspection_id, usize::MAX);
    let inspection = fx
        .inspections
        .complete(&auditor(), inspection_id, 1)
        .unwrap();

    let outcome = fx
        .inspections
        .finalize(&auditor(), inspection_id, inspection.version)
        .unwrap();
    assert_eq!(outcome.result, InspectionResult::Pass);
    assert_eq!(outcome.summary.main_failed, 0);
    assert_eq!(outcome.summary.secondary_compliance, 100);

    let stored = fx
        .inspections
        .get(&auditor(), inspection_id)
        .unwrap()
        .inspection;
    assert_eq!(stored.result, Some(InspectionResult::Pass));
    assert_eq!(stored.main_failed, Some(0));
    assert_eq!(stored.secondary_compliance, Some(100));
}

#[test]
fn finalize_computes_fail_below_threshold() {
    let fx = setup();
    let farm_id = create_farm(&fx);
    let inspection_id = schedule_inspection(&fx, farm_id);
    // 1 of 2 secondary = 50 % < 60 %
    evaluate_all(&fx, inspection_id, 1);
    let inspection = fx
        .inspections
        .complete(&auditor(), inspection_id, 1)
        .unwrap();

    let outcome = fx
        .inspections
        .finalize(&auditor(), inspection_id, inspection.version)
        .unwrap();
    assert_eq!(outcome.result, InspectionResult::Fail);
    assert_eq!(outcome.summary.secondary_compliance, 50);
}

#[test]
fn finalize_twice_is_rejected() {
    let fx = setup();
    let farm_id = create_farm(&fx);
    let inspection_id = passed_inspection(&fx, farm_id);

    let stored = fx
        .inspections
        .get(&auditor(), inspection_id)
        .unwrap()
        .inspection;
    let err = fx
        .inspections
        .finalize(&auditor(), inspection_id, stored.version)
        .unwrap_err();
    assert!(matches!(err, DomainError::IllegalTransition { .. }));
}

#[test]
fn no_evaluation_after_completion() {
    let fx = setup();
    let farm_id = create_farm(&fx);
    let inspection_id = schedule_inspection(&fx, farm_id);
    evaluate_all(&fx, inspection_id, usize::MAX);
    fx.inspections
        .complete(&auditor(), inspection_id, 1)
        .unwrap();

    let reqs = fx
        .inspections
        .get(&auditor(), inspection_id)
        .unwrap()
        .requirements;
    let req = &reqs[0];
    let err = fx
        .inspections
        .save_evaluation(
            &auditor(),
            req.id,
            SaveEvaluation {
                evaluation_result: EvaluationResult::No,
                evaluation_method: None,
                note: None,
                version: req.version,
            },
        )
        .unwrap_err();
    assert!(matches!(err, DomainError::IllegalTransition { .. }));
}

#[test]
fn farmer_cannot_view_another_farmers_inspection() {
    let fx = setup();
    let farm_id = create_farm(&fx);
    let inspection_id = schedule_inspection(&fx, farm_id);

    assert!(fx.inspections.get(&farmer(), inspection_id).is_ok());
    let err = fx
        .inspections
        .get(&other_farmer(), inspection_id)
        .unwrap_err();
    assert!(matches!(err, DomainError::Authorization { .. }));
}
