//! Shared fixtures: in-memory database, services, principals, and a
//! small seeded checklist (2 primary + 2 secondary requirements).
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use gapcert_core::types::{
    EvaluationResult, FarmData, PlantingData, Principal, RequirementLevel, Role,
};
use gapcert_service::certificates::CertificateService;
use gapcert_service::farms::FarmService;
use gapcert_service::inspections::{InspectionService, SaveEvaluation, ScheduleInspection};
use gapcert_service::audit_logs::AuditLogService;
use gapcert_storage::connection::DatabaseManager;
use gapcert_storage::queries::templates;

pub const COMPLIANCE_THRESHOLD: u32 = 60;
pub const VALIDITY_MONTHS: u32 = 24;
pub const MAX_PAGE_LIMIT: u32 = 200;

pub struct Fixture {
    pub db: Arc<DatabaseManager>,
    pub farms: FarmService,
    pub inspections: InspectionService,
    pub certificates: CertificateService,
    pub audit_logs: AuditLogService,
    pub inspection_type_id: i64,
}

pub fn farmer() -> Principal {
    Principal::new(101, Role::Farmer)
}

pub fn other_farmer() -> Principal {
    Principal::new(102, Role::Farmer)
}

pub fn auditor() -> Principal {
    Principal::new(201, Role::Auditor)
}

pub fn committee() -> Principal {
    Principal::new(301, Role::Committee)
}

pub fn admin() -> Principal {
    Principal::new(401, Role::Admin)
}

pub fn setup() -> Fixture {
    let db = Arc::new(DatabaseManager::open_in_memory().unwrap());

    // Minimal master checklist: one item with the two primary
    // requirements, one with the two secondary ones.
    let inspection_type_id = db
        .with_writer(|conn| {
            let type_id = templates::insert_type(conn, "GAP initial certification")?;
            let item1 = templates::insert_item_template(conn, type_id, 1, "Water and soil")?;
            templates::insert_requirement_template(
                conn,
                item1,
                1,
                "No prohibited agrochemicals in use",
                RequirementLevel::Primary,
            )?;
            templates::insert_requirement_template(
                conn,
                item1,
                2,
                "Water source free of contamination",
                RequirementLevel::Primary,
            )?;
            let item2 = templates::insert_item_template(conn, type_id, 2, "Record keeping")?;
            templates::insert_requirement_template(
                conn,
                item2,
                1,
                "Tapping records maintained",
                RequirementLevel::Secondary,
            )?;
            templates::insert_requirement_template(
                conn,
                item2,
                2,
                "Fertilizer log maintained",
                RequirementLevel::Secondary,
            )?;
            Ok::<_, gapcert_core::errors::StorageError>(type_id)
        })
        .unwrap();

    Fixture {
        farms: FarmService::new(Arc::clone(&db), MAX_PAGE_LIMIT),
        inspections: InspectionService::new(
            Arc::clone(&db),
            COMPLIANCE_THRESHOLD,
            MAX_PAGE_LIMIT,
        ),
        certificates: CertificateService::new(Arc::clone(&db), VALIDITY_MONTHS, MAX_PAGE_LIMIT),
        audit_logs: AuditLogService::new(Arc::clone(&db), 365, MAX_PAGE_LIMIT),
        db,
        inspection_type_id,
    }
}

pub fn farm_data() -> FarmData {
    FarmData {
        village_name: "Ban Nong Sai".to_string(),
        moo: Some("4".to_string()),
        road: None,
        alley: None,
        subdistrict: "Na Bon".to_string(),
        district: "Na Bon".to_string(),
        province: "Nakhon Si Thammarat".to_string(),
    }
}

pub fn planting_data() -> PlantingData {
    PlantingData {
        specie: "RRIM 600".to_string(),
        area_of_plot: 12.5,
        number_of_rubber: 900,
        number_of_tapping: 750,
        age_of_rubber: 9,
        year_of_tapping: Some(2020),
        month_of_tapping: Some(5),
        total_production: Some(3_200.0),
    }
}

/// Register a farm owned by [`farmer`] and return its id.
pub fn create_farm(fx: &Fixture) -> i64 {
    let (farm, _) = fx
        .farms
        .create(&farmer(), farm_data(), vec![planting_data()])
        .unwrap();
    farm.id
}

/// Schedule an inspection for tomorrow and return its id.
pub fn schedule_inspection(fx: &Fixture, farm_id: i64) -> i64 {
    fx.inspections
        .schedule(
            &auditor(),
            ScheduleInspection {
                rubber_farm_id: farm_id,
                inspection_type_id: fx.inspection_type_id,
                inspection_date_and_time: Utc::now() + Duration::days(1),
                additional_auditor_ids: vec![202],
            },
        )
        .unwrap()
}

/// Evaluate every requirement of an inspection; `secondary_yes` controls
/// how many secondary requirements get a Yes (the rest get No), primaries
/// are always Yes.
pub fn evaluate_all(fx: &Fixture, inspection_id: i64, secondary_yes: usize) {
    let reqs = fx
        .inspections
        .get(&auditor(), inspection_id)
        .unwrap()
        .requirements;
    let mut secondary_seen = 0;
    for req in reqs {
        let result = match req.level {
            RequirementLevel::Primary => EvaluationResult::Yes,
            RequirementLevel::Secondary => {
                secondary_seen += 1;
                if secondary_seen <= secondary_yes {
                    EvaluationResult::Yes
                } else {
                    EvaluationResult::No
                }
            }
        };
        fx.inspections
            .save_evaluation(
                &auditor(),
                req.id,
                SaveEvaluation {
                    evaluation_result: result,
                    evaluation_method: Some("site visit".to_string()),
                    note: None,
                    version: req.version,
                },
            )
            .unwrap();
    }
}

/// Drive an inspection to a terminal Pass and return its id.
pub fn passed_inspection(fx: &Fixture, farm_id: i64) -> i64 {
    let inspection_id = schedule_inspection(fx, farm_id);
    evaluate_all(fx, inspection_id, usize::MAX);
    let inspection = fx
        .inspections
        .complete(&auditor(), inspection_id, 1)
        .unwrap();
    fx.inspections
        .finalize(&auditor(), inspection_id, inspection.version)
        .unwrap();
    inspection_id
}
