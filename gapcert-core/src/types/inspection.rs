//! Inspection tree: inspection → items → requirement evaluations, plus
//! the master checklist templates the scheduler copies from.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionStatus {
    AwaitingSchedule,
    AwaitingInspection,
    Inspected,
}

impl InspectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwaitingSchedule => "awaiting_schedule",
            Self::AwaitingInspection => "awaiting_inspection",
            Self::Inspected => "inspected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "awaiting_schedule" => Some(Self::AwaitingSchedule),
            "awaiting_inspection" => Some(Self::AwaitingInspection),
            "inspected" => Some(Self::Inspected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionResult {
    AwaitingResult,
    Pass,
    Fail,
}

impl InspectionResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwaitingResult => "awaiting_result",
            Self::Pass => "pass",
            Self::Fail => "fail",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "awaiting_result" => Some(Self::AwaitingResult),
            "pass" => Some(Self::Pass),
            "fail" => Some(Self::Fail),
            _ => None,
        }
    }
}

/// Primary failures block certification outright; secondary failures are
/// tolerated up to the configured compliance threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementLevel {
    Primary,
    Secondary,
}

impl RequirementLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "primary" => Some(Self::Primary),
            "secondary" => Some(Self::Secondary),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationResult {
    Yes,
    No,
    NotApplicable,
}

impl EvaluationResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::NotApplicable => "not_applicable",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "yes" => Some(Self::Yes),
            "no" => Some(Self::No),
            "not_applicable" => Some(Self::NotApplicable),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    pub id: i64,
    pub rubber_farm_id: i64,
    pub inspection_type_id: i64,
    /// Scheduled visit time, epoch seconds.
    pub inspection_date_time: i64,
    pub chief_auditor_id: i64,
    pub status: InspectionStatus,
    /// Meaningful once `status = Inspected`; `AwaitingResult` until
    /// finalization computes `Pass`/`Fail`.
    pub result: Option<InspectionResult>,
    /// Aggregate columns persisted at finalization.
    pub main_failed: Option<i64>,
    pub secondary_compliance: Option<i64>,
    pub version: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Inspection {
    /// Terminal means the result can never change again: `Inspected`
    /// with a computed `Pass`/`Fail`.
    pub fn is_terminal(&self) -> bool {
        self.status == InspectionStatus::Inspected
            && matches!(
                self.result,
                Some(InspectionResult::Pass) | Some(InspectionResult::Fail)
            )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionItem {
    pub id: i64,
    pub inspection_id: i64,
    pub item_no: i64,
    pub name: String,
    pub version: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    pub id: i64,
    pub inspection_item_id: i64,
    pub requirement_no: i64,
    pub name: String,
    pub level: RequirementLevel,
    /// `None` until the auditor records an evaluation.
    pub evaluation_result: Option<EvaluationResult>,
    pub evaluation_method: Option<String>,
    pub note: Option<String>,
    pub version: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

// ─── Master checklist templates (read-mostly reference data) ───────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionType {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemTemplate {
    pub id: i64,
    pub inspection_type_id: i64,
    pub item_no: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementTemplate {
    pub id: i64,
    pub item_template_id: i64,
    pub requirement_no: i64,
    pub name: String,
    pub level: RequirementLevel,
}
