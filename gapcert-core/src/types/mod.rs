//! Domain records and value types shared across the workspace.

pub mod audit;
pub mod certificate;
pub mod farm;
pub mod inspection;
pub mod listing;
pub mod principal;

pub use audit::{AuditAction, AuditLogEntry};
pub use certificate::{Certificate, CertificateState, MAX_CANCEL_DETAIL_LEN};
pub use farm::{FarmData, PlantingData, PlantingDetail, RubberFarm};
pub use inspection::{
    EvaluationResult, Inspection, InspectionItem, InspectionResult, InspectionStatus,
    InspectionType, ItemTemplate, Requirement, RequirementLevel, RequirementTemplate,
};
pub use listing::{Page, Paginator, PageRequest, SortOrder, SortSpec};
pub use principal::{Principal, Role};
