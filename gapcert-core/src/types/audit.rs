//! Audit trail entries — append-only who/what/when records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "CREATE" => Some(Self::Create),
            "UPDATE" => Some(Self::Update),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }
}

/// One immutable audit record. Snapshots are opaque serialized documents:
/// different tables produce different shapes, so no structural type is
/// forced across them; consumers compute field diffs on read if needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: i64,
    pub table_name: String,
    pub record_id: i64,
    pub action: AuditAction,
    pub user_id: i64,
    /// `None` for CREATE.
    pub old_data: Option<Value>,
    /// `None` for DELETE.
    pub new_data: Option<Value>,
    pub created_at: i64,
}
