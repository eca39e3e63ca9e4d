//! The authenticated principal threaded through every service call.
//!
//! Authentication itself is an external collaborator (an upstream
//! gateway); gapcert only consumes the resulting identity and role.

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Farmer,
    Auditor,
    Committee,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Farmer => "farmer",
            Role::Auditor => "auditor",
            Role::Committee => "committee",
            Role::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "farmer" => Some(Role::Farmer),
            "auditor" => Some(Role::Auditor),
            "committee" => Some(Role::Committee),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i64,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: i64, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Reject the call unless the principal holds the given role.
    pub fn require(&self, role: Role) -> Result<(), DomainError> {
        if self.role == role {
            Ok(())
        } else {
            Err(DomainError::authorization(format!(
                "requires {} role",
                role.as_str()
            )))
        }
    }
}
