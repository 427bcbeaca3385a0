//! Caller identity as supplied by the upstream identity provider.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Role of an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular staff member.
    Staff,
    /// Administrator who decides leave and edits policy.
    Admin,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "staff" => Ok(Role::Staff),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// An already-authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// The caller's user id.
    pub user_id: String,
    /// The caller's role.
    pub role: Role,
}

impl Identity {
    /// Creates an identity.
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    /// Returns true for administrators.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fails with `Forbidden` unless the caller is an administrator.
    pub fn require_admin(&self) -> EngineResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(EngineError::Forbidden {
                message: "administrator role required".to_string(),
            })
        }
    }

    /// Fails with `Forbidden` unless the caller is `user_id` or an admin.
    pub fn require_self_or_admin(&self, user_id: &str) -> EngineResult<()> {
        if self.is_admin() || self.user_id == user_id {
            Ok(())
        } else {
            Err(EngineError::Forbidden {
                message: format!("cannot access records of user '{}'", user_id),
            })
        }
    }
}
