//! The authenticated caller and permission enforcement.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Permission, Role};

/// Identity a request runs as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: String,
    pub username: String,
    #[serde(default)]
    pub role: Role,
    /// Company a viewer is restricted to.
    #[serde(default)]
    pub company: Option<String>,
}

impl Principal {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            role,
            company: None,
        }
    }

    /// Binds the principal to a company.
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    /// Checks that the principal's role grants `permission`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::Denied`] if it does not.
    pub fn enforce(&self, permission: Permission) -> Result<(), AccessError> {
        if self.role.allows(permission) {
            debug!(
                user = %self.username,
                role = %self.role,
                %permission,
                "access granted"
            );
            Ok(())
        } else {
            warn!(
                user = %self.username,
                role = %self.role,
                %permission,
                "access denied"
            );
            Err(AccessError::Denied {
                role: self.role,
                permission,
            })
        }
    }

    /// Returns the company every listing must be restricted to, if any.
    ///
    /// Only viewers are scoped; a company on an admin or inspector account
    /// is informational.
    pub fn company_scope(&self) -> Option<&str> {
        match self.role {
            Role::Viewer => self.company.as_deref().filter(|c| !c.is_empty()),
            Role::Admin | Role::Inspector => None,
        }
    }
}

/// Access-control failures.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("role '{role}' may not {permission}")]
    Denied { role: Role, permission: Permission },
}
