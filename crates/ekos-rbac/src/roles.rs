#![allow(clippy::match_same_arms)]
//! Role and permission definitions.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Role attached to every user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access, including catalog management.
    Admin,

    /// Field inspector.
    ///
    /// **Permissions:**
    /// - Create, edit and delete reports
    /// - Cannot manage projects or categories
    Inspector,

    /// Read-only access, optionally limited to one company.
    #[default]
    Viewer,
}

/// An action guarded by a role check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ReadReports,
    WriteReports,
    /// Create and delete projects and categories.
    ManageCatalog,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Inspector, Role::Viewer];

    /// Returns whether this role grants `permission`.
    pub fn allows(&self, permission: Permission) -> bool {
        match (self, permission) {
            (Role::Admin, _) => true,
            (Role::Inspector, Permission::ReadReports | Permission::WriteReports) => true,
            (Role::Inspector, _) => false,
            (Role::Viewer, Permission::ReadReports) => true,
            (Role::Viewer, _) => false,
        }
    }

    pub fn can_write(&self) -> bool {
        self.allows(Permission::WriteReports)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Inspector => "inspector",
            Role::Viewer => "viewer",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Permission::ReadReports => "read reports",
            Permission::WriteReports => "write reports",
            Permission::ManageCatalog => "manage catalog",
        };
        f.write_str(name)
    }
}
