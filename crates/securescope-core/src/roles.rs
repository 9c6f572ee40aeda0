// SecureScope
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Role definitions and role-default grants

use crate::error::AccessError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Coarse-grained identity classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full administrative access
    Admin,
    /// Content and user moderation
    Moderator,
    /// Standard user
    User,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Moderator, Role::User];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Moderator => "moderator",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "moderator" => Ok(Role::Moderator),
            "user" => Ok(Role::User),
            other => Err(AccessError::Config {
                message: format!("Unknown role: {}", other),
            }),
        }
    }
}

/// Baseline permission ids granted by each role, independent of groups.
///
/// Kept as plain configuration so a resolver can be run against any table.
/// The default table is ordered admin ⊇ moderator by content, but nothing
/// here enforces an ordering between roles. When deserialized, roles that
/// are not listed keep their default grants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RoleDefaults {
    pub admin: BTreeSet<String>,
    pub moderator: BTreeSet<String>,
    pub user: BTreeSet<String>,
}

impl RoleDefaults {
    /// A table granting nothing to any role
    pub fn empty() -> Self {
        Self {
            admin: BTreeSet::new(),
            moderator: BTreeSet::new(),
            user: BTreeSet::new(),
        }
    }

    /// Permission ids granted to `role`
    pub fn permissions_for(&self, role: Role) -> &BTreeSet<String> {
        match role {
            Role::Admin => &self.admin,
            Role::Moderator => &self.moderator,
            Role::User => &self.user,
        }
    }

    /// Whether `role` grants `permission_id` by default
    pub fn grants(&self, role: Role, permission_id: &str) -> bool {
        self.permissions_for(role).contains(permission_id)
    }

    /// Replace the grants for one role
    pub fn set<I, S>(&mut self, role: Role, permissions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let permissions = permissions.into_iter().map(Into::into).collect();
        match role {
            Role::Admin => self.admin = permissions,
            Role::Moderator => self.moderator = permissions,
            Role::User => self.user = permissions,
        }
    }

    /// Builder-style variant of [`RoleDefaults::set`]
    pub fn with<I, S>(mut self, role: Role, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(role, permissions);
        self
    }
}

impl Default for RoleDefaults {
    fn default() -> Self {
        Self::empty()
            .with(Role::Admin, ["manage_users", "manage_roles", "manage_content", "view_analytics"])
            .with(Role::Moderator, ["manage_content", "view_analytics"])
            .with(Role::User, ["view_content"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_role_grants() {
        let defaults = RoleDefaults::default();

        assert!(defaults.grants(Role::Admin, "manage_users"));
        assert!(defaults.grants(Role::Moderator, "view_analytics"));
        assert!(!defaults.grants(Role::Moderator, "manage_users"));
        assert!(defaults.grants(Role::User, "view_content"));
        assert!(!defaults.grants(Role::User, "edit_content"));
    }

    #[test]
    fn test_admin_covers_moderator_by_default() {
        let defaults = RoleDefaults::default();

        assert!(defaults.moderator.is_subset(&defaults.admin));
    }

    #[test]
    fn test_set_replaces_grants() {
        let defaults = RoleDefaults::default().with(Role::User, ["edit_content"]);

        assert!(defaults.grants(Role::User, "edit_content"));
        assert!(!defaults.grants(Role::User, "view_content"));
    }

    #[test]
    fn test_role_round_trip_through_str() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("owner".parse::<Role>().is_err());
    }
}
