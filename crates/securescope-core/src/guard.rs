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

//! Access decisions for protected views

use crate::error::AccessError;
use crate::models::{Group, User};
use crate::resolver::has_permission;
use crate::roles::{Role, RoleDefaults};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of guarding a protected view
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AccessDecision {
    /// Render the view
    Granted,
    /// No session; send the caller to login
    LoginRequired,
    /// Authenticated but missing the required permission; send the caller home
    Forbidden,
}

/// Dashboard variant shown on the home view
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DashboardKind {
    Admin,
    Moderator,
    User,
}

impl DashboardKind {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Admin => DashboardKind::Admin,
            Role::Moderator => DashboardKind::Moderator,
            Role::User => DashboardKind::User,
        }
    }
}

/// Protected views and the permission each one requires
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Home,
    Users,
    Groups,
    Analytics,
    Settings,
}

impl View {
    pub const ALL: [View; 5] = [View::Home, View::Users, View::Groups, View::Analytics, View::Settings];

    pub fn as_str(&self) -> &'static str {
        match self {
            View::Home => "home",
            View::Users => "users",
            View::Groups => "groups",
            View::Analytics => "analytics",
            View::Settings => "settings",
        }
    }

    /// Permission needed beyond an authenticated session, if any
    pub fn required_permission(&self) -> Option<&'static str> {
        match self {
            View::Users => Some("manage_users"),
            View::Groups => Some("manage_roles"),
            View::Analytics => Some("view_analytics"),
            View::Home | View::Settings => None,
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for View {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        View::ALL.into_iter().find(|view| view.as_str() == s).ok_or_else(|| AccessError::Config {
            message: format!("Unknown view: {}", s),
        })
    }
}

/// Decide whether `user` may open a view guarded by `required_permission`.
/// A view with no requirement only needs an authenticated user.
pub fn decide(user: Option<&User>, required_permission: Option<&str>, role_defaults: &RoleDefaults, groups: &[Group]) -> AccessDecision {
    let Some(user) = user else {
        return AccessDecision::LoginRequired;
    };

    match required_permission {
        Some(permission) if !has_permission(Some(user), permission, role_defaults, groups) => AccessDecision::Forbidden,
        _ => AccessDecision::Granted,
    }
}
