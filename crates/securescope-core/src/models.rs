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

//! User and group data models

use crate::roles::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Unique user identifier
    pub id: String,

    /// Login email (not required to be unique)
    pub email: String,

    /// Display name
    pub name: String,

    /// Role, fixed at creation
    pub role: Role,

    /// Avatar image URL
    pub avatar: String,

    /// Ids of the groups this user belongs to.
    /// Always the mirror of `Group::members`.
    pub groups: BTreeSet<String>,

    /// Login secret, compared verbatim
    #[serde(skip_serializing, default)]
    pub credential_secret: String,

    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_member_of(&self, group_id: &str) -> bool {
        self.groups.contains(group_id)
    }

    /// Exact, case-sensitive credential comparison
    pub fn matches_credentials(&self, email: &str, credential_secret: &str) -> bool {
        self.email == email && self.credential_secret == credential_secret
    }
}

/// Named bundle of permissions plus its member list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Group {
    /// Unique group identifier, assigned by the store
    pub id: String,

    /// Group name
    pub name: String,

    /// Group description
    pub description: String,

    /// Granted permission ids; may name ids missing from the catalog
    pub permissions: BTreeSet<String>,

    /// Ids of member users. Always the mirror of `User::groups`.
    pub members: BTreeSet<String>,

    /// Group creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Group {
    pub fn grants(&self, permission_id: &str) -> bool {
        self.permissions.contains(permission_id)
    }

    pub fn has_member(&self, user_id: &str) -> bool {
        self.members.contains(user_id)
    }
}

/// User creation request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub credential_secret: String,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: Role, credential_secret: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            role,
            credential_secret: credential_secret.into(),
        }
    }
}

/// Group creation request. The id is always assigned by the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewGroup {
    pub name: String,
    pub description: String,
    pub permissions: BTreeSet<String>,
}

impl NewGroup {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            permissions: BTreeSet::new(),
        }
    }

    /// Set the initial permission ids
    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }
}
