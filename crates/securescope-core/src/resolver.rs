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

//! Permission resolution
//!
//! A user holds a permission when their role grants it by default or when
//! one of the groups named in `User::groups` lists it. The role table is
//! always consulted first; groups are only scanned when the role does not
//! grant the permission. Catalog membership plays no part.

use crate::models::{Group, User};
use crate::roles::{Role, RoleDefaults};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Where a granted permission comes from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Grant {
    /// Baseline grant of the user's role
    Role { role: Role },
    /// Grant through membership of a group
    Group { group_id: String },
}

/// Check whether `user` holds `permission_id`. An absent user holds nothing.
pub fn has_permission(user: Option<&User>, permission_id: &str, role_defaults: &RoleDefaults, groups: &[Group]) -> bool {
    explain_permission(user, permission_id, role_defaults, groups).is_some()
}

/// Like [`has_permission`], but reports the first source that grants it.
///
/// A role grant wins over any group grant. Among groups, the first one in
/// `groups` order that the user belongs to and that lists the permission is
/// reported.
pub fn explain_permission(user: Option<&User>, permission_id: &str, role_defaults: &RoleDefaults, groups: &[Group]) -> Option<Grant> {
    let user = user?;

    if role_defaults.grants(user.role, permission_id) {
        return Some(Grant::Role { role: user.role });
    }

    member_groups(user, groups)
        .find(|group| group.grants(permission_id))
        .map(|group| Grant::Group { group_id: group.id.clone() })
}

/// Every permission id the user holds, from the role and from all groups.
/// May include ids that are not in the catalog.
pub fn effective_permissions(user: Option<&User>, role_defaults: &RoleDefaults, groups: &[Group]) -> BTreeSet<String> {
    let Some(user) = user else {
        return BTreeSet::new();
    };

    let mut permissions = role_defaults.permissions_for(user.role).clone();
    for group in member_groups(user, groups) {
        permissions.extend(group.permissions.iter().cloned());
    }

    permissions
}

fn member_groups<'a>(user: &'a User, groups: &'a [Group]) -> impl Iterator<Item = &'a Group> + 'a {
    groups.iter().filter(move |group| user.groups.contains(&group.id))
}
