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

//! Identity and group store
//!
//! Owns every user and group and the many-to-many membership relation
//! between them. `User::groups` and `Group::members` are two views of that
//! one relation: every mutation here updates both sides before returning.
//!
//! Mutations that name an unknown user or group do nothing and report it in
//! their return value instead of failing.

use crate::error::AccessResult;
use crate::models::{Group, NewGroup, NewUser, User};
use crate::roles::Role;
use crate::validation::{AcceptAll, UserValidator};
use chrono::Utc;
use rand::seq::SliceRandom;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Outcome of a membership mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipChange {
    /// The relation was modified
    Changed,
    /// The relation already had the requested shape
    Unchanged,
    /// No user with the given id; nothing was touched
    UnknownUser,
    /// No group with the given id; nothing was touched
    UnknownGroup,
}

impl MembershipChange {
    /// Whether both ids resolved
    pub fn is_applied(&self) -> bool {
        matches!(self, MembershipChange::Changed | MembershipChange::Unchanged)
    }
}

/// In-memory user and group store
#[derive(Debug)]
pub struct IdentityStore {
    users: Vec<User>,
    groups: Vec<Group>,
    avatar_pool: Vec<String>,
    validator: Box<dyn UserValidator>,
}

impl IdentityStore {
    /// Create an empty store
    pub fn new(avatar_pool: Vec<String>, validator: Box<dyn UserValidator>) -> Self {
        Self {
            users: Vec::new(),
            groups: Vec::new(),
            avatar_pool,
            validator,
        }
    }

    /// Create a user. The id, avatar and empty group set are assigned here.
    pub fn create_user(&mut self, request: NewUser) -> AccessResult<User> {
        self.validator.validate(&request, &self.users)?;

        let user = User {
            id: self.fresh_id("u", |store, id| store.user_index(id).is_some()),
            email: request.email,
            name: request.name,
            role: request.role,
            avatar: self.pick_avatar(),
            groups: BTreeSet::new(),
            credential_secret: request.credential_secret,
            created_at: Utc::now(),
        };

        self.users.push(user.clone());

        info!(user_id = %user.id, role = %user.role, "User created");
        Ok(user)
    }

    /// Create a group with no members. Permission ids are stored as given.
    pub fn create_group(&mut self, request: NewGroup) -> Group {
        let group = Group {
            id: self.fresh_id("g", |store, id| store.group_index(id).is_some()),
            name: request.name,
            description: request.description,
            permissions: request.permissions,
            members: BTreeSet::new(),
            created_at: Utc::now(),
        };

        self.groups.push(group.clone());

        info!(group_id = %group.id, group_name = %group.name, permission_count = %group.permissions.len(), "Group created");
        group
    }

    /// Replace a group's permission set wholesale
    pub fn update_group_permissions(&mut self, group_id: &str, permissions: BTreeSet<String>) -> Option<Group> {
        let Some(index) = self.group_index(group_id) else {
            debug!(group_id = %group_id, "Ignoring permission update for unknown group");
            return None;
        };

        let group = &mut self.groups[index];
        group.permissions = permissions;

        info!(group_id = %group_id, permission_count = %group.permissions.len(), "Group permissions updated");
        Some(group.clone())
    }

    /// Remove `permission_id` from the group if present, add it otherwise
    pub fn toggle_group_permission(&mut self, group_id: &str, permission_id: &str) -> Option<Group> {
        let Some(index) = self.group_index(group_id) else {
            debug!(group_id = %group_id, "Ignoring permission toggle for unknown group");
            return None;
        };

        let group = &mut self.groups[index];
        let granted = if group.permissions.remove(permission_id) {
            false
        } else {
            group.permissions.insert(permission_id.to_string());
            true
        };

        info!(group_id = %group_id, permission_id = %permission_id, granted = %granted, "Group permission toggled");
        Some(group.clone())
    }

    /// Add a membership. Both sides are updated together.
    pub fn add_user_to_group(&mut self, user_id: &str, group_id: &str) -> MembershipChange {
        let (user_index, group_index) = match self.resolve_pair(user_id, group_id) {
            Ok(pair) => pair,
            Err(outcome) => return outcome,
        };

        let user_changed = self.users[user_index].groups.insert(group_id.to_string());
        let group_changed = self.groups[group_index].members.insert(user_id.to_string());

        if user_changed || group_changed {
            info!(user_id = %user_id, group_id = %group_id, "User added to group");
            MembershipChange::Changed
        } else {
            MembershipChange::Unchanged
        }
    }

    /// Remove a membership. Both sides are updated together.
    pub fn remove_user_from_group(&mut self, user_id: &str, group_id: &str) -> MembershipChange {
        let (user_index, group_index) = match self.resolve_pair(user_id, group_id) {
            Ok(pair) => pair,
            Err(outcome) => return outcome,
        };

        let user_changed = self.users[user_index].groups.remove(group_id);
        let group_changed = self.groups[group_index].members.remove(user_id);

        if user_changed || group_changed {
            info!(user_id = %user_id, group_id = %group_id, "User removed from group");
            MembershipChange::Changed
        } else {
            MembershipChange::Unchanged
        }
    }

    /// Snapshot of all users in creation order
    pub fn list_users(&self) -> Vec<User> {
        self.users.clone()
    }

    /// Snapshot of all groups in creation order
    pub fn list_groups(&self) -> Vec<Group> {
        self.groups.clone()
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn get_user(&self, user_id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == user_id)
    }

    pub fn get_group(&self, group_id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == group_id)
    }

    /// First user, in creation order, whose email and secret both match exactly
    pub fn find_user_by_credentials(&self, email: &str, credential_secret: &str) -> Option<&User> {
        self.users.iter().find(|u| u.matches_credentials(email, credential_secret))
    }

    pub fn users_with_role(&self, role: Role) -> Vec<User> {
        self.users.iter().filter(|u| u.role == role).cloned().collect()
    }

    /// Groups the user belongs to, in group creation order
    pub fn groups_for_user(&self, user_id: &str) -> Vec<Group> {
        match self.get_user(user_id) {
            Some(user) => self.groups.iter().filter(|g| user.groups.contains(&g.id)).cloned().collect(),
            None => Vec::new(),
        }
    }

    /// Members of the group, in user creation order
    pub fn members_of_group(&self, group_id: &str) -> Vec<User> {
        match self.get_group(group_id) {
            Some(group) => self.users.iter().filter(|u| group.members.contains(&u.id)).cloned().collect(),
            None => Vec::new(),
        }
    }

    /// Check that every membership is recorded on both sides and that every
    /// recorded id points at an existing entity
    pub fn is_consistent(&self) -> bool {
        let users_ok = self.users.iter().all(|user| {
            user.groups
                .iter()
                .all(|group_id| self.get_group(group_id).is_some_and(|group| group.members.contains(&user.id)))
        });

        let groups_ok = self.groups.iter().all(|group| {
            group
                .members
                .iter()
                .all(|user_id| self.get_user(user_id).is_some_and(|user| user.groups.contains(&group.id)))
        });

        users_ok && groups_ok
    }

    /// Insert a fully formed user with no memberships. Used for seeding.
    /// Returns false if the id is already taken.
    pub(crate) fn insert_user(&mut self, mut user: User) -> bool {
        if self.user_index(&user.id).is_some() {
            return false;
        }
        user.groups.clear();
        self.users.push(user);
        true
    }

    /// Insert a fully formed group with no members. Used for seeding.
    /// Returns false if the id is already taken.
    pub(crate) fn insert_group(&mut self, mut group: Group) -> bool {
        if self.group_index(&group.id).is_some() {
            return false;
        }
        group.members.clear();
        self.groups.push(group);
        true
    }

    fn resolve_pair(&self, user_id: &str, group_id: &str) -> Result<(usize, usize), MembershipChange> {
        let Some(user_index) = self.user_index(user_id) else {
            debug!(user_id = %user_id, group_id = %group_id, "Ignoring membership change for unknown user");
            return Err(MembershipChange::UnknownUser);
        };
        let Some(group_index) = self.group_index(group_id) else {
            debug!(user_id = %user_id, group_id = %group_id, "Ignoring membership change for unknown group");
            return Err(MembershipChange::UnknownGroup);
        };
        Ok((user_index, group_index))
    }

    fn user_index(&self, user_id: &str) -> Option<usize> {
        self.users.iter().position(|u| u.id == user_id)
    }

    fn group_index(&self, group_id: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.id == group_id)
    }

    fn fresh_id(&self, prefix: &str, taken: impl Fn(&Self, &str) -> bool) -> String {
        loop {
            let id = format!("{}{}", prefix, uuid::Uuid::new_v4().simple());
            if !taken(self, &id) {
                return id;
            }
        }
    }

    fn pick_avatar(&self) -> String {
        self.avatar_pool.choose(&mut rand::thread_rng()).cloned().unwrap_or_default()
    }
}

impl Default for IdentityStore {
    fn default() -> Self {
        Self::new(Vec::new(), Box::new(AcceptAll))
    }
}
