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

//! Permission catalog
//!
//! The catalog is the list of known permissions. Groups may still reference
//! ids that are not (or no longer) in the catalog; nothing here enforces
//! referential integrity.

use crate::error::{AccessError, AccessResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Permission category used to group the catalog
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum PermissionCategory {
    /// User management
    User,
    /// Content management
    Content,
    /// System settings
    System,
    /// Analytics and reporting
    Analytics,
}

impl PermissionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionCategory::User => "user",
            PermissionCategory::Content => "content",
            PermissionCategory::System => "system",
            PermissionCategory::Analytics => "analytics",
        }
    }
}

impl fmt::Display for PermissionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PermissionCategory {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(PermissionCategory::User),
            "content" => Ok(PermissionCategory::Content),
            "system" => Ok(PermissionCategory::System),
            "analytics" => Ok(PermissionCategory::Analytics),
            other => Err(AccessError::Config {
                message: format!("Unknown permission category: {}", other),
            }),
        }
    }
}

/// A catalog entry describing one capability
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Permission {
    /// Slug-like identifier derived from the name
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// What the permission allows
    pub description: String,

    /// Catalog category
    pub category: PermissionCategory,
}

impl Permission {
    /// Create a permission with an explicit id
    pub fn new(id: impl Into<String>, name: impl Into<String>, description: impl Into<String>, category: PermissionCategory) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            category,
        }
    }
}

/// What to do when a derived permission id is already in the catalog
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// The new entry overwrites the existing one in place (last write wins)
    #[default]
    Replace,
    /// The add is refused with `AccessError::PermissionExists`
    Reject,
    /// The id gets a numeric suffix (`_2`, `_3`, ...) until it is free
    Suffix,
}

/// Derive a permission id from its display name.
///
/// Lowercases the name and collapses every run of whitespace into a single
/// underscore. Nothing else is stripped, so `"Export  Reports"` becomes
/// `"export_reports"` and `" Audit"` becomes `"_audit"`.
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut in_whitespace = false;

    for ch in lowered.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                slug.push('_');
                in_whitespace = true;
            }
        } else {
            slug.push(ch);
            in_whitespace = false;
        }
    }

    slug
}

/// Ordered collection of known permissions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionCatalog {
    permissions: Vec<Permission>,
    collision_policy: CollisionPolicy,
}

impl PermissionCatalog {
    /// Create an empty catalog
    pub fn new(collision_policy: CollisionPolicy) -> Self {
        Self {
            permissions: Vec::new(),
            collision_policy,
        }
    }

    /// Create a catalog holding the built-in permissions
    pub fn with_defaults(collision_policy: CollisionPolicy) -> Self {
        Self {
            permissions: default_permissions(),
            collision_policy,
        }
    }

    pub fn collision_policy(&self) -> CollisionPolicy {
        self.collision_policy
    }

    /// Add a permission, deriving its id from `name`
    pub fn add_permission(&mut self, name: &str, description: &str, category: PermissionCategory) -> AccessResult<Permission> {
        let mut id = slugify(name);

        if let Some(pos) = self.position(&id) {
            match self.collision_policy {
                CollisionPolicy::Replace => {
                    let permission = Permission::new(id, name, description, category);
                    self.permissions[pos] = permission.clone();
                    info!(permission_id = %permission.id, "Permission replaced");
                    return Ok(permission);
                }
                CollisionPolicy::Reject => {
                    return Err(AccessError::PermissionExists { id });
                }
                CollisionPolicy::Suffix => {
                    id = self.next_free_id(&id);
                }
            }
        }

        let permission = Permission::new(id, name, description, category);
        self.permissions.push(permission.clone());

        info!(permission_id = %permission.id, category = %permission.category, "Permission added");
        Ok(permission)
    }

    /// Remove a permission by id. Returns the removed entry, if any.
    pub fn remove_permission(&mut self, id: &str) -> Option<Permission> {
        match self.position(id) {
            Some(pos) => {
                let removed = self.permissions.remove(pos);
                info!(permission_id = %id, "Permission removed");
                Some(removed)
            }
            None => {
                debug!(permission_id = %id, "Permission not in catalog, nothing removed");
                None
            }
        }
    }

    /// Snapshot of the catalog in insertion order
    pub fn list(&self) -> Vec<Permission> {
        self.permissions.clone()
    }

    pub fn get(&self, id: &str) -> Option<&Permission> {
        self.permissions.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    /// Group the catalog by category.
    ///
    /// Categories appear in the order their first permission was added, and
    /// permissions keep their catalog order within a category.
    pub fn by_category(&self) -> Vec<(PermissionCategory, Vec<Permission>)> {
        let mut grouped: Vec<(PermissionCategory, Vec<Permission>)> = Vec::new();

        for permission in &self.permissions {
            match grouped.iter_mut().find(|(category, _)| *category == permission.category) {
                Some((_, entries)) => entries.push(permission.clone()),
                None => grouped.push((permission.category, vec![permission.clone()])),
            }
        }

        grouped
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.permissions.iter().position(|p| p.id == id)
    }

    fn next_free_id(&self, base: &str) -> String {
        (2..)
            .map(|n| format!("{}_{}", base, n))
            .find(|candidate| !self.contains(candidate))
            .unwrap_or_else(|| base.to_string())
    }
}

/// The built-in permission set
pub fn default_permissions() -> Vec<Permission> {
    vec![
        Permission::new("manage_users", "Manage Users", "Create, update, and delete user accounts", PermissionCategory::User),
        Permission::new("manage_roles", "Manage Roles", "Create and modify user roles", PermissionCategory::User),
        Permission::new("manage_content", "Manage Content", "Create, edit, and delete content", PermissionCategory::Content),
        Permission::new("view_analytics", "View Analytics", "Access system analytics and reports", PermissionCategory::Analytics),
        Permission::new("edit_content", "Edit Content", "Modify existing content", PermissionCategory::Content),
        Permission::new("publish_content", "Publish Content", "Make content publicly available", PermissionCategory::Content),
        Permission::new("moderate_content", "Moderate Content", "Review and moderate user-generated content", PermissionCategory::Content),
        Permission::new("moderate_users", "Moderate Users", "Manage user behavior and interactions", PermissionCategory::User),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Export Reports"), "export_reports");
        assert_eq!(slugify("Export   Reports"), "export_reports");
        assert_eq!(slugify("Manage\tAPI Keys"), "manage_api_keys");
        assert_eq!(slugify(" Audit"), "_audit");
        assert_eq!(slugify("already_slugged"), "already_slugged");
    }

    #[test]
    fn test_slugify_lowercases_whole_words() {
        // Final sigma depends on word context
        assert_eq!(slugify("ΟΔΟΣ"), "οδος");
        assert_eq!(slugify("ΟΔΟΣ ΣΤΟΑ"), "οδος_στοα");
    }

    #[test]
    fn test_default_catalog() {
        let catalog = PermissionCatalog::with_defaults(CollisionPolicy::Replace);

        assert_eq!(catalog.len(), 8);
        assert!(catalog.contains("manage_users"));
        assert!(catalog.contains("moderate_users"));
        assert!(!catalog.contains("view_content"));
    }

    #[test]
    fn test_add_permission_derives_id() {
        let mut catalog = PermissionCatalog::new(CollisionPolicy::Replace);

        let permission = catalog.add_permission("Export Reports", "Download CSV reports", PermissionCategory::Analytics).unwrap();

        assert_eq!(permission.id, "export_reports");
        assert_eq!(permission.name, "Export Reports");
        assert_eq!(catalog.list(), vec![permission]);
    }

    #[test]
    fn test_collision_replace_is_last_write_wins() {
        let mut catalog = PermissionCatalog::with_defaults(CollisionPolicy::Replace);

        let replaced = catalog.add_permission("Manage Users", "Only admins", PermissionCategory::System).unwrap();

        assert_eq!(replaced.id, "manage_users");
        assert_eq!(catalog.len(), 8);
        // Position is kept, contents are the newest write
        assert_eq!(catalog.list()[0].description, "Only admins");
        assert_eq!(catalog.get("manage_users").unwrap().category, PermissionCategory::System);
    }

    #[test]
    fn test_collision_reject() {
        let mut catalog = PermissionCatalog::with_defaults(CollisionPolicy::Reject);

        let result = catalog.add_permission("Manage Users", "dup", PermissionCategory::User);

        assert!(matches!(result, Err(AccessError::PermissionExists { ref id }) if id == "manage_users"));
        assert_eq!(catalog.len(), 8);
        assert_eq!(catalog.get("manage_users").unwrap().description, "Create, update, and delete user accounts");
    }

    #[test]
    fn test_collision_suffix() {
        let mut catalog = PermissionCatalog::with_defaults(CollisionPolicy::Suffix);

        let second = catalog.add_permission("Manage Users", "dup", PermissionCategory::User).unwrap();
        let third = catalog.add_permission("Manage Users", "dup again", PermissionCategory::User).unwrap();

        assert_eq!(second.id, "manage_users_2");
        assert_eq!(third.id, "manage_users_3");
        assert_eq!(catalog.len(), 10);
    }

    #[test]
    fn test_remove_permission() {
        let mut catalog = PermissionCatalog::with_defaults(CollisionPolicy::Replace);

        let removed = catalog.remove_permission("edit_content");
        assert_eq!(removed.map(|p| p.id), Some("edit_content".to_string()));
        assert!(!catalog.contains("edit_content"));

        // Absent ids are a no-op
        assert!(catalog.remove_permission("edit_content").is_none());
        assert_eq!(catalog.len(), 7);
    }

    #[test]
    fn test_by_category_keeps_first_seen_order() {
        let catalog = PermissionCatalog::with_defaults(CollisionPolicy::Replace);

        let grouped = catalog.by_category();
        let categories: Vec<_> = grouped.iter().map(|(c, _)| *c).collect();

        assert_eq!(categories, vec![PermissionCategory::User, PermissionCategory::Content, PermissionCategory::Analytics]);

        let user_ids: Vec<_> = grouped[0].1.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(user_ids, vec!["manage_users", "manage_roles", "moderate_users"]);
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("analytics".parse::<PermissionCategory>().unwrap(), PermissionCategory::Analytics);
        assert!("billing".parse::<PermissionCategory>().is_err());
    }
}
