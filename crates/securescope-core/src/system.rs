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

//! Access-control system that coordinates the catalog, the identity store
//! and the session.
//!
//! Each instance owns its own state; there is no process-wide store. Every
//! store mutation runs inside a single write lock so the membership relation
//! is never observed half-updated. When both are needed, the store lock is
//! always taken before the session lock.

use crate::catalog::{Permission, PermissionCatalog, PermissionCategory};
use crate::config::AccessConfig;
use crate::error::AccessResult;
use crate::guard::{self, AccessDecision, DashboardKind, View};
use crate::models::{Group, NewGroup, NewUser, User};
use crate::resolver::{self, Grant};
use crate::roles::{Role, RoleDefaults};
use crate::seed::seed_store;
use crate::session::{Session, SessionManager};
use crate::store::{IdentityStore, MembershipChange};
use crate::validation::validator_for;
use parking_lot::RwLock;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Access-control entry point used by the presentation layer
#[derive(Debug)]
pub struct AccessControl {
    /// Active configuration
    config: AccessConfig,

    /// Users, groups and memberships
    store: RwLock<IdentityStore>,

    /// Known permissions
    catalog: RwLock<PermissionCatalog>,

    /// Current session
    session: RwLock<SessionManager>,
}

impl AccessControl {
    /// Create a system from `config`, seeding demo data if enabled
    pub fn new(config: AccessConfig) -> Self {
        let mut store = IdentityStore::new(config.avatar_pool.clone(), validator_for(config.unique_emails));

        let catalog = if config.seed_demo_data {
            seed_store(&mut store);
            PermissionCatalog::with_defaults(config.permission_collision)
        } else {
            PermissionCatalog::new(config.permission_collision)
        };

        info!(
            users = %store.list_users().len(),
            groups = %store.list_groups().len(),
            permissions = %catalog.len(),
            "Access control initialized"
        );

        Self {
            config,
            store: RwLock::new(store),
            catalog: RwLock::new(catalog),
            session: RwLock::new(SessionManager::new()),
        }
    }

    /// Create a system from environment configuration
    pub fn from_env() -> Self {
        Self::new(AccessConfig::from_env())
    }

    pub fn config(&self) -> &AccessConfig {
        &self.config
    }

    pub fn role_defaults(&self) -> &RoleDefaults {
        &self.config.role_defaults
    }

    // Session

    /// Log in by exact email and secret match, after the configured delay.
    /// No lock is held while waiting.
    pub async fn login(&self, email: &str, credential_secret: &str) -> AccessResult<User> {
        let delay = self.config.login_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let store = self.store.read();
        self.session.write().login(&store, email, credential_secret)
    }

    /// Discard the current session, if any
    pub fn logout(&self) -> Option<Session> {
        self.session.write().logout()
    }

    pub fn session(&self) -> Option<Session> {
        self.session.read().current().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.read().is_authenticated()
    }

    /// The session user as currently stored, so membership edits made after
    /// login are visible
    pub fn current_user(&self) -> Option<User> {
        let store = self.store.read();
        self.session_user(&store).cloned()
    }

    // Authorization

    /// Whether the session user holds `permission_id`
    pub fn has_permission(&self, permission_id: &str) -> bool {
        let store = self.store.read();
        let user = self.session_user(&store);
        let granted = resolver::has_permission(user, permission_id, &self.config.role_defaults, store.groups());

        debug!(
            user_id = %user.map(|u| u.id.as_str()).unwrap_or("anonymous"),
            permission_id = %permission_id,
            granted = %granted,
            "Permission check completed"
        );

        granted
    }

    /// Whether the stored user `user_id` holds `permission_id`.
    /// Unknown users hold nothing.
    pub fn user_has_permission(&self, user_id: &str, permission_id: &str) -> bool {
        let store = self.store.read();
        resolver::has_permission(store.get_user(user_id), permission_id, &self.config.role_defaults, store.groups())
    }

    /// Which source grants `permission_id` to the session user
    pub fn explain_permission(&self, permission_id: &str) -> Option<Grant> {
        let store = self.store.read();
        resolver::explain_permission(self.session_user(&store), permission_id, &self.config.role_defaults, store.groups())
    }

    /// All permission ids held by the session user
    pub fn effective_permissions(&self) -> BTreeSet<String> {
        let store = self.store.read();
        resolver::effective_permissions(self.session_user(&store), &self.config.role_defaults, store.groups())
    }

    /// Guard a view that requires `required_permission` (or only a session)
    pub fn check_access(&self, required_permission: Option<&str>) -> AccessDecision {
        let store = self.store.read();
        guard::decide(self.session_user(&store), required_permission, &self.config.role_defaults, store.groups())
    }

    /// Guard one of the protected views
    pub fn check_view(&self, view: View) -> AccessDecision {
        let decision = self.check_access(view.required_permission());
        debug!(view = %view, decision = ?decision, "View access checked");
        decision
    }

    /// Dashboard for the session user
    pub fn dashboard(&self) -> Option<DashboardKind> {
        self.current_user().map(|user| DashboardKind::for_role(user.role))
    }

    // Users and groups

    pub fn list_users(&self) -> Vec<User> {
        self.store.read().list_users()
    }

    pub fn list_groups(&self) -> Vec<Group> {
        self.store.read().list_groups()
    }

    pub fn get_user(&self, user_id: &str) -> Option<User> {
        self.store.read().get_user(user_id).cloned()
    }

    pub fn get_group(&self, group_id: &str) -> Option<Group> {
        self.store.read().get_group(group_id).cloned()
    }

    pub fn users_with_role(&self, role: Role) -> Vec<User> {
        self.store.read().users_with_role(role)
    }

    pub fn groups_for_user(&self, user_id: &str) -> Vec<Group> {
        self.store.read().groups_for_user(user_id)
    }

    pub fn members_of_group(&self, group_id: &str) -> Vec<User> {
        self.store.read().members_of_group(group_id)
    }

    pub fn create_user(&self, request: NewUser) -> AccessResult<User> {
        self.store.write().create_user(request)
    }

    pub fn create_group(&self, request: NewGroup) -> Group {
        self.store.write().create_group(request)
    }

    pub fn update_group_permissions(&self, group_id: &str, permissions: BTreeSet<String>) -> Option<Group> {
        self.store.write().update_group_permissions(group_id, permissions)
    }

    pub fn toggle_group_permission(&self, group_id: &str, permission_id: &str) -> Option<Group> {
        self.store.write().toggle_group_permission(group_id, permission_id)
    }

    pub fn add_user_to_group(&self, user_id: &str, group_id: &str) -> MembershipChange {
        self.store.write().add_user_to_group(user_id, group_id)
    }

    pub fn remove_user_from_group(&self, user_id: &str, group_id: &str) -> MembershipChange {
        self.store.write().remove_user_from_group(user_id, group_id)
    }

    /// Check the membership relation for asymmetric or dangling entries
    pub fn is_consistent(&self) -> bool {
        self.store.read().is_consistent()
    }

    // Permission catalog

    pub fn list_permissions(&self) -> Vec<Permission> {
        self.catalog.read().list()
    }

    pub fn permissions_by_category(&self) -> Vec<(PermissionCategory, Vec<Permission>)> {
        self.catalog.read().by_category()
    }

    pub fn add_permission(&self, name: &str, description: &str, category: PermissionCategory) -> AccessResult<Permission> {
        self.catalog.write().add_permission(name, description, category)
    }

    /// Remove a catalog entry. Groups that still list the id keep it.
    pub fn remove_permission(&self, id: &str) -> Option<Permission> {
        self.catalog.write().remove_permission(id)
    }

    fn session_user<'a>(&self, store: &'a IdentityStore) -> Option<&'a User> {
        let session = self.session.read();
        session.current().and_then(|s| store.get_user(&s.user_id))
    }
}

impl Default for AccessControl {
    fn default() -> Self {
        Self::new(AccessConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn create_test_system() -> AccessControl {
        AccessControl::new(AccessConfig::default().with_login_delay(Duration::ZERO))
    }

    #[tokio::test]
    async fn test_system_initialization() {
        let system = create_test_system();

        assert_eq!(system.list_users().len(), 3);
        assert_eq!(system.list_groups().len(), 3);
        assert_eq!(system.list_permissions().len(), 8);
        assert!(!system.is_authenticated());
        assert!(system.is_consistent());
    }

    #[tokio::test]
    async fn test_unseeded_system_is_empty() {
        let config = AccessConfig {
            seed_demo_data: false,
            ..AccessConfig::default()
        };
        let system = AccessControl::new(config);

        assert!(system.list_users().is_empty());
        assert!(system.list_groups().is_empty());
        assert!(system.list_permissions().is_empty());
    }

    #[tokio::test]
    async fn test_anonymous_has_nothing() {
        let system = create_test_system();

        assert!(!system.has_permission("manage_users"));
        assert!(system.effective_permissions().is_empty());
        assert_eq!(system.check_access(None), AccessDecision::LoginRequired);
        assert!(system.dashboard().is_none());
    }

    #[tokio::test]
    async fn test_session_sees_membership_changes() {
        let system = create_test_system();
        let regular = system.login("user@example.com", "password").await.unwrap();

        assert!(!system.has_permission("view_analytics"));

        let qa = system.create_group(NewGroup::new("QA", "").with_permissions(["view_analytics"]));
        system.add_user_to_group(&regular.id, &qa.id);

        assert!(system.has_permission("view_analytics"));
        assert_eq!(system.explain_permission("view_analytics"), Some(Grant::Group { group_id: qa.id.clone() }));

        system.remove_user_from_group(&regular.id, &qa.id);
        assert!(!system.has_permission("view_analytics"));
    }

    #[tokio::test]
    async fn test_guard_and_dashboard() {
        let system = create_test_system();

        system.login("mod@example.com", "password").await.unwrap();
        assert_eq!(system.dashboard(), Some(DashboardKind::Moderator));
        assert_eq!(system.check_access(Some("view_analytics")), AccessDecision::Granted);
        assert_eq!(system.check_access(Some("manage_users")), AccessDecision::Forbidden);

        system.logout();
        assert_eq!(system.check_access(Some("view_analytics")), AccessDecision::LoginRequired);
    }

    #[tokio::test]
    async fn test_check_view_for_seeded_users() {
        let system = create_test_system();

        assert_eq!(system.check_view(View::Home), AccessDecision::LoginRequired);

        system.login("mod@example.com", "password").await.unwrap();
        assert_eq!(system.check_view(View::Groups), AccessDecision::Forbidden);
        assert_eq!(system.check_view(View::Users), AccessDecision::Forbidden);
        assert_eq!(system.check_view(View::Analytics), AccessDecision::Granted);

        system.login("user@example.com", "password").await.unwrap();
        assert_eq!(system.check_view(View::Settings), AccessDecision::Granted);
        assert_eq!(system.check_view(View::Home), AccessDecision::Granted);
        assert_eq!(system.check_view(View::Analytics), AccessDecision::Forbidden);

        system.login("admin@example.com", "password").await.unwrap();
        assert!(View::ALL.iter().all(|view| system.check_view(*view) == AccessDecision::Granted));
    }

    #[tokio::test]
    async fn test_reads_proceed_during_login_delay() {
        let system = AccessControl::new(AccessConfig::default().with_login_delay(Duration::from_millis(50)));

        let (login, observed) = tokio::join!(system.login("admin@example.com", "password"), async {
            (system.list_users().len(), system.is_authenticated(), system.has_permission("manage_users"))
        });

        // Observed while login was still sleeping
        assert_eq!(observed, (3, false, false));
        assert_eq!(login.unwrap().id, "u1");
        assert!(system.has_permission("manage_users"));
    }

    #[tokio::test]
    async fn test_login_delay_is_applied() {
        let system = AccessControl::new(AccessConfig::default().with_login_delay(Duration::from_millis(20)));

        let start = std::time::Instant::now();
        system.login("admin@example.com", "password").await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_removed_permission_stays_on_groups() {
        let system = create_test_system();

        system.remove_permission("edit_content");

        assert!(system.list_permissions().iter().all(|p| p.id != "edit_content"));
        assert!(system.get_group("g2").unwrap().grants("edit_content"));
        assert!(system.user_has_permission("u2", "edit_content"));
    }
}
