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

//! Session management
//!
//! One session per process. The manager is either anonymous or
//! authenticated as a single user; a successful login replaces whatever
//! session was active, a failed one leaves the state untouched.

use crate::error::{AccessError, AccessResult};
use crate::models::User;
use crate::store::IdentityStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// An authenticated session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    /// Authenticated user id
    pub user_id: String,

    /// When the login succeeded
    pub authenticated_at: DateTime<Utc>,
}

/// Session state machine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated(Session),
}

/// Tracks the currently authenticated identity
#[derive(Debug, Clone, Default)]
pub struct SessionManager {
    state: SessionState,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Authenticate against the store by exact email and secret match
    pub fn login(&mut self, store: &IdentityStore, email: &str, credential_secret: &str) -> AccessResult<User> {
        let Some(user) = store.find_user_by_credentials(email, credential_secret) else {
            warn!(email = %email, "Login failed: invalid credentials");
            return Err(AccessError::InvalidCredentials);
        };

        if let SessionState::Authenticated(previous) = &self.state {
            info!(previous_user_id = %previous.user_id, "Replacing active session");
        }

        self.state = SessionState::Authenticated(Session {
            user_id: user.id.clone(),
            authenticated_at: Utc::now(),
        });

        info!(user_id = %user.id, role = %user.role, "User logged in");
        Ok(user.clone())
    }

    /// Return to the anonymous state. Returns the discarded session, if any.
    pub fn logout(&mut self) -> Option<Session> {
        match std::mem::take(&mut self.state) {
            SessionState::Authenticated(session) => {
                info!(user_id = %session.user_id, "User logged out");
                Some(session)
            }
            SessionState::Anonymous => None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current(&self) -> Option<&Session> {
        match &self.state {
            SessionState::Authenticated(session) => Some(session),
            SessionState::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;
    use crate::roles::Role;

    fn create_test_store() -> IdentityStore {
        let mut store = IdentityStore::default();
        store.create_user(NewUser::new("Admin User", "admin@example.com", Role::Admin, "password")).unwrap();
        store.create_user(NewUser::new("Regular User", "user@example.com", Role::User, "password")).unwrap();
        store
    }

    #[test]
    fn test_starts_anonymous() {
        let manager = SessionManager::new();

        assert_eq!(manager.state(), &SessionState::Anonymous);
        assert!(!manager.is_authenticated());
    }

    #[test]
    fn test_login_and_logout_cycle() {
        let store = create_test_store();
        let mut manager = SessionManager::new();

        let user = manager.login(&store, "admin@example.com", "password").unwrap();
        assert_eq!(user.role, Role::Admin);
        assert_eq!(manager.current().map(|s| s.user_id.as_str()), Some(user.id.as_str()));

        let discarded = manager.logout().unwrap();
        assert_eq!(discarded.user_id, user.id);
        assert!(!manager.is_authenticated());

        // Logging out again is harmless
        assert!(manager.logout().is_none());

        manager.login(&store, "admin@example.com", "password").unwrap();
        assert!(manager.is_authenticated());
    }

    #[test]
    fn test_invalid_credentials_stay_anonymous() {
        let store = create_test_store();
        let mut manager = SessionManager::new();

        let result = manager.login(&store, "admin@example.com", "wrong");

        assert!(matches!(result, Err(AccessError::InvalidCredentials)));
        assert_eq!(manager.state(), &SessionState::Anonymous);
    }

    #[test]
    fn test_login_is_case_sensitive() {
        let store = create_test_store();
        let mut manager = SessionManager::new();

        assert!(manager.login(&store, "ADMIN@example.com", "password").is_err());
        assert!(manager.login(&store, "admin@example.com", "Password").is_err());
    }

    #[test]
    fn test_new_login_replaces_session() {
        let store = create_test_store();
        let mut manager = SessionManager::new();

        manager.login(&store, "admin@example.com", "password").unwrap();
        let regular = manager.login(&store, "user@example.com", "password").unwrap();

        assert_eq!(manager.current().unwrap().user_id, regular.id);
    }

    #[test]
    fn test_failed_login_keeps_existing_session() {
        let store = create_test_store();
        let mut manager = SessionManager::new();

        let admin = manager.login(&store, "admin@example.com", "password").unwrap();
        assert!(manager.login(&store, "user@example.com", "wrong").is_err());

        assert_eq!(manager.current().unwrap().user_id, admin.id);
    }
}
