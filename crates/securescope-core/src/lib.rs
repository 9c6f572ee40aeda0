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

//! SecureScope access-control core
//!
//! This crate provides the authorization model behind the SecureScope
//! dashboards:
//! - A permission catalog
//! - An in-memory user and group store with a symmetric membership relation
//! - Permission resolution from role defaults and group grants
//! - A single-session login manager
//!
//! All state is volatile and seeded from a built-in dataset.

pub mod catalog;
pub mod config;
pub mod error;
pub mod guard;
pub mod models;
pub mod resolver;
pub mod roles;
pub mod seed;
pub mod session;
pub mod store;
pub mod system;
pub mod validation;

pub use catalog::{CollisionPolicy, Permission, PermissionCatalog, PermissionCategory};
pub use config::AccessConfig;
pub use error::{AccessError, AccessResult};
pub use guard::{AccessDecision, DashboardKind, View};
pub use models::{Group, NewGroup, NewUser, User};
pub use resolver::{Grant, effective_permissions, explain_permission, has_permission};
pub use roles::{Role, RoleDefaults};
pub use session::{Session, SessionManager, SessionState};
pub use store::{IdentityStore, MembershipChange};
pub use system::AccessControl;
pub use validation::{AcceptAll, UniqueEmail, UserValidator};
