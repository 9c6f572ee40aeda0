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

//! Built-in demo dataset: three users, three groups, one membership each.
//! The eight default permissions live in [`crate::catalog::default_permissions`].

use crate::models::{Group, User};
use crate::roles::Role;
use crate::store::IdentityStore;
use chrono::Utc;
use std::collections::BTreeSet;
use tracing::{debug, info};

struct SeedUser {
    id: &'static str,
    email: &'static str,
    name: &'static str,
    role: Role,
    avatar: &'static str,
}

struct SeedGroup {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    permissions: &'static [&'static str],
}

const SEED_SECRET: &str = "password";

const SEED_USERS: [SeedUser; 3] = [
    SeedUser {
        id: "u1",
        email: "admin@example.com",
        name: "Admin User",
        role: Role::Admin,
        avatar: "https://images.unsplash.com/photo-1472099645785-5658abf4ff4e?w=400&h=400&fit=crop",
    },
    SeedUser {
        id: "u2",
        email: "user@example.com",
        name: "Regular User",
        role: Role::User,
        avatar: "https://images.unsplash.com/photo-1500648767791-00dcc994a43e?w=400&h=400&fit=crop",
    },
    SeedUser {
        id: "u3",
        email: "mod@example.com",
        name: "Moderator User",
        role: Role::Moderator,
        avatar: "https://images.unsplash.com/photo-1494790108377-be9c29b29330?w=400&h=400&fit=crop",
    },
];

const SEED_GROUPS: [SeedGroup; 3] = [
    SeedGroup {
        id: "g1",
        name: "Administrators",
        description: "Full system access",
        permissions: &["manage_users", "manage_roles", "manage_content", "view_analytics"],
    },
    SeedGroup {
        id: "g2",
        name: "Content Editors",
        description: "Can edit and publish content",
        permissions: &["edit_content", "publish_content"],
    },
    SeedGroup {
        id: "g3",
        name: "Moderators",
        description: "Can moderate content and users",
        permissions: &["moderate_content", "moderate_users", "view_analytics"],
    },
];

const SEED_MEMBERSHIPS: [(&str, &str); 3] = [("u1", "g1"), ("u2", "g2"), ("u3", "g3")];

/// Load the demo users and groups into `store`.
/// Entries whose id is already taken are skipped.
pub fn seed_store(store: &mut IdentityStore) {
    let now = Utc::now();

    for seed in &SEED_USERS {
        let inserted = store.insert_user(User {
            id: seed.id.to_string(),
            email: seed.email.to_string(),
            name: seed.name.to_string(),
            role: seed.role,
            avatar: seed.avatar.to_string(),
            groups: BTreeSet::new(),
            credential_secret: SEED_SECRET.to_string(),
            created_at: now,
        });
        if !inserted {
            debug!(user_id = %seed.id, "Seed user already present");
        }
    }

    for seed in &SEED_GROUPS {
        let inserted = store.insert_group(Group {
            id: seed.id.to_string(),
            name: seed.name.to_string(),
            description: seed.description.to_string(),
            permissions: seed.permissions.iter().map(|p| p.to_string()).collect(),
            members: BTreeSet::new(),
            created_at: now,
        });
        if !inserted {
            debug!(group_id = %seed.id, "Seed group already present");
        }
    }

    for (user_id, group_id) in SEED_MEMBERSHIPS {
        store.add_user_to_group(user_id, group_id);
    }

    info!(users = %SEED_USERS.len(), groups = %SEED_GROUPS.len(), "Demo data seeded");
}
