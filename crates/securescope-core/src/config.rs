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

//! Configuration management for the access-control core

use crate::catalog::CollisionPolicy;
use crate::error::{AccessError, AccessResult};
use crate::roles::RoleDefaults;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Environment variable naming a TOML configuration file
pub const CONFIG_ENV: &str = "SECURESCOPE_CONFIG";

/// Configuration for an [`AccessControl`](crate::system::AccessControl) instance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AccessConfig {
    /// Baseline grants per role
    pub role_defaults: RoleDefaults,

    /// Avatar URLs assigned at random to new users
    pub avatar_pool: Vec<String>,

    /// Simulated login latency in milliseconds
    pub login_delay_ms: u64,

    /// Refuse new users whose email is already registered
    pub unique_emails: bool,

    /// Handling of derived permission ids that are already in the catalog
    pub permission_collision: CollisionPolicy,

    /// Load the built-in demo users, groups and permissions
    pub seed_demo_data: bool,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            role_defaults: RoleDefaults::default(),
            avatar_pool: default_avatar_pool(),
            login_delay_ms: 1000,
            unique_emails: false,
            permission_collision: CollisionPolicy::Replace,
            seed_demo_data: true,
        }
    }
}

impl AccessConfig {
    /// Load configuration from a TOML file. Missing keys take their defaults.
    pub fn load_from_file(path: impl AsRef<Path>) -> AccessResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| env::var(key).ok())
    }

    /// Resolve configuration: explicit path, then `SECURESCOPE_CONFIG`, then
    /// defaults. Environment overrides are applied last in every case.
    pub fn resolve(cli_config: Option<PathBuf>) -> AccessResult<Self> {
        let config = if let Some(config_path) = cli_config {
            Self::load_from_file(config_path)?
        } else if let Ok(env_config) = env::var(CONFIG_ENV) {
            Self::load_from_file(env_config)?
        } else {
            Self::default()
        };

        Ok(config.with_overrides(|key| env::var(key).ok()))
    }

    /// Apply `SECURESCOPE_*` overrides read through `lookup`.
    /// Unparseable values are ignored with a warning.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(value) = lookup("SECURESCOPE_LOGIN_DELAY_MS") {
            match value.parse() {
                Ok(ms) => self.login_delay_ms = ms,
                Err(_) => warn!(value = %value, "Ignoring invalid SECURESCOPE_LOGIN_DELAY_MS"),
            }
        }

        if let Some(value) = lookup("SECURESCOPE_UNIQUE_EMAILS") {
            match value.parse() {
                Ok(flag) => self.unique_emails = flag,
                Err(_) => warn!(value = %value, "Ignoring invalid SECURESCOPE_UNIQUE_EMAILS"),
            }
        }

        if let Some(value) = lookup("SECURESCOPE_SEED_DEMO_DATA") {
            match value.parse() {
                Ok(flag) => self.seed_demo_data = flag,
                Err(_) => warn!(value = %value, "Ignoring invalid SECURESCOPE_SEED_DEMO_DATA"),
            }
        }

        if let Some(value) = lookup("SECURESCOPE_PERMISSION_COLLISION") {
            match parse_collision_policy(&value) {
                Ok(policy) => self.permission_collision = policy,
                Err(e) => warn!(error = %e, "Ignoring invalid SECURESCOPE_PERMISSION_COLLISION"),
            }
        }

        self
    }

    /// Set the simulated login latency
    pub fn with_login_delay(mut self, delay: Duration) -> Self {
        self.login_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn login_delay(&self) -> Duration {
        Duration::from_millis(self.login_delay_ms)
    }
}

fn parse_collision_policy(value: &str) -> AccessResult<CollisionPolicy> {
    match value.trim().to_ascii_lowercase().as_str() {
        "replace" => Ok(CollisionPolicy::Replace),
        "reject" => Ok(CollisionPolicy::Reject),
        "suffix" => Ok(CollisionPolicy::Suffix),
        other => Err(AccessError::Config {
            message: format!("Unknown permission collision policy: {}", other),
        }),
    }
}

fn default_avatar_pool() -> Vec<String> {
    vec![
        "https://images.unsplash.com/photo-1535713875002-d1d0cf377fde?w=400&h=400&fit=crop".to_string(),
        "https://images.unsplash.com/photo-1580489944761-15a19d654956?w=400&h=400&fit=crop".to_string(),
        "https://images.unsplash.com/photo-1633332755192-727a05c4013d?w=400&h=400&fit=crop".to_string(),
        "https://images.unsplash.com/photo-1438761681033-6461ffad8d80?w=400&h=400&fit=crop".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::Role;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AccessConfig::default();

        assert_eq!(config.login_delay(), Duration::from_secs(1));
        assert_eq!(config.avatar_pool.len(), 4);
        assert!(!config.unique_emails);
        assert_eq!(config.permission_collision, CollisionPolicy::Replace);
        assert!(config.seed_demo_data);
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("SECURESCOPE_LOGIN_DELAY_MS", "0"),
            ("SECURESCOPE_UNIQUE_EMAILS", "true"),
            ("SECURESCOPE_PERMISSION_COLLISION", "Suffix"),
        ]);

        let config = AccessConfig::default().with_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.login_delay_ms, 0);
        assert!(config.unique_emails);
        assert_eq!(config.permission_collision, CollisionPolicy::Suffix);
        assert!(config.seed_demo_data);
    }

    #[test]
    fn test_invalid_overrides_are_ignored() {
        let vars: HashMap<&str, &str> = HashMap::from([("SECURESCOPE_LOGIN_DELAY_MS", "soon"), ("SECURESCOPE_PERMISSION_COLLISION", "merge")]);

        let config = AccessConfig::default().with_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.login_delay_ms, 1000);
        assert_eq!(config.permission_collision, CollisionPolicy::Replace);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
login_delay_ms = 5
unique_emails = true
permission_collision = "reject"

[role_defaults]
user = ["view_content", "edit_content"]
"#
        )
        .unwrap();

        let config = AccessConfig::load_from_file(file.path()).unwrap();

        assert_eq!(config.login_delay_ms, 5);
        assert!(config.unique_emails);
        assert_eq!(config.permission_collision, CollisionPolicy::Reject);
        assert!(config.role_defaults.grants(Role::User, "edit_content"));
        // Roles missing from the file keep their default grants
        assert!(config.role_defaults.grants(Role::Admin, "manage_users"));
        assert!(!config.role_defaults.grants(Role::User, "manage_users"));
        // Keys missing from the file keep their defaults
        assert_eq!(config.avatar_pool.len(), 4);
    }

    #[test]
    fn test_login_delay_saturates() {
        let config = AccessConfig::default().with_login_delay(Duration::MAX);
        assert_eq!(config.login_delay_ms, u64::MAX);

        let config = AccessConfig::default().with_login_delay(Duration::from_millis(250));
        assert_eq!(config.login_delay(), Duration::from_millis(250));
    }

    // The only test in this crate that touches the process environment, so
    // every resolution path runs here in sequence.
    #[test]
    fn test_resolve_precedence() {
        let mut explicit = tempfile::NamedTempFile::new().unwrap();
        writeln!(explicit, "login_delay_ms = 11").unwrap();
        let mut from_env = tempfile::NamedTempFile::new().unwrap();
        writeln!(from_env, "login_delay_ms = 22\nunique_emails = true").unwrap();

        unsafe {
            env::remove_var("SECURESCOPE_LOGIN_DELAY_MS");
            env::remove_var("SECURESCOPE_UNIQUE_EMAILS");
            env::remove_var("SECURESCOPE_SEED_DEMO_DATA");
            env::remove_var("SECURESCOPE_PERMISSION_COLLISION");
            env::set_var(CONFIG_ENV, from_env.path());
        }

        // Explicit path wins over SECURESCOPE_CONFIG
        let config = AccessConfig::resolve(Some(explicit.path().to_path_buf())).unwrap();
        assert_eq!(config.login_delay_ms, 11);
        assert!(!config.unique_emails);

        // SECURESCOPE_CONFIG is used when no path is given
        let config = AccessConfig::resolve(None).unwrap();
        assert_eq!(config.login_delay_ms, 22);
        assert!(config.unique_emails);

        // Overrides apply on top of the loaded file
        unsafe {
            env::set_var("SECURESCOPE_LOGIN_DELAY_MS", "33");
        }
        let config = AccessConfig::resolve(Some(explicit.path().to_path_buf())).unwrap();
        assert_eq!(config.login_delay_ms, 33);

        // Defaults when neither is set
        unsafe {
            env::remove_var(CONFIG_ENV);
            env::remove_var("SECURESCOPE_LOGIN_DELAY_MS");
        }
        let config = AccessConfig::resolve(None).unwrap();
        assert_eq!(config, AccessConfig::default());
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = AccessConfig::load_from_file("/nonexistent/securescope.toml");
        assert!(matches!(result, Err(AccessError::Io(_))));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AccessConfig::default();

        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: AccessConfig = toml::from_str(&text).unwrap();

        assert_eq!(parsed, config);
    }
}
