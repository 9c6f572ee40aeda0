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

//! Error handling for the access-control core
//!
//! Unknown user or group ids passed to mutations are deliberately absent from
//! this taxonomy: the store absorbs them as no-ops so that callers acting on a
//! stale reference degrade silently instead of failing.

use thiserror::Error;

/// Access-control error types
#[derive(Error, Debug)]
pub enum AccessError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email already registered: {email}")]
    DuplicateEmail { email: String },

    #[error("Permission already exists: {id}")]
    PermissionExists { id: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl AccessError {
    /// Get the error type identifier
    pub fn error_type(&self) -> &'static str {
        match self {
            AccessError::InvalidCredentials => "invalid_credentials",
            AccessError::DuplicateEmail { .. } => "duplicate_email",
            AccessError::PermissionExists { .. } => "permission_exists",
            AccessError::Config { .. } => "config_error",
            AccessError::Io(_) => "io_error",
            AccessError::Toml(_) => "toml_error",
        }
    }

    /// Whether the caller can recover by retrying with different input
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AccessError::InvalidCredentials | AccessError::DuplicateEmail { .. } | AccessError::PermissionExists { .. })
    }
}

/// Result type for access-control operations
pub type AccessResult<T> = Result<T, AccessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_type_identifiers() {
        assert_eq!(AccessError::InvalidCredentials.error_type(), "invalid_credentials");
        assert_eq!(AccessError::DuplicateEmail { email: "a@b.c".to_string() }.error_type(), "duplicate_email");
        assert_eq!(AccessError::PermissionExists { id: "x".to_string() }.error_type(), "permission_exists");
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(AccessError::InvalidCredentials.is_recoverable());
        assert!(!AccessError::Config { message: "bad".to_string() }.is_recoverable());
    }

    #[test]
    fn test_error_display() {
        let err = AccessError::DuplicateEmail { email: "admin@example.com".to_string() };
        assert_eq!(err.to_string(), "Email already registered: admin@example.com");
    }
}
