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

//! Validation hooks run before a user is created

use crate::error::{AccessError, AccessResult};
use crate::models::{NewUser, User};
use std::fmt::Debug;

/// Hook consulted by the store before a user is inserted
pub trait UserValidator: Debug + Send + Sync {
    /// Accept or refuse `request` given the users already stored
    fn validate(&self, request: &NewUser, existing: &[User]) -> AccessResult<()>;
}

/// Accepts every request, including colliding emails
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl UserValidator for AcceptAll {
    fn validate(&self, _request: &NewUser, _existing: &[User]) -> AccessResult<()> {
        Ok(())
    }
}

/// Refuses a request whose email is already used by a stored user.
/// Comparison is exact, matching how login compares emails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniqueEmail;

impl UserValidator for UniqueEmail {
    fn validate(&self, request: &NewUser, existing: &[User]) -> AccessResult<()> {
        if existing.iter().any(|user| user.email == request.email) {
            return Err(AccessError::DuplicateEmail { email: request.email.clone() });
        }
        Ok(())
    }
}

/// Pick the validator matching the `unique_emails` setting
pub fn validator_for(unique_emails: bool) -> Box<dyn UserValidator> {
    if unique_emails { Box::new(UniqueEmail) } else { Box::new(AcceptAll) }
}
