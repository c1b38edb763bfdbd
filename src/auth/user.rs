// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Stadli

//! Authenticated user representation and the per-request auth outcome.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;

/// A user resolved from a valid session cookie.
///
/// Derived from the user store on every request, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub email: String,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Outcome of authenticating one request.
///
/// Every failure kind (no cookie, bad token, deleted user, store outage)
/// is `Unauthenticated`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthResult {
    Authenticated(AuthenticatedUser),
    #[default]
    Unauthenticated,
}

impl AuthResult {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthResult::Authenticated(_))
    }

    pub fn into_user(self) -> Option<AuthenticatedUser> {
        match self {
            AuthResult::Authenticated(user) => Some(user),
            AuthResult::Unauthenticated => None,
        }
    }
}

impl From<Option<AuthenticatedUser>> for AuthResult {
    fn from(user: Option<AuthenticatedUser>) -> Self {
        user.map_or(AuthResult::Unauthenticated, AuthResult::Authenticated)
    }
}
