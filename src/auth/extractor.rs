// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Stadli

//! Axum extractors for the signed-in user.
//!
//! ```rust,ignore
//! async fn my_handler(CurrentUser(user): CurrentUser) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::error::SignInRedirect;
use super::{AuthError, AuthResult, AuthenticatedUser};
use crate::state::AppState;

/// The request's auth outcome, preferring what the middleware resolved.
fn auth_result(parts: &Parts, state: &AppState) -> AuthResult {
    if let Some(result) = parts.extensions.get::<AuthResult>() {
        return result.clone();
    }
    state
        .authenticator
        .authenticate(&parts.headers, state.users.as_ref())
}

/// Extractor that requires a signed-in user.
///
/// Rejects with `401 unauthenticated` when the session cookie is missing,
/// invalid, expired, or refers to a deleted user.
///
/// # Example
///
/// ```rust,ignore
/// async fn whoami(CurrentUser(user): CurrentUser) -> Json<AuthenticatedUser> {
///     Json(user)
/// }
/// ```
pub struct CurrentUser(pub AuthenticatedUser);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        auth_result(parts, state)
            .into_user()
            .map(CurrentUser)
            .ok_or(AuthError::Unauthenticated)
    }
}

/// Extractor for browser-facing console routes.
///
/// Same check as [`CurrentUser`], but rejects with a redirect to `/login`
/// carrying a "Please sign in" flash instead of a JSON 401.
pub struct ConsoleUser(pub AuthenticatedUser);

impl FromRequestParts<AppState> for ConsoleUser {
    type Rejection = SignInRedirect;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        auth_result(parts, state)
            .into_user()
            .map(ConsoleUser)
            .ok_or(SignInRedirect)
    }
}

/// Optional authentication extractor.
///
/// Returns `None` if no valid session is present, instead of rejecting.
pub struct OptionalUser(pub Option<AuthenticatedUser>);

impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(OptionalUser(auth_result(parts, state).into_user()))
    }
}
