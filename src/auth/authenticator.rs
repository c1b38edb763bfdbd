// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Stadli

//! The session authenticator.
//!
//! Owns the signing secret and session lifetime, and ties together token
//! signing, cookie rendering, password checks and the user store. It holds
//! no per-session state: a cookie is valid purely by its signature and
//! embedded expiry.
//!
//! Per request:
//!
//! ```text
//! no cookie ──────────────┐
//! bad/expired token ──────┤──> Unauthenticated
//! valid token ──> lookup ─┤
//!                  missing┘
//!                  found ───> Authenticated(user)
//! ```

use axum::http::HeaderMap;
use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, error, info, warn};

use super::cookie::{clear_session_cookie, session_cookie_value, SessionCookie};
use super::error::{LoginError, TokenError};
use super::password::{normalize_email, verify_password};
use super::token::{self, SessionPayload};
use super::user::{AuthResult, AuthenticatedUser};
use crate::config::{SessionSecret, DEFAULT_SESSION_TTL_HOURS};
use crate::storage::UserStore;

/// Stand-in credential checked when the email is unknown, so both login
/// failure paths hash and compare the same amount of data.
const UNKNOWN_USER_SALT: &str = "00000000000000000000000000000000";
const UNKNOWN_USER_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

#[derive(Debug, Clone)]
pub struct SessionAuthenticator {
    secret: SessionSecret,
    ttl: TimeDelta,
}

impl SessionAuthenticator {
    /// Authenticator with the default 12 hour session lifetime.
    pub fn new(secret: SessionSecret) -> Self {
        Self {
            secret,
            ttl: TimeDelta::hours(i64::from(DEFAULT_SESSION_TTL_HOURS)),
        }
    }

    pub fn with_ttl_hours(mut self, hours: u32) -> Self {
        self.ttl = TimeDelta::hours(i64::from(hours));
        self
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// Mint a session cookie for `user_id`, valid from now.
    ///
    /// `None` only if the secret cannot key HMAC-SHA256; see [`token::mint`].
    pub fn mint(&self, user_id: i64) -> Option<SessionCookie> {
        self.mint_at(user_id, Utc::now())
    }

    pub fn mint_at(&self, user_id: i64, now: DateTime<Utc>) -> Option<SessionCookie> {
        let payload = SessionPayload::new(user_id, self.ttl, now);
        let value = token::mint(&payload, self.secret.as_bytes())?;
        Some(SessionCookie::new(value, self.ttl))
    }

    /// Verify a raw cookie value and return the user id it carries.
    pub fn verify(&self, cookie_value: &str) -> Result<i64, TokenError> {
        self.verify_at(cookie_value, Utc::now())
    }

    pub fn verify_at(&self, cookie_value: &str, now: DateTime<Utc>) -> Result<i64, TokenError> {
        token::verify(cookie_value, self.secret.as_bytes(), now).map(|payload| payload.user_id)
    }

    /// Look up the user behind a verified token. Store errors fail closed.
    pub fn resolve_user(&self, store: &dyn UserStore, user_id: i64) -> Option<AuthenticatedUser> {
        match store.get_user_by_id(user_id) {
            Ok(Some(user)) => Some(user),
            Ok(None) => {
                debug!(user_id, "Session refers to a user that no longer exists");
                None
            }
            Err(err) => {
                error!(user_id, error = %err, "User lookup failed, treating request as anonymous");
                None
            }
        }
    }

    /// Resolve the request's session cookie to a user.
    pub fn authenticate(&self, headers: &HeaderMap, store: &dyn UserStore) -> AuthResult {
        self.authenticate_at(headers, store, Utc::now())
    }

    pub fn authenticate_at(
        &self,
        headers: &HeaderMap,
        store: &dyn UserStore,
        now: DateTime<Utc>,
    ) -> AuthResult {
        let Some(cookie_value) = session_cookie_value(headers) else {
            return AuthResult::Unauthenticated;
        };

        // The store is only consulted for tokens that pass verification.
        match self.verify_at(cookie_value, now) {
            Ok(user_id) => self.resolve_user(store, user_id).into(),
            Err(reason) => {
                debug!(%reason, "Rejected session cookie");
                AuthResult::Unauthenticated
            }
        }
    }

    /// Check credentials and mint a session cookie.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub fn login(
        &self,
        store: &dyn UserStore,
        email: &str,
        password: &str,
    ) -> Result<SessionCookie, LoginError> {
        let email = normalize_email(email);

        let credential = match store.get_credential(&email) {
            Ok(credential) => credential,
            Err(err) => {
                error!(error = %err, "Credential lookup failed during login");
                return Err(LoginError::Unavailable);
            }
        };

        let Some(credential) = credential else {
            std::hint::black_box(verify_password(
                password,
                UNKNOWN_USER_SALT,
                UNKNOWN_USER_HASH,
            ));
            warn!("Login rejected: invalid credentials");
            return Err(LoginError::InvalidCredentials);
        };

        if !verify_password(password, &credential.salt, &credential.password_hash) {
            warn!(user_id = credential.user_id, "Login rejected: invalid credentials");
            return Err(LoginError::InvalidCredentials);
        }

        let Some(cookie) = self.mint(credential.user_id) else {
            error!(user_id = credential.user_id, "Failed to mint session cookie");
            return Err(LoginError::Unavailable);
        };

        info!(user_id = credential.user_id, "Session issued");
        Ok(cookie)
    }

    /// `Set-Cookie` value that ends the session on the client.
    pub fn logout(&self) -> String {
        self.clear()
    }

    /// Expiring `sid` cookie. Always the same value.
    pub fn clear(&self) -> String {
        clear_session_cookie()
    }
}
