// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Stadli

//! # Authentication Module
//!
//! Stateless cookie sessions for the Stadli console.
//!
//! ## Auth Flow
//!
//! 1. `POST /login` checks the email/password against the salted hash in the
//!    user store
//! 2. On success the server sets `sid=<base64(payload)>.<base64(hmac)>`,
//!    where the payload is `"{user_id}.{expires_at_ms}"`
//! 3. On every request the auth middleware:
//!    - Verifies the HMAC in constant time and checks the expiry
//!    - Looks up the user id in the user store
//!    - Stores the [`AuthResult`] in request extensions
//! 4. `/logout` overwrites the cookie with an expired one
//!
//! ## Security
//!
//! - No server-side session table: a token stays valid until it expires
//! - Any malformed, forged or expired token is treated as "not logged in"
//! - Login failures never reveal whether the email exists

pub mod authenticator;
pub mod cookie;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod password;
pub mod roles;
pub mod token;
pub mod user;

pub use authenticator::SessionAuthenticator;
pub use cookie::SessionCookie;
pub use error::{AuthError, LoginError, SignInRedirect, TokenError};
pub use extractor::{ConsoleUser, CurrentUser, OptionalUser};
pub use roles::Role;
pub use user::{AuthResult, AuthenticatedUser};
