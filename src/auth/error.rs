// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Stadli

//! Authentication errors.
//!
//! Internally the failure kinds stay distinct so they can be logged and
//! tested. At the HTTP boundary every token failure collapses into
//! "not logged in".

use axum::{
    http::{
        header::{LOCATION, SET_COOKIE},
        StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::cookie::flash_cookie;

/// Why a session token was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Wrong shape, bad base64 or unparseable fields
    #[error("session token is malformed")]
    Malformed,
    /// MAC does not match the payload under the current secret
    #[error("session token signature is invalid")]
    BadSignature,
    /// Embedded expiry is not in the future
    #[error("session token has expired")]
    Expired,
}

/// Why a login attempt failed.
///
/// Unknown email and wrong password are the same variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Auth unavailable")]
    Unavailable,
}

/// Path the login flow sends failed attempts back to.
pub const LOGIN_PATH: &str = "/login";

impl IntoResponse for LoginError {
    /// Redirect back to the login page with the message in a flash cookie.
    fn into_response(self) -> Response {
        (
            StatusCode::FOUND,
            [
                (LOCATION, LOGIN_PATH.to_string()),
                (SET_COOKIE, flash_cookie(&self.to_string())),
            ],
        )
            .into_response()
    }
}

/// Flash shown when a console page is opened without a session.
pub const SIGN_IN_MESSAGE: &str = "Please sign in";

/// Rejection for console pages: send the browser to the login form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignInRedirect;

impl IntoResponse for SignInRedirect {
    fn into_response(self) -> Response {
        (
            StatusCode::FOUND,
            [
                (LOCATION, LOGIN_PATH.to_string()),
                (SET_COOKIE, flash_cookie(SIGN_IN_MESSAGE)),
            ],
        )
            .into_response()
    }
}

/// Rejection returned by API extractors that require a signed-in user.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No valid session cookie, or the session's user no longer exists
    #[error("Authentication is required")]
    Unauthenticated,
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::Unauthenticated => "unauthenticated",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
