// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Stadli

//! Login, logout and session introspection endpoints.

use axum::{
    extract::State,
    http::{
        header::{LOCATION, SET_COOKIE},
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::cookie::{clear_flash_cookie, read_flash};
use crate::auth::{AuthenticatedUser, ConsoleUser, OptionalUser};
use crate::state::AppState;

/// Where a successful login lands.
pub const AFTER_LOGIN_PATH: &str = "/admin";
/// Where logout lands.
pub const AFTER_LOGOUT_PATH: &str = "/";

/// Form body of `POST /login`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// One-shot message left by the previous redirect.
#[derive(Debug, Serialize, ToSchema)]
pub struct FlashResponse {
    pub message: String,
}

fn redirect_with_cookie(location: &str, cookie: String) -> Response {
    (
        StatusCode::FOUND,
        [(LOCATION, location.to_string()), (SET_COOKIE, cookie)],
    )
        .into_response()
}

/// Check credentials and start a session.
///
/// Both failure kinds (unknown email, wrong password) redirect back to
/// `/login` with the same flash message.
#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Redirect to /admin with a session cookie, or back to /login with a flash message"),
    )
)]
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    match state
        .authenticator
        .login(state.users.as_ref(), &form.email, &form.password)
    {
        Ok(cookie) => redirect_with_cookie(AFTER_LOGIN_PATH, cookie.header_string()),
        Err(err) => err.into_response(),
    }
}

/// End the session by overwriting the cookie with an expired one.
#[utoipa::path(
    get,
    path = "/logout",
    tag = "Auth",
    responses(
        (status = 302, description = "Redirect to / with an expired session cookie"),
    )
)]
pub async fn logout(State(state): State<AppState>) -> Response {
    redirect_with_cookie(AFTER_LOGOUT_PATH, state.authenticator.logout())
}

/// Report the current session's user.
///
/// Missing or invalid sessions are `204` rather than an error, so the
/// response does not distinguish why there is no session.
#[utoipa::path(
    get,
    path = "/v1/auth/session",
    tag = "Auth",
    responses(
        (status = 200, description = "Session is active", body = AuthenticatedUser),
        (status = 204, description = "No active session"),
    )
)]
pub async fn current_session(OptionalUser(user): OptionalUser) -> Response {
    match user {
        Some(user) => (StatusCode::OK, Json(user)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Console landing page. Browsers without a session go back to `/login`.
#[utoipa::path(
    get,
    path = "/admin",
    tag = "Auth",
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Signed-in console user", body = AuthenticatedUser),
        (status = 302, description = "Redirect to /login with a \"Please sign in\" flash"),
    )
)]
pub async fn console_home(ConsoleUser(user): ConsoleUser) -> Json<AuthenticatedUser> {
    Json(user)
}

/// Read and clear the flash message set by the last redirect.
#[utoipa::path(
    get,
    path = "/v1/auth/flash",
    tag = "Auth",
    responses(
        (status = 200, description = "Pending message; the flash cookie is cleared", body = FlashResponse),
        (status = 204, description = "No pending message"),
    )
)]
pub async fn take_flash(headers: HeaderMap) -> Response {
    match read_flash(&headers) {
        Some(message) => (
            StatusCode::OK,
            [(SET_COOKIE, clear_flash_cookie())],
            Json(FlashResponse { message }),
        )
            .into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}
