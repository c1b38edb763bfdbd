// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Stadli

//! User endpoints.

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::{AuthenticatedUser, CurrentUser, Role};

/// Response for GET /v1/users/me
#[derive(Debug, Serialize, ToSchema)]
pub struct UserMeResponse {
    /// User's numeric ID
    pub id: i64,
    /// Login email (normalised)
    pub email: String,
    /// User's role
    pub role: Role,
    /// Whether the user can manage console settings and users
    pub is_admin: bool,
}

impl From<AuthenticatedUser> for UserMeResponse {
    fn from(user: AuthenticatedUser) -> Self {
        Self {
            is_admin: user.is_admin(),
            id: user.id,
            email: user.email,
            role: user.role,
        }
    }
}

/// Get the current signed-in user's information.
#[utoipa::path(
    get,
    path = "/v1/users/me",
    tag = "Users",
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "User information", body = UserMeResponse),
        (status = 401, description = "Unauthorized - missing, invalid or expired session"),
    )
)]
pub async fn get_current_user(CurrentUser(user): CurrentUser) -> Json<UserMeResponse> {
    Json(user.into())
}
