// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Stadli

//! Session middleware for Axum.
//!
//! Resolves the session cookie once per request and stores the
//! [`AuthResult`](super::AuthResult) in request extensions, where the
//! extractors in `extractor.rs` pick it up.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/v1/users/me", get(handler))
//!     .layer(axum::middleware::from_fn_with_state(state.clone(), resolve_session));
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use tracing::debug;

use crate::state::AppState;

/// Attach the request's [`AuthResult`](super::AuthResult) to its extensions.
///
/// Never rejects; handlers decide whether a user is required.
pub async fn resolve_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let result = state
        .authenticator
        .authenticate(request.headers(), state.users.as_ref());
    debug!(authenticated = result.is_authenticated(), "Session resolved");
    request.extensions_mut().insert(result);
    next.run(request).await
}
