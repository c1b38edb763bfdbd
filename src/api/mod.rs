// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Stadli

use axum::{
    http::{
        header::{REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS},
        HeaderName, HeaderValue,
    },
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{cookie::SESSION_COOKIE_NAME, middleware::resolve_session, AuthenticatedUser, Role},
    state::AppState,
};

pub mod health;
pub mod session;
pub mod users;

const CROSS_ORIGIN_OPENER_POLICY: HeaderName =
    HeaderName::from_static("cross-origin-opener-policy");

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/admin", get(session::console_home))
        .route("/login", post(session::login))
        .route("/logout", get(session::logout).post(session::logout))
        .route("/v1/auth/session", get(session::current_session))
        .route("/v1/auth/flash", get(session::take_flash))
        .route("/v1/users/me", get(users::get_current_user))
        .layer(middleware::from_fn_with_state(state.clone(), resolve_session))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(SetResponseHeaderLayer::overriding(
            X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            REFERRER_POLICY,
            HeaderValue::from_static("same-origin"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            CROSS_ORIGIN_OPENER_POLICY,
            HeaderValue::from_static("same-origin"),
        ))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

struct SessionCookieSecurity;

impl Modify for SessionCookieSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE_NAME))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::readiness,
        session::login,
        session::logout,
        session::current_session,
        session::take_flash,
        session::console_home,
        users::get_current_user
    ),
    components(
        schemas(
            AuthenticatedUser,
            Role,
            session::LoginForm,
            session::FlashResponse,
            users::UserMeResponse,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    modifiers(&SessionCookieSecurity),
    tags(
        (name = "Auth", description = "Login, logout and session introspection"),
        (name = "Users", description = "Signed-in user information"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionAuthenticator;
    use crate::config::SessionSecret;
    use crate::storage::{InMemoryUserStore, UserStore};
    use axum::{
        body::{to_bytes, Body},
        http::{
            header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
            Request, StatusCode,
        },
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_app() -> (Router, Arc<InMemoryUserStore>) {
        let store = Arc::new(InMemoryUserStore::new());
        store
            .create_user("coach@stadli.test", "go-team", Role::Admin)
            .unwrap();
        let secret = SessionSecret::new("router-secret-0123456789abcdef-0123456").unwrap();
        let state = AppState::new(SessionAuthenticator::new(secret), store.clone());
        (router(state), store)
    }

    fn login_request(email: &str, password: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/login")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("email={email}&password={password}")))
            .unwrap()
    }

    fn get_with_cookie(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    /// `name=value` part of a `Set-Cookie` header.
    fn cookie_pair(set_cookie: &str) -> String {
        set_cookie.split(';').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let (app, _store) = test_app();
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn health_returns_ok_with_security_headers() {
        let (app, _store) = test_app();
        let response = app
            .oneshot(get_with_cookie("/health", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(headers[X_FRAME_OPTIONS], "DENY");
        assert_eq!(headers[REFERRER_POLICY], "same-origin");
        assert_eq!(headers["cross-origin-opener-policy"], "same-origin");
        assert!(headers.contains_key("x-request-id"));

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn login_then_access_protected_route() {
        let (app, _store) = test_app();

        let response = app
            .clone()
            .oneshot(login_request("coach%40stadli.test", "go-team"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "/admin");
        let session = cookie_pair(response.headers()[SET_COOKIE].to_str().unwrap());

        let response = app
            .clone()
            .oneshot(get_with_cookie("/v1/users/me", Some(&session)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["email"], "coach@stadli.test");
        assert_eq!(body["role"], "admin");
        assert_eq!(body["is_admin"], true);

        let response = app
            .oneshot(get_with_cookie("/v1/auth/session", Some(&session)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_route_rejects_missing_and_tampered_cookies() {
        let (app, _store) = test_app();

        let response = app
            .clone()
            .oneshot(get_with_cookie("/v1/users/me", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .clone()
            .oneshot(login_request("coach%40stadli.test", "go-team"))
            .await
            .unwrap();
        let session = cookie_pair(response.headers()[SET_COOKIE].to_str().unwrap());
        // Replace the last MAC character before the padding with a different one.
        let mut tampered = session.trim_end_matches('=').to_string();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });
        tampered.push('=');

        let response = app
            .clone()
            .oneshot(get_with_cookie("/v1/users/me", Some(&tampered)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(get_with_cookie("/v1/auth/session", Some(&tampered)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn login_failures_are_identical_over_http() {
        let (app, _store) = test_app();

        let unknown = app
            .clone()
            .oneshot(login_request("nobody%40stadli.test", "go-team"))
            .await
            .unwrap();
        let wrong = app
            .oneshot(login_request("coach%40stadli.test", "wrong"))
            .await
            .unwrap();

        assert_eq!(unknown.status(), StatusCode::FOUND);
        assert_eq!(unknown.status(), wrong.status());
        assert_eq!(unknown.headers()[LOCATION], wrong.headers()[LOCATION]);
        assert_eq!(unknown.headers()[SET_COOKIE], wrong.headers()[SET_COOKIE]);
    }

    #[tokio::test]
    async fn session_for_deleted_user_is_anonymous() {
        let (app, store) = test_app();
        let response = app
            .clone()
            .oneshot(login_request("coach%40stadli.test", "go-team"))
            .await
            .unwrap();
        let session = cookie_pair(response.headers()[SET_COOKIE].to_str().unwrap());

        store.delete(1).unwrap();
        let response = app
            .oneshot(get_with_cookie("/v1/users/me", Some(&session)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn logout_accepts_get_and_post() {
        let (app, _store) = test_app();
        for method in ["GET", "POST"] {
            let request = Request::builder()
                .method(method)
                .uri("/logout")
                .body(Body::empty())
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::FOUND);
            assert_eq!(response.headers()[LOCATION], "/");
            assert!(response.headers()[SET_COOKIE]
                .to_str()
                .unwrap()
                .ends_with("Max-Age=0"));
        }
    }

    #[tokio::test]
    async fn console_redirects_anonymous_browser_to_login() {
        let (app, _store) = test_app();
        let response = app
            .oneshot(get_with_cookie("/admin", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "/login");
        assert!(response.headers()[SET_COOKIE]
            .to_str()
            .unwrap()
            .starts_with("flash=Please%20sign%20in;"));
    }

    #[tokio::test]
    async fn login_lands_on_console() {
        let (app, _store) = test_app();
        let response = app
            .clone()
            .oneshot(login_request("coach%40stadli.test", "go-team"))
            .await
            .unwrap();
        let session = cookie_pair(response.headers()[SET_COOKIE].to_str().unwrap());

        let response = app
            .oneshot(get_with_cookie("/admin", Some(&session)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn failed_login_flash_reads_back_verbatim() {
        let (app, _store) = test_app();
        let response = app
            .clone()
            .oneshot(login_request("coach%40stadli.test", "wrong"))
            .await
            .unwrap();
        let flash = cookie_pair(response.headers()[SET_COOKIE].to_str().unwrap());

        let response = app
            .oneshot(get_with_cookie("/v1/auth/flash", Some(&flash)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["message"], "Invalid credentials");
    }

    #[tokio::test]
    async fn readiness_reflects_store_outage() {
        let (app, store) = test_app();
        store.set_unavailable(true);
        let response = app
            .oneshot(get_with_cookie("/health/ready", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn openapi_lists_auth_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/login"));
        assert!(doc.paths.paths.contains_key("/v1/users/me"));
        assert!(doc
            .components
            .as_ref()
            .unwrap()
            .security_schemes
            .contains_key("session_cookie"));
    }
}
