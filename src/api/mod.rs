// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{middleware::capture_form_token, Claims, CredentialSource, DecodedView},
    models::{
        LoginRequest, LoginResponse, SessionResponse, TokenInfoResponse, UserSummary,
        VerifyResponse,
    },
    state::AppState,
};

pub mod auth;
pub mod health;

pub fn router(state: AppState) -> Router {
    let capture_forms = state
        .gate
        .sources()
        .contains(&CredentialSource::FormField);

    let v1_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/verify", get(auth::verify))
        .route("/auth/me", get(auth::me))
        .route("/admin/token-info", get(auth::token_info))
        .with_state(state);

    let app = Router::new()
        .route("/health", get(health::health))
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()));

    // Form bodies are only buffered when the form-field source is enabled
    let app = if capture_forms {
        app.layer(middleware::from_fn(capture_form_token))
    } else {
        app
    };

    app.layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::login,
        auth::verify,
        auth::me,
        auth::token_info
    ),
    components(
        schemas(
            Claims,
            DecodedView,
            LoginRequest,
            LoginResponse,
            VerifyResponse,
            SessionResponse,
            TokenInfoResponse,
            UserSummary,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Health", description = "Liveness probe"),
        (name = "Auth", description = "Login and credential checks"),
        (name = "Admin", description = "Administrative credential tools")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::auth::{middleware::FORM_BODY_LIMIT, SigningSecret, SystemClock};

    fn state_with(legacy: bool) -> AppState {
        AppState::new(
            SigningSecret::new("router-secret").unwrap(),
            3600,
            CredentialSource::ordered(&[], legacy),
            Arc::new(SystemClock),
        )
        .unwrap()
    }

    fn state() -> AppState {
        state_with(false)
    }

    fn oversized_form_login() -> Request<Body> {
        let body = format!("token={}", "a".repeat(FORM_BODY_LIMIT + 1));
        Request::builder()
            .method("POST")
            .uri("/v1/auth/login")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn health_returns_ok_with_request_id() {
        let response = router(state())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], br#"{"status":"ok"}"#);
    }

    #[test]
    fn openapi_document_lists_auth_routes() {
        let doc = ApiDoc::openapi();
        for path in ["/v1/auth/login", "/v1/auth/verify", "/v1/auth/me", "/v1/admin/token-info"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[tokio::test]
    async fn query_token_ignored_without_legacy_locations() {
        let token = crate::auth::TokenIssuer::from_secret("router-secret")
            .unwrap()
            .issue(
                &crate::auth::UserIdentity {
                    id: 1,
                    email: "a@example.com".to_string(),
                    role: "Customer".to_string(),
                    full_name: None,
                },
                chrono::Utc::now().timestamp(),
            )
            .unwrap();
        let response = router(state())
            .oneshot(
                Request::builder()
                    .uri(format!("/v1/auth/me?token={token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], br#"{"authenticated":false}"#);
    }

    #[tokio::test]
    async fn form_bodies_are_buffered_only_with_legacy_locations() {
        let response = router(state_with(true))
            .oneshot(oversized_form_login())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        // Without the form source the body goes straight to the JSON handler
        let response = router(state_with(false))
            .oneshot(oversized_form_login())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
}
