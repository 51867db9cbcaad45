// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::State,
    http::{HeaderMap, Uri},
    Extension, Json,
};

use crate::{
    auth::{middleware::FormToken, AdminOnly, Auth, CredentialRequest, OptionalAuth},
    error::ApiError,
    models::{
        LoginRequest, LoginResponse, SessionResponse, TokenInfoResponse, UserSummary,
        VerifyResponse,
    },
    state::AppState,
    store::UserStore,
};

/// Exchange email and password for a bearer credential.
#[utoipa::path(
    post,
    path = "/v1/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credential issued", body = LoginResponse),
        (status = 400, description = "Email or password missing"),
        (status = 401, description = "Invalid credentials or inactive account"),
        (status = 423, description = "Account temporarily locked"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let outcome = state
        .login
        .login(&request.email, &request.password, state.now())
        .await?;

    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        token: outcome.token,
        expires_at: outcome.expires_at,
        user: outcome.user,
    }))
}

/// Confirm the caller's credential and return the current account.
#[utoipa::path(
    get,
    path = "/v1/auth/verify",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Credential is valid", body = VerifyResponse),
        (status = 401, description = "Missing or invalid credential, or unknown user"),
    )
)]
pub async fn verify(
    Auth(claims): Auth,
    State(state): State<AppState>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let user = state
        .users
        .find_by_id(claims.user_id)
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "user lookup failed");
            ApiError::internal("Internal server error")
        })?
        .filter(|user| user.is_active)
        .ok_or_else(|| {
            tracing::warn!(user_id = claims.user_id, "credential names a missing or inactive user");
            ApiError::unauthorized("User not found")
        })?;

    Ok(Json(VerifyResponse {
        success: true,
        message: "Token is valid".to_string(),
        user: UserSummary::from(&user),
    }))
}

/// Claims of the caller, or an anonymous marker.
#[utoipa::path(
    get,
    path = "/v1/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Session state", body = SessionResponse),
    )
)]
pub async fn me(OptionalAuth(claims): OptionalAuth) -> Json<SessionResponse> {
    Json(SessionResponse {
        authenticated: claims.is_some(),
        claims,
    })
}

/// Decode the caller's own credential for debugging.
///
/// The decoded view is informational; the role check has already run on
/// the verified claims.
#[utoipa::path(
    get,
    path = "/v1/admin/token-info",
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Decoded credential", body = TokenInfoResponse),
        (status = 401, description = "Missing or invalid credential"),
        (status = 403, description = "Admin role required"),
    )
)]
pub async fn token_info(
    AdminOnly(_claims): AdminOnly,
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    form_token: Option<Extension<FormToken>>,
) -> Result<Json<TokenInfoResponse>, ApiError> {
    let request = CredentialRequest {
        headers: &headers,
        query: uri.query(),
        form_token: form_token
            .as_ref()
            .map(|Extension(FormToken(token))| token.as_str()),
    };
    let token = state
        .gate
        .extract_credential(&request)
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    let token_info = state
        .issuer
        .inspect(&token, state.clock.now())
        .map_err(|err| ApiError::bad_request(err.to_string()))?;

    Ok(Json(TokenInfoResponse {
        success: true,
        token_info,
    }))
}
