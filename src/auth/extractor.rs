// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors over the [`AuthGate`].
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn list_orders(Auth(claims): Auth) -> impl IntoResponse {
//!     // claims.user_id, claims.role
//! }
//! ```
//!
//! Any state `S` works as long as `Arc<AuthGate>: FromRef<S>`.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use super::{
    claims::Claims,
    error::AuthError,
    gate::{AuthGate, CredentialRequest},
    middleware::FormToken,
    roles::Role,
};

fn credential_request(parts: &Parts) -> CredentialRequest<'_> {
    CredentialRequest {
        headers: &parts.headers,
        query: parts.uri.query(),
        form_token: parts
            .extensions
            .get::<FormToken>()
            .map(|FormToken(token)| token.as_str()),
    }
}

/// Requires a valid credential; rejects with 401 otherwise.
///
/// # Example
///
/// ```rust,ignore
/// async fn update_settings(
///     Auth(claims): Auth,
///     State(state): State<AppState>,
/// ) -> Result<Json<Settings>, ApiError> {
///     // claims.user_id identifies the caller
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Auth(pub Claims);

impl<S> FromRequestParts<S> for Auth
where
    Arc<AuthGate>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let gate = Arc::<AuthGate>::from_ref(state);
        gate.require_auth(&credential_request(parts)).map(Auth)
    }
}

/// Optional authentication.
///
/// Yields `None` for anonymous or invalid credentials instead of rejecting.
#[derive(Debug, Clone)]
pub struct OptionalAuth(pub Option<Claims>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    Arc<AuthGate>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let gate = Arc::<AuthGate>::from_ref(state);
        Ok(OptionalAuth(gate.optional_auth(&credential_request(parts))))
    }
}

/// Requires a valid credential with exactly the role selected by `R`
/// (see [`Role::from_tag`]); 401 without a credential, 403 on a role mismatch.
///
/// ```rust,ignore
/// async fn ship_order(RequireRole(claims): RequireRole<{ Role::STAFF_TAG }>) { }
/// ```
#[derive(Debug, Clone)]
pub struct RequireRole<const R: u8>(pub Claims);

impl<S, const R: u8> FromRequestParts<S> for RequireRole<R>
where
    Arc<AuthGate>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let gate = Arc::<AuthGate>::from_ref(state);
        gate.require_role(&credential_request(parts), Role::from_tag(R).as_str())
            .map(RequireRole)
    }
}

/// Requires the `Admin` role.
#[derive(Debug, Clone)]
pub struct AdminOnly(pub Claims);

impl<S> FromRequestParts<S> for AdminOnly
where
    Arc<AuthGate>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireRole(claims) =
            RequireRole::<{ Role::ADMIN_TAG }>::from_request_parts(parts, state).await?;
        Ok(AdminOnly(claims))
    }
}
