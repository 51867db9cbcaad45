// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorization gate errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::verifier::Rejection;

/// Why a request carried no usable identity.
///
/// Kept for audit logging only; never serialized into a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    /// No credential in any searched location
    NoCredential,
    /// A credential was found but rejected by the verifier
    Rejected(Rejection),
}

impl AuthFailure {
    pub fn code(&self) -> &'static str {
        match self {
            AuthFailure::NoCredential => "no_credential",
            AuthFailure::Rejected(rejection) => rejection.code(),
        }
    }
}

/// Gate-level authorization error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Missing or invalid credential (401)
    Unauthenticated(AuthFailure),
    /// Authenticated, but the role does not match (403)
    Forbidden,
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Client-facing error code. Identical for every unauthenticated cause.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::Unauthenticated(_) => "unauthenticated",
            AuthError::Forbidden => "insufficient_permissions",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::Unauthenticated(_) => write!(f, "Authentication required"),
            AuthError::Forbidden => write!(f, "Insufficient permissions"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut response = (
            status,
            Json(AuthErrorBody {
                error: self.to_string(),
                error_code: self.error_code().to_string(),
            }),
        )
            .into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                axum::http::header::WWW_AUTHENTICATE,
                axum::http::HeaderValue::from_static("Bearer"),
            );
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(error: AuthError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn unauthenticated_returns_401() {
        let (status, body) = body_of(AuthError::Unauthenticated(AuthFailure::NoCredential)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error_code"], "unauthenticated");
    }

    #[tokio::test]
    async fn rejection_subtype_is_not_disclosed() {
        let (_, expired) =
            body_of(AuthError::Unauthenticated(AuthFailure::Rejected(Rejection::Expired))).await;
        let (_, forged) = body_of(AuthError::Unauthenticated(AuthFailure::Rejected(
            Rejection::SignatureMismatch,
        )))
        .await;
        assert_eq!(expired, forged);
        assert!(!expired.to_string().contains("expired"));
    }

    #[tokio::test]
    async fn forbidden_returns_403() {
        let response = AuthError::Forbidden.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response.headers().get("www-authenticate").is_none());
    }

    #[test]
    fn failure_codes_pass_through_rejections() {
        assert_eq!(AuthFailure::NoCredential.code(), "no_credential");
        assert_eq!(
            AuthFailure::Rejected(Rejection::NotYetValid).code(),
            "not_yet_valid"
        );
    }
}
