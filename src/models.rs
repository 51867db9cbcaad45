// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the authentication endpoints. All types
//! derive `ToSchema` for the OpenAPI document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{Claims, DecodedView};
use crate::store::UserRecord;

/// Body of `POST /v1/auth/login`.
///
/// Missing fields deserialize as empty strings so they surface as a 400
/// from the login workflow rather than a JSON rejection.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Public view of a user account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserSummary {
    pub id: i64,
    pub email: String,
    pub role: String,
    pub name: String,
    /// Previous successful login, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

impl From<&UserRecord> for UserSummary {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role.clone(),
            name: user
                .full_name
                .clone()
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| user.email.clone()),
            last_login: user.last_login,
        }
    }
}

/// Successful login.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    /// Bearer credential
    pub token: String,
    /// Credential expiry (unix seconds)
    pub expires_at: i64,
    pub user: UserSummary,
}

/// Result of `GET /v1/auth/verify`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VerifyResponse {
    pub success: bool,
    pub message: String,
    pub user: UserSummary,
}

/// Result of `GET /v1/auth/me`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claims: Option<Claims>,
}

/// Result of `GET /v1/admin/token-info`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenInfoResponse {
    pub success: bool,
    pub token_info: DecodedView,
}
