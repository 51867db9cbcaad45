// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential header and claims.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::codec::{self, SegmentError};

/// The only signing algorithm this service issues or accepts.
pub const ALGORITHM: &str = "HS256";

/// Credential type marker.
pub const TOKEN_TYPE: &str = "JWT";

/// Credential header. Fixed for every credential this service issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHeader {
    pub typ: String,
    pub alg: String,
}

impl Default for TokenHeader {
    fn default() -> Self {
        Self {
            typ: TOKEN_TYPE.to_string(),
            alg: ALGORITHM.to_string(),
        }
    }
}

/// Verified claims carried by a credential.
///
/// Field order matches the serialized payload:
/// `{"user_id","email","role","name","iat","exp"}` plus optional `nbf`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// Numeric user id from the user store
    pub user_id: i64,
    /// Account email
    pub email: String,
    /// Role name, e.g. `"Admin"`
    #[serde(default)]
    pub role: String,
    /// Display name (falls back to the email at issuance)
    #[serde(default)]
    pub name: String,
    /// Issued at (unix seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Expires at (unix seconds, inclusive)
    pub exp: i64,
    /// Not valid before (unix seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
}

impl Claims {
    /// Encode as a base64url claims segment.
    pub fn to_segment(&self) -> Result<String, serde_json::Error> {
        codec::encode_json(self)
    }

    /// Decode a base64url claims segment without any signature or time checks.
    pub fn from_segment(segment: &str) -> Result<Self, SegmentError> {
        let object = codec::decode_object(segment)?;
        serde_json::from_value(serde_json::Value::Object(object)).map_err(|_| SegmentError::Json)
    }

    /// Check the claim against a role name (exact, case-sensitive).
    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }
}

/// The subset of a user record needed to issue a credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: i64,
    pub email: String,
    pub role: String,
    pub full_name: Option<String>,
}
