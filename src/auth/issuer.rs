// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential issuance.
//!
//! A credential is `base64url(header).base64url(claims).base64url(hmac)`
//! where the HMAC-SHA256 is keyed with the shared [`SigningSecret`] and
//! computed over the first two segments joined by `.`.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use utoipa::ToSchema;

use super::claims::{Claims, TokenHeader, UserIdentity};
use super::codec::{self, SegmentError, SigningKeyError};
use super::secret::{ConfigError, SigningSecret};

/// Default expiry window (24 hours).
pub const DEFAULT_EXPIRY_SECS: i64 = 24 * 60 * 60;

/// Failure to encode a credential.
#[derive(Debug, Error)]
pub enum IssueError {
    #[error("failed to encode credential: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Signing(#[from] SigningKeyError),
    #[error("expiry window of {expiry_secs}s from {now} overflows the timestamp range")]
    ExpiryOverflow { now: i64, expiry_secs: i64 },
}

/// Issues signed, time-bounded credentials.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    secret: SigningSecret,
    expiry_secs: i64,
}

impl TokenIssuer {
    /// Create an issuer. `expiry_secs` must be positive.
    pub fn new(secret: SigningSecret, expiry_secs: i64) -> Result<Self, ConfigError> {
        if expiry_secs <= 0 {
            return Err(ConfigError::InvalidExpiry(expiry_secs));
        }
        Ok(Self {
            secret,
            expiry_secs,
        })
    }

    /// Create an issuer from raw secret bytes with the default 24h expiry.
    pub fn from_secret(secret: impl AsRef<[u8]>) -> Result<Self, ConfigError> {
        Self::new(SigningSecret::new(secret)?, DEFAULT_EXPIRY_SECS)
    }

    pub fn expiry_secs(&self) -> i64 {
        self.expiry_secs
    }

    /// Expiry of a credential issued at `now`.
    pub fn expires_at(&self, now: i64) -> Result<i64, IssueError> {
        now.checked_add(self.expiry_secs)
            .ok_or(IssueError::ExpiryOverflow {
                now,
                expiry_secs: self.expiry_secs,
            })
    }

    /// Build the claims a credential for `user` issued at `now` would carry.
    pub fn claims_for(&self, user: &UserIdentity, now: i64) -> Result<Claims, IssueError> {
        let name = user
            .full_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&user.email)
            .to_string();

        Ok(Claims {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role.clone(),
            name,
            iat: Some(now),
            exp: self.expires_at(now)?,
            nbf: None,
        })
    }

    /// Issue a credential for an authenticated user.
    pub fn issue(&self, user: &UserIdentity, now: i64) -> Result<String, IssueError> {
        let claims = self.claims_for(user, now)?;
        let token = self.sign(&claims)?;
        tracing::debug!(user_id = user.id, exp = claims.exp, "issued credential");
        Ok(token)
    }

    /// Sign an arbitrary claims payload. Used for impersonation and test issuance.
    pub fn sign(&self, claims: &Claims) -> Result<String, IssueError> {
        let header_b64 = codec::encode_json(&TokenHeader::default())?;
        let claims_b64 = claims.to_segment()?;
        let signature_b64 = codec::sign(&self.secret, &header_b64, &claims_b64)?;
        Ok(format!("{header_b64}.{claims_b64}.{signature_b64}"))
    }

    /// Decode a credential without verifying it.
    ///
    /// For diagnostics only: the result says nothing about authenticity and
    /// must never drive an authorization decision.
    pub fn inspect(&self, token: &str, now: i64) -> Result<DecodedView, InspectError> {
        inspect(token, now)
    }
}

/// Unverified view of a credential.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DecodedView {
    /// Decoded header object
    #[schema(value_type = Object)]
    pub header: Value,
    /// Decoded claims object
    #[schema(value_type = Object)]
    pub claims: Value,
    /// Signature segment as presented (not checked)
    pub signature: String,
    /// Whether `exp` is in the past
    pub expired: bool,
    pub current_time: i64,
    pub expiry_time: Option<i64>,
    pub time_until_expiry: Option<i64>,
}

/// Why a credential could not be inspected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InspectError {
    #[error("invalid token structure: expected 3 parts")]
    InvalidStructure,
    #[error("header decoding failed")]
    HeaderDecode,
    #[error("payload decoding failed")]
    PayloadDecode,
    #[error("header JSON parsing failed")]
    HeaderJson,
    #[error("payload JSON parsing failed")]
    PayloadJson,
}

/// Decode header and claims without checking the signature.
pub fn inspect(token: &str, now: i64) -> Result<DecodedView, InspectError> {
    let parts: Vec<&str> = token.split('.').collect();
    let [header, payload, signature] = parts.as_slice() else {
        return Err(InspectError::InvalidStructure);
    };

    let header = codec::decode_object(header).map_err(|e| match e {
        SegmentError::Base64 => InspectError::HeaderDecode,
        SegmentError::Json => InspectError::HeaderJson,
    })?;
    let claims = codec::decode_object(payload).map_err(|e| match e {
        SegmentError::Base64 => InspectError::PayloadDecode,
        SegmentError::Json => InspectError::PayloadJson,
    })?;

    let expiry_time = claims.get("exp").and_then(Value::as_i64);

    Ok(DecodedView {
        header: Value::Object(header),
        claims: Value::Object(claims),
        signature: signature.to_string(),
        expired: expiry_time.is_some_and(|exp| exp < now),
        current_time: now,
        expiry_time,
        time_until_expiry: expiry_time.and_then(|exp| exp.checked_sub(now)),
    })
}
