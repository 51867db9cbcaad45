// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential verification.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. structure (exactly three non-empty segments)
//! 2. base64url + JSON object decoding of header and claims
//! 3. `alg == "HS256"`
//! 4. HMAC-SHA256 signature (constant-time)
//! 5. mandatory claims (`exp`, `user_id`, `email`)
//! 6. `exp >= now`
//! 7. `iat <= now + 60`
//! 8. `nbf <= now`
//!
//! No claim value is interpreted before the signature has been checked.

use hmac::Mac;
use serde_json::Value;
use thiserror::Error;

use super::claims::{Claims, ALGORITHM};
use super::codec::{self, JsonObject};
use super::secret::{ConfigError, SigningSecret};

/// Clock skew tolerance for `iat` (60 seconds).
pub const CLOCK_SKEW_LEEWAY: i64 = 60;

/// Claims that must be present in every credential.
const REQUIRED_CLAIMS: [&str; 3] = ["exp", "user_id", "email"];

/// Why a credential was not accepted.
///
/// Each variant is a distinct outcome so callers can audit the cause, but
/// none of them is meant to be echoed back to a client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("credential does not have three non-empty segments")]
    MalformedStructure,
    #[error("credential segment is not base64url-encoded JSON")]
    DecodeFailure,
    #[error("unsupported signing algorithm")]
    UnsupportedAlgorithm,
    #[error("credential signature does not match")]
    SignatureMismatch,
    #[error("credential is missing the `{0}` claim")]
    MissingClaim(&'static str),
    #[error("credential has expired")]
    Expired,
    #[error("credential was issued in the future")]
    IssuedInFuture,
    #[error("credential is not yet valid")]
    NotYetValid,
    #[error("credential verification failed")]
    VerificationFailed,
}

impl Rejection {
    /// Stable machine-readable code for logs and audits.
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::MalformedStructure => "malformed_structure",
            Rejection::DecodeFailure => "decode_failure",
            Rejection::UnsupportedAlgorithm => "unsupported_algorithm",
            Rejection::SignatureMismatch => "signature_mismatch",
            Rejection::MissingClaim(_) => "missing_claim",
            Rejection::Expired => "expired",
            Rejection::IssuedInFuture => "issued_in_future",
            Rejection::NotYetValid => "not_yet_valid",
            Rejection::VerificationFailed => "verification_failed",
        }
    }
}

/// Verifies credentials signed with the shared secret.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    secret: SigningSecret,
}

impl TokenVerifier {
    pub fn new(secret: SigningSecret) -> Self {
        Self { secret }
    }

    /// Create a verifier from raw secret bytes.
    pub fn from_secret(secret: impl AsRef<[u8]>) -> Result<Self, ConfigError> {
        Ok(Self::new(SigningSecret::new(secret)?))
    }

    /// Verify `token` at time `now` (unix seconds).
    pub fn verify(&self, token: &str, now: i64) -> Result<Claims, Rejection> {
        let token = token.trim();

        let segments: Vec<&str> = token.split('.').collect();
        let [header_b64, claims_b64, signature_b64] = segments.as_slice() else {
            return Err(Rejection::MalformedStructure);
        };
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(Rejection::MalformedStructure);
        }

        let header = codec::decode_object(header_b64).map_err(|_| Rejection::DecodeFailure)?;
        let claims = codec::decode_object(claims_b64).map_err(|_| Rejection::DecodeFailure)?;

        if header.get("alg").and_then(Value::as_str) != Some(ALGORITHM) {
            return Err(Rejection::UnsupportedAlgorithm);
        }

        self.check_signature(header_b64, claims_b64, signature_b64)?;

        let claims = parse_claims(claims)?;

        if claims.exp < now {
            return Err(Rejection::Expired);
        }
        if claims.iat.is_some_and(|iat| iat > now + CLOCK_SKEW_LEEWAY) {
            return Err(Rejection::IssuedInFuture);
        }
        if claims.nbf.is_some_and(|nbf| nbf > now) {
            return Err(Rejection::NotYetValid);
        }

        Ok(claims)
    }

    /// Compare the presented signature with the one recomputed over the
    /// undecoded header and claims segments.
    fn check_signature(
        &self,
        header_b64: &str,
        claims_b64: &str,
        signature_b64: &str,
    ) -> Result<(), Rejection> {
        let presented = codec::decode(signature_b64).map_err(|_| Rejection::SignatureMismatch)?;

        codec::signing_mac(&self.secret, header_b64, claims_b64)
            .map_err(|_| Rejection::VerificationFailed)?
            .verify_slice(&presented)
            .map_err(|_| Rejection::SignatureMismatch)?;

        // Padded or non-canonical spellings of the right digest are still
        // a different credential.
        if codec::encode(&presented) != signature_b64 {
            return Err(Rejection::SignatureMismatch);
        }
        Ok(())
    }
}

fn parse_claims(claims: JsonObject) -> Result<Claims, Rejection> {
    if let Some(missing) = REQUIRED_CLAIMS
        .into_iter()
        .find(|name| claims.get(*name).is_none_or(Value::is_null))
    {
        return Err(Rejection::MissingClaim(missing));
    }
    serde_json::from_value(Value::Object(claims)).map_err(|_| Rejection::DecodeFailure)
}
