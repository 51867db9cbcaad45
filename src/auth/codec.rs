// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wire codec for the three-segment credential.
//!
//! Segments are base64url without padding on output. On input, trailing
//! `=` padding is tolerated (at most two characters) since some clients
//! re-pad segments before sending them back.

use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::Sha256;
use thiserror::Error;

use super::secret::SigningSecret;

type HmacSha256 = Hmac<Sha256>;

/// JSON object decoded from a segment.
pub type JsonObject = Map<String, Value>;

/// Failure to turn a segment back into a JSON object.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SegmentError {
    #[error("segment is not valid base64url")]
    Base64,
    #[error("segment is not a JSON object")]
    Json,
}

pub fn encode(bytes: &[u8]) -> String {
    Base64UrlUnpadded::encode_string(bytes)
}

pub fn decode(segment: &str) -> Result<Vec<u8>, SegmentError> {
    let trimmed = segment.trim_end_matches('=');
    if segment.len() - trimmed.len() > 2 {
        return Err(SegmentError::Base64);
    }
    Base64UrlUnpadded::decode_vec(trimmed).map_err(|_| SegmentError::Base64)
}

/// Serialize a value as compact JSON and base64url-encode it.
pub fn encode_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(value)?;
    Ok(encode(&json))
}

/// Decode a segment into a JSON object. Arrays, scalars and invalid JSON
/// are all treated as decode failures.
pub fn decode_object(segment: &str) -> Result<JsonObject, SegmentError> {
    let bytes = decode(segment)?;
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(SegmentError::Json),
    }
}

/// The HMAC key was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("signing key rejected by HMAC")]
pub struct SigningKeyError;

/// HMAC-SHA256 over `header_b64.claims_b64`, base64url-encoded.
pub fn sign(
    secret: &SigningSecret,
    header_b64: &str,
    claims_b64: &str,
) -> Result<String, SigningKeyError> {
    let mac = signing_mac(secret, header_b64, claims_b64)?;
    Ok(encode(&mac.finalize().into_bytes()))
}

/// Keyed MAC primed with the signing input.
pub(crate) fn signing_mac(
    secret: &SigningSecret,
    header_b64: &str,
    claims_b64: &str,
) -> Result<HmacSha256, SigningKeyError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SigningKeyError)?;
    mac.update(header_b64.as_bytes());
    mac.update(b".");
    mac.update(claims_b64.as_bytes());
    Ok(mac)
}
