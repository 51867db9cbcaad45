// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared HMAC signing secret.

use std::sync::Arc;

use thiserror::Error;

/// Fatal configuration errors.
///
/// Raised at construction time; a process that hits one of these must not
/// start serving requests.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The signing secret is missing or empty.
    #[error("credential signing secret is not configured")]
    MissingSecret,
    /// The expiry window is zero or negative.
    #[error("credential expiry must be a positive number of seconds, got {0}")]
    InvalidExpiry(i64),
    /// An environment variable could not be parsed.
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// The symmetric secret used by both the issuer and the verifier.
///
/// Cloning is cheap (reference counted) and the bytes are never printed.
#[derive(Clone)]
pub struct SigningSecret(Arc<[u8]>);

impl SigningSecret {
    /// Wrap raw secret bytes. Empty secrets are rejected.
    pub fn new(bytes: impl AsRef<[u8]>) -> Result<Self, ConfigError> {
        let bytes = bytes.as_ref();
        if bytes.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        Ok(Self(Arc::from(bytes)))
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the secret in bytes (safe to log).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SigningSecret([REDACTED; {} bytes])", self.0.len())
    }
}
