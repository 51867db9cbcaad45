// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Password checks via bcrypt.

/// bcrypt cost factor for newly hashed passwords.
const BCRYPT_COST: u32 = 10;

/// One-way password comparison.
pub trait PasswordVerifier: Send + Sync {
    /// `true` when `password` matches the stored `hash`.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// bcrypt-backed [`PasswordVerifier`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BcryptVerifier;

impl PasswordVerifier for BcryptVerifier {
    fn verify(&self, password: &str, hash: &str) -> bool {
        match bcrypt::verify(password, hash) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(error = %e, "stored password hash could not be checked");
                false
            }
        }
    }
}

/// Hash a password for storage.
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, BCRYPT_COST)
}
