// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Email/password login.
//!
//! Accounts lock for [`LOCKOUT_MINUTES`] after [`MAX_LOGIN_ATTEMPTS`]
//! consecutive password failures. A successful login clears the counter.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::auth::{IssueError, PasswordVerifier, TokenIssuer};
use crate::models::UserSummary;
use crate::store::{LockoutPolicy, StoreError, UserStore};

/// Failed attempts before the account is locked.
pub const MAX_LOGIN_ATTEMPTS: u32 = 5;

/// Lock duration once the limit is reached.
pub const LOCKOUT_MINUTES: i64 = 30;

fn lockout_policy() -> LockoutPolicy {
    LockoutPolicy {
        max_attempts: MAX_LOGIN_ATTEMPTS,
        lock_for: Duration::minutes(LOCKOUT_MINUTES),
    }
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Email and password are required")]
    MissingCredentials,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Account temporarily locked. Try again later.")]
    Locked { until: DateTime<Utc> },
    #[error("Your account is inactive. Please contact support.")]
    Inactive,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Issue(#[from] IssueError),
}

/// A successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub expires_at: i64,
    pub user: UserSummary,
}

/// Checks credentials against the user store and issues tokens.
pub struct LoginService<S, P> {
    store: Arc<S>,
    passwords: P,
    issuer: Arc<TokenIssuer>,
}

impl<S: UserStore, P: PasswordVerifier> LoginService<S, P> {
    pub fn new(store: Arc<S>, passwords: P, issuer: Arc<TokenIssuer>) -> Self {
        Self {
            store,
            passwords,
            issuer,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub async fn login(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<LoginOutcome, LoginError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            tracing::warn!("login failed: email or password missing");
            return Err(LoginError::MissingCredentials);
        }

        let Some(user) = self.store.find_by_email(email).await? else {
            tracing::warn!(email, "login failed: unknown user");
            return Err(LoginError::InvalidCredentials);
        };

        if let Some(until) = user.account_locked_until.filter(|_| user.is_locked(now)) {
            tracing::warn!(user_id = user.id, %until, "login failed: account locked");
            return Err(LoginError::Locked { until });
        }

        if !user.is_active {
            tracing::warn!(user_id = user.id, "login failed: account inactive");
            return Err(LoginError::Inactive);
        }

        if !self.passwords.verify(password, &user.password_hash) {
            let failed = self
                .store
                .record_failed_login(user.id, now, lockout_policy())
                .await?;
            let just_locked = failed.attempts == MAX_LOGIN_ATTEMPTS;
            if let Some(until) = failed.locked_until.filter(|_| just_locked) {
                tracing::warn!(user_id = user.id, %until, "account locked after repeated failures");
            }
            tracing::warn!(
                user_id = user.id,
                attempts = failed.attempts,
                "login failed: invalid password"
            );
            return Err(LoginError::InvalidCredentials);
        }

        let expires_at = self.issuer.expires_at(now.timestamp())?;
        let identity = user.identity();
        let token = self.issuer.issue(&identity, now.timestamp())?;
        self.store.record_successful_login(user.id, now).await?;

        tracing::info!(user_id = user.id, role = %user.role, "login successful");

        Ok(LoginOutcome {
            token,
            expires_at,
            user: UserSummary::from(&user),
        })
    }
}
