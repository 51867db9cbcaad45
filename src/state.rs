// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use axum::extract::FromRef;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::auth::{
    password::hash_password, AuthGate, BcryptVerifier, Clock, ConfigError, CredentialSource,
    Role, SigningSecret, SystemClock, TokenIssuer, TokenVerifier,
};
use crate::config::{SeedAdmin, Settings};
use crate::login::LoginService;
use crate::store::{InMemoryUserStore, NewUser, StoreError, UserRecord, UserStore};

pub type AppLoginService = LoginService<InMemoryUserStore, BcryptVerifier>;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub gate: Arc<AuthGate>,
    pub issuer: Arc<TokenIssuer>,
    pub login: Arc<AppLoginService>,
    pub users: Arc<InMemoryUserStore>,
    pub clock: Arc<dyn Clock>,
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to hash seed password: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AppState {
    /// Wire issuer, verifier, gate and login service around one secret.
    pub fn new(
        secret: SigningSecret,
        token_ttl_secs: i64,
        sources: Vec<CredentialSource>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        let issuer = Arc::new(TokenIssuer::new(secret.clone(), token_ttl_secs)?);
        let gate = AuthGate::new(TokenVerifier::new(secret), clock.clone()).with_sources(sources);
        let users = Arc::new(InMemoryUserStore::new());
        let login = LoginService::new(users.clone(), BcryptVerifier, issuer.clone());

        Ok(Self {
            gate: Arc::new(gate),
            issuer,
            login: Arc::new(login),
            users,
            clock,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        Self::new(
            settings.secret.clone(),
            settings.token_ttl_secs,
            settings.credential_sources(),
            Arc::new(SystemClock),
        )
    }

    /// Current time as seen by the gate.
    pub fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.clock.now(), 0).unwrap_or_else(Utc::now)
    }

    /// Create the bootstrap admin unless the email is already taken.
    pub async fn seed_admin(&self, seed: &SeedAdmin) -> Result<Option<UserRecord>, SeedError> {
        if self.users.find_by_email(&seed.email).await?.is_some() {
            tracing::info!(email = %seed.email, "seed admin already present");
            return Ok(None);
        }

        let user = self
            .users
            .insert(NewUser {
                email: seed.email.clone(),
                password_hash: hash_password(&seed.password)?,
                role: Role::Admin.as_str().to_string(),
                full_name: Some("Administrator".to_string()),
                is_active: true,
            })
            .await?;
        tracing::info!(user_id = user.id, "seed admin created");
        Ok(Some(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::FixedClock;

    #[tokio::test]
    async fn seed_admin_is_idempotent() {
        let state = AppState::new(
            SigningSecret::new("state-secret").unwrap(),
            3600,
            CredentialSource::ordered(&[], false),
            Arc::new(FixedClock(1_000)),
        )
        .unwrap();
        let seed = SeedAdmin {
            email: "root@example.com".to_string(),
            password: "hunter22".to_string(),
        };

        let created = state.seed_admin(&seed).await.unwrap().unwrap();
        assert_eq!(created.role, "Admin");
        assert!(state.seed_admin(&seed).await.unwrap().is_none());
        assert_eq!(state.users.len().await, 1);
        assert_eq!(state.now().timestamp(), 1_000);
    }

    #[test]
    fn invalid_ttl_is_rejected() {
        let result = AppState::new(
            SigningSecret::new("state-secret").unwrap(),
            0,
            Vec::new(),
            Arc::new(SystemClock),
        );
        assert!(matches!(result, Err(ConfigError::InvalidExpiry(0))));
    }
}
