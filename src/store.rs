// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User store seam.
//!
//! The relational user table lives outside this service's core; the login
//! workflow only needs lookups by email or id and the login-attempt
//! bookkeeping below. [`InMemoryUserStore`] backs development and tests.

use std::collections::HashMap;
use std::future::Future;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tokio::sync::RwLock;
use unicode_normalization::UnicodeNormalization;

use crate::auth::UserIdentity;

/// Store failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user {0} not found")]
    NotFound(i64),
    #[error("a user with email {0} already exists")]
    DuplicateEmail(String),
}

/// A row of the users table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub login_attempts: u32,
    pub account_locked_until: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
}

impl UserRecord {
    pub fn identity(&self) -> UserIdentity {
        UserIdentity {
            id: self.id,
            email: self.email.clone(),
            role: self.role.clone(),
            full_name: self.full_name.clone(),
        }
    }

    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.account_locked_until.is_some_and(|until| until > now)
    }
}

/// Fields needed to create a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub full_name: Option<String>,
    pub is_active: bool,
}

/// When repeated password failures lock an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    pub max_attempts: u32,
    pub lock_for: Duration,
}

/// State of an account after a recorded failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailedLogin {
    pub attempts: u32,
    pub locked_until: Option<DateTime<Utc>>,
}

/// Lookups and login bookkeeping against the user table.
pub trait UserStore: Send + Sync {
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<UserRecord>, StoreError>> + Send;

    fn find_by_id(&self, id: i64)
        -> impl Future<Output = Result<Option<UserRecord>, StoreError>> + Send;

    /// Increment the attempt counter and, once it reaches the policy limit,
    /// lock the account. The read-modify-write must be atomic per user.
    fn record_failed_login(
        &self,
        id: i64,
        now: DateTime<Utc>,
        policy: LockoutPolicy,
    ) -> impl Future<Output = Result<FailedLogin, StoreError>> + Send;

    /// Reset attempts and lock, and stamp `last_login`.
    fn record_successful_login(
        &self,
        id: i64,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Canonical form used for email lookups: trimmed, NFKC, lowercase.
pub fn normalize_email(email: &str) -> String {
    email.trim().nfkc().collect::<String>().to_lowercase()
}

#[derive(Default)]
struct Users {
    by_id: HashMap<i64, UserRecord>,
    next_id: i64,
}

/// In-process user store.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<Users>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user, assigning the next id.
    pub async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let mut users = self.users.write().await;
        let key = normalize_email(&user.email);
        if users
            .by_id
            .values()
            .any(|existing| normalize_email(&existing.email) == key)
        {
            return Err(StoreError::DuplicateEmail(user.email));
        }

        users.next_id += 1;
        let record = UserRecord {
            id: users.next_id,
            email: user.email.trim().to_string(),
            password_hash: user.password_hash,
            role: user.role,
            full_name: user.full_name,
            is_active: user.is_active,
            login_attempts: 0,
            account_locked_until: None,
            last_login: None,
        };
        users.by_id.insert(record.id, record.clone());
        Ok(record)
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let key = normalize_email(email);
        let users = self.users.read().await;
        Ok(users
            .by_id
            .values()
            .find(|user| normalize_email(&user.email) == key)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.read().await.by_id.get(&id).cloned())
    }

    async fn record_failed_login(
        &self,
        id: i64,
        now: DateTime<Utc>,
        policy: LockoutPolicy,
    ) -> Result<FailedLogin, StoreError> {
        let mut users = self.users.write().await;
        let user = users.by_id.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        user.login_attempts = user.login_attempts.saturating_add(1);
        if user.login_attempts >= policy.max_attempts {
            user.account_locked_until = Some(now + policy.lock_for);
        }
        Ok(FailedLogin {
            attempts: user.login_attempts,
            locked_until: user.account_locked_until,
        })
    }

    async fn record_successful_login(&self, id: i64, at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let user = users.by_id.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        user.login_attempts = 0;
        user.account_locked_until = None;
        user.last_login = Some(at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: "Customer".to_string(),
            full_name: None,
            is_active: true,
        }
    }

    #[test]
    fn normalize_email_folds_case_and_width() {
        assert_eq!(normalize_email("  Shop@Example.COM "), "shop@example.com");
        // Fullwidth letters fold under NFKC
        assert_eq!(normalize_email("ｓｈｏｐ@example.com"), "shop@example.com");
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let store = InMemoryUserStore::new();
        let a = store.insert(new_user("a@example.com")).await.unwrap();
        let b = store.insert(new_user("b@example.com")).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = InMemoryUserStore::new();
        store.insert(new_user("a@example.com")).await.unwrap();
        let result = store.insert(new_user("A@Example.com")).await;
        assert!(matches!(result, Err(StoreError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn lookup_by_email_is_normalized() {
        let store = InMemoryUserStore::new();
        let inserted = store.insert(new_user("Buyer@Example.com")).await.unwrap();
        let found = store.find_by_email(" buyer@example.COM").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(inserted.id));
        assert!(store.find_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn login_bookkeeping_round_trip() {
        let store = InMemoryUserStore::new();
        let user = store.insert(new_user("a@example.com")).await.unwrap();
        let now = Utc::now();

        let policy = LockoutPolicy {
            max_attempts: 2,
            lock_for: Duration::minutes(30),
        };

        let first = store.record_failed_login(user.id, now, policy).await.unwrap();
        assert_eq!(first, FailedLogin { attempts: 1, locked_until: None });
        let second = store.record_failed_login(user.id, now, policy).await.unwrap();
        assert_eq!(second.locked_until, Some(now + Duration::minutes(30)));

        let locked = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(locked.login_attempts, 2);
        assert!(locked.is_locked(now));

        store.record_successful_login(user.id, now).await.unwrap();
        let reset = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(reset.login_attempts, 0);
        assert!(!reset.is_locked(now));
        assert_eq!(reset.last_login, Some(now));
    }

    #[tokio::test]
    async fn bookkeeping_on_unknown_user_fails() {
        let store = InMemoryUserStore::new();
        let result = store.record_successful_login(99, Utc::now()).await;
        assert!(matches!(result, Err(StoreError::NotFound(99))));
    }
}
