// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Catalog Auth Server - Stateless Bearer Credentials
//!
//! This crate issues and verifies HS256-signed bearer credentials for a
//! catalog/order web application and gates HTTP handlers on them.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Credential issuing, verification and request gating
//! - `login` - Email/password login with account lockout
//! - `store` - User store seam and in-memory implementation

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod login;
pub mod models;
pub mod state;
pub mod store;
