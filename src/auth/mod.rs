// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Stateless bearer credentials for the catalog/order API.
//!
//! ## Auth Flow
//!
//! 1. Client posts email + password to `/v1/auth/login`
//! 2. Server checks the account and issues
//!    `base64url(header).base64url(claims).base64url(HMAC-SHA256)`
//! 3. Client sends `Authorization: Bearer <credential>` on later requests
//! 4. [`AuthGate`] extracts the credential, [`TokenVerifier`] checks
//!    structure, algorithm, signature, mandatory claims and time window
//! 5. Handlers receive [`Claims`] through the [`Auth`], [`OptionalAuth`],
//!    [`RequireRole`] or [`AdminOnly`] extractors
//!
//! ## Security
//!
//! - HS256 only; any other `alg` (including `none`) is rejected
//! - Signature comparison is constant-time
//! - Clock skew tolerance for `iat` is 60 seconds
//! - Nothing is stored server-side: rotating the secret invalidates every
//!   outstanding credential
//! - Clients only ever see a generic 401/403; the precise rejection is logged

pub mod claims;
pub mod clock;
pub mod codec;
pub mod error;
pub mod extractor;
pub mod gate;
pub mod issuer;
pub mod middleware;
pub mod password;
pub mod roles;
pub mod secret;
pub mod verifier;

pub use claims::{Claims, UserIdentity};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{AuthError, AuthFailure};
pub use extractor::{AdminOnly, Auth, OptionalAuth, RequireRole};
pub use gate::{AuthGate, CredentialRequest, CredentialSource};
pub use issuer::{DecodedView, InspectError, IssueError, TokenIssuer};
pub use password::{BcryptVerifier, PasswordVerifier};
pub use roles::Role;
pub use secret::{ConfigError, SigningSecret};
pub use verifier::{Rejection, TokenVerifier};
