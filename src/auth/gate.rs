// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorization gate.
//!
//! Locates a credential in an inbound request, runs it through the
//! [`TokenVerifier`] and applies the call-site policy (required, optional,
//! or role-restricted).
//!
//! ## Credential locations
//!
//! Searched in order, first match wins:
//!
//! 1. `Authorization: Bearer <token>`
//! 2. the same value under an alternate header name set by a proxy
//!    front-end (`X-Original-Authorization`, `X-Forwarded-Authorization`)
//! 3. a `token` field in a form-encoded POST body
//! 4. a `token` query parameter
//!
//! Locations 3 and 4 exist for older clients. Tokens in URLs and bodies end
//! up in access logs, so they can be switched off with
//! `AUTH_LEGACY_TOKEN_LOCATIONS=false`.

use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderMap, HeaderName};

use super::claims::Claims;
use super::clock::Clock;
use super::error::{AuthError, AuthFailure};
use super::verifier::TokenVerifier;

/// Name of the form field and query parameter carrying a credential.
pub const TOKEN_PARAM: &str = "token";

/// Alternate header names checked when `Authorization` is absent.
pub const DEFAULT_ALTERNATE_HEADERS: [&str; 2] =
    ["x-original-authorization", "x-forwarded-authorization"];

/// Transport-neutral view of the parts of a request that may carry a credential.
#[derive(Debug, Clone, Copy)]
pub struct CredentialRequest<'a> {
    pub headers: &'a HeaderMap,
    /// Raw query string, without the leading `?`
    pub query: Option<&'a str>,
    /// `token` field of a form-encoded body, if one was captured
    pub form_token: Option<&'a str>,
}

impl<'a> CredentialRequest<'a> {
    pub fn from_headers(headers: &'a HeaderMap) -> Self {
        Self {
            headers,
            query: None,
            form_token: None,
        }
    }
}

/// One place a credential may be found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    AuthorizationHeader,
    AlternateHeader(HeaderName),
    FormField,
    QueryParam,
}

impl CredentialSource {
    /// Build the ordered source list.
    ///
    /// `legacy` enables the form-field and query-parameter fallbacks.
    pub fn ordered(alternate_headers: &[HeaderName], legacy: bool) -> Vec<CredentialSource> {
        let mut sources = vec![CredentialSource::AuthorizationHeader];
        sources.extend(
            alternate_headers
                .iter()
                .cloned()
                .map(CredentialSource::AlternateHeader),
        );
        if legacy {
            sources.push(CredentialSource::FormField);
            sources.push(CredentialSource::QueryParam);
        }
        sources
    }

    pub fn name(&self) -> &'static str {
        match self {
            CredentialSource::AuthorizationHeader => "authorization_header",
            CredentialSource::AlternateHeader(_) => "alternate_header",
            CredentialSource::FormField => "form_field",
            CredentialSource::QueryParam => "query_param",
        }
    }

    fn is_legacy(&self) -> bool {
        matches!(self, CredentialSource::FormField | CredentialSource::QueryParam)
    }

    /// Try to read a credential from this source.
    pub fn extract(&self, request: &CredentialRequest<'_>) -> Option<String> {
        match self {
            CredentialSource::AuthorizationHeader => header_bearer(request.headers, &AUTHORIZATION),
            CredentialSource::AlternateHeader(name) => header_bearer(request.headers, name),
            CredentialSource::FormField => request
                .form_token
                .filter(|token| !token.is_empty())
                .map(str::to_string),
            CredentialSource::QueryParam => request.query.and_then(query_token),
        }
    }
}

fn header_bearer(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    headers
        .get_all(name)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(bearer_token)
        .map(str::to_string)
}

/// Parse `Bearer <token>` (case-sensitive scheme, single space).
pub fn bearer_token(value: &str) -> Option<&str> {
    let rest = value.trim().strip_prefix("Bearer ")?;
    let token = rest.split(char::is_whitespace).next()?;
    (!token.is_empty()).then_some(token)
}

/// Read a non-empty `token` value from a form-encoded string.
pub fn form_token(encoded: &str) -> Option<String> {
    url::form_urlencoded::parse(encoded.as_bytes())
        .find(|(key, _)| key == TOKEN_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

fn query_token(query: &str) -> Option<String> {
    form_token(query)
}

/// Applies credentials from requests against the verifier.
///
/// Stateless per call; share one instance behind an `Arc`.
#[derive(Clone)]
pub struct AuthGate {
    verifier: TokenVerifier,
    clock: Arc<dyn Clock>,
    sources: Vec<CredentialSource>,
}

impl AuthGate {
    /// Gate with every credential location enabled and the default
    /// alternate header names.
    pub fn new(verifier: TokenVerifier, clock: Arc<dyn Clock>) -> Self {
        let alternate: Vec<HeaderName> = DEFAULT_ALTERNATE_HEADERS
            .into_iter()
            .map(HeaderName::from_static)
            .collect();
        Self {
            verifier,
            clock,
            sources: CredentialSource::ordered(&alternate, true),
        }
    }

    /// Replace the credential search order.
    pub fn with_sources(mut self, sources: Vec<CredentialSource>) -> Self {
        self.sources = sources;
        self
    }

    pub fn sources(&self) -> &[CredentialSource] {
        &self.sources
    }

    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    /// Find the first credential in the configured search order.
    pub fn extract_credential(&self, request: &CredentialRequest<'_>) -> Option<String> {
        self.sources.iter().find_map(|source| {
            let token = source.extract(request)?;
            if source.is_legacy() {
                tracing::warn!(
                    source = source.name(),
                    "credential read from a legacy location; prefer the Authorization header"
                );
            } else {
                tracing::trace!(source = source.name(), "credential located");
            }
            Some(token)
        })
    }

    /// Extract and verify, keeping the precise failure.
    pub fn authenticate(&self, request: &CredentialRequest<'_>) -> Result<Claims, AuthFailure> {
        let token = self
            .extract_credential(request)
            .ok_or(AuthFailure::NoCredential)?;
        self.verifier
            .verify(&token, self.clock.now())
            .map_err(AuthFailure::Rejected)
    }

    /// Require a valid credential.
    pub fn require_auth(&self, request: &CredentialRequest<'_>) -> Result<Claims, AuthError> {
        self.authenticate(request).map_err(|failure| {
            tracing::warn!(reason = failure.code(), "request rejected: unauthenticated");
            AuthError::Unauthenticated(failure)
        })
    }

    /// Accept anonymous callers; returns `None` on any failure.
    pub fn optional_auth(&self, request: &CredentialRequest<'_>) -> Option<Claims> {
        match self.authenticate(request) {
            Ok(claims) => Some(claims),
            Err(failure) => {
                tracing::debug!(reason = failure.code(), "continuing anonymously");
                None
            }
        }
    }

    /// Require a valid credential whose role is exactly `role`.
    pub fn require_role(
        &self,
        request: &CredentialRequest<'_>,
        role: &str,
    ) -> Result<Claims, AuthError> {
        let claims = self.require_auth(request)?;
        if !claims.has_role(role) {
            tracing::warn!(
                user_id = claims.user_id,
                required = role,
                actual = %claims.role,
                "request rejected: insufficient role"
            );
            return Err(AuthError::Forbidden);
        }
        Ok(claims)
    }
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGate")
            .field("verifier", &self.verifier)
            .field("sources", &self.sources)
            .finish_non_exhaustive()
    }
}
