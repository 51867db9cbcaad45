// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults and the typed [`Settings`] loaded
//! once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `AUTH_SECRET` | Shared HMAC signing secret | Required |
//! | `AUTH_TOKEN_TTL_SECS` | Credential lifetime in seconds | `86400` |
//! | `AUTH_LEGACY_TOKEN_LOCATIONS` | Accept credentials from form fields and query strings | `true` |
//! | `AUTH_ALT_HEADERS` | Comma-separated alternate bearer headers | `x-original-authorization,x-forwarded-authorization` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//! | `SEED_ADMIN_EMAIL` | Bootstrap admin account email | Unset |
//! | `SEED_ADMIN_PASSWORD` | Bootstrap admin account password | Unset |

use axum::http::HeaderName;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::{gate::DEFAULT_ALTERNATE_HEADERS, issuer::DEFAULT_EXPIRY_SECS};
use crate::auth::{ConfigError, CredentialSource, SigningSecret};

/// Environment variable holding the HMAC signing secret.
///
/// Must be identical on every instance that issues or verifies
/// credentials. Changing it invalidates every outstanding credential.
pub const AUTH_SECRET_ENV: &str = "AUTH_SECRET";

/// Environment variable for the credential lifetime in seconds.
pub const AUTH_TOKEN_TTL_ENV: &str = "AUTH_TOKEN_TTL_SECS";

/// Environment variable toggling the form-field and query-string fallbacks.
pub const AUTH_LEGACY_TOKEN_LOCATIONS_ENV: &str = "AUTH_LEGACY_TOKEN_LOCATIONS";

/// Environment variable listing alternate headers that may carry
/// `Bearer <credential>` when a proxy rewrites `Authorization`.
pub const AUTH_ALT_HEADERS_ENV: &str = "AUTH_ALT_HEADERS";

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
pub const SEED_ADMIN_EMAIL_ENV: &str = "SEED_ADMIN_EMAIL";
pub const SEED_ADMIN_PASSWORD_ENV: &str = "SEED_ADMIN_PASSWORD";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Account created at startup when both seed variables are set.
#[derive(Clone)]
pub struct SeedAdmin {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for SeedAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedAdmin")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Process configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub secret: SigningSecret,
    pub token_ttl_secs: i64,
    pub legacy_token_locations: bool,
    pub alternate_headers: Vec<HeaderName>,
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
    pub seed_admin: Option<SeedAdmin>,
}

impl Settings {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup(AUTH_SECRET_ENV).ok_or(ConfigError::MissingSecret)?;
        let secret = SigningSecret::new(secret)?;

        let token_ttl_secs = match lookup(AUTH_TOKEN_TTL_ENV) {
            Some(raw) => {
                let ttl: i64 = raw.trim().parse().map_err(|_| invalid(AUTH_TOKEN_TTL_ENV, &raw))?;
                if ttl <= 0 {
                    return Err(ConfigError::InvalidExpiry(ttl));
                }
                ttl
            }
            None => DEFAULT_EXPIRY_SECS,
        };

        let legacy_token_locations = match lookup(AUTH_LEGACY_TOKEN_LOCATIONS_ENV) {
            Some(raw) => parse_bool(&raw).ok_or_else(|| invalid(AUTH_LEGACY_TOKEN_LOCATIONS_ENV, &raw))?,
            None => true,
        };

        let alternate_headers = match lookup(AUTH_ALT_HEADERS_ENV) {
            Some(raw) => parse_header_list(&raw)?,
            None => DEFAULT_ALTERNATE_HEADERS
                .into_iter()
                .map(HeaderName::from_static)
                .collect(),
        };

        let port = match lookup(PORT_ENV) {
            Some(raw) => raw.trim().parse().map_err(|_| invalid(PORT_ENV, &raw))?,
            None => DEFAULT_PORT,
        };

        let log_format = match lookup(LOG_FORMAT_ENV).as_deref().map(str::trim) {
            None | Some("") => LogFormat::default(),
            Some(raw) if raw.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(raw) if raw.eq_ignore_ascii_case("pretty") => LogFormat::Pretty,
            Some(raw) => return Err(invalid(LOG_FORMAT_ENV, raw)),
        };

        let seed_admin = match (lookup(SEED_ADMIN_EMAIL_ENV), lookup(SEED_ADMIN_PASSWORD_ENV)) {
            (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => {
                Some(SeedAdmin { email, password })
            }
            _ => None,
        };

        Ok(Self {
            secret,
            token_ttl_secs,
            legacy_token_locations,
            alternate_headers,
            host: lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            log_format,
            seed_admin,
        })
    }

    /// Credential search order implied by these settings.
    pub fn credential_sources(&self) -> Vec<CredentialSource> {
        CredentialSource::ordered(&self.alternate_headers, self.legacy_token_locations)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn invalid(name: &'static str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        name,
        value: value.to_string(),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_header_list(raw: &str) -> Result<Vec<HeaderName>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            HeaderName::from_bytes(name.to_ascii_lowercase().as_bytes())
                .map_err(|_| invalid(AUTH_ALT_HEADERS_ENV, name))
        })
        .collect()
}

/// Install the global tracing subscriber.
pub fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}
