// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Form-body credential capture.
//!
//! Extractors only see request parts, so a `token` field inside a
//! form-encoded POST body would be invisible to them. This middleware
//! buffers such bodies, stores the field as a [`FormToken`] extension and
//! hands the untouched body on to the handler.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/v1/orders", post(create_order))
//!     .layer(axum::middleware::from_fn(capture_form_token));
//! ```

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{header::CONTENT_TYPE, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::gate::form_token;
use crate::error::ApiError;

/// Largest form body buffered for credential lookup (64 KiB).
pub const FORM_BODY_LIMIT: usize = 64 * 1024;

/// `token` field captured from a form-encoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormToken(pub String);

fn is_form_post(request: &Request) -> bool {
    request.method() == Method::POST
        && request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}

/// Capture a `token` form field into request extensions.
pub async fn capture_form_token(request: Request, next: Next) -> Response {
    if !is_form_post(&request) {
        return next.run(request).await;
    }

    let (mut parts, body) = request.into_parts();
    let bytes = match to_bytes(body, FORM_BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, "Form body too large")
                .into_response()
        }
    };

    if let Some(token) = std::str::from_utf8(&bytes).ok().and_then(form_token) {
        parts.extensions.insert(FormToken(token));
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}
