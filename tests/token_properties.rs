// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! End-to-end properties of issued credentials, checked through the public
//! API and against independent encoders.

use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderMap, HeaderValue};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use catalog_auth_server::auth::{
    AuthError, AuthFailure, AuthGate, Claims, CredentialRequest, FixedClock, Rejection,
    TokenIssuer, TokenVerifier, UserIdentity,
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

const SECRET: &str = "integration-secret";

fn issuer(expiry: i64) -> TokenIssuer {
    TokenIssuer::new(
        catalog_auth_server::auth::SigningSecret::new(SECRET).unwrap(),
        expiry,
    )
    .unwrap()
}

fn verifier() -> TokenVerifier {
    TokenVerifier::from_secret(SECRET).unwrap()
}

fn users() -> Vec<UserIdentity> {
    vec![
        UserIdentity {
            id: 1,
            email: "admin@example.com".to_string(),
            role: "Admin".to_string(),
            full_name: Some("Ada Admin".to_string()),
        },
        UserIdentity {
            id: 42,
            email: "buyer+orders@example.com".to_string(),
            role: "Customer".to_string(),
            full_name: None,
        },
        UserIdentity {
            id: i64::from(u32::MAX) + 7,
            email: "zoë@exämple.com".to_string(),
            role: "Staff".to_string(),
            full_name: Some("Zoë \"Z\" Staff".to_string()),
        },
    ]
}

fn forge(header: &str, claims: &str, signature: &[u8]) -> String {
    format!(
        "{}.{}.{}",
        URL_SAFE_NO_PAD.encode(header),
        URL_SAFE_NO_PAD.encode(claims),
        URL_SAFE_NO_PAD.encode(signature)
    )
}

#[test]
fn issue_then_verify_round_trips_identity() {
    for user in users() {
        for now in [0, 1_000, 1_700_000_000] {
            let token = issuer(3600).issue(&user, now).unwrap();
            let claims = verifier().verify(&token, now).unwrap();
            assert_eq!(claims.user_id, user.id);
            assert_eq!(claims.email, user.email);
            assert_eq!(claims.role, user.role);
            assert_eq!(claims.iat, Some(now));
            assert_eq!(claims.exp, now + 3600);
        }
    }
}

#[test]
fn every_signature_bit_flip_is_a_mismatch() {
    let token = issuer(3600).issue(&users()[0], 1_000).unwrap();
    let (signed, signature_b64) = token.rsplit_once('.').unwrap();
    let signature = URL_SAFE_NO_PAD.decode(signature_b64).unwrap();
    assert_eq!(signature.len(), 32);

    for bit in 0..signature.len() * 8 {
        let mut flipped = signature.clone();
        flipped[bit / 8] ^= 1 << (bit % 8);
        let tampered = format!("{signed}.{}", URL_SAFE_NO_PAD.encode(&flipped));
        assert_eq!(
            verifier().verify(&tampered, 1_000),
            Err(Rejection::SignatureMismatch),
            "bit {bit}"
        );
    }
}

#[test]
fn signature_character_flips_never_verify() {
    let token = issuer(3600).issue(&users()[1], 1_000).unwrap();
    let (signed, signature_b64) = token.rsplit_once('.').unwrap();

    for (index, byte) in signature_b64.bytes().enumerate() {
        for bit in 0..7 {
            let flipped = byte ^ (1 << bit);
            // A dot would change the segment count instead
            if flipped == b'.' {
                continue;
            }
            let mut chars = signature_b64.as_bytes().to_vec();
            chars[index] = flipped;
            let tampered = format!("{signed}.{}", String::from_utf8(chars).unwrap());
            assert_eq!(
                verifier().verify(&tampered, 1_000),
                Err(Rejection::SignatureMismatch),
                "char {index} bit {bit}"
            );
        }
    }
}

#[test]
fn expiry_boundary_is_inclusive() {
    let token = issuer(3600).issue(&users()[1], 1_000).unwrap();
    assert!(verifier().verify(&token, 4_600).is_ok());
    assert_eq!(verifier().verify(&token, 4_601), Err(Rejection::Expired));
}

#[test]
fn wrong_segment_counts_are_malformed() {
    let token = issuer(3600).issue(&users()[0], 1_000).unwrap();
    let (head, _) = token.rsplit_once('.').unwrap();
    for candidate in [
        "abc.def".to_string(),
        head.to_string(),
        format!("{token}.extra"),
        String::new(),
        "...".to_string(),
    ] {
        assert_eq!(
            verifier().verify(&candidate, 1_000),
            Err(Rejection::MalformedStructure),
            "{candidate:?}"
        );
    }
}

#[test]
fn unsigned_tokens_are_never_valid() {
    let claims = r#"{"user_id":1,"email":"admin@example.com","role":"Admin","exp":99999999999}"#;

    let with_dummy_signature = forge(r#"{"alg":"none","typ":"JWT"}"#, claims, b"sig");
    assert_eq!(
        verifier().verify(&with_dummy_signature, 1_000),
        Err(Rejection::UnsupportedAlgorithm)
    );

    let empty_signature = format!(
        "{}.{}.",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"none"}"#),
        URL_SAFE_NO_PAD.encode(claims)
    );
    assert!(verifier().verify(&empty_signature, 1_000).is_err());

    let lowercase = forge(r#"{"alg":"hs256"}"#, claims, b"sig");
    assert_eq!(
        verifier().verify(&lowercase, 1_000),
        Err(Rejection::UnsupportedAlgorithm)
    );
}

#[test]
fn claims_segment_round_trips() {
    let samples = [
        Claims {
            user_id: 7,
            email: "ops@example.com".to_string(),
            role: "Staff".to_string(),
            name: "Ops".to_string(),
            iat: Some(1_000),
            exp: 4_600,
            nbf: None,
        },
        Claims {
            user_id: -1,
            email: "ünïcode@example.com".to_string(),
            role: String::new(),
            name: "名前 / with \"quotes\"".to_string(),
            iat: None,
            exp: i64::MAX,
            nbf: Some(2_000),
        },
    ];
    for claims in samples {
        let segment = claims.to_segment().unwrap();
        assert_eq!(Claims::from_segment(&segment).unwrap(), claims);
    }
}

#[test]
fn missing_email_claim_is_reported() {
    let header = r#"{"typ":"JWT","alg":"HS256"}"#;
    let claims = r#"{"user_id":5,"role":"Customer","exp":99999999999}"#;
    let header_b64 = URL_SAFE_NO_PAD.encode(header);
    let claims_b64 = URL_SAFE_NO_PAD.encode(claims);
    let signature = catalog_auth_server::auth::codec::sign(
        &catalog_auth_server::auth::SigningSecret::new(SECRET).unwrap(),
        &header_b64,
        &claims_b64,
    )
    .unwrap();

    assert_eq!(
        verifier().verify(&format!("{header_b64}.{claims_b64}.{signature}"), 1_000),
        Err(Rejection::MissingClaim("email"))
    );
}

#[test]
fn issued_tokens_are_standard_hs256_jwts() {
    let now = chrono::Utc::now().timestamp();
    let token = issuer(3600).issue(&users()[2], now).unwrap();

    let decoded = jsonwebtoken::decode::<Claims>(
        &token,
        &DecodingKey::from_secret(SECRET.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .unwrap();
    assert_eq!(decoded.claims.user_id, users()[2].id);
    assert_eq!(decoded.claims.name, "Zoë \"Z\" Staff");
}

#[test]
fn standard_hs256_jwts_are_accepted() {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        user_id: 99,
        email: "external@example.com".to_string(),
        role: "Customer".to_string(),
        name: "External".to_string(),
        iat: Some(now),
        exp: now + 60,
        nbf: None,
    };
    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    assert_eq!(verifier().verify(&token, now).unwrap(), claims);
    assert_eq!(
        TokenVerifier::from_secret("rotated").unwrap().verify(&token, now),
        Err(Rejection::SignatureMismatch)
    );
}

#[test]
fn gate_collapses_failures_to_401_and_role_mismatch_to_403() {
    let gate = AuthGate::new(verifier(), Arc::new(FixedClock(1_000)));

    let empty = HeaderMap::new();
    assert_eq!(
        gate.require_auth(&CredentialRequest::from_headers(&empty)),
        Err(AuthError::Unauthenticated(AuthFailure::NoCredential))
    );

    let token = issuer(3600).issue(&users()[1], 1_000).unwrap();
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    );
    let request = CredentialRequest::from_headers(&headers);
    assert_eq!(gate.require_role(&request, "Admin"), Err(AuthError::Forbidden));
    assert_eq!(
        gate.require_role(&request, "Customer").unwrap().user_id,
        42
    );
}
