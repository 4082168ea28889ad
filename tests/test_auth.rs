use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use flexserve::auth::{self, Claims};
use flexserve::error::Error;
use flexserve::http::request::{Method, Request};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

fn token(secret: &[u8], iss: &str, aud: &str, exp: u64) -> String {
    let claims = Claims {
        iss: iss.to_string(),
        aud: aud.to_string(),
        exp,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .unwrap()
}

fn upgrade_request(path: &str) -> Request {
    Request {
        method: Method::GET,
        path: path.to_string(),
        version: "HTTP/1.1".to_string(),
        headers: HashMap::new(),
        body: vec![],
    }
}

#[test]
fn test_valid_token_verifies() {
    let t = token(auth::SECRET, auth::ISSUER, auth::AUDIENCE, now() + 3600);
    let claims = auth::verify(&t).unwrap();

    assert_eq!(claims.iss, "auth0");
    assert_eq!(claims.aud, "aud0");
}

#[test]
fn test_wrong_signature_is_rejected() {
    let t = token(b"not-the-secret", auth::ISSUER, auth::AUDIENCE, now() + 3600);
    assert!(matches!(auth::verify(&t), Err(Error::Auth(_))));
}

#[test]
fn test_wrong_issuer_is_rejected() {
    let t = token(auth::SECRET, "evil0", auth::AUDIENCE, now() + 3600);
    assert!(matches!(auth::verify(&t), Err(Error::Auth(_))));
}

#[test]
fn test_wrong_audience_is_rejected() {
    let t = token(auth::SECRET, auth::ISSUER, "aud1", now() + 3600);
    assert!(matches!(auth::verify(&t), Err(Error::Auth(_))));
}

#[test]
fn test_expired_token_is_rejected() {
    let t = token(auth::SECRET, auth::ISSUER, auth::AUDIENCE, now() - 600);
    assert!(matches!(auth::verify(&t), Err(Error::Auth(_))));
}

#[test]
fn test_garbage_token_is_rejected() {
    assert!(matches!(
        auth::verify("definitely.not.a-jwt"),
        Err(Error::Auth(_))
    ));
}

#[test]
fn test_bearer_token_extraction() {
    let t = token(auth::SECRET, auth::ISSUER, auth::AUDIENCE, now() + 3600);
    let req = upgrade_request(&format!("/chat?token={t}"));

    assert_eq!(auth::bearer_token(&req), Some(t));
}

#[test]
fn test_bearer_token_is_percent_decoded() {
    let req = upgrade_request("/?token=abc%2Edef");
    assert_eq!(auth::bearer_token(&req), Some("abc.def".to_string()));
}

#[test]
fn test_authorize_without_token_fails() {
    let req = upgrade_request("/chat");
    match auth::authorize(&req) {
        Err(Error::Auth(detail)) => assert!(detail.contains("missing")),
        other => panic!("expected auth error, got {other:?}"),
    }
}

#[test]
fn test_authorize_end_to_end() {
    let t = token(auth::SECRET, auth::ISSUER, auth::AUDIENCE, now() + 3600);
    let req = upgrade_request(&format!("/chat?token={t}"));

    assert!(auth::authorize(&req).is_ok());
}
