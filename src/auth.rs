//! Bearer-token gate for websocket upgrades.
//!
//! The token rides on the upgrade target as `?token=<jwt>` and is checked
//! once, before the websocket handshake completes. Claims are transient:
//! verified, then dropped.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::http::request::Request;

pub const SECRET: &[u8] = b"secret";
pub const ISSUER: &str = "auth0";
pub const AUDIENCE: &str = "aud0";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub aud: String,
    pub exp: u64,
}

/// Extracts the bearer token from the upgrade request's query string.
///
/// The value comes back form-urlencoded-decoded (`%XX` bytes, `+` as space).
pub fn bearer_token(req: &Request) -> Option<String> {
    req.query_param("token")
}

/// Decodes and verifies a token: HS256 signature with the shared secret,
/// expected issuer and audience, and the standard expiry check.
pub fn verify(token: &str) -> Result<Claims, Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.set_audience(&[AUDIENCE]);

    decode::<Claims>(token, &DecodingKey::from_secret(SECRET), &validation)
        .map(|data| data.claims)
        .map_err(|e| Error::Auth(e.to_string()))
}

/// Runs the full gate against an upgrade request.
pub fn authorize(req: &Request) -> Result<Claims, Error> {
    let token = bearer_token(req).ok_or_else(|| Error::Auth("missing token".to_string()))?;
    verify(&token)
}
