//! Session tokens and password-reset tokens.
//!
//! Session tokens are HS256 JWTs carrying the account id. Reset tokens are
//! random hex strings; only their SHA-256 digest is stored, so the database
//! alone cannot be used to reset a password.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Account id, as a string per RFC 7519.
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_seconds: i64,
}

impl TokenService {
    #[must_use]
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_seconds: ttl_hours * 3600,
        }
    }

    pub fn issue(&self, account_id: i32) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: account_id.to_string(),
            exp: now + self.ttl_seconds,
            iat: now,
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Validates signature and expiry, returning the account id.
    pub fn verify(&self, token: &str) -> Result<i32, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        data.claims
            .sub
            .parse()
            .map_err(|_| jsonwebtoken::errors::ErrorKind::InvalidSubject.into())
    }
}

/// Returns `(plaintext, sha256_hex)`. Only the digest should be persisted.
#[must_use]
pub fn generate_reset_token() -> (String, String) {
    let bytes: [u8; 32] = rand::rng().random();
    let plaintext = hex::encode(bytes);
    let digest = hash_reset_token(&plaintext);
    (plaintext, digest)
}

#[must_use]
pub fn hash_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
