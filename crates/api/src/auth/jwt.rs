//! Access tokens and session secrets.
//!
//! Access tokens are HS256 JWTs carrying the user id and a token type. Refresh
//! tokens are random hex strings; sessions store only their SHA-256.

use jobbit_core::types::DbId;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::env_or;

/// `token_type` of access tokens. OTP tokens share the signing secret and
/// carry a different type.
pub const ACCESS_TOKEN_TYPE: &str = "access";

/// Random bytes in a refresh token.
const REFRESH_TOKEN_BYTES: usize = 32;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: DbId,
    pub token_type: String,
    pub exp: i64,
    pub iat: i64,
    /// Keeps two tokens issued to one user in the same second distinct.
    pub jti: String,
}

/// Signing secret and token lifetimes.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
    pub refresh_token_expiry_days: i64,
}

impl JwtConfig {
    /// | Env Var                    | Required | Default |
    /// |----------------------------|----------|---------|
    /// | `JWT_SECRET`               | **yes**  | --      |
    /// | `JWT_ACCESS_EXPIRY_MINS`   | no       | `60`    |
    /// | `JWT_REFRESH_EXPIRY_DAYS`  | no       | `1`     |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is unset or empty.
    pub fn from_env() -> Self {
        let secret = env_or("JWT_SECRET", String::new());
        assert!(!secret.is_empty(), "JWT_SECRET must be set in the environment");
        Self {
            secret,
            access_token_expiry_mins: env_or("JWT_ACCESS_EXPIRY_MINS", 60),
            refresh_token_expiry_days: env_or("JWT_REFRESH_EXPIRY_DAYS", 1),
        }
    }

    fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.secret.as_bytes())
    }

    fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.secret.as_bytes())
    }
}

pub fn generate_access_token(
    user_id: DbId,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let iat = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        token_type: ACCESS_TOKEN_TYPE.to_string(),
        exp: iat + config.access_token_expiry_mins * 60,
        iat,
        jti: Uuid::new_v4().to_string(),
    };
    encode(&Header::default(), &claims, &config.encoding_key())
}

/// Decode an access token. Bad signatures, expired tokens and tokens of
/// another type are all errors.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let claims = decode::<Claims>(token, &config.decoding_key(), &Validation::default())?.claims;
    if claims.token_type != ACCESS_TOKEN_TYPE {
        return Err(jsonwebtoken::errors::ErrorKind::InvalidToken.into());
    }
    Ok(claims)
}

/// A fresh refresh token and the hash to store for it.
pub fn generate_refresh_token() -> (String, String) {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    let token: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    let hash = hash_refresh_token(&token);
    (token, hash)
}

pub fn hash_refresh_token(token: &str) -> String {
    sha256_hex(token)
}

/// Lower-case hex SHA-256 of `input`.
pub fn sha256_hex(input: &str) -> String {
    format!("{:x}", Sha256::digest(input.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 1,
        }
    }

    fn signed(claims: &Claims, config: &JwtConfig) -> String {
        encode(&Header::default(), claims, &config.encoding_key()).unwrap()
    }

    fn claims(token_type: &str, exp_offset: i64) -> Claims {
        let now = chrono::Utc::now().timestamp();
        Claims {
            sub: Uuid::new_v4(),
            token_type: token_type.to_string(),
            exp: now + exp_offset,
            iat: now,
            jti: Uuid::new_v4().to_string(),
        }
    }

    #[test]
    fn access_token_round_trips_user_id() {
        let config = config("jobbit-unit-test-secret");
        let user_id = Uuid::new_v4();
        let token = generate_access_token(user_id, &config).unwrap();

        let decoded = validate_token(&token, &config).unwrap();
        assert_eq!(decoded.sub, user_id);
        assert_eq!(decoded.exp - decoded.iat, 15 * 60);
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let config = config("jobbit-unit-test-secret");
        // Past the default 60 second leeway.
        let token = signed(&claims(ACCESS_TOKEN_TYPE, -300), &config);
        assert!(validate_token(&token, &config).is_err());
    }

    #[test]
    fn otp_tokens_are_not_credentials() {
        let config = config("jobbit-unit-test-secret");
        let token = signed(&claims("otp", 300), &config);
        assert!(validate_token(&token, &config).is_err());
    }

    #[test]
    fn foreign_secret_is_rejected() {
        let token = generate_access_token(Uuid::new_v4(), &config("alpha")).unwrap();
        assert!(validate_token(&token, &config("bravo")).is_err());
    }

    #[test]
    fn refresh_tokens_are_random_hex() {
        let (a, hash) = generate_refresh_token();
        let (b, _) = generate_refresh_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), REFRESH_TOKEN_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, hash_refresh_token(&a));
        assert_eq!(hash.len(), 64);
    }
}
