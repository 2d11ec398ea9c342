//! One-time codes for second-factor and confirmation flows.
//!
//! An OTP is a pair: a short-lived HS256 token carrying the flow's payload,
//! handed to the client, and a numeric code delivered out of band. The code is
//! stored against the SHA-256 of the token and deleted on first successful
//! verification, so each pair verifies at most once. A challenge stops
//! accepting codes after too many wrong ones.

use chrono::{Duration, Utc};
use jobbit_core::types::DbId;
use jobbit_db::repositories::OtpRepo;
use jobbit_db::DbPool;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::jwt::{sha256_hex, JwtConfig};
use crate::config::env_or;

const OTP_TOKEN_TYPE: &str = "otp";

/// Digits a code is drawn from; codes never repeat a digit.
const DIGITS: &[u8; 10] = b"0123456789";

#[derive(Debug, thiserror::Error)]
pub enum OtpError {
    /// Wrong code, unknown or already used token, or expired token.
    #[error("Invalid token or code")]
    Invalid,

    #[error("Token encoding failed: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// OTP lifetime and code shape.
#[derive(Debug, Clone)]
pub struct OtpConfig {
    pub expiry_mins: i64,
    pub code_length: usize,
    /// Wrong codes tolerated per challenge before it is locked.
    pub max_attempts: i32,
}

impl OtpConfig {
    /// | Env Var                     | Default |
    /// |-----------------------------|---------|
    /// | `OTP_EXPIRY_MINS`           | `5`     |
    /// | `VERIFICATION_CODE_LENGTH`  | `6`     |
    /// | `OTP_MAX_ATTEMPTS`          | `5`     |
    pub fn from_env() -> Self {
        let expiry_mins = env_or("OTP_EXPIRY_MINS", 5);
        let code_length = env_or("VERIFICATION_CODE_LENGTH", 6);
        let max_attempts = env_or("OTP_MAX_ATTEMPTS", 5);
        assert!(
            (1..=DIGITS.len()).contains(&code_length),
            "VERIFICATION_CODE_LENGTH must be between 1 and 10"
        );
        Self {
            expiry_mins,
            code_length,
            max_attempts,
        }
    }
}

/// Flow-specific data carried by an OTP token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OtpPayload {
    pub user_id: DbId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OtpClaims {
    #[serde(flatten)]
    payload: OtpPayload,
    token_type: String,
    exp: i64,
    jti: String,
}

/// Draw a code of `length` distinct digits.
pub fn generate_code(length: usize) -> String {
    let mut rng = rand::rng();
    rand::seq::index::sample(&mut rng, DIGITS.len(), length.min(DIGITS.len()))
        .iter()
        .map(|i| DIGITS[i] as char)
        .collect()
}

/// Sign `payload` into a token, store a fresh code for it and return
/// `(token, code)`. Expired challenges are swept on the way.
pub async fn issue(
    pool: &DbPool,
    jwt: &JwtConfig,
    config: &OtpConfig,
    payload: OtpPayload,
) -> Result<(String, String), OtpError> {
    let expires_at = Utc::now() + Duration::minutes(config.expiry_mins);
    let claims = OtpClaims {
        payload,
        token_type: OTP_TOKEN_TYPE.to_string(),
        exp: expires_at.timestamp(),
        jti: Uuid::new_v4().to_string(),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt.secret.as_bytes()),
    )?;
    let code = generate_code(config.code_length);

    match OtpRepo::cleanup_expired(pool).await {
        Ok(0) => {}
        Ok(removed) => tracing::debug!(removed, "Expired OTP challenges removed"),
        Err(e) => tracing::warn!(error = %e, "Failed to remove expired OTP challenges"),
    }
    OtpRepo::create(pool, &sha256_hex(&token), &code, expires_at).await?;
    Ok((token, code))
}

/// Consume the code stored for `token` and return the token's payload.
pub async fn verify(
    pool: &DbPool,
    jwt: &JwtConfig,
    config: &OtpConfig,
    token: &str,
    code: &str,
) -> Result<OtpPayload, OtpError> {
    if token.is_empty() || code.is_empty() {
        return Err(OtpError::Invalid);
    }
    if !OtpRepo::consume(pool, &sha256_hex(token), code, config.max_attempts).await? {
        return Err(OtpError::Invalid);
    }
    let data = decode::<OtpClaims>(
        token,
        &DecodingKey::from_secret(jwt.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| OtpError::Invalid)?;
    if data.claims.token_type != OTP_TOKEN_TYPE {
        return Err(OtpError::Invalid);
    }
    Ok(data.claims.payload)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn codes_have_distinct_digits() {
        for _ in 0..50 {
            let code = generate_code(6);
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            let unique: HashSet<char> = code.chars().collect();
            assert_eq!(unique.len(), 6);
        }
    }

    #[test]
    fn code_length_is_capped_at_ten() {
        assert_eq!(generate_code(12).len(), 10);
    }

    #[test]
    fn payload_skips_empty_fields() {
        let payload = OtpPayload {
            user_id: Uuid::nil(),
            phone_number: Some("+79990000000".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("email").is_none());
        assert_eq!(json["phone_number"], "+79990000000");
    }
}
