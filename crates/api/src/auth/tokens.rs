//! Signed tokens embedded in activation and password-reset links.
//!
//! A token is `<issued_at>-<hmac>` where the HMAC-SHA256 covers the link's
//! purpose, the user id, the issue time and the user state that the link is
//! meant to change. Activating an account or changing its password alters
//! that state, so every link outstanding for the user stops verifying.

use chrono::Utc;
use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use jobbit_db::models::user::User;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Links stay valid for three days.
pub const TOKEN_TTL_SECS: i64 = 3 * 24 * 60 * 60;

/// What a link is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPurpose {
    Activation,
    PasswordReset,
}

impl TokenPurpose {
    fn as_str(self) -> &'static str {
        match self {
            TokenPurpose::Activation => "activation",
            TokenPurpose::PasswordReset => "password_reset",
        }
    }
}

fn signature(
    secret: &str,
    purpose: TokenPurpose,
    user: &User,
    issued_at: i64,
) -> Result<String, InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())?;
    let last_login = user
        .last_login_at
        .map(|t| t.timestamp().to_string())
        .unwrap_or_default();
    mac.update(
        format!(
            "{}:{}:{}:{}:{}:{}",
            purpose.as_str(),
            user.id,
            issued_at,
            user.password_hash,
            user.is_active,
            last_login
        )
        .as_bytes(),
    );
    Ok(format!("{:x}", mac.finalize().into_bytes()))
}

/// Issue a token for `user`.
pub fn make_token(
    secret: &str,
    purpose: TokenPurpose,
    user: &User,
) -> Result<String, InvalidLength> {
    make_token_at(secret, purpose, user, Utc::now().timestamp())
}

fn make_token_at(
    secret: &str,
    purpose: TokenPurpose,
    user: &User,
    issued_at: i64,
) -> Result<String, InvalidLength> {
    Ok(format!(
        "{issued_at}-{}",
        signature(secret, purpose, user, issued_at)?
    ))
}

/// Whether `token` was issued for `user` and `purpose` and has not expired.
pub fn check_token(secret: &str, purpose: TokenPurpose, user: &User, token: &str) -> bool {
    let Some((issued_at, _)) = token.split_once('-') else {
        return false;
    };
    let Ok(issued_at) = issued_at.parse::<i64>() else {
        return false;
    };
    if Utc::now().timestamp() - issued_at > TOKEN_TTL_SECS {
        return false;
    }
    make_token_at(secret, purpose, user, issued_at).is_ok_and(|expected| expected == token)
}
