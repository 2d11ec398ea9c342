//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- access-token generation and validation, refresh-token helpers.
//! - [`session`] -- server-side session records bound to access tokens.
//! - [`otp`] -- one-time codes paired with short-lived signed tokens.
//! - [`tokens`] -- HMAC links for account activation and password reset.

pub mod jwt;
pub mod otp;
pub mod password;
pub mod session;
pub mod tokens;
