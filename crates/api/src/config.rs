use std::fmt::Display;
use std::str::FromStr;

use crate::auth::jwt::JwtConfig;
use crate::auth::otp::OtpConfig;
use crate::messaging::email::EmailConfig;
use crate::messaging::sms::SmsConfig;
use crate::oauth::OAuthConfigs;
use crate::payments::{CryptoCloudConfig, StripeConfig};
use crate::storage::StorageConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Time allowed for in-flight requests to drain after a shutdown signal.
    pub shutdown_timeout_secs: u64,
    /// Timeout for every outbound HTTP call (default: `15`).
    pub http_client_timeout_secs: u64,
    /// Timeout for the HEAD request that reads chat file metadata (default: `3`).
    pub file_head_timeout_secs: u64,
    /// Whether deleting an account requires confirming a one-time code first.
    pub send_delete_confirmation: bool,
    pub jwt: JwtConfig,
    pub otp: OtpConfig,
    pub frontend: FrontendConfig,
    /// `None` disables SMTP; messages are logged instead.
    pub email: Option<EmailConfig>,
    /// `None` disables SMS; messages are logged instead.
    pub sms: Option<SmsConfig>,
    pub oauth: OAuthConfigs,
    pub cryptocloud: Option<CryptoCloudConfig>,
    pub stripe: Option<StripeConfig>,
    pub storage: StorageConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                                  | Default                  |
    /// |------------------------------------------|--------------------------|
    /// | `HOST`                                   | `0.0.0.0`                |
    /// | `PORT`                                   | `8000`                   |
    /// | `CORS_ORIGINS`                           | `http://localhost:3000`  |
    /// | `REQUEST_TIMEOUT_SECS`                   | `30`                     |
    /// | `SHUTDOWN_TIMEOUT_SECS`                  | `30`                     |
    /// | `HTTP_CLIENT_TIMEOUT_SECS`               | `15`                     |
    /// | `FILE_HEAD_TIMEOUT_SECS`                 | `3`                      |
    /// | `SEND_USER_ACCOUNT_DELETE_CONFIRMATION`  | `true`                   |
    ///
    /// Sub-configurations document their own variables.
    pub fn from_env() -> Self {
        let cors_origins = env_or("CORS_ORIGINS", "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            host: env_or("HOST", "0.0.0.0".to_string()),
            port: env_or("PORT", 8000),
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 30),
            http_client_timeout_secs: env_or("HTTP_CLIENT_TIMEOUT_SECS", 15),
            file_head_timeout_secs: env_or("FILE_HEAD_TIMEOUT_SECS", 3),
            send_delete_confirmation: env_or("SEND_USER_ACCOUNT_DELETE_CONFIRMATION", true),
            jwt: JwtConfig::from_env(),
            otp: OtpConfig::from_env(),
            frontend: FrontendConfig::from_env(),
            email: EmailConfig::from_env(),
            sms: SmsConfig::from_env(),
            oauth: OAuthConfigs::from_env(),
            cryptocloud: CryptoCloudConfig::from_env(),
            stripe: StripeConfig::from_env(),
            storage: StorageConfig::from_env(),
        }
    }
}

/// Parse `name` from the environment, falling back to `default` when unset.
///
/// # Panics
///
/// Panics when the variable is set but does not parse; configuration is
/// read once at startup.
pub fn env_or<T>(name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|e| panic!("{name} has an invalid value {raw:?}: {e}")),
        Err(_) => default,
    }
}

/// Where the single-page frontend lives; used to build links sent to users.
#[derive(Debug, Clone)]
pub struct FrontendConfig {
    pub protocol: String,
    pub url: String,
}

impl FrontendConfig {
    /// | Env Var             | Default          |
    /// |---------------------|------------------|
    /// | `FRONTEND_PROTOCOL` | `http`           |
    /// | `FRONTEND_URL`      | `localhost:3000` |
    pub fn from_env() -> Self {
        Self {
            protocol: env_or("FRONTEND_PROTOCOL", "http".to_string()),
            url: env_or("FRONTEND_URL", "localhost:3000".to_string()),
        }
    }

    /// Absolute frontend link for `path` (which must start with `/`).
    pub fn link(&self, path: &str) -> String {
        format!("{}://{}{}", self.protocol, self.url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_variables_fall_back_to_default() {
        assert_eq!(env_or("JOBBIT_TEST_SURELY_UNSET_VAR", 42u64), 42);
    }

    #[test]
    fn frontend_link_joins_parts() {
        let frontend = FrontendConfig {
            protocol: "https".into(),
            url: "jobbit.example".into(),
        };
        assert_eq!(
            frontend.link("/activate/abc/def"),
            "https://jobbit.example/activate/abc/def"
        );
    }
}
