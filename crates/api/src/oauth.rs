//! OAuth2 sign-in through VK, Google and Yandex.
//!
//! Each provider exposes the same three steps: build the authorize URL the
//! browser is redirected to, exchange the returned code for an access token,
//! and resolve the account's email. Endpoints are fields so tests can point
//! them at a mock server.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("OAuth request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("OAuth provider error: {0}")]
    Provider(String),
}

/// Client credentials of one provider.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
}

impl OAuthConfig {
    /// Read `<PREFIX>_CLIENT_ID`, `<PREFIX>_CLIENT_SECRET` and
    /// `<PREFIX>_REDIRECT_URL`; `None` unless all three are set.
    pub fn from_env(prefix: &str) -> Option<Self> {
        let var = |name: &str| std::env::var(format!("{prefix}_{name}")).ok();
        Some(Self {
            client_id: var("CLIENT_ID")?,
            client_secret: var("CLIENT_SECRET")?,
            redirect_url: var("REDIRECT_URL")?,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct OAuthConfigs {
    pub vk: Option<OAuthConfig>,
    pub google: Option<OAuthConfig>,
    pub yandex: Option<OAuthConfig>,
}

impl OAuthConfigs {
    /// Providers with incomplete `VK_*`, `GOOGLE_*` or `YANDEX_*` settings
    /// are disabled.
    pub fn from_env() -> Self {
        Self {
            vk: OAuthConfig::from_env("VK"),
            google: OAuthConfig::from_env("GOOGLE"),
            yandex: OAuthConfig::from_env("YANDEX"),
        }
    }
}

/// An OAuth2 identity provider.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Where to send the browser to start sign-in.
    fn authorization_url(&self) -> String;

    /// Exchange an authorization code for the account's email.
    async fn email_for_code(&self, code: &str) -> Result<String, OAuthError>;
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_id: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

impl AccessTokenResponse {
    fn into_token(self) -> Result<(String, Self), OAuthError> {
        match self.access_token.clone() {
            Some(token) => Ok((token, self)),
            None => Err(OAuthError::Provider(
                self.error.unwrap_or_else(|| "no access token in response".into()),
            )),
        }
    }
}

fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

// ---------------------------------------------------------------------------
// VK
// ---------------------------------------------------------------------------

pub struct VkProvider {
    client: reqwest::Client,
    config: OAuthConfig,
    pub authorize_endpoint: String,
    pub token_endpoint: String,
}

impl VkProvider {
    pub fn new(client: reqwest::Client, config: OAuthConfig) -> Self {
        Self {
            client,
            config,
            authorize_endpoint: "https://oauth.vk.com/authorize".into(),
            token_endpoint: "https://oauth.vk.com/access_token".into(),
        }
    }
}

/// Placeholder address for VK accounts that do not share an email.
pub fn vk_fallback_email(user_id: &str) -> String {
    format!("{user_id}.oauth2vk@omw.com")
}

#[async_trait]
impl OAuthProvider for VkProvider {
    fn name(&self) -> &'static str {
        "vk"
    }

    fn authorization_url(&self) -> String {
        format!(
            "{}?client_id={}&scope=profile,email,phone&redirect_uri={}&response_type=code",
            self.authorize_endpoint,
            encode(&self.config.client_id),
            encode(&self.config.redirect_url)
        )
    }

    async fn email_for_code(&self, code: &str) -> Result<String, OAuthError> {
        let response: AccessTokenResponse = self
            .client
            .get(&self.token_endpoint)
            .query(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.config.redirect_url.as_str()),
            ])
            .send()
            .await?
            .json()
            .await?;
        let (_, response) = response.into_token()?;

        if let Some(email) = response.email.filter(|e| !e.is_empty()) {
            return Ok(email);
        }
        let user_id = match response.user_id {
            Some(serde_json::Value::String(s)) => s,
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => return Err(OAuthError::Provider("no user id in VK response".into())),
        };
        Ok(vk_fallback_email(&user_id))
    }
}

// ---------------------------------------------------------------------------
// Google
// ---------------------------------------------------------------------------

pub struct GoogleProvider {
    client: reqwest::Client,
    config: OAuthConfig,
    pub authorize_endpoint: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
}

impl GoogleProvider {
    pub fn new(client: reqwest::Client, config: OAuthConfig) -> Self {
        Self {
            client,
            config,
            authorize_endpoint: "https://accounts.google.com/o/oauth2/v2/auth".into(),
            token_endpoint: "https://oauth2.googleapis.com/token".into(),
            userinfo_endpoint: "https://www.googleapis.com/oauth2/v1/userinfo".into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct EmailInfo {
    email: Option<String>,
    #[serde(default)]
    default_email: Option<String>,
}

#[async_trait]
impl OAuthProvider for GoogleProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    fn authorization_url(&self) -> String {
        format!(
            "{}?scope={}&access_type=offline&include_granted_scopes=true&response_type=code\
             &state=state_parameter_passthrough_value&redirect_uri={}&client_id={}",
            self.authorize_endpoint,
            encode("https://www.googleapis.com/auth/userinfo.email"),
            encode(&self.config.redirect_url),
            encode(&self.config.client_id)
        )
    }

    async fn email_for_code(&self, code: &str) -> Result<String, OAuthError> {
        let response: AccessTokenResponse = self
            .client
            .post(&self.token_endpoint)
            .form(&[
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.redirect_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?
            .json()
            .await?;
        let (token, _) = response.into_token()?;

        let info: EmailInfo = self
            .client
            .get(&self.userinfo_endpoint)
            .query(&[("access_token", token.as_str())])
            .send()
            .await?
            .json()
            .await?;
        info.email
            .ok_or_else(|| OAuthError::Provider("no email in Google profile".into()))
    }
}

// ---------------------------------------------------------------------------
// Yandex
// ---------------------------------------------------------------------------

pub struct YandexProvider {
    client: reqwest::Client,
    config: OAuthConfig,
    pub authorize_endpoint: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
}

impl YandexProvider {
    pub fn new(client: reqwest::Client, config: OAuthConfig) -> Self {
        Self {
            client,
            config,
            authorize_endpoint: "https://oauth.yandex.ru/authorize".into(),
            token_endpoint: "https://oauth.yandex.ru/token".into(),
            userinfo_endpoint: "https://login.yandex.ru/info".into(),
        }
    }
}

#[async_trait]
impl OAuthProvider for YandexProvider {
    fn name(&self) -> &'static str {
        "yandex"
    }

    fn authorization_url(&self) -> String {
        format!(
            "{}?response_type=code&client_id={}&redirect_uri={}&scope={}",
            self.authorize_endpoint,
            encode(&self.config.client_id),
            encode(&self.config.redirect_url),
            encode("login:info login:email")
        )
    }

    async fn email_for_code(&self, code: &str) -> Result<String, OAuthError> {
        let response: AccessTokenResponse = self
            .client
            .post(&self.token_endpoint)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .send()
            .await?
            .json()
            .await?;
        let (token, _) = response.into_token()?;

        let info: EmailInfo = self
            .client
            .get(&self.userinfo_endpoint)
            .query(&[("format", "json")])
            .header("Authorization", format!("OAuth {token}"))
            .send()
            .await?
            .json()
            .await?;
        info.default_email
            .or(info.email)
            .ok_or_else(|| OAuthError::Provider("no email in Yandex profile".into()))
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Configured providers by name.
#[derive(Default, Clone)]
pub struct OAuthProviders {
    providers: HashMap<&'static str, Arc<dyn OAuthProvider>>,
}

impl OAuthProviders {
    pub fn from_config(client: &reqwest::Client, configs: &OAuthConfigs) -> Self {
        let mut registry = Self::default();
        if let Some(config) = &configs.vk {
            registry.register(Arc::new(VkProvider::new(client.clone(), config.clone())));
        }
        if let Some(config) = &configs.google {
            registry.register(Arc::new(GoogleProvider::new(client.clone(), config.clone())));
        }
        if let Some(config) = &configs.yandex {
            registry.register(Arc::new(YandexProvider::new(client.clone(), config.clone())));
        }
        registry
    }

    pub fn register(&mut self, provider: Arc<dyn OAuthProvider>) {
        self.providers.insert(provider.name(), provider);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn OAuthProvider>> {
        self.providers.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.providers.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::*;

    fn config() -> OAuthConfig {
        OAuthConfig {
            client_id: "client".into(),
            client_secret: "secret".into(),
            redirect_url: "http://localhost:3000/provider/vk".into(),
        }
    }

    #[test]
    fn vk_authorization_url_encodes_redirect() {
        let vk = VkProvider::new(reqwest::Client::new(), config());
        let url = vk.authorization_url();
        assert!(url.starts_with("https://oauth.vk.com/authorize?client_id=client"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fprovider%2Fvk"));
    }

    #[tokio::test]
    async fn vk_falls_back_to_user_id_email() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/access_token")
            .match_query(Matcher::UrlEncoded("code".into(), "abc".into()))
            .with_status(200)
            .with_body(r#"{"access_token": "t", "user_id": 1234}"#)
            .create_async()
            .await;

        let mut vk = VkProvider::new(reqwest::Client::new(), config());
        vk.token_endpoint = format!("{}/access_token", server.url());

        assert_eq!(vk.email_for_code("abc").await.unwrap(), "1234.oauth2vk@omw.com");
    }

    #[tokio::test]
    async fn google_reads_userinfo_email() {
        let mut server = mockito::Server::new_async().await;
        let _token = server
            .mock("POST", "/token")
            .with_status(200)
            .with_body(r#"{"access_token": "g-token"}"#)
            .create_async()
            .await;
        let _info = server
            .mock("GET", "/userinfo")
            .match_query(Matcher::UrlEncoded("access_token".into(), "g-token".into()))
            .with_status(200)
            .with_body(r#"{"email": "person@gmail.com"}"#)
            .create_async()
            .await;

        let mut google = GoogleProvider::new(reqwest::Client::new(), config());
        google.token_endpoint = format!("{}/token", server.url());
        google.userinfo_endpoint = format!("{}/userinfo", server.url());

        assert_eq!(google.email_for_code("code").await.unwrap(), "person@gmail.com");
    }

    #[tokio::test]
    async fn yandex_error_without_token() {
        let mut server = mockito::Server::new_async().await;
        let _token = server
            .mock("POST", "/token")
            .with_status(200)
            .with_body(r#"{"error": "invalid_grant"}"#)
            .create_async()
            .await;

        let mut yandex = YandexProvider::new(reqwest::Client::new(), config());
        yandex.token_endpoint = format!("{}/token", server.url());

        let err = yandex.email_for_code("stale").await.unwrap_err();
        assert!(matches!(err, OAuthError::Provider(msg) if msg == "invalid_grant"));
    }

    #[test]
    fn registry_only_holds_configured_providers() {
        let configs = OAuthConfigs {
            vk: Some(config()),
            ..Default::default()
        };
        let registry = OAuthProviders::from_config(&reqwest::Client::new(), &configs);
        assert!(registry.get("vk").is_some());
        assert!(registry.get("google").is_none());
    }
}
