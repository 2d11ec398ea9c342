use std::sync::Arc;
use std::time::Duration;

use crate::config::ServerConfig;
use crate::messaging::Messenger;
use crate::oauth::OAuthProviders;
use crate::payments::Acquirers;
use crate::storage::{build_storage, Storage};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: jobbit_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Outbound HTTP client shared by OAuth, acquirers, SMS and file HEAD requests.
    pub http: reqwest::Client,
    pub messenger: Arc<Messenger>,
    pub acquirers: Arc<Acquirers>,
    pub oauth: Arc<OAuthProviders>,
    pub storage: Arc<dyn Storage>,
}

impl AppState {
    /// Wire every outbound service from `config`.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built (TLS backend unavailable).
    pub fn from_config(pool: jobbit_db::DbPool, config: ServerConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_client_timeout_secs))
            .build()
            .expect("Failed to build reqwest HTTP client");
        let messenger = Messenger::new(http.clone(), config.email.clone(), config.sms.clone());
        let acquirers =
            Acquirers::from_config(&http, config.cryptocloud.as_ref(), config.stripe.as_ref());
        let oauth = OAuthProviders::from_config(&http, &config.oauth);
        let storage = build_storage(&config.storage);
        Self {
            pool,
            config: Arc::new(config),
            http,
            messenger: Arc::new(messenger),
            acquirers: Arc::new(acquirers),
            oauth: Arc::new(oauth),
            storage,
        }
    }
}
