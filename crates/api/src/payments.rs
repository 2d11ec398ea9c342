//! Acquirer configuration and the per-provider client registry.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use jobbit_acquiring::{cryptocloud, stripe, Acquirer, CryptoCloudClient, StripeClient};
use jobbit_core::enums::TransactionProvider;
use jobbit_core::subscription::Purpose;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct CryptoCloudConfig {
    pub api_key: String,
    pub shop_id: String,
    pub base_url: String,
}

impl CryptoCloudConfig {
    /// `None` unless both `CRYPTOCLOUD_API_KEY` and `CRYPTOCLOUD_SHOP_ID`
    /// are set. `CRYPTOCLOUD_BASE_URL` overrides the public API host.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            api_key: std::env::var("CRYPTOCLOUD_API_KEY").ok()?,
            shop_id: std::env::var("CRYPTOCLOUD_SHOP_ID").ok()?,
            base_url: std::env::var("CRYPTOCLOUD_BASE_URL")
                .unwrap_or_else(|_| cryptocloud::DEFAULT_BASE_URL.into()),
        })
    }
}

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub api_key: String,
    pub base_url: String,
    /// Stripe price id per purpose, from `STRIPE_PRICE_<PURPOSE>`.
    pub prices: HashMap<Purpose, String>,
}

impl StripeConfig {
    /// `None` unless `STRIPE_API_KEY` is set.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("STRIPE_API_KEY").ok()?;
        let prices = Purpose::ALL
            .iter()
            .filter_map(|purpose| {
                std::env::var(format!("STRIPE_PRICE_{}", purpose.as_str()))
                    .ok()
                    .map(|price| (*purpose, price))
            })
            .collect();
        Some(Self {
            api_key,
            base_url: std::env::var("STRIPE_BASE_URL")
                .unwrap_or_else(|_| stripe::DEFAULT_BASE_URL.into()),
            prices,
        })
    }
}

/// Configured acquirer clients, looked up by provider.
#[derive(Default, Clone)]
pub struct Acquirers {
    clients: HashMap<TransactionProvider, Arc<dyn Acquirer>>,
}

impl Acquirers {
    pub fn from_config(
        client: &reqwest::Client,
        crypto: Option<&CryptoCloudConfig>,
        stripe: Option<&StripeConfig>,
    ) -> Self {
        let mut acquirers = Self::default();
        if let Some(c) = crypto {
            acquirers.register(Arc::new(CryptoCloudClient::with_client(
                client.clone(),
                c.base_url.clone(),
                c.api_key.clone(),
                c.shop_id.clone(),
            )));
        }
        if let Some(s) = stripe {
            acquirers.register(Arc::new(StripeClient::with_client(
                client.clone(),
                s.base_url.clone(),
                s.api_key.clone(),
                s.prices.clone(),
            )));
        }
        acquirers
    }

    pub fn register(&mut self, acquirer: Arc<dyn Acquirer>) {
        self.clients.insert(acquirer.provider(), acquirer);
    }

    /// Providers with a configured client.
    pub fn configured(&self) -> Vec<TransactionProvider> {
        let mut providers: Vec<_> = self.clients.keys().copied().collect();
        providers.sort_by_key(|p| p.as_str());
        providers
    }

    pub fn get(&self, provider: TransactionProvider) -> AppResult<Arc<dyn Acquirer>> {
        self.clients.get(&provider).cloned().ok_or_else(|| {
            AppError::BadRequest(format!("Acquirer {provider} is not configured"))
        })
    }

    /// Look up the acquirer of a stored transaction's `provider` column.
    pub fn for_stored(&self, provider: &str) -> AppResult<Arc<dyn Acquirer>> {
        let provider = TransactionProvider::from_str(provider)
            .map_err(|e| AppError::InternalError(e.to_string()))?;
        self.get(provider)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn unconfigured_provider_is_bad_request() {
        let acquirers = Acquirers::default();
        assert_matches!(
            acquirers.get(TransactionProvider::Stripe).map(|_| ()),
            Err(AppError::BadRequest(msg)) if msg == "Acquirer STRIPE is not configured"
        );
    }

    #[test]
    fn registry_keys_by_provider() {
        let crypto = CryptoCloudConfig {
            api_key: "key".into(),
            shop_id: "shop".into(),
            base_url: "http://localhost".into(),
        };
        let acquirers = Acquirers::from_config(&reqwest::Client::new(), Some(&crypto), None);
        let client = acquirers.get(TransactionProvider::Crypto).unwrap();
        assert_eq!(client.provider(), TransactionProvider::Crypto);
        assert!(acquirers.for_stored("STRIPE").is_err());
    }
}
