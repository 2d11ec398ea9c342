//! Stripe payment-link client.
//!
//! Each subscription purpose maps to a Stripe price id; an invoice is a
//! payment link for one unit of that price. A link that has been
//! deactivated after checkout counts as paid.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use jobbit_core::enums::{TransactionProvider, TransactionStatus};
use jobbit_core::subscription::Purpose;

use crate::error::AcquiringError;
use crate::invoice::{Acquirer, Invoice, InvoiceRequest};

pub const DEFAULT_BASE_URL: &str = "https://api.stripe.com";

/// HTTP client for the Stripe payment-links API.
pub struct StripeClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    prices: HashMap<Purpose, String>,
}

#[derive(Debug, Deserialize)]
struct PaymentLink {
    id: String,
    url: String,
    active: bool,
}

impl StripeClient {
    /// * `prices` - Stripe price id for each purchasable purpose.
    pub fn new(base_url: String, api_key: String, prices: HashMap<Purpose, String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, api_key, prices)
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: String,
        api_key: String,
        prices: HashMap<Purpose, String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            prices,
        }
    }
}

/// Payment links stay active until the checkout completes.
pub fn map_link_state(active: bool) -> TransactionStatus {
    if active {
        TransactionStatus::Created
    } else {
        TransactionStatus::Paid
    }
}

#[async_trait]
impl Acquirer for StripeClient {
    fn provider(&self) -> TransactionProvider {
        TransactionProvider::Stripe
    }

    async fn create_invoice(&self, request: &InvoiceRequest) -> Result<Invoice, AcquiringError> {
        let price = self.prices.get(&request.purpose).ok_or_else(|| {
            AcquiringError::Configuration(format!(
                "no Stripe price configured for {}",
                request.purpose
            ))
        })?;
        let form = [
            ("line_items[0][price]", price.as_str()),
            ("line_items[0][quantity]", "1"),
            ("metadata[transaction_id]", request.order_id.as_str()),
        ];

        let response = self
            .client
            .post(format!("{}/v1/payment_links", self.base_url))
            .bearer_auth(&self.api_key)
            .form(&form)
            .send()
            .await?;
        let link: PaymentLink = crate::ensure_success(response).await?.json().await?;

        tracing::info!(link_id = %link.id, order_id = %request.order_id, "Stripe payment link created");
        Ok(Invoice {
            invoice_id: link.id,
            pay_url: link.url,
            status: map_link_state(link.active),
        })
    }

    async fn invoice_status(&self, invoice_id: &str) -> Result<TransactionStatus, AcquiringError> {
        let response = self
            .client
            .get(format!("{}/v1/payment_links/{}", self.base_url, invoice_id))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let link: PaymentLink = crate::ensure_success(response).await?.json().await?;
        Ok(map_link_state(link.active))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn client(url: String) -> StripeClient {
        let prices = HashMap::from([(Purpose::W1ProSub, "price_week".to_string())]);
        StripeClient::new(url, "sk_test".into(), prices)
    }

    fn request(purpose: Purpose) -> InvoiceRequest {
        InvoiceRequest {
            order_id: "3f2a".into(),
            amount: 100.0,
            currency: "USD".into(),
            purpose,
        }
    }

    #[tokio::test]
    async fn creates_payment_link() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/payment_links")
            .match_header("authorization", "Bearer sk_test")
            .match_body(mockito::Matcher::UrlEncoded(
                "line_items[0][price]".into(),
                "price_week".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"plink_1","url":"https://buy.stripe.com/test_1","active":true,"currency":"usd"}"#)
            .create_async()
            .await;

        let invoice = client(server.url())
            .create_invoice(&request(Purpose::W1ProSub))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(invoice.invoice_id, "plink_1");
        assert_eq!(invoice.pay_url, "https://buy.stripe.com/test_1");
        assert_eq!(invoice.status, TransactionStatus::Created);
    }

    #[tokio::test]
    async fn missing_price_is_a_configuration_error() {
        let server = mockito::Server::new_async().await;
        let err = client(server.url())
            .create_invoice(&request(Purpose::M3ProSub))
            .await
            .unwrap_err();
        assert_matches!(err, AcquiringError::Configuration(_));
    }

    #[tokio::test]
    async fn inactive_link_counts_as_paid() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/payment_links/plink_1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"plink_1","url":"https://buy.stripe.com/test_1","active":false}"#)
            .create_async()
            .await;

        let status = client(server.url()).invoice_status("plink_1").await.unwrap();
        assert_eq!(status, TransactionStatus::Paid);
    }
}
