//! CryptoCloud invoice API client.
//!
//! Invoices are created with a form POST authenticated by
//! `Authorization: Token <api key>` and looked up by `INV-<invoice id>`.

use async_trait::async_trait;
use serde::Deserialize;
use jobbit_core::enums::{TransactionProvider, TransactionStatus};

use crate::error::AcquiringError;
use crate::invoice::{Acquirer, Invoice, InvoiceRequest};

pub const DEFAULT_BASE_URL: &str = "https://api.cryptocloud.plus";

/// HTTP client for one CryptoCloud shop.
pub struct CryptoCloudClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    shop_id: String,
}

#[derive(Debug, Deserialize)]
struct CreateInvoiceResponse {
    status: String,
    pay_url: Option<String>,
    invoice_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InvoiceInfoResponse {
    status: String,
    status_invoice: Option<String>,
}

/// Map a CryptoCloud `status_invoice` value onto a transaction status.
pub fn map_status(status_invoice: &str) -> Option<TransactionStatus> {
    match status_invoice {
        "created" => Some(TransactionStatus::Created),
        "paid" => Some(TransactionStatus::Paid),
        "partial" => Some(TransactionStatus::Partial),
        "canceled" => Some(TransactionStatus::Canceled),
        _ => None,
    }
}

impl CryptoCloudClient {
    pub fn new(base_url: String, api_key: String, shop_id: String) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, api_key, shop_id)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        base_url: String,
        api_key: String,
        shop_id: String,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            shop_id,
        }
    }

    fn auth_header(&self) -> String {
        format!("Token {}", self.api_key)
    }
}

#[async_trait]
impl Acquirer for CryptoCloudClient {
    fn provider(&self) -> TransactionProvider {
        TransactionProvider::Crypto
    }

    async fn create_invoice(&self, request: &InvoiceRequest) -> Result<Invoice, AcquiringError> {
        let amount = format!("{:.2}", request.amount);
        let form = [
            ("shop_id", self.shop_id.as_str()),
            ("amount", amount.as_str()),
            ("order_id", request.order_id.as_str()),
            ("currency", request.currency.as_str()),
        ];

        let response = self
            .client
            .post(format!("{}/v1/invoice/create", self.base_url))
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .form(&form)
            .send()
            .await?;
        let body: CreateInvoiceResponse = crate::ensure_success(response).await?.json().await?;

        if body.status != "success" {
            return Err(AcquiringError::UnexpectedResponse(format!(
                "invoice creation returned status '{}'",
                body.status
            )));
        }
        match (body.invoice_id, body.pay_url) {
            (Some(invoice_id), Some(pay_url)) => {
                tracing::info!(invoice_id = %invoice_id, order_id = %request.order_id, "CryptoCloud invoice created");
                Ok(Invoice {
                    invoice_id,
                    pay_url,
                    status: TransactionStatus::Created,
                })
            }
            _ => Err(AcquiringError::UnexpectedResponse(
                "invoice creation response lacks invoice_id or pay_url".into(),
            )),
        }
    }

    async fn invoice_status(&self, invoice_id: &str) -> Result<TransactionStatus, AcquiringError> {
        let uuid = format!("INV-{}", invoice_id.trim_start_matches("INV-"));
        let response = self
            .client
            .get(format!("{}/v1/invoice/info", self.base_url))
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .query(&[("uuid", uuid.as_str())])
            .send()
            .await?;
        let body: InvoiceInfoResponse = crate::ensure_success(response).await?.json().await?;

        let raw = body.status_invoice.ok_or_else(|| {
            AcquiringError::UnexpectedResponse(format!(
                "invoice info returned status '{}' without status_invoice",
                body.status
            ))
        })?;
        map_status(&raw).ok_or_else(|| {
            AcquiringError::UnexpectedResponse(format!("unknown invoice status '{raw}'"))
        })
    }
}
