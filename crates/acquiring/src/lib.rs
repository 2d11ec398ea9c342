//! HTTP clients for the external payment acquirers.
//!
//! Each acquirer issues invoices with a payment link and reports their
//! status. Both implement [`Acquirer`] so handlers can pick one by
//! [`TransactionProvider`](jobbit_core::enums::TransactionProvider).

pub mod cryptocloud;
pub mod error;
pub mod invoice;
pub mod stripe;

pub use cryptocloud::CryptoCloudClient;
pub use error::AcquiringError;
pub use invoice::{Acquirer, Invoice, InvoiceRequest};
pub use stripe::StripeClient;

/// Return the response unchanged when its status is 2xx, otherwise an
/// [`AcquiringError::Api`] carrying the status and body text.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, AcquiringError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(AcquiringError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}
