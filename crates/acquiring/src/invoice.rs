//! The acquirer abstraction shared by every provider.

use async_trait::async_trait;
use jobbit_core::enums::{TransactionProvider, TransactionStatus};
use jobbit_core::subscription::Purpose;

use crate::error::AcquiringError;

/// What to charge for.
#[derive(Debug, Clone)]
pub struct InvoiceRequest {
    /// Our transaction id, echoed back by acquirers that support it.
    pub order_id: String,
    pub amount: f64,
    pub currency: String,
    pub purpose: Purpose,
}

/// An invoice issued by an acquirer.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    pub invoice_id: String,
    pub pay_url: String,
    pub status: TransactionStatus,
}

/// A payment provider able to issue invoices and report their status.
#[async_trait]
pub trait Acquirer: Send + Sync {
    /// Which provider this client talks to.
    fn provider(&self) -> TransactionProvider;

    /// Issue an invoice and return its payment link.
    async fn create_invoice(&self, request: &InvoiceRequest) -> Result<Invoice, AcquiringError>;

    /// Fetch the current status of a previously issued invoice.
    async fn invoice_status(&self, invoice_id: &str) -> Result<TransactionStatus, AcquiringError>;
}
