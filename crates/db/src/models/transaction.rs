//! Acquirer transactions and subscription price plans.

use serde::Serialize;
use sqlx::FromRow;
use jobbit_core::types::{DbId, Timestamp};

/// A row from the `transactions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Transaction {
    pub id: DbId,
    pub status: String,
    pub pay_url: Option<String>,
    pub invoice_id: String,
    pub currency: String,
    pub payment_type: String,
    pub purpose: String,
    pub amount: f64,
    pub provider: String,
    pub tx_type: Option<String>,
    pub user_id: Option<DbId>,
    pub user_role: String,
    pub created_at: Timestamp,
}

/// DTO for recording a transaction once the invoice is issued.
#[derive(Debug)]
pub struct CreateTransaction {
    /// Caller-chosen id; the crypto acquirer echoes it back as the order id.
    pub id: DbId,
    pub status: String,
    pub pay_url: Option<String>,
    pub invoice_id: String,
    pub currency: String,
    pub payment_type: String,
    pub purpose: String,
    pub amount: f64,
    pub provider: String,
    pub tx_type: Option<String>,
    pub user_id: DbId,
    pub user_role: String,
}

/// Per-currency subscription prices, one column per purpose.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SubscriptionPlan {
    pub id: DbId,
    pub currency: String,
    pub d1_pro_sub: f64,
    pub w1_pro_sub: f64,
    pub m1_pro_sub: f64,
    pub m3_pro_sub: f64,
}

impl SubscriptionPlan {
    /// Price stored in the column named `column` (see `Purpose::price_column`).
    pub fn price(&self, column: &str) -> Option<f64> {
        match column {
            "d1_pro_sub" => Some(self.d1_pro_sub),
            "w1_pro_sub" => Some(self.w1_pro_sub),
            "m1_pro_sub" => Some(self.m1_pro_sub),
            "m3_pro_sub" => Some(self.m3_pro_sub),
            _ => None,
        }
    }
}
