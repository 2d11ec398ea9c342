//! Handlers for subscription plans and the transactions that pay for them.

use std::collections::BTreeMap;
use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use jobbit_acquiring::InvoiceRequest;
use jobbit_core::enums::{ProfileRole, TransactionProvider, TransactionStatus, TransactionType};
use jobbit_core::error::CoreError;
use jobbit_core::pagination::DEFAULT_PAGE_SIZE;
use jobbit_core::subscription::{
    currency_or_default, format_amount, payment_type_for, purpose_for, purpose_title, Currency,
    Period, Purpose, SubLevel,
};
use jobbit_core::types::{DbId, Timestamp};
use jobbit_db::models::notification::CreateNotification;
use jobbit_db::models::transaction::{CreateTransaction, Transaction};
use jobbit_db::repositories::{
    NotificationRepo, ProfileRepo, SubscriptionPlanRepo, TransactionRepo,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::handlers::profile::forbidden;
use crate::middleware::auth::AuthUser;
use crate::query::{ensure_page, require_profile_role, RoleParams, NO_PROFILE_FOR_ROLE};
use crate::response::{DataResponse, Paginated};
use crate::state::AppState;

/// Currency every invoice is issued in.
const INVOICE_CURRENCY: Currency = Currency::Usd;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PlansParams {
    pub currency: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PlanEntry {
    pub title: &'static str,
    pub price: f64,
    pub period: Period,
    pub sub_level: SubLevel,
}

/// Plan prices keyed by purpose, plus the currency they are quoted in.
#[derive(Debug, Serialize)]
pub struct PlansResponse {
    #[serde(flatten)]
    pub plans: BTreeMap<&'static str, PlanEntry>,
    pub currency: String,
}

#[derive(Debug, Deserialize)]
pub struct MakeSubscriptionRequest {
    pub sub_level: String,
    pub acquiring_type_provider: String,
    pub period: String,
    pub user_role: String,
}

/// Raw for a fresh invoice, formatted with two decimals in listings.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Amount {
    Raw(f64),
    Formatted(String),
}

/// Public shape of a transaction.
#[derive(Debug, Serialize)]
pub struct TransactionView {
    pub id: DbId,
    pub status: String,
    pub pay_url: Option<String>,
    pub purpose: String,
    pub invoice_id: String,
    pub currency: String,
    pub payment_type: String,
    pub amount: Amount,
    pub date: Timestamp,
    #[serde(rename = "type")]
    pub tx_type: Option<String>,
}

impl From<Transaction> for TransactionView {
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.id,
            status: tx.status,
            pay_url: tx.pay_url,
            purpose: tx.purpose,
            invoice_id: tx.invoice_id,
            currency: tx.currency,
            payment_type: tx.payment_type,
            amount: Amount::Raw(tx.amount),
            date: tx.created_at,
            tx_type: tx.tx_type,
        }
    }
}

impl TransactionView {
    /// The listing form: amount as text and purpose as its title.
    fn listed(tx: Transaction) -> Self {
        let amount = format_amount(tx.amount);
        let purpose = purpose_title(&tx.purpose);
        Self {
            amount: Amount::Formatted(amount),
            purpose,
            ..Self::from(tx)
        }
    }
}

fn no_plans(currency: Currency) -> AppError {
    AppError::ErrDetail(format!(
        "No available subscriptions plans for given currency {currency} exist"
    ))
}

fn bad_argument(field: &str) -> AppError {
    AppError::ErrDetail(format!("Bad value for `{field}`"))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/subscription/plans?currency=
pub async fn plans(
    State(state): State<AppState>,
    Query(params): Query<PlansParams>,
) -> AppResult<Json<PlansResponse>> {
    let currency = currency_or_default(params.currency.as_deref());
    let plan = SubscriptionPlanRepo::find_by_currency(&state.pool, currency.as_str())
        .await?
        .ok_or_else(|| no_plans(currency))?;

    let plans = Purpose::ALL
        .iter()
        .filter_map(|purpose| {
            plan.price(purpose.price_column()).map(|price| {
                (
                    purpose.as_str(),
                    PlanEntry {
                        title: purpose.title(),
                        price,
                        period: purpose.period(),
                        sub_level: purpose.sub_level(),
                    },
                )
            })
        })
        .collect();
    Ok(Json(PlansResponse {
        plans,
        currency: plan.currency,
    }))
}

/// POST /api/v1/subscription/make
///
/// Issue an invoice for a subscription. A partially paid invoice is handed
/// back instead of opening a new one; older unpaid invoices are canceled.
pub async fn make(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<MakeSubscriptionRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<TransactionView>>)> {
    let role = ProfileRole::from_str(&input.user_role).map_err(|_| bad_argument("user_role"))?;
    let provider = TransactionProvider::from_str(&input.acquiring_type_provider)
        .map_err(|_| bad_argument("acquiring_type_provider"))?;
    let level = SubLevel::from_str(&input.sub_level).map_err(|_| bad_argument("sub_level"))?;
    let period = Period::from_str(&input.period).map_err(|_| bad_argument("period"))?;

    if !ProfileRepo::exists_for_user(&state.pool, role, auth.user_id).await? {
        return Err(AppError::Detail(NO_PROFILE_FOR_ROLE.into()));
    }
    let purpose = purpose_for(level, period).map_err(|e| match e {
        CoreError::Validation(msg) => AppError::ErrDetail(msg),
        other => other.into(),
    })?;

    if let Some(partial) = TransactionRepo::find_latest_with_status(
        &state.pool,
        auth.user_id,
        TransactionStatus::Partial.as_str(),
    )
    .await?
    {
        return Ok((
            StatusCode::CREATED,
            Json(DataResponse {
                data: partial.into(),
            }),
        ));
    }
    let canceled = TransactionRepo::cancel_created(&state.pool, auth.user_id).await?;
    if canceled > 0 {
        tracing::info!(user_id = %auth.user_id, canceled, "Unpaid invoices canceled");
    }

    let plan = SubscriptionPlanRepo::find_by_currency(&state.pool, INVOICE_CURRENCY.as_str())
        .await?
        .ok_or_else(|| no_plans(INVOICE_CURRENCY))?;
    let amount = plan
        .price(purpose.price_column())
        .filter(|a| *a > 0.0)
        .ok_or_else(|| AppError::ErrDetail("Cannot get invoice amount".into()))?;

    let acquirer = state.acquirers.get(provider)?;
    let id = Uuid::new_v4();
    let invoice = acquirer
        .create_invoice(&InvoiceRequest {
            order_id: id.simple().to_string(),
            amount,
            currency: INVOICE_CURRENCY.as_str().to_string(),
            purpose,
        })
        .await?;

    let tx = TransactionRepo::create(
        &state.pool,
        &CreateTransaction {
            id,
            status: TransactionStatus::Created.as_str().into(),
            pay_url: Some(invoice.pay_url),
            invoice_id: invoice.invoice_id,
            currency: INVOICE_CURRENCY.as_str().into(),
            payment_type: payment_type_for(provider).as_str().into(),
            purpose: purpose.as_str().into(),
            amount,
            provider: provider.as_str().into(),
            tx_type: Some(TransactionType::Deposit.as_str().into()),
            user_id: auth.user_id,
            user_role: role.as_str().into(),
        },
    )
    .await?;
    tracing::info!(
        transaction_id = %tx.id,
        user_id = %auth.user_id,
        provider = %provider,
        purpose = %purpose,
        amount,
        "Invoice issued"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: tx.into() })))
}

/// GET /api/v1/user/transactions?role=
pub async fn list_transactions(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<RoleParams>,
) -> AppResult<Json<Paginated<TransactionView>>> {
    let role = require_profile_role(params.role.as_deref())?;
    if !ProfileRepo::exists_for_user(&state.pool, role, auth.user_id).await? {
        return Err(AppError::Detail(NO_PROFILE_FOR_ROLE.into()));
    }

    let window = params.window(DEFAULT_PAGE_SIZE);
    let count =
        TransactionRepo::count_for_user(&state.pool, auth.user_id, Some(role.as_str())).await?;
    ensure_page(&window, count)?;
    let results = TransactionRepo::list_for_user(
        &state.pool,
        auth.user_id,
        Some(role.as_str()),
        window.limit(),
        window.offset(),
    )
    .await?
    .into_iter()
    .map(TransactionView::listed)
    .collect();
    Ok(Json(Paginated::new(&window, count, results)))
}

/// POST /api/v1/user/transactions/{id}/refresh
///
/// Poll the acquirer for the invoice status and persist it. The first
/// transition to PAID notifies the owner.
pub async fn refresh(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TransactionView>>> {
    let tx = TransactionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Transaction",
            id,
        })?;
    if tx.user_id != Some(auth.user_id) {
        return Err(forbidden());
    }

    let acquirer = state.acquirers.for_stored(&tx.provider)?;
    let status = acquirer.invoice_status(&tx.invoice_id).await?;
    let (previous, updated) = TransactionRepo::update_status(&state.pool, id, status.as_str())
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Transaction",
            id,
        })?;

    if previous != updated.status {
        tracing::info!(transaction_id = %id, from = %previous, to = %updated.status, "Transaction status changed");
    }
    if status == TransactionStatus::Paid && previous != TransactionStatus::Paid.as_str() {
        NotificationRepo::create(
            &state.pool,
            &CreateNotification {
                user_id: auth.user_id,
                title: "Payment received".into(),
                content: Some(format!("{} is paid", purpose_title(&updated.purpose))),
                icon: None,
            },
        )
        .await?;
    }

    Ok(Json(DataResponse {
        data: updated.into(),
    }))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn transaction() -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            status: "CREATED".into(),
            pay_url: Some("https://pay.example.com/x".into()),
            invoice_id: "INV-1".into(),
            currency: "USD".into(),
            payment_type: "SINGULAR".into(),
            purpose: "M1_PRO_SUB".into(),
            amount: 9.5,
            provider: "CRYPTO".into(),
            tx_type: Some("DEPOSIT".into()),
            user_id: None,
            user_role: "CLIENT".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn fresh_view_keeps_raw_values() {
        let json = serde_json::to_value(TransactionView::from(transaction())).unwrap();
        assert_eq!(json["amount"], 9.5);
        assert_eq!(json["purpose"], "M1_PRO_SUB");
        assert_eq!(json["type"], "DEPOSIT");
        assert!(json.get("tx_type").is_none());
    }

    #[test]
    fn listed_view_formats_amount_and_purpose() {
        let json = serde_json::to_value(TransactionView::listed(transaction())).unwrap();
        assert_eq!(json["amount"], "9.50");
        assert_eq!(json["purpose"], "1 Month Subscription");
    }
}
