//! The route handler for creating a transaction.

use axum::{Extension, Json, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    Error,
    state::TransactionState,
    stores::TransactionStore,
    transaction::{
        Category, PaymentMode, Transaction, TransactionKind, parse_date_filter,
    },
    user::UserID,
};

/// The JSON body of a create transaction request.
///
/// Missing or mistyped required fields are rejected by the JSON extractor
/// with a 422 before this handler runs.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionData {
    /// Whether money was earned or spent.
    pub transaction_type: TransactionKind,
    /// The amount of money, must be greater than zero.
    pub amount: f64,
    /// The classification tag for the transaction.
    pub category: Category,
    /// The currency code, defaulting to "INR".
    #[serde(default)]
    pub currency: Option<String>,
    /// Who the money came from or went to.
    #[serde(default)]
    pub merchant: Option<String>,
    /// The settlement channel, defaulting to cash.
    #[serde(default)]
    pub payment_mode: Option<PaymentMode>,
    /// Free-form text attached to the transaction.
    #[serde(default)]
    pub notes: Option<String>,
    /// The economic date as a calendar date or RFC 3339 instant, defaulting
    /// to now. An unparseable value also falls back to now.
    #[serde(default)]
    pub date: Option<String>,
}

/// A route handler for creating a new transaction.
///
/// # Errors
/// Returns a 400 if the amount is not positive or the category does not
/// match the transaction type, and a 404 if the owner no longer exists.
pub async fn create_transaction<T>(
    State(state): State<TransactionState<T>>,
    Extension(user_id): Extension<UserID>,
    Json(data): Json<CreateTransactionData>,
) -> Result<(StatusCode, Json<Value>), Error>
where
    T: TransactionStore + Clone + Send + Sync,
{
    let builder = Transaction::build(data.transaction_type, data.amount, data.category)
        .currency(data.currency)
        .merchant(data.merchant)
        .payment_mode(data.payment_mode.unwrap_or_default())
        .notes(data.notes)
        .occurred_at(data.date.as_deref().and_then(parse_date_filter));

    let mut store = state.transaction_store;
    let transaction = store.create(user_id, builder)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Transaction created",
            "transaction": transaction,
        })),
    ))
}
