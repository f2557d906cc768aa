//! The route handler for updating a transaction.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    Error,
    database_id::TransactionID,
    state::TransactionState,
    stores::TransactionStore,
    transaction::{Category, PaymentMode, TransactionUpdate, parse_date_filter},
    user::UserID,
};

/// The JSON body of an update transaction request.
///
/// Updates are a full-field replace of the mutable fields: an absent
/// optional field resets to its default rather than keeping the stored
/// value. The exceptions are the date, which keeps the stored instant when
/// absent, and the transaction type, which cannot be changed at all.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransactionData {
    /// The new amount, must be greater than zero.
    pub amount: f64,
    /// The new category, which must match the stored transaction type.
    pub category: Category,
    /// The new settlement channel, defaulting to cash.
    #[serde(default)]
    pub payment_mode: Option<PaymentMode>,
    /// The new currency code, defaulting to "INR".
    #[serde(default)]
    pub currency: Option<String>,
    /// The new merchant, cleared if absent.
    #[serde(default)]
    pub merchant: Option<String>,
    /// The new notes, cleared if absent.
    #[serde(default)]
    pub notes: Option<String>,
    /// The new economic date, keeping the stored one if absent or
    /// unparseable.
    #[serde(default)]
    pub date: Option<String>,
}

/// A route handler for replacing the mutable fields of the transaction with
/// `transaction_id`.
///
/// # Errors
/// Returns a 404 if the transaction does not exist or belongs to another
/// user, and a 400 if the update fails validation.
pub async fn update_transaction<T>(
    State(state): State<TransactionState<T>>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionID>,
    Json(data): Json<UpdateTransactionData>,
) -> Result<Json<Value>, Error>
where
    T: TransactionStore + Clone + Send + Sync,
{
    let update = TransactionUpdate {
        amount: data.amount,
        category: data.category,
        payment_mode: data.payment_mode.unwrap_or_default(),
        currency: data.currency,
        merchant: data.merchant,
        notes: data.notes,
        occurred_at: data.date.as_deref().and_then(parse_date_filter),
    };

    let mut store = state.transaction_store;
    let transaction = store.update(transaction_id, user_id, update)?;

    Ok(Json(json!({
        "message": "Transaction updated",
        "transaction": transaction,
    })))
}

#[cfg(test)]
mod update_transaction_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Router, routing::put};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::json;
    use time::macros::datetime;

    use crate::{
        db::initialize,
        endpoints::{self, format_endpoint},
        state::TransactionState,
        stores::{SQLiteTransactionStore, TransactionStore},
        transaction::{Category, Transaction, TransactionKind},
        user::create_user,
    };

    use super::update_transaction;

    fn get_test_server() -> (TestServer, Transaction) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user("test@test.com", &connection).unwrap();

        let mut store = SQLiteTransactionStore::new(Arc::new(Mutex::new(connection)));
        let transaction = store
            .create(
                user.id,
                Transaction::build(TransactionKind::Expense, 42.5, Category::Groceries)
                    .occurred_at(Some(datetime!(2024-03-10 12:00 UTC))),
            )
            .unwrap();

        let state = TransactionState {
            transaction_store: store,
        };
        let app = Router::new()
            .route(
                endpoints::TRANSACTION,
                put(update_transaction::<SQLiteTransactionStore>),
            )
            .layer(Extension(user.id))
            .with_state(state);

        let server = TestServer::new(app);

        (server, transaction)
    }

    #[tokio::test]
    async fn update_replaces_fields() {
        let (server, transaction) = get_test_server();

        let response = server
            .put(&format_endpoint(endpoints::TRANSACTION, transaction.id))
            .json(&json!({
                "amount": 99.0,
                "category": "food & dining",
                "paymentMode": "card",
            }))
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Transaction updated");
        assert_eq!(body["transaction"]["amount"], 99.0);
        assert_eq!(body["transaction"]["category"], "food & dining");
        assert_eq!(body["transaction"]["paymentMode"], "card");
        // The stored date is kept when the body has none.
        assert_eq!(body["transaction"]["date"], "2024-03-10T12:00:00Z");
    }

    #[tokio::test]
    async fn update_cannot_change_the_kind_via_category() {
        let (server, transaction) = get_test_server();

        let response = server
            .put(&format_endpoint(endpoints::TRANSACTION, transaction.id))
            .json(&json!({
                "amount": 99.0,
                "category": "salary",
            }))
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn update_missing_transaction_returns_404() {
        let (server, transaction) = get_test_server();

        let response = server
            .put(&format_endpoint(endpoints::TRANSACTION, transaction.id + 99))
            .json(&json!({
                "amount": 99.0,
                "category": "groceries",
            }))
            .await;

        response.assert_status_not_found();
        response.assert_json(&json!({"error": "Transaction not found"}));
    }
}
