//! The route handler for fetching a single transaction.

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{
    Error, database_id::TransactionID, state::TransactionState, stores::TransactionStore,
    transaction::Transaction, user::UserID,
};

/// A route handler for fetching the transaction with `transaction_id`.
///
/// # Errors
/// Returns a 404 if the transaction does not exist or belongs to another
/// user.
pub async fn get_transaction<T>(
    State(state): State<TransactionState<T>>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionID>,
) -> Result<Json<Transaction>, Error>
where
    T: TransactionStore + Clone + Send + Sync,
{
    let transaction = state.transaction_store.get(transaction_id, user_id)?;

    Ok(Json(transaction))
}

#[cfg(test)]
mod get_transaction_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Router, routing::get};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::json;

    use crate::{
        db::initialize,
        endpoints::{self, format_endpoint},
        state::TransactionState,
        stores::{SQLiteTransactionStore, TransactionStore},
        transaction::{Category, Transaction, TransactionKind},
        user::create_user,
    };

    use super::get_transaction;

    fn get_test_server() -> (TestServer, Transaction) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user("test@test.com", &connection).unwrap();

        let mut store = SQLiteTransactionStore::new(Arc::new(Mutex::new(connection)));
        let transaction = store
            .create(
                user.id,
                Transaction::build(TransactionKind::Expense, 42.5, Category::Groceries),
            )
            .unwrap();

        let state = TransactionState {
            transaction_store: store,
        };
        let app = Router::new()
            .route(
                endpoints::TRANSACTION,
                get(get_transaction::<SQLiteTransactionStore>),
            )
            .layer(Extension(user.id))
            .with_state(state);

        let server = TestServer::new(app);

        (server, transaction)
    }

    #[tokio::test]
    async fn returns_the_transaction() {
        let (server, transaction) = get_test_server();

        let response = server
            .get(&format_endpoint(endpoints::TRANSACTION, transaction.id))
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["id"], transaction.id);
        assert_eq!(body["amount"], 42.5);
        assert_eq!(body["category"], "groceries");
    }

    #[tokio::test]
    async fn missing_transaction_returns_404() {
        let (server, transaction) = get_test_server();

        let response = server
            .get(&format_endpoint(endpoints::TRANSACTION, transaction.id + 99))
            .await;

        response.assert_status_not_found();
        response.assert_json(&json!({"error": "Transaction not found"}));
    }
}
