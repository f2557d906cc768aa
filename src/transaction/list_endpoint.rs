//! The route handler for listing transactions with filters and pagination.

use axum::{Extension, Json, extract::State};
use axum_extra::extract::Query;
use serde_json::{Value, json};
use time::OffsetDateTime;

use crate::{
    Error,
    pagination::{Pagination, PaginationConfig},
    state::TransactionState,
    stores::TransactionStore,
    transaction::ListParams,
    user::UserID,
};

/// A route handler for listing a page of the user's transactions.
///
/// Filters are lenient: unknown filter values match no rows and unparseable
/// pagination or date values fall back to defaults, so this handler only
/// fails on storage errors.
pub async fn list_transactions<T>(
    State(state): State<TransactionState<T>>,
    Extension(user_id): Extension<UserID>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, Error>
where
    T: TransactionStore + Clone + Send + Sync,
{
    let query = params.into_query(OffsetDateTime::now_utc(), &PaginationConfig::default());

    let page = state.transaction_store.get_page(user_id, &query)?;
    let pagination = Pagination::new(page.total, query.page, query.limit);

    Ok(Json(json!({
        "transactions": page.transactions,
        "pagination": pagination,
    })))
}

#[cfg(test)]
mod list_transactions_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Router, routing::get};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{
        db::initialize,
        endpoints,
        state::TransactionState,
        stores::{SQLiteTransactionStore, TransactionStore},
        transaction::{Category, PaymentMode, Transaction, TransactionKind},
        user::create_user,
    };

    use super::list_transactions;

    fn get_test_server() -> TestServer {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user("test@test.com", &connection).unwrap();

        let mut store = SQLiteTransactionStore::new(Arc::new(Mutex::new(connection)));
        for (kind, amount, category, payment_mode, date) in [
            (
                TransactionKind::Expense,
                50.0,
                Category::Groceries,
                PaymentMode::Upi,
                datetime!(2024-03-10 12:00 UTC),
            ),
            (
                TransactionKind::Expense,
                900.0,
                Category::Rent,
                PaymentMode::Netbanking,
                datetime!(2024-03-01 09:00 UTC),
            ),
            (
                TransactionKind::Income,
                5000.0,
                Category::Salary,
                PaymentMode::Netbanking,
                datetime!(2024-03-05 08:00 UTC),
            ),
        ] {
            store
                .create(
                    user.id,
                    Transaction::build(kind, amount, category)
                        .payment_mode(payment_mode)
                        .occurred_at(Some(date)),
                )
                .unwrap();
        }

        let state = TransactionState {
            transaction_store: store,
        };
        let app = Router::new()
            .route(
                endpoints::TRANSACTIONS,
                get(list_transactions::<SQLiteTransactionStore>),
            )
            .layer(Extension(user.id))
            .with_state(state);

        TestServer::new(app)
    }

    #[tokio::test]
    async fn lists_all_transactions_newest_first() {
        let server = get_test_server();

        let response = server.get(endpoints::TRANSACTIONS).await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        let transactions = body["transactions"].as_array().unwrap();
        assert_eq!(transactions.len(), 3);
        assert_eq!(transactions[0]["category"], "groceries");
        assert_eq!(transactions[1]["category"], "salary");
        assert_eq!(transactions[2]["category"], "rent");
        assert_eq!(body["pagination"]["total"], 3);
        assert_eq!(body["pagination"]["page"], 1);
        assert_eq!(body["pagination"]["limit"], 10);
        assert_eq!(body["pagination"]["totalPages"], 1);
    }

    #[tokio::test]
    async fn filters_by_transaction_type() {
        let server = get_test_server();

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("transactionType", "income")
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        let transactions = body["transactions"].as_array().unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0]["transactionType"], "income");
    }

    #[tokio::test]
    async fn repeated_category_params_select_several_categories() {
        let server = get_test_server();

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("category", "groceries")
            .add_query_param("category", "rent")
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["transactions"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_filter_value_returns_empty_page_not_error() {
        let server = get_test_server();

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("category", "gambling")
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert!(body["transactions"].as_array().unwrap().is_empty());
        assert_eq!(body["pagination"]["total"], 0);
        assert_eq!(body["pagination"]["totalPages"], 0);
    }

    #[tokio::test]
    async fn garbage_pagination_falls_back_to_defaults() {
        let server = get_test_server();

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("page", "banana")
            .add_query_param("limit", "-3")
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["pagination"]["page"], 1);
        assert_eq!(body["pagination"]["limit"], 10);
    }

    #[tokio::test]
    async fn explicit_date_bounds_filter_the_page() {
        let server = get_test_server();

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("from", "2024-03-01")
            .add_query_param("to", "2024-03-05")
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        let transactions = body["transactions"].as_array().unwrap();
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0]["category"], "salary");
        assert_eq!(transactions[1]["category"], "rent");
    }

    #[tokio::test]
    async fn pagination_slices_the_result() {
        let server = get_test_server();

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("page", "2")
            .add_query_param("limit", "2")
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["transactions"].as_array().unwrap().len(), 1);
        assert_eq!(body["pagination"]["total"], 3);
        assert_eq!(body["pagination"]["totalPages"], 2);
    }
}
