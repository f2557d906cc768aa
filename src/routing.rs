//! Creates the router for the application.

use axum::{
    Json, Router,
    extract::FromRef,
    middleware,
    routing::{get, post},
};
use serde_json::{Value, json};

use crate::{
    analytics::{expenses_by_category, expenses_by_date, monthly_summary, transaction_summary},
    auth::auth_guard,
    endpoints,
    state::{AppState, AuthState},
    stores::TransactionStore,
    transaction::{
        create_transaction, delete_transaction, get_transaction, list_transactions,
        update_transaction,
    },
};

/// Create the app's router with all the API routes.
///
/// Everything except the health probe sits behind the auth guard, which
/// rejects requests without a valid cookie pair with a 401 JSON error.
pub fn build_router<T>(state: AppState<T>) -> Router
where
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    let auth_state = AuthState::from_ref(&state);

    let protected_routes = Router::new()
        .route(
            endpoints::TRANSACTIONS,
            post(create_transaction::<T>).get(list_transactions::<T>),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction::<T>)
                .put(update_transaction::<T>)
                .delete(delete_transaction::<T>),
        )
        .route(
            endpoints::EXPENSES_BY_CATEGORY,
            get(expenses_by_category::<T>),
        )
        .route(endpoints::EXPENSES_BY_DATE, get(expenses_by_date::<T>))
        .route(endpoints::SUMMARY, get(transaction_summary::<T>))
        .route(endpoints::MONTHLY_SUMMARY, get(monthly_summary::<T>))
        .route_layer(middleware::from_fn_with_state(auth_state, auth_guard))
        .with_state(state);

    Router::new()
        .route(endpoints::HEALTH, get(health))
        .merge(protected_routes)
}

/// A route handler that reports that the server is up.
async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

#[cfg(test)]
mod routing_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Router,
        extract::{FromRef, State},
        routing::post,
    };
    use axum_extra::extract::PrivateCookieJar;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::json;
    use time::Duration;

    use crate::{
        auth::set_auth_cookie,
        db::initialize,
        endpoints,
        state::{AppState, AuthState},
        stores::SQLiteTransactionStore,
        user::{UserID, create_user},
    };

    use super::build_router;

    const TEST_LOG_IN_ROUTE: &str = "/log_in";
    const COOKIE_SECRET: &str = "nafstenoas";

    async fn stub_log_in_route(
        State(_state): State<AuthState>,
        jar: PrivateCookieJar,
    ) -> PrivateCookieJar {
        set_auth_cookie(jar, UserID::new(1), Duration::minutes(5)).unwrap()
    }

    fn get_test_server() -> TestServer {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        create_user("test@test.com", &connection).unwrap();

        let connection = Arc::new(Mutex::new(connection));
        let store = SQLiteTransactionStore::new(connection.clone());
        let state = AppState::new(connection, COOKIE_SECRET, store);
        let auth_state = AuthState::from_ref(&state);

        let app = Router::new()
            .route(TEST_LOG_IN_ROUTE, post(stub_log_in_route))
            .with_state(auth_state)
            .merge(build_router(state));

        TestServer::new(app)
    }

    async fn log_in(server: &TestServer) -> axum_test::TestResponse {
        server.post(TEST_LOG_IN_ROUTE).await
    }

    #[tokio::test]
    async fn health_is_unprotected() {
        let server = get_test_server();

        let response = server.get(endpoints::HEALTH).await;

        response.assert_status_ok();
        response.assert_json(&json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn api_routes_require_auth() {
        let server = get_test_server();

        for endpoint in [
            endpoints::TRANSACTIONS,
            endpoints::EXPENSES_BY_CATEGORY,
            endpoints::EXPENSES_BY_DATE,
            endpoints::SUMMARY,
            endpoints::MONTHLY_SUMMARY,
        ] {
            let response = server.get(endpoint).await;

            response.assert_status_unauthorized();
        }
    }

    #[tokio::test]
    async fn authenticated_round_trip_through_the_api() {
        let server = get_test_server();
        let cookies = log_in(&server).await.cookies();

        let response = server
            .post(endpoints::TRANSACTIONS)
            .add_cookies(cookies.clone())
            .json(&json!({
                "transactionType": "expense",
                "amount": 42.5,
                "category": "groceries",
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_cookies(cookies.clone())
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["transactions"].as_array().unwrap().len(), 1);

        let response = server
            .get(endpoints::SUMMARY)
            .add_cookies(cookies)
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["totalExpense"], 42.5);
    }
}
