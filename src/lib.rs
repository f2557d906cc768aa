//! Fintrack is a personal finance tracker: user-scoped income and expense
//! transactions with filtered, paginated listings and read-only analytics
//! (category breakdown, daily trend, summary totals, monthly trend).
//!
//! This library provides a REST API that serves JSON.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod analytics;
mod auth;
mod database_id;
mod db;
pub mod endpoints;
mod logging;
mod pagination;
mod routing;
mod state;
mod stores;
mod timestamp;
mod transaction;
mod user;

pub use auth::{DEFAULT_COOKIE_DURATION, set_auth_cookie};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::PaginationConfig;
pub use routing::build_router;
pub use state::{AppState, create_cookie_key};
pub use stores::{SQLiteTransactionStore, TransactionStore};
pub use transaction::{
    Category, PaymentMode, Transaction, TransactionBuilder, TransactionKind,
};
pub use user::{User, UserID, create_user, get_user_by_id};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// Either the user ID or expiry cookie is missing from the cookie jar in
    /// the request.
    #[error("no auth cookies in the request")]
    CookieMissing,

    /// The session cookie did not resolve to a valid user.
    #[error("the auth cookie does not refer to a valid user")]
    InvalidCredentials,

    /// The session cookie's expiry has passed.
    #[error("the auth cookie has expired")]
    TokenExpired,

    /// A zero or negative amount was used to create or update a transaction.
    ///
    /// Amounts are unsigned quantities of money; the direction of the money
    /// flow is carried by the transaction kind, not the sign.
    #[error("{0} is not a valid amount, amounts must be greater than zero")]
    NonPositiveAmount(f64),

    /// The category does not belong to the enumeration for the transaction's
    /// kind, e.g. an income transaction filed under "groceries".
    #[error("the category \"{category}\" cannot be used for {kind} transactions")]
    CategoryKindMismatch {
        /// The rejected category.
        category: Category,
        /// The kind of the transaction being created or updated.
        kind: TransactionKind,
    },

    /// The user ID attached to the request does not refer to a valid user.
    #[error("the user ID does not refer to a valid user")]
    InvalidUser,

    /// The requested transaction does not exist, or belongs to another user.
    ///
    /// The two cases are deliberately indistinguishable so that clients
    /// cannot probe for the existence of other users' data.
    #[error("the requested transaction could not be found")]
    NotFound,

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 787 occurs when a FOREIGN KEY constraint failed, i.e. the
            // owning user does not exist.
            rusqlite::Error::SqliteFailure(sql_error, Some(_))
                if sql_error.extended_code == 787 =>
            {
                Error::InvalidUser
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Error::CookieMissing => (StatusCode::UNAUTHORIZED, "Access token required".to_owned()),
            Error::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid token".to_owned()),
            Error::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired".to_owned()),
            Error::NonPositiveAmount(_) | Error::CategoryKindMismatch { .. } => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            Error::InvalidUser => (StatusCode::NOT_FOUND, "User not found".to_owned()),
            Error::NotFound => (StatusCode::NOT_FOUND, "Transaction not found".to_owned()),
            // Any errors that are not handled above are not intended to be
            // shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_owned(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{
        Error,
        transaction::{Category, TransactionKind},
    };

    #[test]
    fn not_found_maps_to_404() {
        let response = Error::NotFound.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_errors_map_to_400() {
        let response = Error::NonPositiveAmount(-1.0).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = Error::CategoryKindMismatch {
            category: Category::Groceries,
            kind: TransactionKind::Income,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn auth_errors_map_to_401() {
        for error in [
            Error::CookieMissing,
            Error::InvalidCredentials,
            Error::TokenExpired,
        ] {
            let response = error.into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn sql_errors_map_to_500() {
        let response = Error::SqlError(rusqlite::Error::InvalidQuery).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
