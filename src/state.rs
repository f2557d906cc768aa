//! Defines the app state structs that hold the data needed by the route
//! handlers.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};

use crate::stores::TransactionStore;

/// The app state.
///
/// Does not implement `Debug` to avoid leaking the cookie secret in logs.
#[derive(Clone)]
pub struct AppState<T>
where
    T: TransactionStore + Clone + Send + Sync,
{
    /// The key to use for signing and encrypting private cookies.
    cookie_key: Key,
    /// The connection to the application's database.
    ///
    /// Auth needs direct access to the user table, everything else goes
    /// through the transaction store.
    db_connection: Arc<Mutex<Connection>>,
    /// The store for managing transactions.
    transaction_store: T,
}

impl<T> AppState<T>
where
    T: TransactionStore + Clone + Send + Sync,
{
    /// Create a new app state.
    ///
    /// `cookie_secret` is hashed to produce the key for private cookies, so
    /// any non-empty string works.
    pub fn new(
        db_connection: Arc<Mutex<Connection>>,
        cookie_secret: &str,
        transaction_store: T,
    ) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            db_connection,
            transaction_store,
        }
    }
}

/// Create a cookie key from a secret string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}

/// The state needed for authenticating requests.
#[derive(Clone)]
pub struct AuthState {
    /// The key to use for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The connection to the application's database, used to check that a
    /// token still refers to a registered user.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl<T> FromRef<AppState<T>> for AuthState
where
    T: TransactionStore + Clone + Send + Sync,
{
    fn from_ref(state: &AppState<T>) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// The state needed for the transaction routes.
#[derive(Debug, Clone)]
pub struct TransactionState<T>
where
    T: TransactionStore + Clone + Send + Sync,
{
    /// The store for managing transactions.
    pub transaction_store: T,
}

impl<T> FromRef<AppState<T>> for TransactionState<T>
where
    T: TransactionStore + Clone + Send + Sync,
{
    fn from_ref(state: &AppState<T>) -> Self {
        Self {
            transaction_store: state.transaction_store.clone(),
        }
    }
}

/// The state needed for the analytics routes.
///
/// The aggregations read the same store the transaction routes write, so the
/// state is shared.
pub type AnalyticsState<T> = TransactionState<T>;
