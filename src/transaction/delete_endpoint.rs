//! The route handler for deleting a transaction.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde_json::{Value, json};

use crate::{
    Error, database_id::TransactionID, state::TransactionState, stores::TransactionStore,
    user::UserID,
};

/// A route handler for deleting the transaction with `transaction_id`.
///
/// # Errors
/// Returns a 404 if the transaction does not exist or belongs to another
/// user.
pub async fn delete_transaction<T>(
    State(state): State<TransactionState<T>>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionID>,
) -> Result<Json<Value>, Error>
where
    T: TransactionStore + Clone + Send + Sync,
{
    let mut store = state.transaction_store;
    store.delete(transaction_id, user_id)?;

    Ok(Json(json!({"message": "Transaction deleted successfully"})))
}
