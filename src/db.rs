//! Database initialization for the application.

use rusqlite::Connection;

use crate::{transaction::create_transaction_table, user::create_user_table};

/// Create the application's database tables and indexes.
///
/// Safe to call on an already-initialized database.
///
/// # Errors
/// Returns an error if a table or index could not be created or if there is
/// some other SQL error.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.pragma_update(None, "foreign_keys", true)?;

    create_user_table(connection)?;
    create_transaction_table(connection)?;

    Ok(())
}
