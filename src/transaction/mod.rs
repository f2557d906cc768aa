//! The transaction domain: models, query parsing, date windows, and the
//! CRUD route handlers.

mod create_endpoint;
mod delete_endpoint;
mod get_endpoint;
mod list_endpoint;
mod models;
mod query;
mod range;
mod update_endpoint;

pub use create_endpoint::create_transaction;
pub use delete_endpoint::delete_transaction;
pub use get_endpoint::get_transaction;
pub use list_endpoint::list_transactions;
pub use models::{
    Category, DEFAULT_CURRENCY, PaymentMode, Transaction, TransactionBuilder, TransactionKind,
    TransactionUpdate, create_transaction_table,
};
pub use query::ListParams;
pub use range::{
    DateRangePreset, DateWindow, month_window_start, next_midnight, parse_date_filter,
    resolve_window, start_of_day,
};
pub use update_endpoint::update_transaction;

pub(crate) use range::month_abbrev;
