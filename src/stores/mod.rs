//! Contains the trait and implementations for objects that store transactions.

mod sqlite;
mod transaction;

pub use sqlite::SQLiteTransactionStore;
pub use transaction::{
    CategoryTotal, DailyTotal, MonthlyTotal, SummaryTotals, TransactionPage, TransactionQuery,
    TransactionStore,
};
