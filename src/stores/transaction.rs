//! Defines the transaction store trait and its query and result types.

use crate::{
    Error,
    database_id::TransactionID,
    transaction::{DateWindow, Transaction, TransactionBuilder, TransactionUpdate},
    user::UserID,
};

/// Handles the creation, retrieval, and aggregation of transactions.
///
/// Every method is scoped to a single user: a store never returns or touches
/// another user's transactions, and a wrong-owner lookup is indistinguishable
/// from a missing row.
pub trait TransactionStore {
    /// Create a new transaction owned by `user_id`.
    fn create(&mut self, user_id: UserID, builder: TransactionBuilder)
    -> Result<Transaction, Error>;

    /// Retrieve the transaction with `id` owned by `user_id`.
    fn get(&self, id: TransactionID, user_id: UserID) -> Result<Transaction, Error>;

    /// Retrieve a page of `user_id`'s transactions matching `query`, newest
    /// first.
    fn get_page(&self, user_id: UserID, query: &TransactionQuery)
    -> Result<TransactionPage, Error>;

    /// Replace the mutable fields of the transaction with `id` owned by
    /// `user_id`.
    fn update(
        &mut self,
        id: TransactionID,
        user_id: UserID,
        update: TransactionUpdate,
    ) -> Result<Transaction, Error>;

    /// Delete the transaction with `id` owned by `user_id`.
    fn delete(&mut self, id: TransactionID, user_id: UserID) -> Result<(), Error>;

    /// Total `user_id`'s expenses per category within `window`, largest
    /// total first.
    fn expense_totals_by_category(
        &self,
        user_id: UserID,
        window: &DateWindow,
    ) -> Result<Vec<CategoryTotal>, Error>;

    /// Total `user_id`'s expenses per calendar day within `window`, in
    /// chronological order. Days without expenses are absent.
    fn expense_totals_by_day(
        &self,
        user_id: UserID,
        window: &DateWindow,
    ) -> Result<Vec<DailyTotal>, Error>;

    /// Total `user_id`'s income and expenses across all time.
    fn summary(&self, user_id: UserID) -> Result<SummaryTotals, Error>;

    /// Total `user_id`'s income and expenses per calendar month within
    /// `window`, in chronological order. Months without transactions are
    /// absent.
    fn totals_by_month(&self, user_id: UserID, window: &DateWindow)
    -> Result<Vec<MonthlyTotal>, Error>;
}

/// Defines which transactions [TransactionStore::get_page] should fetch.
///
/// The filter lists hold raw lowercase labels rather than parsed enums: an
/// unrecognized label is a valid filter that matches no rows, which lets a
/// misspelt query return an empty page instead of an error. An empty list
/// leaves that filter unapplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionQuery {
    /// Keep transactions whose category label is in this list.
    pub categories: Vec<String>,
    /// Keep transactions whose kind label is in this list.
    pub kinds: Vec<String>,
    /// Keep transactions whose payment mode label is in this list.
    pub payment_modes: Vec<String>,
    /// Keep transactions whose date falls within this window.
    pub window: DateWindow,
    /// The 1-based page number to fetch.
    pub page: u64,
    /// The maximum number of transactions in the page.
    pub limit: u64,
}

impl Default for TransactionQuery {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            kinds: Vec::new(),
            payment_modes: Vec::new(),
            window: DateWindow::UNBOUNDED,
            page: 1,
            limit: 10,
        }
    }
}

/// One page of transactions plus the total count across all pages.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionPage {
    /// The transactions in the page, newest first.
    pub transactions: Vec<Transaction>,
    /// The number of transactions matching the query across all pages.
    pub total: u64,
}

/// The total spent in one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    /// The category label as stored.
    pub category: String,
    /// The sum of expense amounts in the category.
    pub total: f64,
}

/// The total spent on one calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyTotal {
    /// The UTC day in "YYYY-MM-DD" form.
    pub day: String,
    /// The sum of expense amounts on the day.
    pub total: f64,
    /// The number of expense transactions on the day.
    pub count: u64,
}

/// A user's all-time income and expense totals.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SummaryTotals {
    /// The sum of all income amounts.
    pub total_income: f64,
    /// The sum of all expense amounts.
    pub total_expenses: f64,
    /// The number of transactions of either kind.
    pub transaction_count: u64,
}

/// The income and expense totals for one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTotal {
    /// The UTC month in "YYYY-MM" form.
    pub month: String,
    /// The sum of income amounts in the month.
    pub income: f64,
    /// The sum of expense amounts in the month.
    pub expenses: f64,
    /// The number of transactions of either kind in the month.
    pub count: u64,
}
