//! The response models for the analytics endpoints.

use serde::Serialize;

/// The per-category expense breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    /// One entry per category with expenses, largest first.
    pub category_data: Vec<CategoryShare>,
    /// The grand total of all expenses in the window.
    pub total_expenses: f64,
}

/// One category's share of the expense total.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShare {
    /// The category label.
    pub name: String,
    /// The amount spent in the category.
    pub amount: f64,
    /// The category's share of the total as a percentage rounded to one
    /// decimal place, e.g. "83.3" or "50". "0.0" when the total is zero.
    pub percentage: String,
}

/// The daily expense trend with its summary statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTrend {
    /// One entry per day with expenses, chronologically. Days without
    /// expenses are absent rather than zero.
    pub daily_data: Vec<DailyPoint>,
    /// Statistics over the whole window.
    pub summary_stats: DailyStats,
}

/// The expenses of one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPoint {
    /// The UTC day in "YYYY-MM-DD" form.
    pub date: String,
    /// The day formatted for display, e.g. "Mar 10".
    pub display_date: String,
    /// The amount spent on the day.
    pub amount: f64,
    /// The number of expense transactions on the day.
    pub transaction_count: u64,
}

/// Summary statistics for the daily expense trend.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    /// The total spent across the window.
    pub total: f64,
    /// The largest single-day total.
    pub highest_day: f64,
    /// The total divided by the 30-day window length, rounded to two
    /// decimal places.
    pub daily_average: f64,
    /// The number of days with at least one expense.
    pub active_days: u64,
}

/// A user's all-time totals.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// The number of transactions of either kind.
    pub total_transactions: u64,
    /// The sum of all income amounts.
    pub total_income: f64,
    /// The sum of all expense amounts.
    pub total_expense: f64,
    /// Income minus expenses.
    pub total_balance: f64,
}

/// The trailing monthly trend with its derived statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrend {
    /// One entry per month with transactions, chronologically. Months
    /// without transactions are absent.
    pub monthly_data: Vec<MonthlyEntry>,
    /// The figures of the most recent month in the data.
    pub current_month: MonthFigures,
    /// Per-field averages over the months present, rounded to the nearest
    /// integer.
    pub averages: MonthlyAverages,
    /// The month with the highest net, earliest first on ties. Absent when
    /// there is no data.
    pub best_month: Option<MonthlyEntry>,
}

/// The figures of one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyEntry {
    /// The month formatted for display, e.g. "Mar 2024".
    pub month: String,
    /// The sum of income amounts in the month.
    pub income: f64,
    /// The sum of expense amounts in the month.
    pub expense: f64,
    /// Income minus expenses.
    pub net: f64,
    /// The number of transactions of either kind in the month.
    pub transactions: u64,
}

/// The income, expense, and net figures of a single month.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthFigures {
    /// The sum of income amounts.
    pub income: f64,
    /// The sum of expense amounts.
    pub expense: f64,
    /// Income minus expenses.
    pub net: f64,
}

/// Whole-number monthly averages.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyAverages {
    /// The average monthly income, rounded to the nearest integer.
    pub income: i64,
    /// The average monthly expenses, rounded to the nearest integer.
    pub expense: i64,
    /// The average monthly net, rounded to the nearest integer.
    pub net: i64,
}
