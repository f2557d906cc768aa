//! Read-only analytics over a user's transactions: the category breakdown,
//! daily expense trend, all-time summary, and monthly trend.
//!
//! Each endpoint is an owner-scoped grouping query in the store followed by
//! a pure second pass in [aggregation], so the shaping logic is testable
//! without a database.

mod aggregation;
mod endpoints;
mod models;

pub use endpoints::{expenses_by_category, expenses_by_date, monthly_summary, transaction_summary};
