//! Lenient parsing of the transaction list query string.
//!
//! Filters arrive as free-form strings and never cause a request to fail:
//! numbers that do not parse fall back to defaults, unknown filter values
//! simply match nothing, and unparseable dates are dropped. Clients get an
//! empty page rather than a 400 for a misspelt filter.

use serde::Deserialize;
use time::OffsetDateTime;

use crate::{pagination::PaginationConfig, stores::TransactionQuery, transaction::resolve_window};

/// The raw query parameters of a transaction list request.
///
/// `category`, `transactionType`, and `paymentMode` may be repeated to
/// select several values at once.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListParams {
    /// The 1-based page number to fetch.
    pub page: Option<String>,
    /// The maximum number of transactions per page.
    pub limit: Option<String>,
    /// Category labels to keep, e.g. "groceries".
    pub category: Vec<String>,
    /// Transaction kinds to keep, "income" or "expense".
    pub transaction_type: Vec<String>,
    /// Payment mode labels to keep, e.g. "upi".
    pub payment_mode: Vec<String>,
    /// A range preset: "today", "week", or "month" relative to now, or
    /// "custom" to cover whole days from `from` through `to`. Any other
    /// preset takes precedence over `from` and `to` and matches everything.
    pub date_range: Option<String>,
    /// The earliest date to include.
    pub from: Option<String>,
    /// The latest date to include.
    pub to: Option<String>,
}

impl ListParams {
    /// Resolve the raw parameters into a store query, anchored at `now` for
    /// the relative range presets.
    pub fn into_query(self, now: OffsetDateTime, config: &PaginationConfig) -> TransactionQuery {
        let window = resolve_window(
            self.date_range.as_deref(),
            self.from.as_deref(),
            self.to.as_deref(),
            now,
        );

        TransactionQuery {
            categories: normalize_filter_values(self.category),
            kinds: normalize_filter_values(self.transaction_type),
            payment_modes: normalize_filter_values(self.payment_mode),
            window,
            page: parse_count(self.page.as_deref(), config.default_page),
            limit: parse_count(self.limit.as_deref(), config.default_page_size),
        }
    }
}

/// Lowercase and trim the filter values, dropping empty strings and the
/// "all" wildcard. An empty result means the filter is not applied.
fn normalize_filter_values(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|value| value.trim().to_lowercase())
        .filter(|value| !value.is_empty() && value != "all")
        .collect()
}

/// Parse a positive count from the query string, falling back to `default`
/// for anything that is not a positive integer.
fn parse_count(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|&count| count >= 1)
        .unwrap_or(default)
}
