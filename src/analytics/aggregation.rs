//! Pure functions that shape the store's grouped totals into the analytics
//! responses.

use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    stores::{CategoryTotal, DailyTotal, MonthlyTotal, SummaryTotals},
    transaction::month_abbrev,
};

use super::models::{
    CategoryBreakdown, CategoryShare, DailyPoint, DailyStats, DailyTrend, MonthFigures,
    MonthlyAverages, MonthlyEntry, MonthlyTrend, Summary,
};

/// The length of the daily trend window. The daily average always divides by
/// this, not by the number of active days.
pub(crate) const DAILY_TREND_WINDOW_DAYS: i64 = 30;

/// The number of months in the monthly trend window, including the current
/// one.
pub(crate) const MONTHLY_TREND_MONTHS: u32 = 6;

const DAY_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Shape per-category totals into the category breakdown response.
pub(crate) fn build_category_breakdown(totals: Vec<CategoryTotal>) -> CategoryBreakdown {
    let total_expenses: f64 = totals.iter().map(|total| total.total).sum();

    let category_data = totals
        .into_iter()
        .map(|total| {
            // Integral shares print without a decimal, e.g. "50" not "50.0".
            let percentage = if total_expenses == 0.0 {
                "0.0".to_owned()
            } else {
                round_to_places(total.total / total_expenses * 100.0, 1).to_string()
            };

            CategoryShare {
                name: total.category,
                amount: total.total,
                percentage,
            }
        })
        .collect();

    CategoryBreakdown {
        category_data,
        total_expenses,
    }
}

/// Shape per-day totals into the daily trend response.
pub(crate) fn build_daily_trend(totals: Vec<DailyTotal>) -> DailyTrend {
    let total: f64 = totals.iter().map(|day| day.total).sum();
    let highest_day = totals.iter().map(|day| day.total).fold(0.0, f64::max);
    let active_days = totals.len() as u64;

    let daily_data = totals
        .into_iter()
        .map(|day| DailyPoint {
            display_date: display_date(&day.day),
            date: day.day,
            amount: day.total,
            transaction_count: day.count,
        })
        .collect();

    DailyTrend {
        daily_data,
        summary_stats: DailyStats {
            total,
            highest_day,
            daily_average: round_to_places(total / DAILY_TREND_WINDOW_DAYS as f64, 2),
            active_days,
        },
    }
}

/// Shape the all-time totals into the summary response.
pub(crate) fn build_summary(totals: SummaryTotals) -> Summary {
    Summary {
        total_transactions: totals.transaction_count,
        total_income: totals.total_income,
        total_expense: totals.total_expenses,
        total_balance: totals.total_income - totals.total_expenses,
    }
}

/// Shape per-month totals into the monthly trend response.
pub(crate) fn build_monthly_trend(totals: Vec<MonthlyTotal>) -> MonthlyTrend {
    let monthly_data: Vec<MonthlyEntry> = totals
        .into_iter()
        .map(|month| MonthlyEntry {
            month: display_month(&month.month),
            income: month.income,
            expense: month.expenses,
            net: month.income - month.expenses,
            transactions: month.count,
        })
        .collect();

    let month_count = monthly_data.len() as f64;
    let averages = if monthly_data.is_empty() {
        MonthlyAverages::default()
    } else {
        let income_sum: f64 = monthly_data.iter().map(|month| month.income).sum();
        let expense_sum: f64 = monthly_data.iter().map(|month| month.expense).sum();
        let net_sum: f64 = monthly_data.iter().map(|month| month.net).sum();

        MonthlyAverages {
            income: (income_sum / month_count).round() as i64,
            expense: (expense_sum / month_count).round() as i64,
            net: (net_sum / month_count).round() as i64,
        }
    };

    let current_month = monthly_data
        .last()
        .map(|month| MonthFigures {
            income: month.income,
            expense: month.expense,
            net: month.net,
        })
        .unwrap_or_default();

    // Strict comparison keeps the earliest month on ties.
    let best_month = monthly_data
        .iter()
        .cloned()
        .reduce(|best, month| if month.net > best.net { month } else { best });

    MonthlyTrend {
        monthly_data,
        current_month,
        averages,
        best_month,
    }
}

fn round_to_places(value: f64, places: u32) -> f64 {
    let factor = 10_f64.powi(places as i32);

    (value * factor).round() / factor
}

/// Format a "YYYY-MM-DD" day for display, e.g. "Mar 10".
///
/// The input comes from the store's day bucketing, so a parse failure can
/// only mean the database was modified outside the application; the raw
/// string is used as-is in that case.
fn display_date(day: &str) -> String {
    match Date::parse(day, DAY_FORMAT) {
        Ok(date) => format!("{} {:02}", month_abbrev(date.month()), date.day()),
        Err(_) => day.to_owned(),
    }
}

/// Format a "YYYY-MM" month for display, e.g. "Mar 2024".
fn display_month(month: &str) -> String {
    match Date::parse(&format!("{month}-01"), DAY_FORMAT) {
        Ok(date) => format!("{} {}", month_abbrev(date.month()), date.year()),
        Err(_) => month.to_owned(),
    }
}
