//! The route handlers for the analytics endpoints.

use axum::{Extension, Json, extract::State};
use axum_extra::extract::Query;
use serde::Deserialize;
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    state::AnalyticsState,
    stores::TransactionStore,
    transaction::{DateWindow, month_window_start, next_midnight, parse_date_filter, start_of_day},
    user::UserID,
};

use super::{
    aggregation::{
        DAILY_TREND_WINDOW_DAYS, MONTHLY_TREND_MONTHS, build_category_breakdown,
        build_daily_trend, build_monthly_trend, build_summary,
    },
    models::{CategoryBreakdown, DailyTrend, MonthlyTrend, Summary},
};

/// The optional window of a category breakdown request.
#[derive(Debug, Default, Deserialize)]
pub struct BreakdownParams {
    /// The earliest date to include.
    pub from: Option<String>,
    /// The latest date to include.
    pub to: Option<String>,
}

/// A route handler for the per-category expense breakdown.
///
/// The `from`/`to` window is applied only when both are given; otherwise the
/// breakdown covers all time.
pub async fn expenses_by_category<T>(
    State(state): State<AnalyticsState<T>>,
    Extension(user_id): Extension<UserID>,
    Query(params): Query<BreakdownParams>,
) -> Result<Json<CategoryBreakdown>, Error>
where
    T: TransactionStore + Clone + Send + Sync,
{
    let window = match (params.from.as_deref(), params.to.as_deref()) {
        // The bounds cover whole days, same as the transaction list filter.
        (Some(from), Some(to)) => DateWindow {
            start: parse_date_filter(from).map(start_of_day),
            end_exclusive: parse_date_filter(to).map(next_midnight),
        },
        _ => DateWindow::UNBOUNDED,
    };

    let totals = state
        .transaction_store
        .expense_totals_by_category(user_id, &window)?;

    Ok(Json(build_category_breakdown(totals)))
}

/// A route handler for the daily expense trend over the trailing 30 days.
pub async fn expenses_by_date<T>(
    State(state): State<AnalyticsState<T>>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<DailyTrend>, Error>
where
    T: TransactionStore + Clone + Send + Sync,
{
    let now = OffsetDateTime::now_utc();
    let window = DateWindow {
        start: Some(now - Duration::days(DAILY_TREND_WINDOW_DAYS)),
        // Storage has millisecond precision, so a bound one millisecond past
        // `now` keeps transactions stamped in the same millisecond as the
        // request.
        end_exclusive: Some(now + Duration::milliseconds(1)),
    };

    let totals = state
        .transaction_store
        .expense_totals_by_day(user_id, &window)?;

    Ok(Json(build_daily_trend(totals)))
}

/// A route handler for the all-time transaction summary.
pub async fn transaction_summary<T>(
    State(state): State<AnalyticsState<T>>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Summary>, Error>
where
    T: TransactionStore + Clone + Send + Sync,
{
    let totals = state.transaction_store.summary(user_id)?;

    Ok(Json(build_summary(totals)))
}

/// A route handler for the monthly trend over the trailing six calendar
/// months, including the current one.
pub async fn monthly_summary<T>(
    State(state): State<AnalyticsState<T>>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<MonthlyTrend>, Error>
where
    T: TransactionStore + Clone + Send + Sync,
{
    let now = OffsetDateTime::now_utc();
    let window = DateWindow {
        start: Some(month_window_start(now.date(), MONTHLY_TREND_MONTHS - 1)),
        end_exclusive: Some(now + Duration::milliseconds(1)),
    };

    let totals = state.transaction_store.totals_by_month(user_id, &window)?;

    Ok(Json(build_monthly_trend(totals)))
}
