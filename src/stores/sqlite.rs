//! Implements a SQLite backed transaction store.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, Row, params_from_iter, types::Type, types::Value};
use time::OffsetDateTime;

use crate::{
    Error,
    database_id::TransactionID,
    stores::{
        TransactionStore,
        transaction::{
            CategoryTotal, DailyTotal, MonthlyTotal, SummaryTotals, TransactionPage,
            TransactionQuery,
        },
    },
    timestamp::{from_unix_ms, to_unix_ms},
    transaction::{
        Category, DEFAULT_CURRENCY, DateWindow, PaymentMode, Transaction, TransactionBuilder,
        TransactionKind, TransactionUpdate,
    },
    user::UserID,
};

const COLUMNS: &str = "id, user_id, kind, amount, currency, merchant, category, payment_mode, \
                       notes, occurred_at, created_at, updated_at";

/// Bucket the millisecond timestamp into a UTC "YYYY-MM-DD" day.
const DAY_EXPR: &str = "strftime('%Y-%m-%d', occurred_at / 1000, 'unixepoch')";
/// Bucket the millisecond timestamp into a UTC "YYYY-MM" month.
const MONTH_EXPR: &str = "strftime('%Y-%m', occurred_at / 1000, 'unixepoch')";

/// Stores transactions in a SQLite database.
///
/// Note that because a transaction belongs to a [User](crate::user::User),
/// the user table must be set up in the database.
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection.lock().map_err(|_| Error::DatabaseLockError)
    }

    fn map_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
        let kind_label: String = row.get(2)?;
        let kind = TransactionKind::from_label(&kind_label)
            .ok_or_else(|| column_error(2, format!("unknown transaction kind {kind_label:?}")))?;

        let category_label: String = row.get(6)?;
        let category = Category::from_label(&category_label)
            .ok_or_else(|| column_error(6, format!("unknown category {category_label:?}")))?;

        let payment_mode_label: String = row.get(7)?;
        let payment_mode = PaymentMode::from_label(&payment_mode_label).ok_or_else(|| {
            column_error(7, format!("unknown payment mode {payment_mode_label:?}"))
        })?;

        Ok(Transaction {
            id: row.get(0)?,
            user_id: UserID::new(row.get(1)?),
            kind,
            amount: row.get(3)?,
            currency: row.get(4)?,
            merchant: row.get(5)?,
            category,
            payment_mode,
            notes: row.get(8)?,
            occurred_at: timestamp_from_row(row, 9)?,
            created_at: timestamp_from_row(row, 10)?,
            updated_at: timestamp_from_row(row, 11)?,
        })
    }
}

/// An error for a stored value that does not map back onto the domain
/// models. Only reachable if the database was modified outside the
/// application.
fn column_error(index: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, Type::Text, message.into())
}

fn timestamp_from_row(row: &Row, index: usize) -> Result<OffsetDateTime, rusqlite::Error> {
    let milliseconds: i64 = row.get(index)?;

    from_unix_ms(milliseconds).map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            index,
            Type::Integer,
            format!("{milliseconds} is not a valid Unix millisecond timestamp").into(),
        )
    })
}

/// Add an `IN` clause for `column` unless `labels` is empty.
///
/// The labels are passed through as SQL parameters, so an unrecognized label
/// is a valid filter that matches no rows.
fn push_label_filter(
    where_parts: &mut Vec<String>,
    parameters: &mut Vec<Value>,
    column: &str,
    labels: &[String],
) {
    if labels.is_empty() {
        return;
    }

    let placeholders = (0..labels.len())
        .map(|i| format!("?{}", parameters.len() + i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    where_parts.push(format!("{column} IN ({placeholders})"));
    parameters.extend(labels.iter().map(|label| Value::Text(label.clone())));
}

/// Add the half-open date bounds of `window` to the query.
fn push_window_filter(
    where_parts: &mut Vec<String>,
    parameters: &mut Vec<Value>,
    window: &DateWindow,
) {
    if let Some(start) = window.start {
        where_parts.push(format!("occurred_at >= ?{}", parameters.len() + 1));
        parameters.push(Value::Integer(to_unix_ms(start)));
    }

    if let Some(end_exclusive) = window.end_exclusive {
        where_parts.push(format!("occurred_at < ?{}", parameters.len() + 1));
        parameters.push(Value::Integer(to_unix_ms(end_exclusive)));
    }
}

impl TransactionStore for SQLiteTransactionStore {
    /// Create a new transaction in the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NonPositiveAmount] or [Error::CategoryKindMismatch] if the
    ///   builder fails validation,
    /// - [Error::InvalidUser] if `user_id` does not refer to a valid user,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn create(
        &mut self,
        user_id: UserID,
        builder: TransactionBuilder,
    ) -> Result<Transaction, Error> {
        builder.validate()?;

        let now = OffsetDateTime::now_utc();
        let occurred_at = builder.occurred_at.unwrap_or(now);

        let transaction = self
            .lock()?
            .prepare(&format!(
                "INSERT INTO \"transaction\" (user_id, kind, amount, currency, merchant, \
                 category, payment_mode, notes, occurred_at, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                 RETURNING {COLUMNS}"
            ))?
            .query_row(
                (
                    user_id.as_i64(),
                    builder.kind.as_str(),
                    builder.amount,
                    builder.currency.as_deref().unwrap_or(DEFAULT_CURRENCY),
                    builder.merchant,
                    builder.category.as_str(),
                    builder.payment_mode.as_str(),
                    builder.notes,
                    to_unix_ms(occurred_at),
                    to_unix_ms(now),
                    to_unix_ms(now),
                ),
                Self::map_row,
            )?;

        Ok(transaction)
    }

    /// Retrieve the transaction with `id` owned by `user_id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a transaction owned by
    ///   `user_id`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, id: TransactionID, user_id: UserID) -> Result<Transaction, Error> {
        let transaction = self
            .lock()?
            .prepare(&format!(
                "SELECT {COLUMNS} FROM \"transaction\" WHERE id = :id AND user_id = :user_id"
            ))?
            .query_row(
                &[(":id", &id), (":user_id", &user_id.as_i64())],
                Self::map_row,
            )?;

        Ok(transaction)
    }

    /// Retrieve a page of `user_id`'s transactions matching `query`, newest
    /// first.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] if there is a SQL error.
    fn get_page(
        &self,
        user_id: UserID,
        query: &TransactionQuery,
    ) -> Result<TransactionPage, Error> {
        let mut where_parts = vec!["user_id = ?1".to_string()];
        let mut parameters = vec![Value::Integer(user_id.as_i64())];

        push_label_filter(
            &mut where_parts,
            &mut parameters,
            "category",
            &query.categories,
        );
        push_label_filter(&mut where_parts, &mut parameters, "kind", &query.kinds);
        push_label_filter(
            &mut where_parts,
            &mut parameters,
            "payment_mode",
            &query.payment_modes,
        );
        push_window_filter(&mut where_parts, &mut parameters, &query.window);

        let where_clause = where_parts.join(" AND ");
        let connection = self.lock()?;

        // Counts come back as i64, the only integer type SQLite knows.
        let total = connection
            .prepare(&format!(
                "SELECT COUNT(id) FROM \"transaction\" WHERE {where_clause}"
            ))?
            .query_row(params_from_iter(parameters.iter()), |row| {
                row.get::<_, i64>(0)
            })? as u64;

        // Clamped to i64: SQLite reads larger integer literals as REAL,
        // which LIMIT/OFFSET reject.
        let limit = query.limit.min(i64::MAX as u64);
        let offset = query
            .page
            .saturating_sub(1)
            .saturating_mul(limit)
            .min(i64::MAX as u64);
        let transactions = connection
            .prepare(&format!(
                "SELECT {COLUMNS} FROM \"transaction\" WHERE {where_clause} \
                 ORDER BY occurred_at DESC, id DESC LIMIT {limit} OFFSET {offset}"
            ))?
            .query_map(params_from_iter(parameters.iter()), Self::map_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TransactionPage {
            transactions,
            total,
        })
    }

    /// Replace the mutable fields of the transaction with `id` owned by
    /// `user_id`.
    ///
    /// The stored kind cannot be changed and the update's category is
    /// validated against it. An absent date keeps the stored one.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a transaction owned by
    ///   `user_id`,
    /// - [Error::NonPositiveAmount] or [Error::CategoryKindMismatch] if the
    ///   update fails validation,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update(
        &mut self,
        id: TransactionID,
        user_id: UserID,
        update: TransactionUpdate,
    ) -> Result<Transaction, Error> {
        let connection = self.lock()?;

        let kind = connection
            .prepare("SELECT kind FROM \"transaction\" WHERE id = :id AND user_id = :user_id")?
            .query_row(&[(":id", &id), (":user_id", &user_id.as_i64())], |row| {
                let label: String = row.get(0)?;

                TransactionKind::from_label(&label)
                    .ok_or_else(|| column_error(0, format!("unknown transaction kind {label:?}")))
            })?;

        update.validate(kind)?;

        let transaction = connection
            .prepare(&format!(
                "UPDATE \"transaction\"
                 SET amount = ?1, category = ?2, payment_mode = ?3, currency = ?4,
                     merchant = ?5, notes = ?6,
                     occurred_at = COALESCE(?7, occurred_at), updated_at = ?8
                 WHERE id = ?9 AND user_id = ?10
                 RETURNING {COLUMNS}"
            ))?
            .query_row(
                (
                    update.amount,
                    update.category.as_str(),
                    update.payment_mode.as_str(),
                    update.currency.as_deref().unwrap_or(DEFAULT_CURRENCY),
                    update.merchant,
                    update.notes,
                    update.occurred_at.map(to_unix_ms),
                    to_unix_ms(OffsetDateTime::now_utc()),
                    id,
                    user_id.as_i64(),
                ),
                Self::map_row,
            )?;

        Ok(transaction)
    }

    /// Delete the transaction with `id` owned by `user_id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a transaction owned by
    ///   `user_id`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&mut self, id: TransactionID, user_id: UserID) -> Result<(), Error> {
        let rows_deleted = self.lock()?.execute(
            "DELETE FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
            &[(":id", &id), (":user_id", &user_id.as_i64())],
        )?;

        if rows_deleted == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }

    /// Total `user_id`'s expenses per category within `window`, largest
    /// total first.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] if there is a SQL error.
    fn expense_totals_by_category(
        &self,
        user_id: UserID,
        window: &DateWindow,
    ) -> Result<Vec<CategoryTotal>, Error> {
        let mut where_parts = vec!["user_id = ?1".to_string(), "kind = 'expense'".to_string()];
        let mut parameters = vec![Value::Integer(user_id.as_i64())];
        push_window_filter(&mut where_parts, &mut parameters, window);
        let where_clause = where_parts.join(" AND ");

        self.lock()?
            .prepare(&format!(
                "SELECT category, SUM(amount) FROM \"transaction\" \
                 WHERE {where_clause} GROUP BY category ORDER BY SUM(amount) DESC"
            ))?
            .query_map(params_from_iter(parameters.iter()), |row| {
                Ok(CategoryTotal {
                    category: row.get(0)?,
                    total: row.get(1)?,
                })
            })?
            .map(|maybe_total| maybe_total.map_err(Error::from))
            .collect()
    }

    /// Total `user_id`'s expenses per calendar day within `window`, in
    /// chronological order.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] if there is a SQL error.
    fn expense_totals_by_day(
        &self,
        user_id: UserID,
        window: &DateWindow,
    ) -> Result<Vec<DailyTotal>, Error> {
        let mut where_parts = vec!["user_id = ?1".to_string(), "kind = 'expense'".to_string()];
        let mut parameters = vec![Value::Integer(user_id.as_i64())];
        push_window_filter(&mut where_parts, &mut parameters, window);
        let where_clause = where_parts.join(" AND ");

        self.lock()?
            .prepare(&format!(
                "SELECT {DAY_EXPR} AS day, SUM(amount), COUNT(id) FROM \"transaction\" \
                 WHERE {where_clause} GROUP BY day ORDER BY day ASC"
            ))?
            .query_map(params_from_iter(parameters.iter()), |row| {
                Ok(DailyTotal {
                    day: row.get(0)?,
                    total: row.get(1)?,
                    count: row.get::<_, i64>(2)? as u64,
                })
            })?
            .map(|maybe_total| maybe_total.map_err(Error::from))
            .collect()
    }

    /// Total `user_id`'s income and expenses across all time.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] if there is a SQL error.
    fn summary(&self, user_id: UserID) -> Result<SummaryTotals, Error> {
        self.lock()?
            .query_row(
                "SELECT COALESCE(SUM(CASE WHEN kind = 'income' THEN amount END), 0.0),
                        COALESCE(SUM(CASE WHEN kind = 'expense' THEN amount END), 0.0),
                        COUNT(id)
                 FROM \"transaction\" WHERE user_id = :user_id",
                &[(":user_id", &user_id.as_i64())],
                |row| {
                    Ok(SummaryTotals {
                        total_income: row.get(0)?,
                        total_expenses: row.get(1)?,
                        transaction_count: row.get::<_, i64>(2)? as u64,
                    })
                },
            )
            .map_err(Error::from)
    }

    /// Total `user_id`'s income and expenses per calendar month within
    /// `window`, in chronological order.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] if there is a SQL error.
    fn totals_by_month(
        &self,
        user_id: UserID,
        window: &DateWindow,
    ) -> Result<Vec<MonthlyTotal>, Error> {
        let mut where_parts = vec!["user_id = ?1".to_string()];
        let mut parameters = vec![Value::Integer(user_id.as_i64())];
        push_window_filter(&mut where_parts, &mut parameters, window);
        let where_clause = where_parts.join(" AND ");

        self.lock()?
            .prepare(&format!(
                "SELECT {MONTH_EXPR} AS month,
                        COALESCE(SUM(CASE WHEN kind = 'income' THEN amount END), 0.0),
                        COALESCE(SUM(CASE WHEN kind = 'expense' THEN amount END), 0.0),
                        COUNT(id)
                 FROM \"transaction\"
                 WHERE {where_clause} GROUP BY month ORDER BY month ASC"
            ))?
            .query_map(params_from_iter(parameters.iter()), |row| {
                Ok(MonthlyTotal {
                    month: row.get(0)?,
                    income: row.get(1)?,
                    expenses: row.get(2)?,
                    count: row.get::<_, i64>(3)? as u64,
                })
            })?
            .map(|maybe_total| maybe_total.map_err(Error::from))
            .collect()
    }
}
