//! Defines the core data models for transactions.

use std::fmt::Display;

use rusqlite::Connection;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use time::OffsetDateTime;

use crate::{Error, database_id::TransactionID, user::UserID};

/// Create the transaction table and its query index.
///
/// Dates are stored as Unix timestamps in milliseconds so that range filters
/// and day bucketing stay simple integer comparisons.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
                amount REAL NOT NULL CHECK (amount > 0),
                currency TEXT NOT NULL DEFAULT 'INR',
                merchant TEXT,
                category TEXT NOT NULL,
                payment_mode TEXT NOT NULL DEFAULT 'cash',
                notes TEXT,
                occurred_at INTEGER NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date
                ON \"transaction\" (user_id, occurred_at DESC)",
        (),
    )?;

    Ok(())
}

/// Whether a transaction represents money earned or money spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    /// Money flowing in, e.g. a salary payment.
    Income,
    /// Money flowing out, e.g. a grocery shop.
    Expense,
}

impl TransactionKind {
    /// The lowercase wire label for the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Parse a wire label, ignoring case. Returns [None] for unknown labels.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_lowercase().as_str() {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TransactionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TransactionKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;

        Self::from_label(&label).ok_or_else(|| {
            de::Error::custom(format!(
                "\"{label}\" is not a transaction type, expected \"income\" or \"expense\""
            ))
        })
    }
}

/// The classification tag for a transaction.
///
/// Categories form two disjoint enumerations, one for each
/// [TransactionKind]; [Category::kind] reports which one a category belongs
/// to. The wire form is the lowercase label, e.g. "food & dining".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Category {
    // Income categories.
    Salary,
    Freelance,
    InvestmentReturns,
    BusinessIncome,
    RentalIncome,
    SideHustle,
    Bonus,
    Gift,
    OtherIncome,
    // Expense categories.
    FoodAndDining,
    Groceries,
    Transportation,
    Shopping,
    Entertainment,
    BillsAndUtilities,
    Healthcare,
    Education,
    Travel,
    Insurance,
    Investment,
    Rent,
    HomeMaintenance,
    PersonalCare,
    Subscriptions,
    Other,
}

impl Category {
    /// The lowercase wire label for the category.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Salary => "salary",
            Self::Freelance => "freelance",
            Self::InvestmentReturns => "investment returns",
            Self::BusinessIncome => "business income",
            Self::RentalIncome => "rental income",
            Self::SideHustle => "side hustle",
            Self::Bonus => "bonus",
            Self::Gift => "gift",
            Self::OtherIncome => "other income",
            Self::FoodAndDining => "food & dining",
            Self::Groceries => "groceries",
            Self::Transportation => "transportation",
            Self::Shopping => "shopping",
            Self::Entertainment => "entertainment",
            Self::BillsAndUtilities => "bills & utilities",
            Self::Healthcare => "healthcare",
            Self::Education => "education",
            Self::Travel => "travel",
            Self::Insurance => "insurance",
            Self::Investment => "investment",
            Self::Rent => "rent",
            Self::HomeMaintenance => "home maintenance",
            Self::PersonalCare => "personal care",
            Self::Subscriptions => "subscriptions",
            Self::Other => "other",
        }
    }

    /// Parse a wire label, ignoring case. Returns [None] for unknown labels.
    pub fn from_label(label: &str) -> Option<Self> {
        let category = match label.to_lowercase().as_str() {
            "salary" => Self::Salary,
            "freelance" => Self::Freelance,
            "investment returns" => Self::InvestmentReturns,
            "business income" => Self::BusinessIncome,
            "rental income" => Self::RentalIncome,
            "side hustle" => Self::SideHustle,
            "bonus" => Self::Bonus,
            "gift" => Self::Gift,
            "other income" => Self::OtherIncome,
            "food & dining" => Self::FoodAndDining,
            "groceries" => Self::Groceries,
            "transportation" => Self::Transportation,
            "shopping" => Self::Shopping,
            "entertainment" => Self::Entertainment,
            "bills & utilities" => Self::BillsAndUtilities,
            "healthcare" => Self::Healthcare,
            "education" => Self::Education,
            "travel" => Self::Travel,
            "insurance" => Self::Insurance,
            "investment" => Self::Investment,
            "rent" => Self::Rent,
            "home maintenance" => Self::HomeMaintenance,
            "personal care" => Self::PersonalCare,
            "subscriptions" => Self::Subscriptions,
            "other" => Self::Other,
            _ => return None,
        };

        Some(category)
    }

    /// The enumeration this category belongs to.
    pub fn kind(self) -> TransactionKind {
        match self {
            Self::Salary
            | Self::Freelance
            | Self::InvestmentReturns
            | Self::BusinessIncome
            | Self::RentalIncome
            | Self::SideHustle
            | Self::Bonus
            | Self::Gift
            | Self::OtherIncome => TransactionKind::Income,
            _ => TransactionKind::Expense,
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;

        Self::from_label(&label)
            .ok_or_else(|| de::Error::custom(format!("\"{label}\" is not a recognized category")))
    }
}

/// The settlement channel used for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[allow(missing_docs)]
pub enum PaymentMode {
    #[default]
    Cash,
    Card,
    Upi,
    Netbanking,
}

impl PaymentMode {
    /// The lowercase wire label for the payment mode.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Upi => "upi",
            Self::Netbanking => "netbanking",
        }
    }

    /// Parse a wire label, ignoring case. Returns [None] for unknown labels.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_lowercase().as_str() {
            "cash" => Some(Self::Cash),
            "card" => Some(Self::Card),
            "upi" => Some(Self::Upi),
            "netbanking" => Some(Self::Netbanking),
            _ => None,
        }
    }
}

impl Display for PaymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PaymentMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PaymentMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;

        Self::from_label(&label).ok_or_else(|| {
            de::Error::custom(format!("\"{label}\" is not a recognized payment mode"))
        })
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build] and pass the
/// builder to the transaction store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionID,
    /// The ID of the user that owns this transaction.
    pub user_id: UserID,
    /// Whether money was earned or spent.
    #[serde(rename = "transactionType")]
    pub kind: TransactionKind,
    /// The amount of money earned or spent, always positive.
    pub amount: f64,
    /// The currency code the amount is denominated in.
    pub currency: String,
    /// Who the money came from or went to.
    pub merchant: Option<String>,
    /// The classification tag, drawn from the enumeration matching `kind`.
    pub category: Category,
    /// The settlement channel used.
    pub payment_mode: PaymentMode,
    /// Free-form text attached to the transaction.
    pub notes: Option<String>,
    /// The economic instant the transaction happened, which may differ from
    /// when the record was created.
    #[serde(rename = "date", with = "time::serde::rfc3339")]
    pub occurred_at: OffsetDateTime,
    /// When the record was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the record was last modified.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(kind: TransactionKind, amount: f64, category: Category) -> TransactionBuilder {
        TransactionBuilder {
            kind,
            amount,
            category,
            currency: None,
            merchant: None,
            payment_mode: PaymentMode::default(),
            notes: None,
            occurred_at: None,
        }
    }
}

/// The default currency code for transactions that do not specify one.
pub const DEFAULT_CURRENCY: &str = "INR";

/// A builder for creating [Transaction] instances.
///
/// Optional fields default to the values the storage schema would assign:
/// currency "INR", payment mode cash, and the current instant for the date.
/// Validation happens when the builder is handed to the store.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// Whether money was earned or spent.
    pub kind: TransactionKind,
    /// The amount of money earned or spent. Must be greater than zero.
    pub amount: f64,
    /// The classification tag. Must belong to the enumeration matching `kind`.
    pub category: Category,
    /// The currency code, defaulting to [DEFAULT_CURRENCY].
    pub currency: Option<String>,
    /// Who the money came from or went to.
    pub merchant: Option<String>,
    /// The settlement channel used, defaulting to cash.
    pub payment_mode: PaymentMode,
    /// Free-form text attached to the transaction.
    pub notes: Option<String>,
    /// The economic instant of the transaction, defaulting to now.
    pub occurred_at: Option<OffsetDateTime>,
}

impl TransactionBuilder {
    /// Set the currency code for the transaction.
    pub fn currency(mut self, currency: Option<String>) -> Self {
        self.currency = currency;
        self
    }

    /// Set the merchant for the transaction.
    pub fn merchant(mut self, merchant: Option<String>) -> Self {
        self.merchant = merchant;
        self
    }

    /// Set the payment mode for the transaction.
    pub fn payment_mode(mut self, payment_mode: PaymentMode) -> Self {
        self.payment_mode = payment_mode;
        self
    }

    /// Set the notes for the transaction.
    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    /// Set the economic date of the transaction.
    pub fn occurred_at(mut self, occurred_at: Option<OffsetDateTime>) -> Self {
        self.occurred_at = occurred_at;
        self
    }

    /// Check the invariants that must hold before the transaction can be
    /// persisted.
    ///
    /// # Errors
    /// Returns a:
    /// - [Error::NonPositiveAmount] if the amount is zero or negative,
    /// - or [Error::CategoryKindMismatch] if the category belongs to the
    ///   other kind's enumeration.
    pub fn validate(&self) -> Result<(), Error> {
        validate_fields(self.kind, self.amount, self.category)
    }
}

/// A full-field replacement for the mutable fields of a transaction.
///
/// The transaction's kind is deliberately absent: it is immutable after
/// creation so that historical analytics cannot be silently reclassified.
/// An absent `occurred_at` keeps the stored economic date.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionUpdate {
    /// The new amount. Must be greater than zero.
    pub amount: f64,
    /// The new category. Must match the stored kind.
    pub category: Category,
    /// The new payment mode.
    pub payment_mode: PaymentMode,
    /// The new currency code, defaulting to [DEFAULT_CURRENCY].
    pub currency: Option<String>,
    /// The new merchant, cleared if absent.
    pub merchant: Option<String>,
    /// The new notes, cleared if absent.
    pub notes: Option<String>,
    /// The new economic date, or [None] to keep the stored one.
    pub occurred_at: Option<OffsetDateTime>,
}

impl TransactionUpdate {
    /// Check the update against the invariants for a transaction of `kind`.
    ///
    /// # Errors
    /// Returns a:
    /// - [Error::NonPositiveAmount] if the amount is zero or negative,
    /// - or [Error::CategoryKindMismatch] if the category does not belong to
    ///   `kind`'s enumeration.
    pub fn validate(&self, kind: TransactionKind) -> Result<(), Error> {
        validate_fields(kind, self.amount, self.category)
    }
}

fn validate_fields(kind: TransactionKind, amount: f64, category: Category) -> Result<(), Error> {
    if amount <= 0.0 {
        return Err(Error::NonPositiveAmount(amount));
    }

    if category.kind() != kind {
        return Err(Error::CategoryKindMismatch { category, kind });
    }

    Ok(())
}

#[cfg(test)]
mod models_tests {
    use time::macros::datetime;

    use crate::Error;

    use super::{Category, PaymentMode, Transaction, TransactionKind, TransactionUpdate};

    #[test]
    fn category_labels_round_trip() {
        for category in [
            Category::Salary,
            Category::InvestmentReturns,
            Category::FoodAndDining,
            Category::BillsAndUtilities,
            Category::Other,
        ] {
            assert_eq!(Category::from_label(category.as_str()), Some(category));
        }
    }

    #[test]
    fn category_labels_ignore_case() {
        assert_eq!(
            Category::from_label("Food & Dining"),
            Some(Category::FoodAndDining)
        );
        assert_eq!(Category::from_label("SALARY"), Some(Category::Salary));
    }

    #[test]
    fn unknown_category_label_is_rejected() {
        assert_eq!(Category::from_label("gambling"), None);
    }

    #[test]
    fn income_and_expense_categories_are_disjoint() {
        assert_eq!(Category::Salary.kind(), TransactionKind::Income);
        assert_eq!(Category::OtherIncome.kind(), TransactionKind::Income);
        assert_eq!(Category::Groceries.kind(), TransactionKind::Expense);
        assert_eq!(Category::Other.kind(), TransactionKind::Expense);
    }

    #[test]
    fn builder_rejects_non_positive_amount() {
        let builder = Transaction::build(TransactionKind::Expense, 0.0, Category::Groceries);

        assert_eq!(builder.validate(), Err(Error::NonPositiveAmount(0.0)));
    }

    #[test]
    fn builder_rejects_category_from_other_kind() {
        let builder = Transaction::build(TransactionKind::Income, 100.0, Category::Groceries);

        assert_eq!(
            builder.validate(),
            Err(Error::CategoryKindMismatch {
                category: Category::Groceries,
                kind: TransactionKind::Income,
            })
        );
    }

    #[test]
    fn update_validates_against_stored_kind() {
        let update = TransactionUpdate {
            amount: 50.0,
            category: Category::Salary,
            payment_mode: PaymentMode::Cash,
            currency: None,
            merchant: None,
            notes: None,
            occurred_at: None,
        };

        assert!(update.validate(TransactionKind::Income).is_ok());
        assert_eq!(
            update.validate(TransactionKind::Expense),
            Err(Error::CategoryKindMismatch {
                category: Category::Salary,
                kind: TransactionKind::Expense,
            })
        );
    }

    #[test]
    fn transaction_serializes_with_wire_field_names() {
        let transaction = Transaction {
            id: 1,
            user_id: crate::user::UserID::new(7),
            kind: TransactionKind::Expense,
            amount: 42.5,
            currency: "INR".to_owned(),
            merchant: Some("Corner Dairy".to_owned()),
            category: Category::Groceries,
            payment_mode: PaymentMode::Upi,
            notes: None,
            occurred_at: datetime!(2024-03-10 12:00 UTC),
            created_at: datetime!(2024-03-10 12:01 UTC),
            updated_at: datetime!(2024-03-10 12:01 UTC),
        };

        let json = serde_json::to_value(&transaction).unwrap();

        assert_eq!(json["transactionType"], "expense");
        assert_eq!(json["paymentMode"], "upi");
        assert_eq!(json["category"], "groceries");
        assert_eq!(json["date"], "2024-03-10T12:00:00Z");
        assert_eq!(json["userId"], 7);
    }
}
