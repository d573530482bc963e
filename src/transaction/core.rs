//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    auth::UserID,
    card::{CardId, card_exists},
    category::{CategoryId, category_exists},
    database_id::TransactionId,
};

// ============================================================================
// MODELS
// ============================================================================

/// Whether a transaction brings money in, spends it, or invests it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in, e.g. a salary payment.
    Income,
    /// Money going out, e.g. rent or groceries.
    Expense,
    /// Money moved into investments.
    Investment,
}

impl TransactionType {
    /// All transaction types, in display order.
    pub const ALL: [TransactionType; 3] = [
        TransactionType::Income,
        TransactionType::Expense,
        TransactionType::Investment,
    ];

    /// The identifier stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
            TransactionType::Investment => "investment",
        }
    }

    /// The human readable name shown in the UI.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
            TransactionType::Investment => "Investment",
        }
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            "investment" => Ok(TransactionType::Investment),
            _ => Err(Error::NotFound),
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An income, expense or investment event.
///
/// To create a new `Transaction`, use [TransactionBuilder].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user the transaction belongs to.
    pub user_id: UserID,
    /// The amount of money in dollars. Always positive; the type says which
    /// direction the money moved.
    pub amount: f64,
    /// Whether the transaction is income, an expense or an investment.
    pub transaction_type: TransactionType,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
    /// Whether an expense recurs every month (rent) or not (groceries).
    /// Always false for income and investments.
    pub is_fixed: bool,
    /// The ID of the category the transaction belongs to.
    pub category_id: Option<CategoryId>,
    /// The ID of the card the expense was paid with.
    pub card_id: Option<CardId>,
}

/// A builder for creating [Transaction] instances.
///
/// The required fields are set in [TransactionBuilder::new]; the rest default
/// to an empty description with no category, card or fixed flag.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The user the transaction belongs to.
    pub user_id: UserID,
    /// The amount of money in dollars.
    pub amount: f64,
    /// Whether the transaction is income, an expense or an investment.
    pub transaction_type: TransactionType,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
    /// Whether an expense recurs every month.
    pub is_fixed: bool,
    /// The category of the transaction, e.g. 'Groceries', 'Rent'.
    pub category_id: Option<CategoryId>,
    /// The card the expense was paid with.
    pub card_id: Option<CardId>,
}

impl TransactionBuilder {
    /// Create a builder with the required fields.
    pub fn new(
        user_id: UserID,
        amount: f64,
        transaction_type: TransactionType,
        date: Date,
    ) -> Self {
        Self {
            user_id,
            amount,
            transaction_type,
            date,
            description: String::new(),
            is_fixed: false,
            category_id: None,
            card_id: None,
        }
    }

    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Mark an expense as fixed (recurring every month).
    pub fn is_fixed(mut self, is_fixed: bool) -> Self {
        self.is_fixed = is_fixed;
        self
    }

    /// Set the category for the transaction.
    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }

    /// Set the card for the transaction.
    pub fn card_id(mut self, card_id: Option<CardId>) -> Self {
        self.card_id = card_id;
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database from a builder.
///
/// The fixed flag and card only apply to expenses and are cleared for other
/// transaction types.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidCategory] if the category ID does not refer to one of the user's categories,
/// - [Error::InvalidCard] if the card ID does not refer to one of the user's cards,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let builder = normalize(builder);
    validate_references(&builder, connection)?;

    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (user_id, amount, type, date, description, is_fixed, category_id, card_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING id, user_id, amount, type, date, description, is_fixed, category_id, card_id",
        )?
        .query_row(
            (
                builder.user_id.as_i64(),
                builder.amount,
                builder.transaction_type.as_str(),
                builder.date,
                builder.description,
                builder.is_fixed,
                builder.category_id,
                builder.card_id,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`, scoped to `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to one of the user's transactions,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, user_id, amount, type, date, description, is_fixed, category_id, card_id
             FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(&[(":id", &id), (":user_id", &user_id.as_i64())], map_transaction_row)?;

    Ok(transaction)
}

/// Replace the editable fields of a transaction.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingTransaction] if `id` does not refer to one of the user's transactions,
/// - [Error::InvalidCategory] or [Error::InvalidCard] if the references are not the user's,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<(), Error> {
    let builder = normalize(builder);
    validate_references(&builder, connection)?;

    let rows_affected = connection.execute(
        "UPDATE \"transaction\"
         SET amount = ?1, type = ?2, date = ?3, description = ?4, is_fixed = ?5,
             category_id = ?6, card_id = ?7
         WHERE id = ?8 AND user_id = ?9",
        (
            builder.amount,
            builder.transaction_type.as_str(),
            builder.date,
            builder.description,
            builder.is_fixed,
            builder.category_id,
            builder.card_id,
            id,
            builder.user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(())
}

/// Delete a transaction by its `id`, scoped to `user_id`.
///
/// Returns the number of rows deleted: zero when the transaction did not
/// exist, one when it did.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<usize, Error> {
    connection
        .execute(
            "DELETE FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
            &[(":id", &id), (":user_id", &user_id.as_i64())],
        )
        .map_err(|err| err.into())
}

/// Get a user's transactions with a date in `[start, end]`, newest first.
pub fn get_transactions_in_date_range(
    user_id: UserID,
    start: Date,
    end: Date,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, amount, type, date, description, is_fixed, category_id, card_id
             FROM \"transaction\"
             WHERE user_id = ?1 AND date >= ?2 AND date <= ?3
             ORDER BY date DESC, id DESC",
        )?
        .query_map((user_id.as_i64(), start, end), map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                amount REAL NOT NULL,
                type TEXT NOT NULL,
                date TEXT NOT NULL,
                description TEXT NOT NULL,
                is_fixed INTEGER NOT NULL DEFAULT 0,
                category_id INTEGER,
                card_id INTEGER,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL,
                FOREIGN KEY(card_id) REFERENCES card(id) ON UPDATE CASCADE ON DELETE SET NULL
                )",
        (),
    )?;

    // Composite index used by the month and dashboard pages.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub(super) fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_user_id = row.get(1)?;
    let amount = row.get(2)?;
    let raw_type: String = row.get(3)?;
    let date = row.get(4)?;
    let description = row.get(5)?;
    let is_fixed = row.get(6)?;
    let category_id = row.get(7)?;
    let card_id = row.get(8)?;

    let transaction_type = raw_type.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unknown transaction type {raw_type}").into(),
        )
    })?;

    Ok(Transaction {
        id,
        user_id: UserID::new(raw_user_id),
        amount,
        transaction_type,
        date,
        description,
        is_fixed,
        category_id,
        card_id,
    })
}

/// Clear the fields that only apply to expenses.
fn normalize(mut builder: TransactionBuilder) -> TransactionBuilder {
    if builder.transaction_type != TransactionType::Expense {
        builder.is_fixed = false;
        builder.card_id = None;
    }

    builder
}

fn validate_references(
    builder: &TransactionBuilder,
    connection: &Connection,
) -> Result<(), Error> {
    if let Some(category_id) = builder.category_id
        && !category_exists(category_id, builder.user_id, connection)?
    {
        return Err(Error::InvalidCategory(Some(category_id)));
    }

    if let Some(card_id) = builder.card_id
        && !card_exists(card_id, builder.user_id, connection)?
    {
        return Err(Error::InvalidCard(Some(card_id)));
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        auth::{Email, PasswordHash, UserID, create_user},
        category::{CategoryKind, CategoryName, create_category},
        db::initialize,
    };

    use super::{
        TransactionBuilder, TransactionType, create_transaction, delete_transaction,
        get_transaction, get_transactions_in_date_range, update_transaction,
    };

    fn get_test_connection() -> (Connection, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(
            Email::new_unchecked("foo@bar.baz"),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        (connection, user.id)
    }

    #[test]
    fn create_succeeds() {
        let (connection, user_id) = get_test_connection();
        let amount = 12.3;

        let result = create_transaction(
            TransactionBuilder::new(
                user_id,
                amount,
                TransactionType::Expense,
                date!(2025 - 10 - 05),
            )
            .description("Lunch"),
            &connection,
        );

        match result {
            Ok(transaction) => {
                assert_eq!(transaction.amount, amount);
                assert_eq!(transaction.transaction_type, TransactionType::Expense);
                assert_eq!(transaction.description, "Lunch");
            }
            Err(error) => panic!("Unexpected error: {error}"),
        }
    }

    #[test]
    fn create_fails_on_invalid_category_id() {
        let (connection, user_id) = get_test_connection();
        let category_id = Some(42);

        let result = create_transaction(
            TransactionBuilder::new(
                user_id,
                123.45,
                TransactionType::Expense,
                date!(2025 - 10 - 04),
            )
            .category_id(category_id),
            &connection,
        );

        assert_eq!(result, Err(Error::InvalidCategory(category_id)));
    }

    #[test]
    fn create_fails_on_someone_elses_category() {
        let (connection, user_id) = get_test_connection();
        let other_user = create_user(
            Email::new_unchecked("other@bar.baz"),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();
        let category = create_category(
            other_user.id,
            CategoryName::new_unchecked("Groceries"),
            CategoryKind::VariableExpense,
            &connection,
        )
        .unwrap();

        let result = create_transaction(
            TransactionBuilder::new(
                user_id,
                123.45,
                TransactionType::Expense,
                date!(2025 - 10 - 04),
            )
            .category_id(Some(category.id)),
            &connection,
        );

        assert_eq!(result, Err(Error::InvalidCategory(Some(category.id))));
    }

    #[test]
    fn fixed_flag_is_cleared_for_income() {
        let (connection, user_id) = get_test_connection();

        let transaction = create_transaction(
            TransactionBuilder::new(
                user_id,
                5000.0,
                TransactionType::Income,
                date!(2025 - 10 - 01),
            )
            .is_fixed(true),
            &connection,
        )
        .unwrap();

        assert!(!transaction.is_fixed);
    }

    #[test]
    fn get_transaction_is_scoped_to_user() {
        let (connection, user_id) = get_test_connection();
        let other_user = create_user(
            Email::new_unchecked("other@bar.baz"),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();
        let transaction = create_transaction(
            TransactionBuilder::new(
                user_id,
                12.3,
                TransactionType::Expense,
                date!(2025 - 10 - 05),
            ),
            &connection,
        )
        .unwrap();

        assert_eq!(
            get_transaction(transaction.id, user_id, &connection),
            Ok(transaction.clone())
        );
        assert_eq!(
            get_transaction(transaction.id, other_user.id, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn update_replaces_fields() {
        let (connection, user_id) = get_test_connection();
        let transaction = create_transaction(
            TransactionBuilder::new(
                user_id,
                12.3,
                TransactionType::Expense,
                date!(2025 - 10 - 05),
            ),
            &connection,
        )
        .unwrap();

        update_transaction(
            transaction.id,
            TransactionBuilder::new(
                user_id,
                45.6,
                TransactionType::Investment,
                date!(2025 - 10 - 06),
            )
            .description("Index fund"),
            &connection,
        )
        .unwrap();

        let updated = get_transaction(transaction.id, user_id, &connection).unwrap();
        assert_eq!(updated.amount, 45.6);
        assert_eq!(updated.transaction_type, TransactionType::Investment);
        assert_eq!(updated.date, date!(2025 - 10 - 06));
        assert_eq!(updated.description, "Index fund");
    }

    #[test]
    fn update_missing_transaction_fails() {
        let (connection, user_id) = get_test_connection();

        let result = update_transaction(
            999,
            TransactionBuilder::new(
                user_id,
                45.6,
                TransactionType::Expense,
                date!(2025 - 10 - 06),
            ),
            &connection,
        );

        assert_eq!(result, Err(Error::UpdateMissingTransaction));
    }

    #[test]
    fn delete_removes_row() {
        let (connection, user_id) = get_test_connection();
        let transaction = create_transaction(
            TransactionBuilder::new(
                user_id,
                12.3,
                TransactionType::Expense,
                date!(2025 - 10 - 05),
            ),
            &connection,
        )
        .unwrap();

        let rows_affected = delete_transaction(transaction.id, user_id, &connection).unwrap();

        assert_eq!(rows_affected, 1);
        assert_eq!(
            get_transaction(transaction.id, user_id, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_is_scoped_to_user() {
        let (connection, user_id) = get_test_connection();
        let other_user = create_user(
            Email::new_unchecked("other@bar.baz"),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();
        let transaction = create_transaction(
            TransactionBuilder::new(
                user_id,
                12.3,
                TransactionType::Expense,
                date!(2025 - 10 - 05),
            ),
            &connection,
        )
        .unwrap();

        let rows_affected =
            delete_transaction(transaction.id, other_user.id, &connection).unwrap();

        assert_eq!(rows_affected, 0);
        assert!(get_transaction(transaction.id, user_id, &connection).is_ok());
    }

    #[test]
    fn date_range_query_filters_and_sorts() {
        let (connection, user_id) = get_test_connection();
        for (amount, date) in [
            (1.0, date!(2025 - 06 - 01)),
            (2.0, date!(2025 - 06 - 15)),
            (3.0, date!(2025 - 07 - 01)),
        ] {
            create_transaction(
                TransactionBuilder::new(user_id, amount, TransactionType::Expense, date),
                &connection,
            )
            .unwrap();
        }

        let transactions = get_transactions_in_date_range(
            user_id,
            date!(2025 - 06 - 01),
            date!(2025 - 06 - 30),
            &connection,
        )
        .unwrap();

        let amounts: Vec<_> = transactions.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![2.0, 1.0]);
    }
}
