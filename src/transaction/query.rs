//! Filtered queries backing the transactions page and the CSV export.

use rusqlite::{Connection, Row, ToSql, params_from_iter};
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    auth::UserID,
    card::CardId,
    category::CategoryId,
    database_id::TransactionId,
    transaction::TransactionType,
};

/// The filters a user can apply to their transaction list.
///
/// All fields are optional and combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TransactionFilter {
    /// Only transactions in this calendar month (1-12).
    pub month: Option<u8>,
    /// Only transactions in this year.
    pub year: Option<i32>,
    /// Only transactions of this type.
    #[serde(rename = "type_")]
    pub transaction_type: Option<TransactionType>,
    /// Only transactions with this category.
    pub category_id: Option<CategoryId>,
    /// Only transactions paid with this card.
    pub card_id: Option<CardId>,
    /// Only fixed (true) or variable (false) expenses.
    pub is_fixed: Option<bool>,
}

impl TransactionFilter {
    /// Build the WHERE clause conditions and parameters for this filter.
    ///
    /// The returned SQL starts with the user scope condition, so it is never
    /// empty.
    fn to_conditions(&self, user_id: UserID) -> (String, Vec<Box<dyn ToSql>>) {
        let mut conditions: Vec<String> = vec!["t.user_id = ?".to_owned()];
        let mut params: Vec<Box<dyn ToSql>> = vec![Box::new(user_id.as_i64())];

        if let Some(year) = self.year {
            conditions.push("strftime('%Y', t.date) = ?".to_owned());
            params.push(Box::new(format!("{year:04}")));
        }

        if let Some(month) = self.month {
            conditions.push("strftime('%m', t.date) = ?".to_owned());
            params.push(Box::new(format!("{month:02}")));
        }

        if let Some(transaction_type) = self.transaction_type {
            conditions.push("t.type = ?".to_owned());
            params.push(Box::new(transaction_type.as_str()));
        }

        if let Some(category_id) = self.category_id {
            conditions.push("t.category_id = ?".to_owned());
            params.push(Box::new(category_id));
        }

        if let Some(card_id) = self.card_id {
            conditions.push("t.card_id = ?".to_owned());
            params.push(Box::new(card_id));
        }

        if let Some(is_fixed) = self.is_fixed {
            conditions.push("t.is_fixed = ?".to_owned());
            params.push(Box::new(is_fixed));
        }

        (conditions.join(" AND "), params)
    }
}

/// A transaction joined with its category and card names for display.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRow {
    /// The ID of the transaction.
    pub id: TransactionId,
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
    /// The name of the transaction's category, if it has one.
    pub category_name: Option<String>,
    /// The name of the card the expense was paid with, if any.
    pub card_name: Option<String>,
}

/// Count the transactions matching `filter`.
pub fn count_matching_transactions(
    user_id: UserID,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<u64, Error> {
    let (conditions, params) = filter.to_conditions(user_id);
    let sql = format!("SELECT COUNT(1) FROM \"transaction\" t WHERE {conditions}");

    let count: i64 = connection
        .prepare(&sql)?
        .query_row(params_from_iter(params.iter().map(|p| p.as_ref())), |row| {
            row.get(0)
        })?;

    Ok(count as u64)
}

/// Get one page of transactions matching `filter`, newest first, joined with
/// category and card names.
pub fn get_matching_transactions(
    user_id: UserID,
    filter: &TransactionFilter,
    limit: Option<u64>,
    offset: u64,
    connection: &Connection,
) -> Result<Vec<TransactionRow>, Error> {
    let (conditions, mut params) = filter.to_conditions(user_id);

    let mut sql = format!(
        "SELECT t.id, t.amount, t.type, t.date, t.description, t.is_fixed, c.name, k.name
         FROM \"transaction\" t
         LEFT JOIN category c ON c.id = t.category_id
         LEFT JOIN card k ON k.id = t.card_id
         WHERE {conditions}
         ORDER BY t.date DESC, t.id DESC"
    );

    if let Some(limit) = limit {
        sql.push_str(" LIMIT ? OFFSET ?");
        params.push(Box::new(limit as i64));
        params.push(Box::new(offset as i64));
    }

    connection
        .prepare(&sql)?
        .query_map(params_from_iter(params.iter().map(|p| p.as_ref())), map_row)?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}

fn map_row(row: &Row) -> Result<TransactionRow, rusqlite::Error> {
    let id = row.get(0)?;
    let amount = row.get(1)?;
    let raw_type: String = row.get(2)?;
    let date = row.get(3)?;
    let description = row.get(4)?;
    let is_fixed = row.get(5)?;
    let category_name = row.get(6)?;
    let card_name = row.get(7)?;

    let transaction_type = raw_type.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown transaction type {raw_type}").into(),
        )
    })?;

    Ok(TransactionRow {
        id,
        amount,
        transaction_type,
        date,
        description,
        is_fixed,
        category_name,
        card_name,
    })
}

#[cfg(test)]
mod filter_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        auth::{Email, PasswordHash, UserID, create_user},
        card::create_card,
        category::{CategoryKind, CategoryName, create_category},
        db::initialize,
        transaction::{TransactionBuilder, TransactionType, create_transaction},
    };

    use super::{TransactionFilter, count_matching_transactions, get_matching_transactions};

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

    fn seed_transactions(connection: &Connection, user_id: UserID) {
        let category = create_category(
            user_id,
            CategoryName::new_unchecked("Groceries"),
            CategoryKind::VariableExpense,
            connection,
        )
        .unwrap();
        let card = create_card(user_id, "Visa", None, None, connection).unwrap();

        create_transaction(
            TransactionBuilder::new(
                user_id,
                100.0,
                TransactionType::Expense,
                date!(2025 - 06 - 10),
            )
            .description("Supermarket")
            .category_id(Some(category.id))
            .card_id(Some(card.id)),
            connection,
        )
        .unwrap();

        create_transaction(
            TransactionBuilder::new(
                user_id,
                1200.0,
                TransactionType::Expense,
                date!(2025 - 06 - 01),
            )
            .description("Rent")
            .is_fixed(true),
            connection,
        )
        .unwrap();

        create_transaction(
            TransactionBuilder::new(
                user_id,
                5000.0,
                TransactionType::Income,
                date!(2025 - 07 - 01),
            )
            .description("Salary"),
            connection,
        )
        .unwrap();
    }

    #[test]
    fn empty_filter_matches_everything() {
        let (connection, user_id) = get_test_connection();
        seed_transactions(&connection, user_id);

        let count =
            count_matching_transactions(user_id, &TransactionFilter::default(), &connection)
                .unwrap();

        assert_eq!(count, 3);
    }

    #[test]
    fn month_and_year_filter() {
        let (connection, user_id) = get_test_connection();
        seed_transactions(&connection, user_id);

        let filter = TransactionFilter {
            month: Some(6),
            year: Some(2025),
            ..Default::default()
        };
        let rows = get_matching_transactions(user_id, &filter, None, 0, &connection).unwrap();

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.date.month() as u8 == 6));
    }

    #[test]
    fn type_filter() {
        let (connection, user_id) = get_test_connection();
        seed_transactions(&connection, user_id);

        let filter = TransactionFilter {
            transaction_type: Some(TransactionType::Income),
            ..Default::default()
        };
        let rows = get_matching_transactions(user_id, &filter, None, 0, &connection).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].description, "Salary");
    }

    #[test]
    fn fixed_filter() {
        let (connection, user_id) = get_test_connection();
        seed_transactions(&connection, user_id);

        let filter = TransactionFilter {
            is_fixed: Some(true),
            ..Default::default()
        };
        let rows = get_matching_transactions(user_id, &filter, None, 0, &connection).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].description, "Rent");
    }

    #[test]
    fn rows_include_joined_names() {
        let (connection, user_id) = get_test_connection();
        seed_transactions(&connection, user_id);

        let filter = TransactionFilter {
            category_id: Some(1),
            ..Default::default()
        };
        let rows = get_matching_transactions(user_id, &filter, None, 0, &connection).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category_name.as_deref(), Some("Groceries"));
        assert_eq!(rows[0].card_name.as_deref(), Some("Visa"));
    }

    #[test]
    fn pagination_limits_rows() {
        let (connection, user_id) = get_test_connection();
        seed_transactions(&connection, user_id);

        let rows =
            get_matching_transactions(user_id, &TransactionFilter::default(), Some(2), 0, &connection)
                .unwrap();
        assert_eq!(rows.len(), 2);

        let next_page =
            get_matching_transactions(user_id, &TransactionFilter::default(), Some(2), 2, &connection)
                .unwrap();
        assert_eq!(next_page.len(), 1);
    }

    #[test]
    fn results_are_scoped_to_user() {
        let (connection, user_id) = get_test_connection();
        seed_transactions(&connection, user_id);
        let other_user = create_user(
            Email::new_unchecked("other@bar.baz"),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        let count =
            count_matching_transactions(other_user.id, &TransactionFilter::default(), &connection)
                .unwrap();

        assert_eq!(count, 0);
    }
}
