//! Defines the core card model and database queries.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, auth::UserID};

/// Database identifier for a card.
pub type CardId = i64;

/// A credit card that expenses can be attached to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// The ID of the card.
    pub id: CardId,
    /// The user the card belongs to.
    pub user_id: UserID,
    /// The display name of the card.
    pub name: String,
    /// The credit limit in dollars, if the user recorded one.
    pub credit_limit: Option<f64>,
    /// When the last invoice was issued, if the user recorded it.
    pub last_invoice_date: Option<Date>,
}

/// Create the card table and indexes.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_card_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS card (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            credit_limit REAL,
            last_invoice_date TEXT,
            UNIQUE(user_id, name),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_card_user ON card(user_id);",
    )?;

    Ok(())
}

/// Create a card and return it with its generated ID.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateCardName] if the user already has a card named `name`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_card(
    user_id: UserID,
    name: &str,
    credit_limit: Option<f64>,
    last_invoice_date: Option<Date>,
    connection: &Connection,
) -> Result<Card, Error> {
    connection
        .execute(
            "INSERT INTO card (user_id, name, credit_limit, last_invoice_date)
             VALUES (?1, ?2, ?3, ?4)",
            (user_id.as_i64(), name, credit_limit, last_invoice_date),
        )
        .map_err(|error| map_duplicate_name(error, name))?;

    let id = connection.last_insert_rowid();

    Ok(Card {
        id,
        user_id,
        name: name.to_owned(),
        credit_limit,
        last_invoice_date,
    })
}

/// Retrieve a single card by ID, scoped to `user_id`.
pub fn get_card(card_id: CardId, user_id: UserID, connection: &Connection) -> Result<Card, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, credit_limit, last_invoice_date FROM card
             WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(&[(":id", &card_id), (":user_id", &user_id.as_i64())], map_row)
        .map_err(|error| error.into())
}

/// Retrieve all of a user's cards ordered alphabetically by name.
pub fn get_all_cards(user_id: UserID, connection: &Connection) -> Result<Vec<Card>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, credit_limit, last_invoice_date FROM card
             WHERE user_id = :user_id ORDER BY name ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row)?
        .map(|maybe_card| maybe_card.map_err(|error| error.into()))
        .collect()
}

/// Check that `card_id` refers to one of the user's cards.
pub fn card_exists(card_id: CardId, user_id: UserID, connection: &Connection) -> Result<bool, Error> {
    let count: i64 = connection.query_row(
        "SELECT COUNT(1) FROM card WHERE id = ?1 AND user_id = ?2",
        (card_id, user_id.as_i64()),
        |row| row.get(0),
    )?;

    Ok(count > 0)
}

/// Sum the expenses attached to `card_id` with a date in `[start, end]`.
///
/// This is the card's invoice for the period; cards themselves do not store
/// a balance.
pub fn get_card_invoice(
    card_id: CardId,
    user_id: UserID,
    start: Date,
    end: Date,
    connection: &Connection,
) -> Result<f64, Error> {
    let total = connection.query_row(
        "SELECT COALESCE(SUM(amount), 0) FROM \"transaction\"
         WHERE card_id = ?1 AND user_id = ?2 AND type = 'expense' AND date >= ?3 AND date <= ?4",
        (card_id, user_id.as_i64(), start, end),
        |row| row.get(0),
    )?;

    Ok(total)
}

/// Update a card's name, limit and last invoice date.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingCard] if `card_id` does not refer to one of the user's cards,
/// - [Error::DuplicateCardName] if the user already has another card named `name`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_card(
    card_id: CardId,
    user_id: UserID,
    name: &str,
    credit_limit: Option<f64>,
    last_invoice_date: Option<Date>,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection
        .execute(
            "UPDATE card SET name = ?1, credit_limit = ?2, last_invoice_date = ?3
             WHERE id = ?4 AND user_id = ?5",
            (name, credit_limit, last_invoice_date, card_id, user_id.as_i64()),
        )
        .map_err(|error| map_duplicate_name(error, name))?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingCard);
    }

    Ok(())
}

/// Delete a card by ID. Returns an error if the card doesn't exist.
///
/// Transactions that used the card keep existing but lose the link.
pub fn delete_card(card_id: CardId, user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM card WHERE id = ?1 AND user_id = ?2",
        (card_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCard);
    }

    Ok(())
}

fn map_duplicate_name(error: rusqlite::Error, name: &str) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
            if sql_error.extended_code == 2067 && desc.contains("card.") =>
        {
            Error::DuplicateCardName(name.to_owned())
        }
        error => error.into(),
    }
}

fn map_row(row: &Row) -> Result<Card, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_user_id = row.get(1)?;
    let name = row.get(2)?;
    let credit_limit = row.get(3)?;
    let last_invoice_date = row.get(4)?;

    Ok(Card {
        id,
        user_id: UserID::new(raw_user_id),
        name,
        credit_limit,
        last_invoice_date,
    })
}
