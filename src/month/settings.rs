//! Per-month settings: base income, budget percentages and notes.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, auth::UserID, database_id::DatabaseId};

/// The default base income for a month that has no settings yet.
pub const DEFAULT_BASE_INCOME: f64 = 2000.0;

/// The default needs/wants/savings/investment percentages (the 50/20/30 rule).
pub const DEFAULT_PERCENTAGES: (u8, u8, u8, u8) = (50, 20, 30, 0);

/// The settings of one calendar month for one user.
///
/// A row is created on demand, with defaults, the first time a month is
/// visited. There is at most one row per (user, month, year).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySettings {
    /// The ID of the settings row.
    pub id: DatabaseId,
    /// The user the settings belong to.
    pub user_id: UserID,
    /// The calendar month (1-12).
    pub month: u8,
    /// The calendar year.
    pub year: i32,
    /// The income the budget rule is calculated against.
    pub base_income: f64,
    /// The percentage of income budgeted for needs (fixed expenses).
    pub needs_percent: u8,
    /// The percentage of income budgeted for wants (variable expenses).
    pub wants_percent: u8,
    /// The percentage of income budgeted for savings.
    pub savings_percent: u8,
    /// The percentage of income budgeted for investments.
    pub investment_percent: u8,
    /// Free-form notes for the month.
    pub notes: String,
}

/// Create the monthly settings table.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_monthly_settings_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS monthly_settings (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            month INTEGER NOT NULL,
            year INTEGER NOT NULL,
            base_income REAL NOT NULL,
            needs_percent INTEGER NOT NULL,
            wants_percent INTEGER NOT NULL,
            savings_percent INTEGER NOT NULL,
            investment_percent INTEGER NOT NULL,
            notes TEXT NOT NULL DEFAULT '',
            UNIQUE(user_id, month, year),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
            )",
        (),
    )?;

    Ok(())
}

/// Get the settings for a month, creating a row with the default 50/20/30
/// percentages if the month has none yet.
///
/// Creation is idempotent: two concurrent calls both end up reading the same
/// row thanks to the (user, month, year) unique constraint.
pub fn get_or_create_monthly_settings(
    user_id: UserID,
    month: u8,
    year: i32,
    connection: &Connection,
) -> Result<MonthlySettings, Error> {
    let (needs, wants, savings, investment) = DEFAULT_PERCENTAGES;

    connection.execute(
        "INSERT OR IGNORE INTO monthly_settings
            (user_id, month, year, base_income, needs_percent, wants_percent, savings_percent, investment_percent)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        (
            user_id.as_i64(),
            month,
            year,
            DEFAULT_BASE_INCOME,
            needs,
            wants,
            savings,
            investment,
        ),
    )?;

    get_monthly_settings(user_id, month, year, connection)
}

/// Get the settings for a month.
///
/// # Errors
///
/// Returns an [Error::NotFound] if the month has no settings row yet.
pub fn get_monthly_settings(
    user_id: UserID,
    month: u8,
    year: i32,
    connection: &Connection,
) -> Result<MonthlySettings, Error> {
    connection
        .prepare(
            "SELECT id, user_id, month, year, base_income, needs_percent, wants_percent,
                    savings_percent, investment_percent, notes
             FROM monthly_settings
             WHERE user_id = ?1 AND month = ?2 AND year = ?3",
        )?
        .query_row((user_id.as_i64(), month, year), map_row)
        .map_err(|error| error.into())
}

/// Check that the four budget percentages sum to exactly 100.
fn validate_percentages(needs: u8, wants: u8, savings: u8, investment: u8) -> Result<(), Error> {
    let total = needs as u16 + wants as u16 + savings as u16 + investment as u16;

    if total != 100 {
        return Err(Error::InvalidPercentages(total));
    }

    Ok(())
}

/// Replace a month's base income and budget percentages, creating the
/// settings row first if the month has none.
///
/// # Errors
///
/// Returns an [Error::InvalidPercentages] if the percentages do not sum to 100.
pub fn update_monthly_settings(
    user_id: UserID,
    month: u8,
    year: i32,
    base_income: f64,
    needs_percent: u8,
    wants_percent: u8,
    savings_percent: u8,
    investment_percent: u8,
    connection: &Connection,
) -> Result<MonthlySettings, Error> {
    validate_percentages(needs_percent, wants_percent, savings_percent, investment_percent)?;

    let settings = get_or_create_monthly_settings(user_id, month, year, connection)?;

    connection.execute(
        "UPDATE monthly_settings
         SET base_income = ?1, needs_percent = ?2, wants_percent = ?3,
             savings_percent = ?4, investment_percent = ?5
         WHERE id = ?6",
        (
            base_income,
            needs_percent,
            wants_percent,
            savings_percent,
            investment_percent,
            settings.id,
        ),
    )?;

    Ok(MonthlySettings {
        base_income,
        needs_percent,
        wants_percent,
        savings_percent,
        investment_percent,
        ..settings
    })
}

/// Replace a month's notes, creating the settings row first if the month has
/// none.
pub fn update_notes(
    user_id: UserID,
    month: u8,
    year: i32,
    notes: &str,
    connection: &Connection,
) -> Result<(), Error> {
    let settings = get_or_create_monthly_settings(user_id, month, year, connection)?;

    connection.execute(
        "UPDATE monthly_settings SET notes = ?1 WHERE id = ?2",
        (notes, settings.id),
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<MonthlySettings, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_user_id = row.get(1)?;
    let month = row.get(2)?;
    let year = row.get(3)?;
    let base_income = row.get(4)?;
    let needs_percent = row.get(5)?;
    let wants_percent = row.get(6)?;
    let savings_percent = row.get(7)?;
    let investment_percent = row.get(8)?;
    let notes = row.get(9)?;

    Ok(MonthlySettings {
        id,
        user_id: UserID::new(raw_user_id),
        month,
        year,
        base_income,
        needs_percent,
        wants_percent,
        savings_percent,
        investment_percent,
        notes,
    })
}
