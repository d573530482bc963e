//! Storage for per-user preferences.
//!
//! Each user has at most one preferences row; saving upserts it.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, auth::UserID};

/// The currency amounts are displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Brazilian real.
    Brl,
    /// United States dollar.
    Usd,
    /// Euro.
    Eur,
}

impl Currency {
    /// All supported currencies, in display order.
    pub const ALL: [Currency; 3] = [Currency::Brl, Currency::Usd, Currency::Eur];

    /// The ISO 4217 code stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Brl => "BRL",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }

    /// The human readable name shown in the UI.
    pub fn label(&self) -> &'static str {
        match self {
            Currency::Brl => "BRL - Brazilian Real",
            Currency::Usd => "USD - US Dollar",
            Currency::Eur => "EUR - Euro",
        }
    }
}

impl FromStr for Currency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BRL" => Ok(Currency::Brl),
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            _ => Err(Error::NotFound),
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The UI color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light backgrounds.
    Light,
    /// Dark backgrounds.
    Dark,
}

impl Theme {
    /// The identifier stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// The human readable name shown in the UI.
    pub fn label(&self) -> &'static str {
        match self {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
        }
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(Error::NotFound),
        }
    }
}

/// A user's display preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// The user the preferences belong to.
    pub user_id: UserID,
    /// The currency amounts are displayed in.
    pub currency: Currency,
    /// The year that month pages default to.
    pub default_year: i32,
    /// The UI color theme.
    pub theme: Theme,
}

impl Preferences {
    /// The preferences used before the user has saved any.
    pub fn default_for(user_id: UserID, current_year: i32) -> Self {
        Self {
            user_id,
            currency: Currency::Brl,
            default_year: current_year,
            theme: Theme::Light,
        }
    }
}

/// Create the preferences table.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_preferences_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS preferences (
                user_id INTEGER PRIMARY KEY,
                currency TEXT NOT NULL,
                default_year INTEGER NOT NULL,
                theme TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Get a user's saved preferences, or `None` if they never saved any.
pub fn get_preferences(
    user_id: UserID,
    connection: &Connection,
) -> Result<Option<Preferences>, Error> {
    let result = connection
        .prepare(
            "SELECT user_id, currency, default_year, theme FROM preferences WHERE user_id = :user_id",
        )?
        .query_row(&[(":user_id", &user_id.as_i64())], map_row);

    match result {
        Ok(preferences) => Ok(Some(preferences)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(error) => Err(error.into()),
    }
}

/// Save a user's preferences, replacing any previously saved row.
pub fn save_preferences(preferences: &Preferences, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO preferences (user_id, currency, default_year, theme)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(user_id) DO UPDATE
         SET currency = excluded.currency,
             default_year = excluded.default_year,
             theme = excluded.theme",
        (
            preferences.user_id.as_i64(),
            preferences.currency.as_str(),
            preferences.default_year,
            preferences.theme.as_str(),
        ),
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Preferences, rusqlite::Error> {
    let raw_user_id = row.get(0)?;
    let raw_currency: String = row.get(1)?;
    let default_year = row.get(2)?;
    let raw_theme: String = row.get(3)?;

    let currency = raw_currency.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            rusqlite::types::Type::Text,
            format!("unknown currency {raw_currency}").into(),
        )
    })?;
    let theme = raw_theme.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unknown theme {raw_theme}").into(),
        )
    })?;

    Ok(Preferences {
        user_id: UserID::new(raw_user_id),
        currency,
        default_year,
        theme,
    })
}
