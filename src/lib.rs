//! Moneta is a web app for tracking personal finances month by month.
//!
//! Users record income, expenses and investments, group them into categories
//! and credit cards, and get per-month summaries: totals, a configurable
//! 50/20/30-style budget rule, and a qualitative "thermometer" status.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use time::Date;
use tokio::signal;

mod alert;
mod app_state;
mod audit;
mod auth;
mod card;
mod category;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod goal;
mod html;
mod internal_server_error;
mod logging;
mod month;
mod navigation;
mod not_found;
mod pagination;
mod preferences;
mod routing;
mod settings_page;
#[cfg(test)]
mod test_utils;
mod timezone;
mod transaction;

pub use app_state::AppState;
pub use auth::{
    Email, PasswordHash, User, UserID, ValidatedPassword, get_user_by_email, update_user_password,
};
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use pagination::PaginationConfig;
pub use routing::build_router;

use crate::{
    alert::alert_error, card::CardId, category::CategoryId,
    internal_server_error::render_internal_server_error, not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid combination of email and password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The email address used to register is not a valid email address.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// The email address used to register already belongs to a user.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// Either the user ID or expiry cookie is missing from the cookie jar in
    /// the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// There was an error parsing the date in the cookie or creating the new
    /// expiry date time.
    ///
    /// Callers should pass in the original error as a string and the date
    /// string that caused the error.
    #[error("could not format expiry cookie date-time string \"{1}\": {0}")]
    InvalidDateFormat(String, String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The category ID used on a transaction did not match one of the user's
    /// categories.
    #[error("the category ID does not refer to one of your categories")]
    InvalidCategory(Option<CategoryId>),

    /// The card ID used on a transaction did not match one of the user's
    /// cards.
    #[error("the card ID does not refer to one of your cards")]
    InvalidCard(Option<CardId>),

    /// An empty string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// An empty string was used to create a card name.
    #[error("Card name cannot be empty")]
    EmptyCardName,

    /// An empty string was used to create a monthly goal.
    #[error("Goal name cannot be empty")]
    EmptyGoalName,

    /// A date in the future was used to create a transaction.
    ///
    /// Transactions record events that have already happened, therefore future
    /// dates are not allowed.
    #[error("{0} is a date in the future, which is not allowed")]
    FutureDate(Date),

    /// A month number outside 1-12 was used in a request.
    #[error("{0} is not a valid month number")]
    InvalidMonth(u8),

    /// The budget percentages on a month's settings do not sum to 100.
    #[error("budget percentages must sum to 100, got {0}")]
    InvalidPercentages(u16),

    /// The specified card name already exists for this user.
    #[error("the card \"{0}\" already exists")]
    DuplicateCardName(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while writing the CSV export.
    #[error("could not write CSV export: {0}")]
    ExportError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a card that does not exist
    #[error("tried to delete a card that is not in the database")]
    DeleteMissingCard,

    /// Tried to update a card that does not exist
    #[error("tried to update a card that is not in the database")]
    UpdateMissingCard,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// Tried to update a category that does not exist
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// Tried to delete a monthly goal that does not exist
    #[error("tried to delete a goal that is not in the database")]
    DeleteMissingGoal,

    /// Tried to update a monthly goal that does not exist
    #[error("tried to update a goal that is not in the database")]
    UpdateMissingGoal,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            // Invalid month numbers in URLs get the same treatment as any
            // other nonexistent page.
            Error::InvalidMonth(_) => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => render_internal_server_error(
                "Invalid Timezone Settings",
                &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            ),
            Error::DatabaseLockError => render_internal_server_error(
                "Sorry, something went wrong.",
                "Try again later or check the server logs",
            ),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                render_internal_server_error(
                    "Sorry, something went wrong.",
                    "Try again later or check the server logs",
                )
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            Error::InvalidTimezoneError(timezone) => alert_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Invalid Timezone Settings",
                &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            ),
            Error::FutureDate(date) => alert_error(
                StatusCode::BAD_REQUEST,
                "Invalid transaction date",
                &format!("{date} is a date in the future, which is not allowed."),
            ),
            Error::InvalidCategory(category_id) => alert_error(
                StatusCode::BAD_REQUEST,
                "Invalid category",
                &format!("Could not find a category with the ID {category_id:?}"),
            ),
            Error::InvalidCard(card_id) => alert_error(
                StatusCode::BAD_REQUEST,
                "Invalid card",
                &format!("Could not find a card with the ID {card_id:?}"),
            ),
            error @ (Error::EmptyCategoryName | Error::EmptyCardName | Error::EmptyGoalName) => {
                alert_error(StatusCode::BAD_REQUEST, "Invalid name", &error.to_string())
            }
            Error::InvalidMonth(month) => alert_error(
                StatusCode::BAD_REQUEST,
                "Invalid month",
                &format!("{month} is not a valid month number, expected 1-12."),
            ),
            Error::InvalidPercentages(total) => alert_error(
                StatusCode::BAD_REQUEST,
                "Invalid budget percentages",
                &format!("The percentages must add up to 100%, but they add up to {total}%."),
            ),
            Error::DuplicateCardName(name) => alert_error(
                StatusCode::BAD_REQUEST,
                "Duplicate Card Name",
                &format!(
                    "The card {name} already exists. Choose a different card name, \
                    or edit or delete the existing card.",
                ),
            ),
            Error::UpdateMissingTransaction => alert_error(
                StatusCode::NOT_FOUND,
                "Could not update transaction",
                "The transaction could not be found.",
            ),
            Error::DeleteMissingTransaction => alert_error(
                StatusCode::NOT_FOUND,
                "Could not delete transaction",
                "The transaction could not be found. \
                Try refreshing the page to see if the transaction has already been deleted.",
            ),
            Error::UpdateMissingCard => alert_error(
                StatusCode::NOT_FOUND,
                "Could not update card",
                "The card could not be found.",
            ),
            Error::DeleteMissingCard => alert_error(
                StatusCode::NOT_FOUND,
                "Could not delete card",
                "The card could not be found. \
                Try refreshing the page to see if the card has already been deleted.",
            ),
            Error::UpdateMissingCategory => alert_error(
                StatusCode::NOT_FOUND,
                "Could not update category",
                "The category could not be found.",
            ),
            Error::DeleteMissingCategory => alert_error(
                StatusCode::NOT_FOUND,
                "Could not delete category",
                "The category could not be found. \
                Try refreshing the page to see if the category has already been deleted.",
            ),
            Error::UpdateMissingGoal => alert_error(
                StatusCode::NOT_FOUND,
                "Could not update goal",
                "The goal could not be found.",
            ),
            Error::DeleteMissingGoal => alert_error(
                StatusCode::NOT_FOUND,
                "Could not delete goal",
                "The goal could not be found. \
                Try refreshing the page to see if the goal has already been deleted.",
            ),
            _ => alert_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong",
                "An unexpected error occurred, check the server logs for more details.",
            ),
        }
    }
}
