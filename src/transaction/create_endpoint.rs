//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::IntoResponse,
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of failing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    audit::{AuditAction, EntityKind, record_audit_event},
    auth::UserID,
    card::CardId,
    category::CategoryId,
    endpoints,
    timezone::get_local_date,
    transaction::{TransactionBuilder, TransactionType, core::create_transaction},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating or editing a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// The value of the transaction in dollars.
    pub amount: f64,
    /// Whether the transaction is income, an expense or an investment.
    pub type_: TransactionType,
    /// The date when the transaction occurred.
    pub date: Date,
    /// Text detailing the transaction.
    #[serde(default)]
    pub description: String,
    /// Set when the fixed-expense checkbox is ticked.
    #[serde(default)]
    pub is_fixed: Option<String>,
    /// The ID of the category to attach.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// The ID of the card to attach.
    #[serde(default)]
    pub card_id: Option<CardId>,
}

impl TransactionForm {
    /// Convert the form into a builder for `user_id`.
    pub(super) fn into_builder(self, user_id: UserID) -> TransactionBuilder {
        TransactionBuilder::new(user_id, self.amount, self.type_, self.date)
            .description(&self.description)
            .is_fixed(self.is_fixed.is_some())
            .category_id(self.category_id)
            .card_id(self.card_id)
    }
}

/// A route handler for creating a new transaction, redirects to transactions view on success.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<TransactionForm>,
) -> impl IntoResponse {
    let today = match get_local_date(&state.local_timezone) {
        Some(today) => today,
        None => {
            return Error::InvalidTimezoneError(state.local_timezone.clone()).into_alert_response();
        }
    };

    if form.date > today {
        return Error::FutureDate(form.date).into_alert_response();
    }

    let builder = form.into_builder(user_id);
    let connection = state.db_connection.lock().unwrap();

    match create_transaction(builder, &connection) {
        Ok(transaction) => {
            record_audit_event(
                user_id,
                AuditAction::Created,
                EntityKind::Transaction,
                transaction.id,
                &connection,
            );

            (
                HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => error.into_alert_response(),
    }
}
