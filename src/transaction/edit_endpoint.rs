//! Defines the endpoint for updating an existing transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    audit::{AuditAction, EntityKind, record_audit_event},
    auth::UserID,
    database_id::TransactionId,
    endpoints,
    timezone::get_local_date,
    transaction::{core::update_transaction, create_endpoint::TransactionForm},
};

/// The state needed to update a transaction.
#[derive(Debug, Clone)]
pub struct UpdateTransactionState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for updating a transaction, redirects to transactions view on success.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn update_transaction_endpoint(
    State(state): State<UpdateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
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

    match update_transaction(transaction_id, builder, &connection) {
        Ok(()) => {
            record_audit_event(
                user_id,
                AuditAction::Updated,
                EntityKind::Transaction,
                transaction_id,
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
