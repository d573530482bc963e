//! CSV export of the user's transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    transaction::{TransactionFilter, TransactionRow, query::get_matching_transactions},
};

/// The state needed to export transactions.
#[derive(Debug, Clone)]
pub struct ExportTransactionsState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExportTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that returns the user's transactions as a CSV download.
///
/// The same filters as the transactions page apply, so the user downloads
/// what they are currently looking at.
pub async fn export_transactions_endpoint(
    State(state): State<ExportTransactionsState>,
    Extension(user_id): Extension<UserID>,
    Query(filter): Query<TransactionFilter>,
) -> Result<Response, Error> {
    let rows = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        get_matching_transactions(user_id, &filter, None, 0, &connection)?
    };

    let csv_bytes = write_csv(&rows)?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"transactions.csv\"",
            ),
        ],
        csv_bytes,
    )
        .into_response())
}

fn write_csv(rows: &[TransactionRow]) -> Result<Vec<u8>, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record([
            "date",
            "type",
            "description",
            "category",
            "card",
            "fixed",
            "amount",
        ])
        .map_err(|error| Error::ExportError(error.to_string()))?;

    for row in rows {
        writer
            .write_record([
                row.date.to_string(),
                row.transaction_type.as_str().to_owned(),
                row.description.clone(),
                row.category_name.clone().unwrap_or_default(),
                row.card_name.clone().unwrap_or_default(),
                row.is_fixed.to_string(),
                format!("{:.2}", row.amount),
            ])
            .map_err(|error| Error::ExportError(error.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|error| Error::ExportError(error.to_string()))
}
