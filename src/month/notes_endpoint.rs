//! Defines the endpoint for saving a month's notes.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    audit::{AuditAction, EntityKind, record_audit_event},
    auth::UserID,
    endpoints,
    month::{parse_month, settings::get_monthly_settings, update_notes},
};

/// The state needed to save a month's notes.
#[derive(Debug, Clone)]
pub struct MonthNotesState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for MonthNotesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for saving a month's notes.
#[derive(Debug, Deserialize)]
pub struct MonthNotesForm {
    /// The calendar year the notes belong to.
    pub year: i32,
    /// The notes text.
    #[serde(default)]
    pub notes: String,
}

/// A route handler for saving a month's notes, redirects back to the month
/// page on success.
pub async fn update_month_notes_endpoint(
    State(state): State<MonthNotesState>,
    Extension(user_id): Extension<UserID>,
    Path(month_number): Path<u8>,
    Form(form): Form<MonthNotesForm>,
) -> Response {
    if let Err(error) = parse_month(month_number) {
        return error.into_alert_response();
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_notes(user_id, month_number, form.year, &form.notes, &connection) {
        Ok(()) => {
            if let Ok(settings) = get_monthly_settings(user_id, month_number, form.year, &connection)
            {
                record_audit_event(
                    user_id,
                    AuditAction::Updated,
                    EntityKind::MonthlySettings,
                    settings.id,
                    &connection,
                );
            }

            let month_url = format!(
                "{}?year={}",
                endpoints::format_endpoint(endpoints::MONTH_VIEW, month_number as i64),
                form.year
            );

            (HxRedirect(month_url), StatusCode::SEE_OTHER).into_response()
        }
        Err(error) => error.into_alert_response(),
    }
}
