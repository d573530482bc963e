//! Defines the endpoint for saving the user's preferences.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    preferences::{Currency, Preferences, Theme, save_preferences},
};

/// The state needed to save preferences.
#[derive(Debug, Clone)]
pub struct PreferencesState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for PreferencesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for saving preferences.
#[derive(Debug, Deserialize)]
pub struct PreferencesForm {
    /// The currency amounts are displayed in.
    pub currency: Currency,
    /// The year that month pages default to.
    pub default_year: i32,
    /// The UI color theme.
    pub theme: Theme,
}

/// A route handler for saving the user's preferences, redirects back to the
/// settings page on success.
pub async fn update_preferences_endpoint(
    State(state): State<PreferencesState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<PreferencesForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let preferences = Preferences {
        user_id,
        currency: form.currency,
        default_year: form.default_year,
        theme: form.theme,
    };

    match save_preferences(&preferences, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::SETTINGS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => error.into_alert_response(),
    }
}
