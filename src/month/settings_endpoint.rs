//! Defines the endpoint for saving a month's budget-rule settings.

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
    month::{parse_month, update_monthly_settings},
};

/// The state needed to save a month's settings.
#[derive(Debug, Clone)]
pub struct MonthSettingsState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for MonthSettingsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for saving a month's budget rule.
#[derive(Debug, Deserialize)]
pub struct MonthSettingsForm {
    /// The calendar year the settings belong to.
    pub year: i32,
    /// The income the budget rule is calculated against.
    pub base_income: f64,
    /// The percentage of income budgeted for needs.
    pub needs_percent: u8,
    /// The percentage of income budgeted for wants.
    pub wants_percent: u8,
    /// The percentage of income budgeted for savings.
    pub savings_percent: u8,
    /// The percentage of income budgeted for investments.
    pub investment_percent: u8,
}

/// A route handler for saving a month's budget-rule settings.
///
/// The percentages must sum to exactly 100, otherwise an error alert is
/// returned and nothing is saved.
pub async fn update_month_settings_endpoint(
    State(state): State<MonthSettingsState>,
    Extension(user_id): Extension<UserID>,
    Path(month_number): Path<u8>,
    Form(form): Form<MonthSettingsForm>,
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

    match update_monthly_settings(
        user_id,
        month_number,
        form.year,
        form.base_income,
        form.needs_percent,
        form.wants_percent,
        form.savings_percent,
        form.investment_percent,
        &connection,
    ) {
        Ok(settings) => {
            record_audit_event(
                user_id,
                AuditAction::Updated,
                EntityKind::MonthlySettings,
                settings.id,
                &connection,
            );

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

#[cfg(test)]
mod settings_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Form,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;

    use crate::{
        Error,
        auth::{Email, PasswordHash, UserID, create_user},
        db::initialize,
        month::settings::get_monthly_settings,
    };

    use super::{MonthSettingsForm, MonthSettingsState, update_month_settings_endpoint};

    fn get_test_state() -> (MonthSettingsState, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(
            Email::new_unchecked("foo@bar.baz"),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        (
            MonthSettingsState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn valid_percentages_are_saved() {
        let (state, user_id) = get_test_state();

        let form = MonthSettingsForm {
            year: 2025,
            base_income: 3200.0,
            needs_percent: 40,
            wants_percent: 25,
            savings_percent: 25,
            investment_percent: 10,
        };
        let response = update_month_settings_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(6),
            Form(form),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let connection = state.db_connection.lock().unwrap();
        let settings = get_monthly_settings(user_id, 6, 2025, &connection).unwrap();
        assert_eq!(settings.base_income, 3200.0);
        assert_eq!(settings.needs_percent, 40);
        assert_eq!(settings.investment_percent, 10);
    }

    #[tokio::test]
    async fn percentages_must_sum_to_100() {
        let (state, user_id) = get_test_state();

        let form = MonthSettingsForm {
            year: 2025,
            base_income: 3200.0,
            needs_percent: 50,
            wants_percent: 30,
            savings_percent: 30,
            investment_percent: 0,
        };
        let response = update_month_settings_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(6),
            Form(form),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            get_monthly_settings(user_id, 6, 2025, &connection),
            Err(Error::NotFound)
        );
    }
}
