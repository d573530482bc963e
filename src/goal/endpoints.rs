//! Endpoints for creating, toggling and deleting monthly goals.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    audit::{AuditAction, EntityKind, record_audit_event},
    auth::UserID,
    endpoints,
    goal::{GoalId, create_goal, toggle_goal},
};

use super::core::delete_goal;

/// The state needed for the goal endpoints.
#[derive(Debug, Clone)]
pub struct GoalEndpointState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GoalEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating a goal.
#[derive(Debug, Deserialize)]
pub struct GoalForm {
    /// The calendar month (1-12) the goal belongs to.
    pub month: u8,
    /// The calendar year the goal belongs to.
    pub year: i32,
    /// What the goal is.
    pub name: String,
    /// The amount of money the goal aims for.
    pub target_amount: f64,
}

/// A route handler for creating a goal, redirects to the dashboard on success.
pub async fn create_goal_endpoint(
    State(state): State<GoalEndpointState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<GoalForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_goal(
        user_id,
        form.month,
        form.year,
        &form.name,
        form.target_amount,
        &connection,
    ) {
        Ok(goal) => {
            record_audit_event(
                user_id,
                AuditAction::Created,
                EntityKind::Goal,
                goal.id,
                &connection,
            );

            (
                HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => error.into_alert_response(),
    }
}

/// A route handler for toggling a goal's completion flag.
pub async fn toggle_goal_endpoint(
    State(state): State<GoalEndpointState>,
    Extension(user_id): Extension<UserID>,
    Path(goal_id): Path<GoalId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match toggle_goal(goal_id, user_id, &connection) {
        Ok(()) => {
            record_audit_event(
                user_id,
                AuditAction::Updated,
                EntityKind::Goal,
                goal_id,
                &connection,
            );

            (
                HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => error.into_alert_response(),
    }
}

/// A route handler for deleting a goal.
///
/// On success an empty fragment is returned so HTMX removes the list item.
pub async fn delete_goal_endpoint(
    State(state): State<GoalEndpointState>,
    Extension(user_id): Extension<UserID>,
    Path(goal_id): Path<GoalId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_goal(goal_id, user_id, &connection) {
        Ok(()) => {
            record_audit_event(
                user_id,
                AuditAction::Deleted,
                EntityKind::Goal,
                goal_id,
                &connection,
            );

            Html("").into_response()
        }
        Err(error) => error.into_alert_response(),
    }
}

#[cfg(test)]
mod goal_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use axum_extra::extract::Form;
    use rusqlite::Connection;

    use crate::{
        auth::{Email, PasswordHash, UserID, create_user},
        db::initialize,
        goal::get_goals_for_month,
    };

    use super::{GoalEndpointState, GoalForm, create_goal_endpoint, toggle_goal_endpoint};

    fn get_test_state() -> (GoalEndpointState, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(
            Email::new_unchecked("foo@bar.baz"),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        (
            GoalEndpointState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn create_goal_and_toggle_it() {
        let (state, user_id) = get_test_state();

        let form = GoalForm {
            month: 6,
            year: 2025,
            name: "Save for the trip".to_owned(),
            target_amount: 500.0,
        };
        let response = create_goal_endpoint(State(state.clone()), Extension(user_id), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let goal_id = {
            let connection = state.db_connection.lock().unwrap();
            let goals = get_goals_for_month(user_id, 6, 2025, &connection).unwrap();
            assert_eq!(goals.len(), 1);
            goals[0].id
        };

        toggle_goal_endpoint(State(state.clone()), Extension(user_id), Path(goal_id))
            .await
            .into_response();

        let connection = state.db_connection.lock().unwrap();
        let goals = get_goals_for_month(user_id, 6, 2025, &connection).unwrap();
        assert!(goals[0].is_completed);
    }

    #[tokio::test]
    async fn create_goal_with_empty_name_fails() {
        let (state, user_id) = get_test_state();

        let form = GoalForm {
            month: 6,
            year: 2025,
            name: "".to_owned(),
            target_amount: 500.0,
        };
        let response = create_goal_endpoint(State(state.clone()), Extension(user_id), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let connection = state.db_connection.lock().unwrap();
        assert!(get_goals_for_month(user_id, 6, 2025, &connection)
            .unwrap()
            .is_empty());
    }
}
