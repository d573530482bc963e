//! Defines the endpoint for deleting a card.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{Html, IntoResponse},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    audit::{AuditAction, EntityKind, record_audit_event},
    auth::UserID,
    card::CardId,
};

use super::core::delete_card;

/// The state needed to delete a card.
#[derive(Debug, Clone)]
pub struct DeleteCardState {
    /// The database connection for managing cards.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteCardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a card.
///
/// On success an empty fragment is returned so HTMX removes the table row.
/// Transactions that used the card keep existing but lose the link.
pub async fn delete_card_endpoint(
    State(state): State<DeleteCardState>,
    Extension(user_id): Extension<UserID>,
    Path(card_id): Path<CardId>,
) -> impl IntoResponse {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_card(card_id, user_id, &connection) {
        Ok(()) => {
            record_audit_event(
                user_id,
                AuditAction::Deleted,
                EntityKind::Card,
                card_id,
                &connection,
            );

            // The status code has to be 200 OK or HTMX will not delete the table row.
            Html("").into_response()
        }
        Err(error) => error.into_alert_response(),
    }
}

#[cfg(test)]
mod delete_card_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;

    use crate::{
        Error,
        auth::{Email, PasswordHash, UserID, create_user},
        card::{create_card, get_card},
        db::initialize,
    };

    use super::{DeleteCardState, delete_card_endpoint};

    fn get_test_state() -> (DeleteCardState, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(
            Email::new_unchecked("foo@bar.baz"),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        (
            DeleteCardState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn deletes_card() {
        let (state, user_id) = get_test_state();
        let card = {
            let connection = state.db_connection.lock().unwrap();
            create_card(user_id, "Visa Gold", None, None, &connection).unwrap()
        };

        let response = delete_card_endpoint(State(state.clone()), Extension(user_id), Path(card.id))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            get_card(card.id, user_id, &connection),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn delete_missing_card_returns_not_found() {
        let (state, user_id) = get_test_state();

        let response = delete_card_endpoint(State(state), Extension(user_id), Path(999))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
