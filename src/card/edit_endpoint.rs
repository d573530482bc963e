//! Defines the endpoint for updating an existing card.

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
    card::{CardForm, CardId},
    endpoints,
};

use super::core::update_card;

/// The state needed to update a card.
#[derive(Debug, Clone)]
pub struct UpdateCardState {
    /// The database connection for managing cards.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateCardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for updating a card, redirects to the cards view on success.
pub async fn update_card_endpoint(
    State(state): State<UpdateCardState>,
    Extension(user_id): Extension<UserID>,
    Path(card_id): Path<CardId>,
    Form(form): Form<CardForm>,
) -> impl IntoResponse {
    if form.name.trim().is_empty() {
        return Error::EmptyCardName.into_alert_response();
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_card(
        card_id,
        user_id,
        form.name.trim(),
        form.credit_limit,
        form.last_invoice_date,
        &connection,
    ) {
        Ok(()) => {
            record_audit_event(
                user_id,
                AuditAction::Updated,
                EntityKind::Card,
                card_id,
                &connection,
            );

            (
                HxRedirect(endpoints::CARDS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => error.into_alert_response(),
    }
}
