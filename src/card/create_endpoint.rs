//! Defines the endpoint for creating a new card.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    audit::{AuditAction, EntityKind, record_audit_event},
    auth::UserID,
    card::create_card,
    endpoints,
};

/// The state needed to create a card.
#[derive(Debug, Clone)]
pub struct CreateCardState {
    /// The database connection for managing cards.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating or editing a card.
#[derive(Debug, Deserialize)]
pub struct CardForm {
    /// The display name of the card.
    pub name: String,
    /// The credit limit in dollars, if recorded.
    #[serde(default)]
    pub credit_limit: Option<f64>,
    /// When the last invoice was issued, if recorded.
    #[serde(default)]
    pub last_invoice_date: Option<Date>,
}

/// A route handler for creating a new card, redirects to the cards view on success.
pub async fn create_card_endpoint(
    State(state): State<CreateCardState>,
    Extension(user_id): Extension<UserID>,
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

    match create_card(
        user_id,
        form.name.trim(),
        form.credit_limit,
        form.last_invoice_date,
        &connection,
    ) {
        Ok(card) => {
            record_audit_event(
                user_id,
                AuditAction::Created,
                EntityKind::Card,
                card.id,
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
