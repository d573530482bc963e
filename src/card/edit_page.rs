//! Renders the page for editing a card.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    card::{CardId, create_page::card_form_fields, get_card},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, dollar_input_styles},
    navigation::NavBar,
};

/// The state needed for the edit card page.
#[derive(Debug, Clone)]
pub struct EditCardPageState {
    /// The database connection for reading cards.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditCardPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for editing a card.
pub async fn get_edit_card_page(
    State(state): State<EditCardPageState>,
    Extension(user_id): Extension<UserID>,
    Path(card_id): Path<CardId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let card = get_card(card_id, user_id, &connection)?;

    let nav_bar = NavBar::new(endpoints::CARDS_VIEW).into_html();
    let update_url = endpoints::format_endpoint(endpoints::CARD, card.id);

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-put=(update_url)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                (card_form_fields(&card.name, card.credit_limit, card.last_invoice_date))

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Card" }
            }
        }
    };

    Ok(base("Edit Card", &[dollar_input_styles()], &content).into_response())
}

#[cfg(test)]
mod edit_card_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;

    use crate::{
        Error,
        auth::{Email, PasswordHash, UserID, create_user},
        card::create_card,
        db::initialize,
        test_utils::{assert_valid_html, must_get_form, parse_html_document},
    };

    use super::{EditCardPageState, get_edit_card_page};

    fn get_test_state() -> (EditCardPageState, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(
            Email::new_unchecked("foo@bar.baz"),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        (
            EditCardPageState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn edit_page_prefills_name() {
        let (state, user_id) = get_test_state();
        let card = {
            let connection = state.db_connection.lock().unwrap();
            create_card(user_id, "Visa Gold", None, None, &connection).unwrap()
        };

        let response = get_edit_card_page(State(state), Extension(user_id), Path(card.id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        let name_input = form
            .select(&scraper::Selector::parse("input[name=name]").unwrap())
            .next()
            .expect("name input missing");
        assert_eq!(name_input.value().attr("value"), Some("Visa Gold"));
    }

    #[tokio::test]
    async fn edit_page_returns_not_found_for_missing_card() {
        let (state, user_id) = get_test_state();

        let result = get_edit_card_page(State(state), Extension(user_id), Path(999)).await;

        assert_eq!(result.err(), Some(Error::NotFound));
    }
}
