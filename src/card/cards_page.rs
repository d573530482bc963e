//! The page listing the user's cards.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    card::{Card, get_all_cards, get_card_invoice},
    endpoints,
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, edit_delete_action_links, format_currency,
    },
    month::month_date_range,
    navigation::NavBar,
    timezone::get_local_date,
};

/// The state needed for the cards page.
#[derive(Debug, Clone)]
pub struct CardsPageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for reading cards.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CardsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A card with its computed invoice for the current month.
#[derive(Debug, Clone)]
struct CardWithInvoice {
    card: Card,
    current_invoice: f64,
}

/// Display the user's cards with their limits and current invoices.
pub async fn get_cards_page(
    State(state): State<CardsPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let today = get_local_date(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;
    let (start, end) = month_date_range(today.year(), today.month());

    let cards = get_all_cards(user_id, &connection)?;
    let cards_with_invoices = cards
        .into_iter()
        .map(|card| {
            let current_invoice = get_card_invoice(card.id, user_id, start, end, &connection)?;

            Ok(CardWithInvoice {
                card,
                current_invoice,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    Ok(cards_view(&cards_with_invoices).into_response())
}

fn cards_view(cards: &[CardWithInvoice]) -> Markup {
    let nav_bar = NavBar::new(endpoints::CARDS_VIEW).into_html();

    let table_row = |card_with_invoice: &CardWithInvoice| {
        let card = &card_with_invoice.card;
        let edit_url = endpoints::format_endpoint(endpoints::EDIT_CARD_VIEW, card.id);
        let delete_url = endpoints::format_endpoint(endpoints::CARD, card.id);
        let confirm_message = format!(
            "Are you sure you want to delete '{}'? Transactions keep existing but lose the card.",
            card.name
        );

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE) { (card.name) }

                td class={ (TABLE_CELL_STYLE) " text-right" }
                {
                    @if let Some(credit_limit) = card.credit_limit {
                        (format_currency(credit_limit))
                    } @else {
                        "—"
                    }
                }

                td class={ (TABLE_CELL_STYLE) " text-right" }
                {
                    (format_currency(card_with_invoice.current_invoice))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    @if let Some(last_invoice_date) = card.last_invoice_date {
                        (last_invoice_date)
                    } @else {
                        "—"
                    }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (edit_delete_action_links(&edit_url, &delete_url, &confirm_message))
                }
            }
        )
    };

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full flex items-center justify-between mb-4"
            {
                h1 class="text-2xl font-bold" { "Cards" }

                a href=(endpoints::NEW_CARD_VIEW) class=(LINK_STYLE) { "New card" }
            }

            @if cards.is_empty() {
                p class="text-gray-500 dark:text-gray-400" { "No cards yet." }
            } @else {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                            th scope="col" class={ (TABLE_CELL_STYLE) " text-right" } { "Limit" }
                            th scope="col" class={ (TABLE_CELL_STYLE) " text-right" } { "Current invoice" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Last invoice" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        }
                    }

                    tbody
                    {
                        @for card in cards {
                            (table_row(card))
                        }
                    }
                }
            }
        }
    };

    base("Cards", &[], &content)
}

#[cfg(test)]
mod cards_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use scraper::Selector;
    use time::OffsetDateTime;

    use crate::{
        auth::{Email, PasswordHash, UserID, create_user},
        card::create_card,
        db::initialize,
        test_utils::{assert_valid_html, parse_html_document},
        transaction::{TransactionBuilder, TransactionType, create_transaction},
    };

    use super::{CardsPageState, get_cards_page};

    fn get_test_state() -> (CardsPageState, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(
            Email::new_unchecked("foo@bar.baz"),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        (
            CardsPageState {
                local_timezone: "Etc/UTC".to_owned(),
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn page_lists_cards_with_invoices() {
        let (state, user_id) = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            let card = create_card(user_id, "Visa Gold", Some(5000.0), None, &connection).unwrap();
            create_transaction(
                TransactionBuilder::new(
                    user_id,
                    123.45,
                    TransactionType::Expense,
                    OffsetDateTime::now_utc().date(),
                )
                .card_id(Some(card.id)),
                &connection,
            )
            .unwrap();
        }

        let response = get_cards_page(State(state), Extension(user_id)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("Visa Gold"));
        assert!(text.contains("$5,000.00"));
        assert!(text.contains("$123.45"));
    }

    #[tokio::test]
    async fn page_with_no_cards_shows_placeholder() {
        let (state, user_id) = get_test_state();

        let response = get_cards_page(State(state), Extension(user_id)).await.unwrap();

        let html = parse_html_document(response).await;
        let selector = Selector::parse("table").unwrap();
        assert_eq!(html.select(&selector).count(), 0);

        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("No cards yet."));
    }
}
