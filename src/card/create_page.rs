//! Renders the page for creating a card.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};
use time::Date;

use crate::{
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        dollar_input_styles,
    },
    navigation::NavBar,
};

/// The shared name, limit and invoice-date fields for the card forms.
pub(super) fn card_form_fields(
    name: &str,
    credit_limit: Option<f64>,
    last_invoice_date: Option<Date>,
) -> Markup {
    let limit_str = credit_limit.map(|limit| format!("{limit:.2}"));

    html! {
        div
        {
            label for="name" class=(FORM_LABEL_STYLE) { "Card Name" }

            input
                id="name"
                type="text"
                name="name"
                placeholder="e.g. Visa Gold"
                value=(name)
                required
                autofocus
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="credit_limit" class=(FORM_LABEL_STYLE) { "Credit limit (optional)" }

            div class="input-wrapper w-full"
            {
                input
                    id="credit_limit"
                    type="number"
                    name="credit_limit"
                    step="0.01"
                    min="0"
                    value=[limit_str.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        div
        {
            label for="last_invoice_date" class=(FORM_LABEL_STYLE) { "Last invoice date (optional)" }

            input
                id="last_invoice_date"
                type="date"
                name="last_invoice_date"
                value=[last_invoice_date.map(|date| date.to_string())]
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}

/// Render the card creation page.
pub async fn get_new_card_page() -> Response {
    let nav_bar = NavBar::new(endpoints::NEW_CARD_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::CARDS_API)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                (card_form_fields("", None, None))

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Card" }
            }
        }
    };

    base("New Card", &[dollar_input_styles()], &content).into_response()
}

#[cfg(test)]
mod new_card_page_tests {
    use axum::http::StatusCode;

    use crate::{
        endpoints,
        test_utils::{
            assert_form_input, assert_form_submit_button, assert_hx_endpoint, assert_valid_html,
            must_get_form, parse_html_document,
        },
    };

    use super::get_new_card_page;

    #[tokio::test]
    async fn render_page() {
        let response = get_new_card_page().await;

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::CARDS_API, "hx-post");
        assert_form_input(&form, "name", "text");
        assert_form_input(&form, "credit_limit", "number");
        assert_form_input(&form, "last_invoice_date", "date");
        assert_form_submit_button(&form);
    }
}
