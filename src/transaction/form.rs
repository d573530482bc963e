//! The shared form fields for creating and editing transactions.

use maud::{Markup, html};
use time::Date;

use crate::{
    card::Card,
    category::Category,
    html::{
        FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE,
    },
    transaction::TransactionType,
};

pub(super) struct TransactionFormDefaults<'a> {
    pub transaction_type: TransactionType,
    pub amount: Option<f64>,
    pub date: Date,
    pub description: Option<&'a str>,
    pub is_fixed: bool,
    pub category_id: Option<i64>,
    pub card_id: Option<i64>,
    pub max_date: Date,
}

pub(super) fn transaction_form_fields(
    defaults: &TransactionFormDefaults<'_>,
    available_categories: &[Category],
    available_cards: &[Card],
) -> Markup {
    let amount_str = defaults.amount.map(|amount| format!("{:.2}", amount.abs()));
    let description_placeholder = defaults.description.unwrap_or("Description");

    html! {
        fieldset class="space-y-2"
        {
            legend class=(FORM_LABEL_STYLE) { "Transaction type" }

            div class=(FORM_RADIO_GROUP_STYLE)
            {
                @for transaction_type in TransactionType::ALL {
                    @let id = format!("transaction-type-{}", transaction_type.as_str());

                    div class="flex items-center gap-3"
                    {
                        input
                            name="type_"
                            id=(id)
                            type="radio"
                            value=(transaction_type.as_str())
                            checked[transaction_type == defaults.transaction_type]
                            required
                            tabindex="0"
                            class=(FORM_RADIO_INPUT_STYLE);

                        label
                            for=(id)
                            class=(FORM_RADIO_LABEL_STYLE)
                        {
                            (transaction_type.label())
                        }
                    }
                }
            }
        }

        div
        {
            label
                for="amount"
                class=(FORM_LABEL_STYLE)
            {
                "Amount"
            }

            div class="input-wrapper w-full"
            {
                input
                    name="amount"
                    id="amount"
                    type="number"
                    step="0.01"
                    placeholder="0.01"
                    min="0.01"
                    required
                    value=[amount_str.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        div
        {
            label
                for="date"
                class=(FORM_LABEL_STYLE)
            {
                "Date"
            }

            input
                name="date"
                id="date"
                type="date"
                max=(defaults.max_date)
                value=(defaults.date)
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label
                for="description"
                class=(FORM_LABEL_STYLE)
            {
                "Description"
            }

            input
                name="description"
                id="description"
                type="text"
                placeholder=(description_placeholder)
                value=[defaults.description]
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div class="flex items-center gap-x-3"
        {
            input
                type="checkbox"
                name="is_fixed"
                id="is_fixed"
                checked[defaults.is_fixed]
                tabindex="0"
                class="rounded-xs";

            label
                for="is_fixed"
                class="block text-sm font-medium text-gray-900 dark:text-white"
            {
                "Fixed expense (recurs every month)"
            }
        }

        @if !available_categories.is_empty() {
            div
            {
                label
                    for="category_id"
                    class=(FORM_LABEL_STYLE)
                {
                    "Category"
                }

                select
                    name="category_id"
                    id="category_id"
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "Select a category" }

                    @for category in available_categories {
                        @if Some(category.id) == defaults.category_id {
                            option value=(category.id) selected { (category.name) }
                        } @else {
                            option value=(category.id) { (category.name) }
                        }
                    }
                }
            }
        }

        @if !available_cards.is_empty() {
            div
            {
                label
                    for="card_id"
                    class=(FORM_LABEL_STYLE)
                {
                    "Card (expenses only)"
                }

                select
                    name="card_id"
                    id="card_id"
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "No card" }

                    @for card in available_cards {
                        @if Some(card.id) == defaults.card_id {
                            option value=(card.id) selected { (card.name) }
                        } @else {
                            option value=(card.id) { (card.name) }
                        }
                    }
                }
            }
        }
    }
}
