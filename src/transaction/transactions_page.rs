//! The page listing all of a user's transactions with filters and pagination.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::UserID,
    card::{Card, get_all_cards},
    category::{Category, get_all_categories},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, CATEGORY_BADGE_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, edit_delete_action_links, format_currency, truncate_text,
    },
    navigation::NavBar,
    pagination::{PaginationConfig, PaginationIndicator, create_pagination_indicators},
    transaction::{
        TransactionFilter, TransactionRow, TransactionType,
        query::{count_matching_transactions, get_matching_transactions},
    },
};

/// The longest a description is rendered in the table before truncation.
const MAX_DESCRIPTION_GRAPHEMES: usize = 40;

/// Names of the months, indexed by month number minus one.
const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsPageState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The config that controls how to display pages of data.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The query parameters accepted by the transactions page.
///
/// The filter fields are spelled out instead of flattening a
/// [TransactionFilter] because `#[serde(flatten)]` does not compose with
/// typed query-string deserialization.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionsPageQuery {
    /// Only transactions in this calendar month (1-12).
    pub month: Option<u8>,
    /// Only transactions in this year.
    pub year: Option<i32>,
    /// Only transactions of this type.
    pub type_: Option<TransactionType>,
    /// Only transactions with this category.
    pub category_id: Option<i64>,
    /// Only transactions paid with this card.
    pub card_id: Option<i64>,
    /// Only fixed (true) or variable (false) expenses.
    pub is_fixed: Option<bool>,
    /// The page of results to display.
    pub page: Option<u64>,
}

impl TransactionsPageQuery {
    fn into_filter(self) -> (TransactionFilter, Option<u64>) {
        (
            TransactionFilter {
                month: self.month,
                year: self.year,
                transaction_type: self.type_,
                category_id: self.category_id,
                card_id: self.card_id,
                is_fixed: self.is_fixed,
            },
            self.page,
        )
    }
}

/// Display a filterable, paginated table of the user's transactions.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<TransactionsPageQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let (filter, page) = query.into_filter();
    let page_size = state.pagination_config.default_page_size;
    let curr_page = page.unwrap_or(state.pagination_config.default_page).max(1);

    let transaction_count = count_matching_transactions(user_id, &filter, &connection)?;
    let page_count = transaction_count.div_ceil(page_size).max(1);
    let curr_page = curr_page.min(page_count);

    let rows = get_matching_transactions(
        user_id,
        &filter,
        Some(page_size),
        (curr_page - 1) * page_size,
        &connection,
    )?;

    let categories = get_all_categories(user_id, &connection)?;
    let cards = get_all_cards(user_id, &connection)?;

    let indicators =
        create_pagination_indicators(curr_page, page_count, state.pagination_config.max_pages);

    Ok(transactions_view(&filter, &rows, &categories, &cards, &indicators).into_response())
}

/// Serialize `filter` (plus an optional page) back into a query string.
fn filter_query_string(filter: &TransactionFilter, page: Option<u64>) -> String {
    let mut pairs: Vec<(&str, String)> = Vec::new();

    if let Some(month) = filter.month {
        pairs.push(("month", month.to_string()));
    }
    if let Some(year) = filter.year {
        pairs.push(("year", year.to_string()));
    }
    if let Some(transaction_type) = filter.transaction_type {
        pairs.push(("type_", transaction_type.as_str().to_owned()));
    }
    if let Some(category_id) = filter.category_id {
        pairs.push(("category_id", category_id.to_string()));
    }
    if let Some(card_id) = filter.card_id {
        pairs.push(("card_id", card_id.to_string()));
    }
    if let Some(is_fixed) = filter.is_fixed {
        pairs.push(("is_fixed", is_fixed.to_string()));
    }
    if let Some(page) = page {
        pairs.push(("page", page.to_string()));
    }

    serde_urlencoded::to_string(&pairs).unwrap_or_default()
}

fn filter_form(filter: &TransactionFilter, categories: &[Category], cards: &[Card]) -> Markup {
    let select_style = FORM_TEXT_INPUT_STYLE;

    html! {
        form
            method="get"
            action=(endpoints::TRANSACTIONS_VIEW)
            class="w-full grid grid-cols-2 lg:grid-cols-7 gap-3 items-end mb-6"
        {
            div
            {
                label for="month" class=(FORM_LABEL_STYLE) { "Month" }

                select name="month" id="month" class=(select_style)
                {
                    option value="" { "All" }

                    @for (index, name) in MONTH_NAMES.iter().enumerate() {
                        @let number = index as u8 + 1;

                        @if Some(number) == filter.month {
                            option value=(number) selected { (name) }
                        } @else {
                            option value=(number) { (name) }
                        }
                    }
                }
            }

            div
            {
                label for="year" class=(FORM_LABEL_STYLE) { "Year" }

                input
                    name="year"
                    id="year"
                    type="number"
                    min="2000"
                    max="2100"
                    value=[filter.year]
                    class=(select_style);
            }

            div
            {
                label for="type_" class=(FORM_LABEL_STYLE) { "Type" }

                select name="type_" id="type_" class=(select_style)
                {
                    option value="" { "All" }

                    @for transaction_type in TransactionType::ALL {
                        @if Some(transaction_type) == filter.transaction_type {
                            option value=(transaction_type.as_str()) selected { (transaction_type.label()) }
                        } @else {
                            option value=(transaction_type.as_str()) { (transaction_type.label()) }
                        }
                    }
                }
            }

            div
            {
                label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }

                select name="category_id" id="category_id" class=(select_style)
                {
                    option value="" { "All" }

                    @for category in categories {
                        @if Some(category.id) == filter.category_id {
                            option value=(category.id) selected { (category.name) }
                        } @else {
                            option value=(category.id) { (category.name) }
                        }
                    }
                }
            }

            div
            {
                label for="card_id" class=(FORM_LABEL_STYLE) { "Card" }

                select name="card_id" id="card_id" class=(select_style)
                {
                    option value="" { "All" }

                    @for card in cards {
                        @if Some(card.id) == filter.card_id {
                            option value=(card.id) selected { (card.name) }
                        } @else {
                            option value=(card.id) { (card.name) }
                        }
                    }
                }
            }

            div
            {
                label for="is_fixed" class=(FORM_LABEL_STYLE) { "Fixed" }

                select name="is_fixed" id="is_fixed" class=(select_style)
                {
                    option value="" { "All" }

                    @if filter.is_fixed == Some(true) {
                        option value="true" selected { "Fixed" }
                    } @else {
                        option value="true" { "Fixed" }
                    }

                    @if filter.is_fixed == Some(false) {
                        option value="false" selected { "Variable" }
                    } @else {
                        option value="false" { "Variable" }
                    }
                }
            }

            div class="flex gap-2"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Apply" }

                a
                    href=(endpoints::TRANSACTIONS_VIEW)
                    class="w-full px-4 py-2 text-center border border-gray-300 dark:border-gray-600 rounded"
                {
                    "Clear"
                }
            }
        }
    }
}

fn transaction_table_row(row: &TransactionRow) -> Markup {
    let edit_url = endpoints::format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, row.id);
    let delete_url = endpoints::format_endpoint(endpoints::TRANSACTION, row.id);
    let amount_class = match row.transaction_type {
        TransactionType::Income => "text-green-600 dark:text-green-400",
        TransactionType::Expense => "text-red-600 dark:text-red-400",
        TransactionType::Investment => "text-blue-600 dark:text-blue-400",
    };

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (row.date) }

            td class=(TABLE_CELL_STYLE)
            {
                (truncate_text(&row.description, MAX_DESCRIPTION_GRAPHEMES))
            }

            td class=(TABLE_CELL_STYLE)
            {
                @if let Some(category_name) = &row.category_name {
                    span class=(CATEGORY_BADGE_STYLE) { (category_name) }
                }
            }

            td class=(TABLE_CELL_STYLE)
            {
                @if let Some(card_name) = &row.card_name {
                    (card_name)
                }
            }

            td class=(TABLE_CELL_STYLE)
            {
                (row.transaction_type.label())

                @if row.is_fixed {
                    " (fixed)"
                }
            }

            td class={ (TABLE_CELL_STYLE) " text-right " (amount_class) }
            {
                (format_currency(row.amount))
            }

            td class=(TABLE_CELL_STYLE)
            {
                (edit_delete_action_links(
                    &edit_url,
                    &delete_url,
                    "Are you sure you want to delete this transaction?",
                ))
            }
        }
    }
}

fn pagination_view(filter: &TransactionFilter, indicators: &[PaginationIndicator]) -> Markup {
    let page_url = |page: u64| {
        format!(
            "{}?{}",
            endpoints::TRANSACTIONS_VIEW,
            filter_query_string(filter, Some(page))
        )
    };

    html! {
        nav class="flex gap-2 mt-4" aria-label="Pagination"
        {
            @for indicator in indicators {
                @match indicator {
                    PaginationIndicator::BackButton(page) => {
                        a href=(page_url(*page)) class=(LINK_STYLE) { "Previous" }
                    }
                    PaginationIndicator::NextButton(page) => {
                        a href=(page_url(*page)) class=(LINK_STYLE) { "Next" }
                    }
                    PaginationIndicator::Page(page) => {
                        a href=(page_url(*page)) class=(LINK_STYLE) { (page) }
                    }
                    PaginationIndicator::CurrPage(page) => {
                        span class="font-bold" { (page) }
                    }
                    PaginationIndicator::Ellipsis => {
                        span { "…" }
                    }
                }
            }
        }
    }
}

fn transactions_view(
    filter: &TransactionFilter,
    rows: &[TransactionRow],
    categories: &[Category],
    cards: &[Card],
    indicators: &[PaginationIndicator],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let export_url = format!(
        "{}?{}",
        endpoints::EXPORT_TRANSACTIONS,
        filter_query_string(filter, None)
    );

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full flex items-center justify-between mb-4"
            {
                h1 class="text-2xl font-bold" { "Transactions" }

                div class="flex gap-4"
                {
                    a href=(export_url) class=(LINK_STYLE) { "Export CSV" }
                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE) { "New transaction" }
                }
            }

            (filter_form(filter, categories, cards))

            @if rows.is_empty() {
                p class="text-gray-500 dark:text-gray-400" { "No transactions match the current filters." }
            } @else {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Card" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                            th scope="col" class={ (TABLE_CELL_STYLE) " text-right" } { "Amount" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        }
                    }

                    tbody
                    {
                        @for row in rows {
                            (transaction_table_row(row))
                        }
                    }
                }

                (pagination_view(filter, indicators))
            }
        }
    };

    base("Transactions", &[], &content)
}

#[cfg(test)]
mod transactions_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use axum_extra::extract::Query;
    use rusqlite::Connection;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        auth::{Email, PasswordHash, UserID, create_user},
        db::initialize,
        pagination::PaginationConfig,
        test_utils::{assert_valid_html, parse_html_document},
        transaction::{TransactionBuilder, TransactionType, create_transaction},
    };

    use super::{TransactionsPageQuery, TransactionsPageState, get_transactions_page};

    fn get_test_state() -> (TransactionsPageState, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(
            Email::new_unchecked("foo@bar.baz"),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        (
            TransactionsPageState {
                db_connection: Arc::new(Mutex::new(connection)),
                pagination_config: PaginationConfig::default(),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn page_lists_transactions() {
        let (state, user_id) = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            for amount in [1.0, 2.0, 3.0] {
                create_transaction(
                    TransactionBuilder::new(
                        user_id,
                        amount,
                        TransactionType::Expense,
                        date!(2025 - 06 - 10),
                    ),
                    &connection,
                )
                .unwrap();
            }
        }

        let response = get_transactions_page(
            State(state),
            Extension(user_id),
            Query(TransactionsPageQuery::default()),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let selector = Selector::parse("tbody tr").unwrap();
        assert_eq!(html.select(&selector).count(), 3);
    }

    #[tokio::test]
    async fn page_with_no_transactions_shows_placeholder() {
        let (state, user_id) = get_test_state();

        let response = get_transactions_page(
            State(state),
            Extension(user_id),
            Query(TransactionsPageQuery::default()),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("No transactions match the current filters."));
    }

    #[tokio::test]
    async fn filter_excludes_other_months() {
        let (state, user_id) = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                TransactionBuilder::new(
                    user_id,
                    1.0,
                    TransactionType::Expense,
                    date!(2025 - 06 - 10),
                ),
                &connection,
            )
            .unwrap();
            create_transaction(
                TransactionBuilder::new(
                    user_id,
                    2.0,
                    TransactionType::Expense,
                    date!(2025 - 07 - 10),
                ),
                &connection,
            )
            .unwrap();
        }

        let query = TransactionsPageQuery {
            month: Some(6),
            year: Some(2025),
            ..Default::default()
        };
        let response = get_transactions_page(State(state), Extension(user_id), Query(query))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        let selector = Selector::parse("tbody tr").unwrap();
        assert_eq!(html.select(&selector).count(), 1);
    }
}
