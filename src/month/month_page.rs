//! The detail page for a single month.
//!
//! Shows the month's overview totals, budget-rule summary, thermometer,
//! notes, audit log, and the month's transactions split into income, fixed
//! expenses, variable expenses and investments.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Month;

use crate::{
    AppState, Error,
    audit::{AuditEntry, get_audit_log_for_range},
    auth::UserID,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, PANEL_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, dollar_input_styles, edit_delete_action_links, format_currency,
    },
    month::{
        BudgetBucket, BudgetStatus, MonthTotals, MonthlySettings, Thermometer, evaluate_budget,
        get_or_create_monthly_settings, month_date_range, parse_month,
    },
    navigation::NavBar,
    preferences::get_preferences,
    timezone::get_local_date,
    transaction::{
        TransactionFilter, TransactionRow, TransactionType, get_matching_transactions,
        get_transactions_in_date_range,
    },
};

/// The state needed for the month detail page.
#[derive(Debug, Clone)]
pub struct MonthPageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for MonthPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query parameters accepted by the month page.
#[derive(Debug, Default, Deserialize)]
pub struct MonthPageQuery {
    /// The year to display; defaults to the user's preferred year.
    pub year: Option<i32>,
}

/// Display the detail page for one month.
pub async fn get_month_page(
    State(state): State<MonthPageState>,
    Extension(user_id): Extension<UserID>,
    Path(month_number): Path<u8>,
    Query(query): Query<MonthPageQuery>,
) -> Result<Response, Error> {
    let month = parse_month(month_number)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let today = get_local_date(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;

    let year = match query.year {
        Some(year) => year,
        None => get_preferences(user_id, &connection)?
            .map(|preferences| preferences.default_year)
            .unwrap_or(today.year()),
    };

    let settings = get_or_create_monthly_settings(user_id, month_number, year, &connection)?;

    let (start, end) = month_date_range(year, month);
    let transactions = get_transactions_in_date_range(user_id, start, end, &connection)?;
    let totals = MonthTotals::from_transactions(&transactions);
    let thermometer = Thermometer::from_totals(&totals);
    let buckets = evaluate_budget(&settings, &totals);

    let section_rows = |transaction_type: TransactionType, is_fixed: Option<bool>| {
        get_matching_transactions(
            user_id,
            &TransactionFilter {
                month: Some(month_number),
                year: Some(year),
                transaction_type: Some(transaction_type),
                is_fixed,
                ..Default::default()
            },
            None,
            0,
            &connection,
        )
    };

    let income_rows = section_rows(TransactionType::Income, None)?;
    let fixed_rows = section_rows(TransactionType::Expense, Some(true))?;
    let variable_rows = section_rows(TransactionType::Expense, Some(false))?;
    let investment_rows = section_rows(TransactionType::Investment, None)?;

    let audit_start = start.midnight().assume_utc();
    let audit_end = end.midnight().assume_utc() + time::Duration::days(1);
    let audit_entries = get_audit_log_for_range(user_id, audit_start, audit_end, &connection)?;

    Ok(month_view(
        month,
        year,
        &settings,
        &totals,
        thermometer,
        &buckets,
        &income_rows,
        &fixed_rows,
        &variable_rows,
        &investment_rows,
        &audit_entries,
    )
    .into_response())
}

fn month_url(month: Month, year: i32) -> String {
    format!(
        "{}?year={year}",
        endpoints::format_endpoint(endpoints::MONTH_VIEW, month as u8 as i64)
    )
}

fn month_selector(month: Month, year: i32) -> Markup {
    let (previous_month, previous_year) = match month {
        Month::January => (Month::December, year - 1),
        other => (other.previous(), year),
    };
    let (next_month, next_year) = match month {
        Month::December => (Month::January, year + 1),
        other => (other.next(), year),
    };

    html! {
        div class="w-full flex items-center justify-between mb-4"
        {
            a href=(month_url(previous_month, previous_year)) class=(LINK_STYLE)
            {
                "← " (previous_month)
            }

            h1 class="text-3xl font-bold" { (month) " " (year) }

            a href=(month_url(next_month, next_year)) class=(LINK_STYLE)
            {
                (next_month) " →"
            }
        }
    }
}

fn overview_section(totals: &MonthTotals) -> Markup {
    let entry = |label: &str, amount: f64, class: &str| {
        html! {
            div class="text-center"
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { (label) }
                p class={ "text-xl font-semibold " (class) } { (format_currency(amount)) }
            }
        }
    };

    let balance_class = if totals.balance() >= 0.0 {
        "text-blue-600 dark:text-blue-400"
    } else {
        "text-red-600 dark:text-red-400"
    };

    html! {
        section class={ (PANEL_STYLE) " grid grid-cols-2 lg:grid-cols-5 gap-4 mb-6" }
        {
            (entry("Income", totals.income, "text-green-600 dark:text-green-400"))
            (entry("Fixed expenses", totals.fixed_expenses, "text-red-600 dark:text-red-400"))
            (entry("Variable expenses", totals.variable_expenses, "text-red-600 dark:text-red-400"))
            (entry("Investments", totals.investments, "text-blue-600 dark:text-blue-400"))
            (entry("Balance", totals.balance(), balance_class))
        }
    }
}

fn budget_section(
    settings: &MonthlySettings,
    buckets: &[BudgetBucket],
    thermometer: Thermometer,
    month_number: u8,
    year: i32,
) -> Markup {
    let status_class = |status: BudgetStatus| match status {
        BudgetStatus::Within => "text-green-600 dark:text-green-400",
        BudgetStatus::Near => "text-yellow-600 dark:text-yellow-400",
        BudgetStatus::Over => "text-red-600 dark:text-red-400",
    };

    let settings_url =
        endpoints::format_endpoint(endpoints::MONTH_SETTINGS, month_number as i64);

    let percent_input = |name: &str, label: &str, value: u8| {
        html! {
            div
            {
                label for=(name) class=(FORM_LABEL_STYLE) { (label) " (%)" }

                input
                    type="number"
                    name=(name)
                    id=(name)
                    min="0"
                    max="100"
                    value=(value)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }
    };

    html! {
        section class={ (PANEL_STYLE) " mb-6" }
        {
            div class="flex items-center justify-between mb-4"
            {
                h2 class="text-xl font-semibold" { "Budget rule" }

                p class="text-lg"
                {
                    (thermometer.emoji()) " " (thermometer.label())
                }
            }

            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400 mb-6"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Bucket" }
                        th scope="col" class={ (TABLE_CELL_STYLE) " text-right" } { "Actual" }
                        th scope="col" class={ (TABLE_CELL_STYLE) " text-right" } { "Budgeted" }
                    }
                }

                tbody
                {
                    @for bucket in buckets {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (bucket.label) " (" (bucket.percent) "%)" }

                            td class={ (TABLE_CELL_STYLE) " text-right " (status_class(bucket.status)) }
                            {
                                (format_currency(bucket.actual))
                            }

                            td class={ (TABLE_CELL_STYLE) " text-right" }
                            {
                                (format_currency(bucket.ideal))
                            }
                        }
                    }
                }
            }

            form
                hx-post=(settings_url)
                hx-target-error="#alert-container"
                class="grid grid-cols-2 lg:grid-cols-6 gap-3 items-end"
            {
                input type="hidden" name="year" value=(year);

                div
                {
                    label for="base_income" class=(FORM_LABEL_STYLE) { "Base income" }

                    div class="input-wrapper w-full"
                    {
                        input
                            type="number"
                            name="base_income"
                            id="base_income"
                            step="0.01"
                            min="0"
                            value=(format!("{:.2}", settings.base_income))
                            required
                            class=(FORM_TEXT_INPUT_STYLE);
                    }
                }

                (percent_input("needs_percent", "Needs", settings.needs_percent))
                (percent_input("wants_percent", "Wants", settings.wants_percent))
                (percent_input("savings_percent", "Savings", settings.savings_percent))
                (percent_input("investment_percent", "Investment", settings.investment_percent))

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save rule" }
            }
        }
    }
}

fn notes_section(settings: &MonthlySettings, month_number: u8, year: i32) -> Markup {
    let notes_url = endpoints::format_endpoint(endpoints::MONTH_NOTES, month_number as i64);

    html! {
        section class=(PANEL_STYLE)
        {
            h2 class="text-xl font-semibold mb-4" { "Notes" }

            form
                hx-put=(notes_url)
                hx-target-error="#alert-container"
                class="space-y-3"
            {
                input type="hidden" name="year" value=(year);

                textarea
                    name="notes"
                    rows="6"
                    placeholder="Notes and observations for this month..."
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    (settings.notes)
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save notes" }
            }
        }
    }
}

fn audit_section(entries: &[AuditEntry]) -> Markup {
    html! {
        section class=(PANEL_STYLE)
        {
            h2 class="text-xl font-semibold mb-4" { "Change history" }

            @if entries.is_empty() {
                p class="text-gray-500 dark:text-gray-400" { "No changes recorded for this month." }
            } @else {
                div class="space-y-3 max-h-80 overflow-y-auto"
                {
                    @for entry in entries {
                        div class="p-3 bg-gray-50 dark:bg-gray-700 rounded-md text-sm"
                        {
                            p class="font-medium"
                            {
                                (entry.entity_kind) " #" (entry.entity_id) " " (entry.action)
                            }

                            p class="text-gray-600 dark:text-gray-400"
                            {
                                (entry.changed_at.date()) " " (entry.changed_at.time())
                            }
                        }
                    }
                }
            }
        }
    }
}

fn transactions_section(title: &str, rows: &[TransactionRow]) -> Markup {
    html! {
        section class={ (PANEL_STYLE) " mb-6" }
        {
            div class="flex items-center justify-between mb-4"
            {
                h2 class="text-xl font-semibold" { (title) }

                a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE) { "Add" }
            }

            @if rows.is_empty() {
                p class="text-gray-500 dark:text-gray-400" { "Nothing recorded." }
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
                            th scope="col" class={ (TABLE_CELL_STYLE) " text-right" } { "Amount" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        }
                    }

                    tbody
                    {
                        @for row in rows {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE) { (row.date) }
                                td class=(TABLE_CELL_STYLE) { (row.description) }

                                td class=(TABLE_CELL_STYLE)
                                {
                                    @if let Some(category_name) = &row.category_name {
                                        (category_name)
                                    }
                                }

                                td class=(TABLE_CELL_STYLE)
                                {
                                    @if let Some(card_name) = &row.card_name {
                                        (card_name)
                                    }
                                }

                                td class={ (TABLE_CELL_STYLE) " text-right" }
                                {
                                    (format_currency(row.amount))
                                }

                                td class=(TABLE_CELL_STYLE)
                                {
                                    (edit_delete_action_links(
                                        &endpoints::format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, row.id),
                                        &endpoints::format_endpoint(endpoints::TRANSACTION, row.id),
                                        "Are you sure you want to delete this transaction?",
                                    ))
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn month_view(
    month: Month,
    year: i32,
    settings: &MonthlySettings,
    totals: &MonthTotals,
    thermometer: Thermometer,
    buckets: &[BudgetBucket],
    income_rows: &[TransactionRow],
    fixed_rows: &[TransactionRow],
    variable_rows: &[TransactionRow],
    investment_rows: &[TransactionRow],
    audit_entries: &[AuditEntry],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::MONTH_VIEW).into_html();
    let month_number = month as u8;

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            (month_selector(month, year))

            (overview_section(totals))

            (budget_section(settings, buckets, thermometer, month_number, year))

            div class="w-full grid grid-cols-1 lg:grid-cols-2 gap-6 mb-6"
            {
                (notes_section(settings, month_number, year))

                (audit_section(audit_entries))
            }

            div class="w-full"
            {
                (transactions_section("Income", income_rows))
                (transactions_section("Fixed expenses", fixed_rows))
                (transactions_section("Variable expenses", variable_rows))
                (transactions_section("Investments", investment_rows))
            }
        }
    };

    base(
        &format!("{month} {year}"),
        &[dollar_input_styles()],
        &content,
    )
}

#[cfg(test)]
mod month_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::Query;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        auth::{Email, PasswordHash, UserID, create_user},
        db::initialize,
        month::settings::get_monthly_settings,
        test_utils::{assert_valid_html, parse_html_document},
        transaction::{TransactionBuilder, TransactionType, create_transaction},
    };

    use super::{MonthPageQuery, MonthPageState, get_month_page};

    fn get_test_state() -> (MonthPageState, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(
            Email::new_unchecked("foo@bar.baz"),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        (
            MonthPageState {
                local_timezone: "Etc/UTC".to_owned(),
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn month_page_renders_with_no_transactions() {
        let (state, user_id) = get_test_state();

        let response = get_month_page(
            State(state),
            Extension(user_id),
            Path(6),
            Query(MonthPageQuery { year: Some(2025) }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("June 2025"));
        assert!(text.contains("Break even"));
    }

    #[tokio::test]
    async fn visiting_a_month_creates_its_settings() {
        let (state, user_id) = get_test_state();

        get_month_page(
            State(state.clone()),
            Extension(user_id),
            Path(6),
            Query(MonthPageQuery { year: Some(2025) }),
        )
        .await
        .unwrap();

        let connection = state.db_connection.lock().unwrap();
        let settings = get_monthly_settings(user_id, 6, 2025, &connection).unwrap();
        assert_eq!(settings.needs_percent, 50);
    }

    #[tokio::test]
    async fn month_page_shows_totals() {
        let (state, user_id) = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                TransactionBuilder::new(
                    user_id,
                    5000.0,
                    TransactionType::Income,
                    date!(2025 - 06 - 01),
                )
                .description("Salary"),
                &connection,
            )
            .unwrap();
            create_transaction(
                TransactionBuilder::new(
                    user_id,
                    1200.0,
                    TransactionType::Expense,
                    date!(2025 - 06 - 03),
                )
                .description("Rent")
                .is_fixed(true),
                &connection,
            )
            .unwrap();
        }

        let response = get_month_page(
            State(state),
            Extension(user_id),
            Path(6),
            Query(MonthPageQuery { year: Some(2025) }),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("$5,000.00"));
        assert!(text.contains("$1,200.00"));
        assert!(text.contains("In the black"));
    }

    #[tokio::test]
    async fn invalid_month_number_is_rejected() {
        let (state, user_id) = get_test_state();

        let result = get_month_page(
            State(state),
            Extension(user_id),
            Path(13),
            Query(MonthPageQuery::default()),
        )
        .await;

        assert_eq!(result.err(), Some(Error::InvalidMonth(13)));
    }
}
