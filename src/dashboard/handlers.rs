//! Dashboard HTTP handlers and view rendering.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Month;

use crate::{
    AppState, Error,
    auth::UserID,
    dashboard::{
        charts::{chart_view, charts_script, expenses_chart, group_expenses_by_category},
        goals_section::goals_section,
    },
    endpoints,
    goal::{MonthlyGoal, get_goals_for_month},
    html::{
        HeadElement, LINK_STYLE, PAGE_CONTAINER_STYLE, PANEL_STYLE, base, dollar_input_styles,
        format_currency,
    },
    month::{MonthTotals, Thermometer, month_date_range},
    navigation::NavBar,
    timezone::get_local_date,
    transaction::{
        TransactionFilter, TransactionType, get_matching_transactions,
        get_transactions_in_date_range,
    },
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Display a page with an overview of the user's current month.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let today = get_local_date(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;
    let month = today.month();
    let year = today.year();

    let (start, end) = month_date_range(year, month);
    let transactions = get_transactions_in_date_range(user_id, start, end, &connection)?;
    let totals = MonthTotals::from_transactions(&transactions);
    let thermometer = Thermometer::from_totals(&totals);

    let expense_rows = get_matching_transactions(
        user_id,
        &TransactionFilter {
            month: Some(month as u8),
            year: Some(year),
            transaction_type: Some(TransactionType::Expense),
            ..Default::default()
        },
        None,
        0,
        &connection,
    )?;
    let category_totals = group_expenses_by_category(&expense_rows);

    let goals = get_goals_for_month(user_id, month as u8, year, &connection)?;

    Ok(dashboard_view(month, year, &totals, thermometer, &category_totals, &goals).into_response())
}

fn summary_section(totals: &MonthTotals) -> Markup {
    let balance = totals.cash_balance();
    let balance_class = if balance >= 0.0 {
        "text-blue-600 dark:text-blue-400"
    } else {
        "text-red-600 dark:text-red-400"
    };

    html! {
        section class={ (PANEL_STYLE) " grid grid-cols-1 md:grid-cols-3 gap-4 mb-6" }
        {
            div class="text-center"
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { "Income" }
                p class="text-2xl font-semibold text-green-600 dark:text-green-400"
                {
                    (format_currency(totals.income))
                }
            }

            div class="text-center"
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { "Expenses" }
                p class="text-2xl font-semibold text-red-600 dark:text-red-400"
                {
                    (format_currency(totals.expenses()))
                }
            }

            div class="text-center"
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { "Balance" }
                p class={ "text-2xl font-semibold " (balance_class) }
                {
                    (format_currency(balance))
                }
            }
        }
    }
}

fn thermometer_section(thermometer: Thermometer, totals: &MonthTotals) -> Markup {
    html! {
        section class={ (PANEL_STYLE) " text-center mb-6" }
        {
            h2 class="text-xl font-semibold mb-4" { "Financial thermometer" }

            div class="flex items-center justify-center gap-4"
            {
                span class="text-5xl" { (thermometer.emoji()) }

                div
                {
                    p class="text-3xl font-bold" { (thermometer.label()) }

                    p class="text-lg text-gray-600 dark:text-gray-400"
                    {
                        "Balance: " (format_currency(totals.cash_balance()))
                    }
                }
            }
        }
    }
}

fn dashboard_view(
    month: Month,
    year: i32,
    totals: &MonthTotals,
    thermometer: Thermometer,
    category_totals: &[(String, f64)],
    goals: &[MonthlyGoal],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let month_url = format!(
        "{}?year={year}",
        endpoints::format_endpoint(endpoints::MONTH_VIEW, month as u8 as i64)
    );

    let mut head_elements = vec![dollar_input_styles()];

    let chart = (!category_totals.is_empty()).then(|| expenses_chart(category_totals));
    if let Some(chart) = &chart {
        head_elements.push(HeadElement::ScriptLink("/static/echarts-5-min.js".to_owned()));
        head_elements.push(charts_script(std::slice::from_ref(chart)));
    }

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full flex items-center justify-between mb-4"
            {
                h1 class="text-3xl font-bold" { (month) " " (year) }

                a href=(month_url) class=(LINK_STYLE) { "Month details" }
            }

            (summary_section(totals))

            div class="w-full grid grid-cols-1 lg:grid-cols-2 gap-6"
            {
                div
                {
                    (thermometer_section(thermometer, totals))

                    (goals_section(goals, month as u8, year))
                }

                section class=(PANEL_STYLE)
                {
                    @match &chart {
                        Some(chart) => { (chart_view(chart)) }
                        None => {
                            p class="text-gray-500 dark:text-gray-400"
                            {
                                "No expenses recorded for this month."
                            }
                        }
                    }
                }
            }
        }
    };

    base("Dashboard", &head_elements, &content)
}

#[cfg(test)]
mod dashboard_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use time::OffsetDateTime;

    use crate::{
        auth::{Email, PasswordHash, UserID, create_user},
        category::{CategoryKind, CategoryName, create_category},
        db::initialize,
        test_utils::{assert_valid_html, parse_html_document},
        transaction::{TransactionBuilder, TransactionType, create_transaction},
    };

    use super::{DashboardState, get_dashboard_page};

    fn get_test_state() -> (DashboardState, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(
            Email::new_unchecked("foo@bar.baz"),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        (
            DashboardState {
                db_connection: Arc::new(Mutex::new(connection)),
                local_timezone: "Etc/UTC".to_owned(),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn dashboard_renders_with_no_data() {
        let (state, user_id) = get_test_state();

        let response = get_dashboard_page(State(state), Extension(user_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("Break even"));
        assert!(text.contains("No expenses recorded for this month."));
    }

    #[tokio::test]
    async fn dashboard_shows_current_month_summary() {
        let (state, user_id) = get_test_state();
        let today = OffsetDateTime::now_utc().date();
        {
            let connection = state.db_connection.lock().unwrap();
            let category = create_category(
                user_id,
                CategoryName::new_unchecked("Groceries"),
                CategoryKind::VariableExpense,
                &connection,
            )
            .unwrap();

            create_transaction(
                TransactionBuilder::new(user_id, 5000.0, TransactionType::Income, today)
                    .description("Salary"),
                &connection,
            )
            .unwrap();
            create_transaction(
                TransactionBuilder::new(user_id, 750.0, TransactionType::Expense, today)
                    .description("Food")
                    .category_id(Some(category.id)),
                &connection,
            )
            .unwrap();
        }

        let response = get_dashboard_page(State(state), Extension(user_id))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("$5,000.00"));
        assert!(text.contains("$750.00"));
        assert!(text.contains("In the black"));
    }
}
