//! The settings page: category manager, the current month's budget rule and
//! general preferences.

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
    category::{category_manager_section, get_all_categories},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE,
        PANEL_STYLE, base, dollar_input_styles,
    },
    month::{MonthlySettings, get_or_create_monthly_settings},
    navigation::NavBar,
    preferences::{Currency, Preferences, Theme, get_preferences},
    timezone::get_local_date,
};

/// The state needed for the settings page.
#[derive(Debug, Clone)]
pub struct SettingsPageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SettingsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Display the settings page.
pub async fn get_settings_page(
    State(state): State<SettingsPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let today = get_local_date(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;

    let categories = get_all_categories(user_id, &connection)?;
    let preferences = get_preferences(user_id, &connection)?
        .unwrap_or_else(|| Preferences::default_for(user_id, today.year()));
    let month_settings =
        get_or_create_monthly_settings(user_id, today.month() as u8, today.year(), &connection)?;

    Ok(settings_view(&categories, &preferences, &month_settings).into_response())
}

fn budget_rule_section(settings: &MonthlySettings) -> Markup {
    let settings_url =
        endpoints::format_endpoint(endpoints::MONTH_SETTINGS, settings.month as i64);

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
        section class=(PANEL_STYLE)
        {
            h2 class="text-xl font-semibold mb-1" { "Budget rule" }

            p class="text-gray-600 dark:text-gray-400 mb-4"
            {
                "Split your income between needs, wants, savings and investments. \
                The percentages must add up to 100%. This applies to the current month."
            }

            form
                hx-post=(settings_url)
                hx-target-error="#alert-container"
                class="space-y-4"
            {
                input type="hidden" name="year" value=(settings.year);

                div
                {
                    label for="base_income" class=(FORM_LABEL_STYLE) { "Base monthly income" }

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

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Rule" }
            }
        }
    }
}

fn preferences_section(preferences: &Preferences) -> Markup {
    html! {
        section class=(PANEL_STYLE)
        {
            h2 class="text-xl font-semibold mb-4" { "Preferences" }

            form
                hx-post=(endpoints::PREFERENCES_API)
                hx-target-error="#alert-container"
                class="space-y-4"
            {
                div
                {
                    label for="currency" class=(FORM_LABEL_STYLE) { "Currency" }

                    select name="currency" id="currency" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for currency in Currency::ALL {
                            @if currency == preferences.currency {
                                option value=(currency.as_str()) selected { (currency.label()) }
                            } @else {
                                option value=(currency.as_str()) { (currency.label()) }
                            }
                        }
                    }
                }

                div
                {
                    label for="default_year" class=(FORM_LABEL_STYLE) { "Default year" }

                    input
                        type="number"
                        name="default_year"
                        id="default_year"
                        min="2000"
                        max="2100"
                        value=(preferences.default_year)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="theme" class=(FORM_LABEL_STYLE) { "Theme" }

                    select name="theme" id="theme" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for theme in [Theme::Light, Theme::Dark] {
                            @if theme == preferences.theme {
                                option value=(theme.as_str()) selected { (theme.label()) }
                            } @else {
                                option value=(theme.as_str()) { (theme.label()) }
                            }
                        }
                    }
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Preferences" }
            }
        }
    }
}

fn settings_view(
    categories: &[crate::category::Category],
    preferences: &Preferences,
    month_settings: &MonthlySettings,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::SETTINGS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold w-full mb-4" { "Settings" }

            div class="w-full grid grid-cols-1 lg:grid-cols-2 gap-6"
            {
                (category_manager_section(categories))

                div class="space-y-6"
                {
                    (budget_rule_section(month_settings))

                    (preferences_section(preferences))
                }
            }
        }
    };

    base("Settings", &[dollar_input_styles()], &content)
}

#[cfg(test)]
mod settings_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        auth::{Email, PasswordHash, UserID, create_user},
        category::{CategoryKind, CategoryName, create_category},
        db::initialize,
        test_utils::{assert_valid_html, parse_html_document},
    };

    use super::{SettingsPageState, get_settings_page};

    fn get_test_state() -> (SettingsPageState, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(
            Email::new_unchecked("foo@bar.baz"),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        (
            SettingsPageState {
                local_timezone: "Etc/UTC".to_owned(),
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn settings_page_renders_all_sections() {
        let (state, user_id) = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_category(
                user_id,
                CategoryName::new_unchecked("Rent"),
                CategoryKind::FixedExpense,
                &connection,
            )
            .unwrap();
        }

        let response = get_settings_page(State(state), Extension(user_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("Categories"));
        assert!(text.contains("Budget rule"));
        assert!(text.contains("Preferences"));
        assert!(text.contains("Rent"));

        // One form each for the budget rule and preferences.
        let forms = Selector::parse("form").unwrap();
        assert_eq!(html.select(&forms).count(), 2);
    }
}
