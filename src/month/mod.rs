//! Month-centric views and calculations.
//!
//! A "month" bundles the user's transactions for a calendar month with the
//! month's settings (base income, budget percentages, notes), the computed
//! totals and budget-rule evaluation, and the month's audit log.

mod month_page;
mod notes_endpoint;
mod settings;
mod settings_endpoint;
mod summary;

pub use month_page::get_month_page;
pub use notes_endpoint::update_month_notes_endpoint;
pub use settings::{
    MonthlySettings, create_monthly_settings_table, get_or_create_monthly_settings,
    update_monthly_settings, update_notes,
};
pub use settings_endpoint::update_month_settings_endpoint;
pub use summary::{BudgetBucket, BudgetStatus, MonthTotals, Thermometer, evaluate_budget};

use time::{Date, Month};

use crate::Error;

/// Parse a month number from a URL into a [time::Month].
///
/// # Errors
///
/// Returns an [Error::InvalidMonth] if `month_number` is outside 1-12.
pub fn parse_month(month_number: u8) -> Result<Month, Error> {
    Month::try_from(month_number).map_err(|_| Error::InvalidMonth(month_number))
}

/// The first and last day of `month` in `year`.
pub fn month_date_range(year: i32, month: Month) -> (Date, Date) {
    // The unwraps cannot fail: day one always exists and `Month::length` is
    // the number of days in the month.
    let start = Date::from_calendar_date(year, month, 1).unwrap();
    let end = Date::from_calendar_date(year, month, month.length(year)).unwrap();

    (start, end)
}
