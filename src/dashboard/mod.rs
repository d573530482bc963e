//! The dashboard: current-month summary, thermometer, expenses chart and goals.

mod charts;
mod goals_section;
mod handlers;

pub use handlers::get_dashboard_page;
