//! Per-user display preferences: currency, default year and theme.

mod core;
mod endpoint;

pub use core::{
    Currency, Preferences, Theme, create_preferences_table, get_preferences, save_preferences,
};
pub use endpoint::update_preferences_endpoint;
