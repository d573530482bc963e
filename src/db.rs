/*! Database initialization for the application. */

use rusqlite::Connection;

use crate::{
    Error, audit::create_audit_log_table, auth::create_user_table, card::create_card_table,
    category::create_category_table, goal::create_goal_table,
    month::create_monthly_settings_table, preferences::create_preferences_table,
    transaction::create_transaction_table,
};

/// Create the application tables in the database.
///
/// Table creation is idempotent, so it is safe to call this function on a
/// database that has already been initialized.
///
/// # Errors
/// Returns an error if a table cannot be created or if there is some other
/// SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    create_user_table(connection)?;
    create_category_table(connection)?;
    create_card_table(connection)?;
    create_transaction_table(connection)?;
    create_monthly_settings_table(connection)?;
    create_preferences_table(connection)?;
    create_goal_table(connection)?;
    create_audit_log_table(connection)?;

    Ok(())
}
