//! The monthly goal model and database queries.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, auth::UserID};

/// Database identifier for a monthly goal.
pub type GoalId = i64;

/// A goal for one month, e.g. 'Save for the trip'.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyGoal {
    /// The ID of the goal.
    pub id: GoalId,
    /// The user the goal belongs to.
    pub user_id: UserID,
    /// The calendar month (1-12) the goal belongs to.
    pub month: u8,
    /// The calendar year the goal belongs to.
    pub year: i32,
    /// What the goal is.
    pub name: String,
    /// The amount of money the goal aims for.
    pub target_amount: f64,
    /// Whether the user has ticked the goal off.
    pub is_completed: bool,
}

/// Create the monthly goal table.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS monthly_goal (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            month INTEGER NOT NULL,
            year INTEGER NOT NULL,
            name TEXT NOT NULL,
            target_amount REAL NOT NULL,
            is_completed INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_monthly_goal_user_month
            ON monthly_goal(user_id, year, month);",
    )?;

    Ok(())
}

/// Create a goal and return it with its generated ID.
///
/// # Errors
///
/// Returns an [Error::EmptyGoalName] if `name` is empty after trimming.
pub fn create_goal(
    user_id: UserID,
    month: u8,
    year: i32,
    name: &str,
    target_amount: f64,
    connection: &Connection,
) -> Result<MonthlyGoal, Error> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::EmptyGoalName);
    }

    connection.execute(
        "INSERT INTO monthly_goal (user_id, month, year, name, target_amount)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        (user_id.as_i64(), month, year, name, target_amount),
    )?;

    Ok(MonthlyGoal {
        id: connection.last_insert_rowid(),
        user_id,
        month,
        year,
        name: name.to_owned(),
        target_amount,
        is_completed: false,
    })
}

/// Get a user's goals for one month, oldest first.
pub fn get_goals_for_month(
    user_id: UserID,
    month: u8,
    year: i32,
    connection: &Connection,
) -> Result<Vec<MonthlyGoal>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, month, year, name, target_amount, is_completed FROM monthly_goal
             WHERE user_id = ?1 AND month = ?2 AND year = ?3
             ORDER BY id ASC",
        )?
        .query_map((user_id.as_i64(), month, year), map_row)?
        .map(|maybe_goal| maybe_goal.map_err(|error| error.into()))
        .collect()
}

/// Flip a goal's completion flag.
///
/// # Errors
///
/// Returns an [Error::UpdateMissingGoal] if `goal_id` does not refer to one of
/// the user's goals.
pub fn toggle_goal(goal_id: GoalId, user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE monthly_goal SET is_completed = NOT is_completed
         WHERE id = ?1 AND user_id = ?2",
        (goal_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingGoal);
    }

    Ok(())
}

/// Delete a goal.
///
/// # Errors
///
/// Returns an [Error::DeleteMissingGoal] if `goal_id` does not refer to one of
/// the user's goals.
pub(super) fn delete_goal(
    goal_id: GoalId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM monthly_goal WHERE id = ?1 AND user_id = ?2",
        (goal_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingGoal);
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<MonthlyGoal, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_user_id = row.get(1)?;
    let month = row.get(2)?;
    let year = row.get(3)?;
    let name = row.get(4)?;
    let target_amount = row.get(5)?;
    let is_completed = row.get(6)?;

    Ok(MonthlyGoal {
        id,
        user_id: UserID::new(raw_user_id),
        month,
        year,
        name,
        target_amount,
        is_completed,
    })
}
