//! Expenses and their links to categories.
//!
//! An expense belongs to any number of categories. The links live in the
//! `expense_category` table and are written in the same SQLite transaction as
//! the expense, so a failed write never leaves an expense with half of its
//! categories.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    aggregation::Ledger,
    amount::require_positive,
    category::CategoryId,
    database_id::DatabaseId,
    ledger::{DatedRecord, stored_timestamp},
};

/// Money spent on something.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// The ID of the expense.
    pub id: DatabaseId,
    /// The amount spent, always greater than zero.
    pub amount: f64,
    /// A text description of what the money was spent on.
    pub description: Option<String>,
    /// When the money was spent.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// The IDs of the categories the expense belongs to, sorted and without duplicates.
    pub category_ids: Vec<CategoryId>,
}

impl Expense {
    /// Start building a new expense.
    pub fn build(amount: f64, date: OffsetDateTime) -> NewExpense {
        NewExpense {
            amount,
            description: None,
            date,
            category_ids: Vec::new(),
        }
    }
}

/// The fields of an expense to create or to replace an existing expense with.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewExpense {
    /// The amount spent, must be greater than zero.
    pub amount: f64,
    /// A text description of what the money was spent on.
    pub description: Option<String>,
    /// When the money was spent, defaults to now.
    #[serde(default = "OffsetDateTime::now_utc", with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// The categories to put the expense in. Order and duplicates are ignored.
    #[serde(default)]
    pub category_ids: Vec<CategoryId>,
}

impl NewExpense {
    /// Set the description.
    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }

    /// Set the categories.
    pub fn category_ids(mut self, category_ids: impl IntoIterator<Item = CategoryId>) -> Self {
        self.category_ids = category_ids.into_iter().collect();
        self
    }
}

fn normalize_category_ids(mut category_ids: Vec<CategoryId>) -> Vec<CategoryId> {
    category_ids.sort_unstable();
    category_ids.dedup();
    category_ids
}

impl DatedRecord for Expense {
    const LEDGER: Ledger = Ledger::Expense;
    const COLUMNS: &'static str = "id, amount, description, date";

    type Input = NewExpense;

    fn map_row(row: &Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get(0)?,
            amount: row.get(1)?,
            description: row.get(2)?,
            date: row.get(3)?,
            category_ids: Vec::new(),
        })
    }

    fn insert(input: NewExpense, connection: &Connection) -> Result<Self, Error> {
        let amount = require_positive(input.amount)?;
        let category_ids = normalize_category_ids(input.category_ids);

        let transaction = connection.unchecked_transaction()?;

        let mut expense = transaction
            .prepare(
                "INSERT INTO expense (amount, description, date)
                 VALUES (?1, ?2, ?3)
                 RETURNING id, amount, description, date",
            )?
            .query_row(
                (amount, input.description, stored_timestamp(input.date)),
                Self::map_row,
            )?;

        link_categories(expense.id, &category_ids, &transaction)?;
        transaction.commit()?;

        expense.category_ids = category_ids;

        Ok(expense)
    }

    fn replace(id: DatabaseId, input: NewExpense, connection: &Connection) -> Result<Self, Error> {
        let amount = require_positive(input.amount)?;
        let category_ids = normalize_category_ids(input.category_ids);

        let transaction = connection.unchecked_transaction()?;

        let mut expense = transaction
            .prepare(
                "UPDATE expense SET amount = ?1, description = ?2, date = ?3
                 WHERE id = ?4
                 RETURNING id, amount, description, date",
            )?
            .query_row(
                (amount, input.description, stored_timestamp(input.date), id),
                Self::map_row,
            )?;

        transaction.execute("DELETE FROM expense_category WHERE expense_id = ?1", [id])?;
        link_categories(id, &category_ids, &transaction)?;
        transaction.commit()?;

        expense.category_ids = category_ids;

        Ok(expense)
    }

    fn load_related(expenses: &mut [Self], connection: &Connection) -> Result<(), Error> {
        let mut statement = connection.prepare_cached(
            "SELECT category_id FROM expense_category
             WHERE expense_id = ?1
             ORDER BY category_id ASC",
        )?;

        for expense in expenses {
            expense.category_ids = statement
                .query_map([expense.id], |row| row.get(0))?
                .collect::<Result<Vec<CategoryId>, _>>()?;
        }

        Ok(())
    }
}

/// Add the links between an expense and each of `category_ids`.
///
/// # Errors
/// Returns [Error::InvalidCategory] with the first ID that does not refer to a
/// category. The caller must roll back any links already written.
fn link_categories(
    expense_id: DatabaseId,
    category_ids: &[CategoryId],
    connection: &Connection,
) -> Result<(), Error> {
    let mut statement = connection
        .prepare_cached("INSERT INTO expense_category (expense_id, category_id) VALUES (?1, ?2)")?;

    for &category_id in category_ids {
        statement
            .execute((expense_id, category_id))
            .map_err(|error| match error {
                // Code 787 occurs when a FOREIGN KEY constraint failed.
                rusqlite::Error::SqliteFailure(error, Some(_)) if error.extended_code == 787 => {
                    Error::InvalidCategory(category_id)
                }
                error => error.into(),
            })?;
    }

    Ok(())
}

/// Create the expense table and the table linking expenses to categories.
///
/// The category table must already exist.
///
/// # Errors
/// Returns an error if the tables cannot be created or if there is an SQL error.
pub fn create_expense_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            amount REAL NOT NULL CHECK (amount > 0),
            description TEXT,
            date TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_expense_date ON expense(date);

        CREATE TABLE IF NOT EXISTS expense_category (
            expense_id INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            PRIMARY KEY (expense_id, category_id),
            FOREIGN KEY(expense_id) REFERENCES expense(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_expense_category_category_id
            ON expense_category(category_id);",
    )
}
