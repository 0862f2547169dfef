//! Money earned, e.g. salary or freelance payments.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    aggregation::Ledger,
    amount::require_finite,
    database_id::DatabaseId,
    ledger::{DatedRecord, stored_timestamp},
};

/// A payment received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Income {
    /// The ID of the income.
    pub id: DatabaseId,
    /// The amount of money received.
    pub amount: f64,
    /// A text description of the income.
    pub description: Option<String>,
    /// When the money was received.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// Where the money came from, e.g. "Salary".
    pub source: Option<String>,
}

impl Income {
    /// Start building a new income.
    pub fn build(amount: f64, date: OffsetDateTime) -> NewIncome {
        NewIncome {
            amount,
            description: None,
            date,
            source: None,
        }
    }
}

/// The fields of an income to create or to replace an existing income with.
///
/// Unlike the other ledgers the date is required and the amount may be any
/// finite number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewIncome {
    /// The amount of money received.
    pub amount: f64,
    /// A text description of the income.
    pub description: Option<String>,
    /// When the money was received.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// Where the money came from.
    pub source: Option<String>,
}

impl NewIncome {
    /// Set the description.
    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }

    /// Set the source.
    pub fn source(mut self, source: &str) -> Self {
        self.source = Some(source.to_owned());
        self
    }
}

impl DatedRecord for Income {
    const LEDGER: Ledger = Ledger::Income;
    const COLUMNS: &'static str = "id, amount, description, date, source";

    type Input = NewIncome;

    fn map_row(row: &Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get(0)?,
            amount: row.get(1)?,
            description: row.get(2)?,
            date: row.get(3)?,
            source: row.get(4)?,
        })
    }

    fn insert(input: NewIncome, connection: &Connection) -> Result<Self, Error> {
        let amount = require_finite(input.amount)?;

        connection
            .prepare(
                "INSERT INTO income (amount, description, date, source)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING id, amount, description, date, source",
            )?
            .query_row(
                (
                    amount,
                    input.description,
                    stored_timestamp(input.date),
                    input.source,
                ),
                Self::map_row,
            )
            .map_err(|error| error.into())
    }

    fn replace(id: DatabaseId, input: NewIncome, connection: &Connection) -> Result<Self, Error> {
        let amount = require_finite(input.amount)?;

        connection
            .prepare(
                "UPDATE income SET amount = ?1, description = ?2, date = ?3, source = ?4
                 WHERE id = ?5
                 RETURNING id, amount, description, date, source",
            )?
            .query_row(
                (
                    amount,
                    input.description,
                    stored_timestamp(input.date),
                    input.source,
                    id,
                ),
                Self::map_row,
            )
            .map_err(|error| error.into())
    }
}

/// Create the income table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_income_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS income (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            amount REAL NOT NULL,
            description TEXT,
            date TEXT NOT NULL,
            source TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_income_date ON income(date);",
    )
}
