//! Money put into savings or investments.
//!
//! Both ledgers store the same fields under the same rules, so a single
//! [Deposit] type serves both. The [DepositKind] marker picks the table.

use std::marker::PhantomData;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    aggregation::Ledger,
    amount::require_positive,
    database_id::DatabaseId,
    ledger::{DatedRecord, stored_timestamp},
};

/// Selects the ledger a [Deposit] is stored in.
pub trait DepositKind {
    /// The ledger, and therefore the table, for this kind of deposit.
    const LEDGER: Ledger;
}

/// Marker for deposits into savings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavingKind {}

impl DepositKind for SavingKind {
    const LEDGER: Ledger = Ledger::Saving;
}

/// Marker for money invested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvestmentKind {}

impl DepositKind for InvestmentKind {
    const LEDGER: Ledger = Ledger::Investment;
}

/// A deposit into savings.
pub type Saving = Deposit<SavingKind>;
/// The fields of a saving entry to create or replace.
pub type NewSaving = NewDeposit<SavingKind>;
/// A contribution to investments.
pub type Investment = Deposit<InvestmentKind>;
/// The fields of an investment entry to create or replace.
pub type NewInvestment = NewDeposit<InvestmentKind>;

/// An amount of money put aside on a given date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Deposit<K> {
    /// The ID of the entry.
    pub id: DatabaseId,
    /// The amount deposited, always greater than zero.
    pub amount: f64,
    /// A text description of the entry.
    pub description: Option<String>,
    /// When the money was deposited.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    #[serde(skip)]
    kind: PhantomData<K>,
}

impl<K> Deposit<K> {
    /// Start building a new entry.
    pub fn build(amount: f64, date: OffsetDateTime) -> NewDeposit<K> {
        NewDeposit {
            amount,
            description: None,
            date,
            kind: PhantomData,
        }
    }
}

/// The fields of a deposit to create or to replace an existing deposit with.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(bound = "")]
pub struct NewDeposit<K> {
    /// The amount deposited, must be greater than zero.
    pub amount: f64,
    /// A text description of the entry.
    pub description: Option<String>,
    /// When the money was deposited, defaults to now.
    #[serde(default = "OffsetDateTime::now_utc", with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    #[serde(skip)]
    kind: PhantomData<K>,
}

impl<K> NewDeposit<K> {
    /// Set the description.
    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }
}

impl<K: DepositKind> DatedRecord for Deposit<K> {
    const LEDGER: Ledger = K::LEDGER;
    const COLUMNS: &'static str = "id, amount, description, date";

    type Input = NewDeposit<K>;

    fn map_row(row: &Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get(0)?,
            amount: row.get(1)?,
            description: row.get(2)?,
            date: row.get(3)?,
            kind: PhantomData,
        })
    }

    fn insert(input: NewDeposit<K>, connection: &Connection) -> Result<Self, Error> {
        let amount = require_positive(input.amount)?;

        connection
            .prepare(&format!(
                "INSERT INTO {} (amount, description, date)
                 VALUES (?1, ?2, ?3)
                 RETURNING {}",
                K::LEDGER.table(),
                Self::COLUMNS
            ))?
            .query_row(
                (amount, input.description, stored_timestamp(input.date)),
                Self::map_row,
            )
            .map_err(|error| error.into())
    }

    fn replace(
        id: DatabaseId,
        input: NewDeposit<K>,
        connection: &Connection,
    ) -> Result<Self, Error> {
        let amount = require_positive(input.amount)?;

        connection
            .prepare(&format!(
                "UPDATE {} SET amount = ?1, description = ?2, date = ?3
                 WHERE id = ?4
                 RETURNING {}",
                K::LEDGER.table(),
                Self::COLUMNS
            ))?
            .query_row(
                (amount, input.description, stored_timestamp(input.date), id),
                Self::map_row,
            )
            .map_err(|error| error.into())
    }
}

/// Create the table for deposits of kind `K` in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_deposit_table<K: DepositKind>(
    connection: &Connection,
) -> Result<(), rusqlite::Error> {
    let table = K::LEDGER.table();

    connection.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            amount REAL NOT NULL CHECK (amount > 0),
            description TEXT,
            date TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_{table}_date ON {table}(date);"
    ))
}
