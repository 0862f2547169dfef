//! Car loan statements and the queries over them.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    amount::require_finite,
    database_id::DatabaseId,
    filters::PeriodRange,
    month::{LoanPeriod, month_ordinal},
    ordering::{newest_period_first, sort_newest_period_first},
    pagination::Page,
};

/// One month's car loan statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarLoanEntry {
    /// The ID of the statement.
    pub id: DatabaseId,
    /// The full English name of the month, e.g. "June".
    pub month: String,
    /// The year of the statement.
    pub year: i32,
    /// The principal owed before the payment.
    pub principal_balance: f64,
    /// The amount needed to pay off the loan.
    pub payoff_balance: f64,
    /// The total payment made this month.
    pub amount_paid: f64,
    /// The part of the payment that reduced the principal.
    pub principal: f64,
    /// The part of the payment that went to interest.
    pub finance: f64,
    /// The principal owed after the payment.
    pub ending_balance: f64,
    /// The interest paid so far this year, if the statement shows it.
    pub interest_ytd: Option<f64>,
}

impl CarLoanEntry {
    /// The statement's month and year.
    ///
    /// # Errors
    /// Returns [Error::UnknownMonth] if the stored month is not a month name.
    pub fn period(&self) -> Result<LoanPeriod, Error> {
        LoanPeriod::from_name(self.year, &self.month)
    }
}

/// The fields of a statement to create or to replace an existing statement with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCarLoanEntry {
    /// The full English name of the month, e.g. "June". Case-sensitive.
    pub month: String,
    /// The year of the statement.
    pub year: i32,
    /// The principal owed before the payment.
    pub principal_balance: f64,
    /// The amount needed to pay off the loan.
    pub payoff_balance: f64,
    /// The total payment made this month.
    pub amount_paid: f64,
    /// The part of the payment that reduced the principal.
    pub principal: f64,
    /// The part of the payment that went to interest.
    pub finance: f64,
    /// The principal owed after the payment.
    pub ending_balance: f64,
    /// The interest paid so far this year.
    #[serde(default)]
    pub interest_ytd: Option<f64>,
}

impl NewCarLoanEntry {
    fn validate(&self) -> Result<(), Error> {
        month_ordinal(&self.month)?;

        for amount in [
            self.principal_balance,
            self.payoff_balance,
            self.amount_paid,
            self.principal,
            self.finance,
            self.ending_balance,
        ] {
            require_finite(amount)?;
        }

        if let Some(interest_ytd) = self.interest_ytd {
            require_finite(interest_ytd)?;
        }

        Ok(())
    }
}

/// A stored statement whose month could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedMonth {
    /// The ID of the statement.
    pub id: DatabaseId,
    /// The month as stored.
    pub month: String,
}

/// A page of statements, plus the statements left out because their month is invalid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarLoanListing {
    /// The statements in the requested range and page, most recent first.
    pub entries: Vec<CarLoanEntry>,
    /// Every stored statement with an unrecognised month, regardless of range and page.
    pub unresolved: Vec<UnresolvedMonth>,
}

const COLUMNS: &str = "id, month, year, principal_balance, payoff_balance, amount_paid, \
    principal, finance, ending_balance, interest_ytd";

fn map_row(row: &Row) -> Result<CarLoanEntry, rusqlite::Error> {
    Ok(CarLoanEntry {
        id: row.get(0)?,
        month: row.get(1)?,
        year: row.get(2)?,
        principal_balance: row.get(3)?,
        payoff_balance: row.get(4)?,
        amount_paid: row.get(5)?,
        principal: row.get(6)?,
        finance: row.get(7)?,
        ending_balance: row.get(8)?,
        interest_ytd: row.get(9)?,
    })
}

/// Create a car loan statement.
///
/// # Errors
/// This function will return a:
/// - [Error::UnknownMonth] if the month is not a full English month name,
/// - [Error::NonFiniteAmount] if any amount is NaN or infinite,
/// - or [Error::SqlError] there is some other SQL error.
pub fn create_car_loan(
    entry: NewCarLoanEntry,
    connection: &Connection,
) -> Result<CarLoanEntry, Error> {
    entry.validate()?;

    let created = connection
        .prepare(&format!(
            "INSERT INTO car_loan (month, year, principal_balance, payoff_balance, amount_paid, \
            principal, finance, ending_balance, interest_ytd) \
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9) \
            RETURNING {COLUMNS}"
        ))?
        .query_row(
            (
                &entry.month,
                entry.year,
                entry.principal_balance,
                entry.payoff_balance,
                entry.amount_paid,
                entry.principal,
                entry.finance,
                entry.ending_balance,
                entry.interest_ytd,
            ),
            map_row,
        )?;

    tracing::debug!("Created car loan statement {} for {} {}", created.id, created.month, created.year);

    Ok(created)
}

/// Retrieve a car loan statement by its `id`.
///
/// # Errors
/// Returns [Error::NotFound] if `id` does not refer to a statement.
pub fn get_car_loan(id: DatabaseId, connection: &Connection) -> Result<CarLoanEntry, Error> {
    connection
        .prepare(&format!("SELECT {COLUMNS} FROM car_loan WHERE id = :id"))?
        .query_row(&[(":id", &id)], map_row)
        .map_err(|error| error.into())
}

/// Replace every field of the statement `id` with `entry`.
///
/// # Errors
/// This function will return a:
/// - [Error::UnknownMonth] or [Error::NonFiniteAmount] if `entry` is invalid,
/// - [Error::NotFound] if `id` does not refer to a statement,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_car_loan(
    id: DatabaseId,
    entry: NewCarLoanEntry,
    connection: &Connection,
) -> Result<CarLoanEntry, Error> {
    entry.validate()?;

    connection
        .prepare(&format!(
            "UPDATE car_loan SET month = ?1, year = ?2, principal_balance = ?3, \
            payoff_balance = ?4, amount_paid = ?5, principal = ?6, finance = ?7, \
            ending_balance = ?8, interest_ytd = ?9 \
            WHERE id = ?10 \
            RETURNING {COLUMNS}"
        ))?
        .query_row(
            (
                &entry.month,
                entry.year,
                entry.principal_balance,
                entry.payoff_balance,
                entry.amount_paid,
                entry.principal,
                entry.finance,
                entry.ending_balance,
                entry.interest_ytd,
                id,
            ),
            map_row,
        )
        .map_err(|error| error.into())
}

/// Delete the statement `id`.
///
/// # Errors
/// Returns [Error::NotFound] if `id` does not refer to a statement.
pub fn delete_car_loan(id: DatabaseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM car_loan WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    tracing::debug!("Deleted car loan statement {id}");

    Ok(())
}

/// Every stored statement paired with its period, and the statements whose month is invalid.
pub(crate) fn load_resolved(
    connection: &Connection,
) -> Result<(Vec<(LoanPeriod, CarLoanEntry)>, Vec<UnresolvedMonth>), Error> {
    let entries = connection
        .prepare(&format!("SELECT {COLUMNS} FROM car_loan ORDER BY id"))?
        .query_map([], map_row)?
        .collect::<Result<Vec<_>, _>>()?;

    let mut resolved = Vec::with_capacity(entries.len());
    let mut unresolved = Vec::new();

    for entry in entries {
        match entry.period() {
            Ok(period) => resolved.push((period, entry)),
            Err(error) => {
                tracing::warn!("Skipping car loan statement {}: {error}", entry.id);
                unresolved.push(UnresolvedMonth {
                    id: entry.id,
                    month: entry.month,
                });
            }
        }
    }

    Ok((resolved, unresolved))
}

/// The most recent of `resolved`, with ties in the same month going to the highest ID.
pub(crate) fn newest(resolved: Vec<(LoanPeriod, CarLoanEntry)>) -> Option<CarLoanEntry> {
    resolved
        .into_iter()
        .min_by(|(a_period, a), (b_period, b)| {
            newest_period_first((*a_period, a.id), (*b_period, b.id))
        })
        .map(|(_, entry)| entry)
}

/// Get the statements in `range`, most recent first, windowed by `page`.
///
/// Statements with an unrecognised month cannot be placed in time, so they
/// are left out of `entries` and listed in `unresolved` instead.
///
/// # Errors
/// Returns an [Error::SqlError] if there is some SQL error.
pub fn list_car_loans(
    range: PeriodRange,
    page: Page,
    connection: &Connection,
) -> Result<CarLoanListing, Error> {
    let (mut resolved, unresolved) = load_resolved(connection)?;

    resolved.retain(|(period, _)| range.contains(*period));
    sort_newest_period_first(&mut resolved, |(period, entry)| (*period, entry.id));

    let entries = page.apply(resolved.into_iter().map(|(_, entry)| entry).collect());

    Ok(CarLoanListing {
        entries,
        unresolved,
    })
}

/// Get the most recent statement, or `None` if there are no statements with a valid month.
///
/// # Errors
/// Returns an [Error::SqlError] if there is some SQL error.
pub fn latest_car_loan(connection: &Connection) -> Result<Option<CarLoanEntry>, Error> {
    let (resolved, _) = load_resolved(connection)?;

    Ok(newest(resolved))
}

/// Create the car loan table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_car_loan_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS car_loan (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            month TEXT NOT NULL,
            year INTEGER NOT NULL,
            principal_balance REAL NOT NULL,
            payoff_balance REAL NOT NULL,
            amount_paid REAL NOT NULL,
            principal REAL NOT NULL,
            finance REAL NOT NULL,
            ending_balance REAL NOT NULL,
            interest_ytd REAL
        );

        CREATE INDEX IF NOT EXISTS idx_car_loan_year_month ON car_loan(year, month);",
    )
}
