//! Totals over every car loan statement.

use rusqlite::Connection;
use serde::Serialize;

use crate::{
    Error,
    aggregation::{Ledger, SumField, sum_field},
    car_loan::core::{UnresolvedMonth, load_resolved, newest},
};

/// The state of the car loan across every statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarLoanSummary {
    /// The ending balance of the most recent statement, zero if there are none.
    pub latest_balance: f64,
    /// The sum of the interest paid on every statement.
    pub total_interest_paid: f64,
    /// The sum of the principal paid on every statement.
    pub total_principal_paid: f64,
    /// The sum of every payment.
    pub total_payments: f64,
    /// Statements that could not be considered for the latest balance.
    ///
    /// They are still included in the totals.
    pub unresolved: Vec<UnresolvedMonth>,
}

/// Summarise every car loan statement from a single snapshot of the database.
///
/// The summary is never filtered by date.
///
/// # Errors
/// Returns an [Error::SqlError] if there is some SQL error.
pub fn car_loan_summary(connection: &Connection) -> Result<CarLoanSummary, Error> {
    let snapshot = connection.unchecked_transaction()?;

    let (resolved, unresolved) = load_resolved(&snapshot)?;
    let latest_balance = newest(resolved)
        .map(|entry| entry.ending_balance)
        .unwrap_or(0.0);
    let total_interest_paid = sum_field(Ledger::CarLoan, SumField::Finance, &snapshot)?;
    let total_principal_paid = sum_field(Ledger::CarLoan, SumField::Principal, &snapshot)?;
    let total_payments = sum_field(Ledger::CarLoan, SumField::AmountPaid, &snapshot)?;

    snapshot.commit()?;

    Ok(CarLoanSummary {
        latest_balance,
        total_interest_paid,
        total_principal_paid,
        total_payments,
        unresolved,
    })
}
