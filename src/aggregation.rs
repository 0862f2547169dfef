//! Summaries computed over every record of a ledger.
//!
//! Summaries are never filtered by date, unlike listings.

use std::fmt::Display;

use rusqlite::Connection;
use serde::Serialize;

use crate::{
    Error,
    ledger::{DatedRecord, latest_record},
};

/// The record tables in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ledger {
    /// Money spent, see [crate::Expense].
    Expense,
    /// Money earned, see [crate::Income].
    Income,
    /// Money put into savings, see [crate::Saving].
    Saving,
    /// Money invested, see [crate::Investment].
    Investment,
    /// Monthly car loan statements, see [crate::CarLoanEntry].
    CarLoan,
}

impl Ledger {
    /// The name of the table that stores this ledger.
    pub fn table(&self) -> &'static str {
        match self {
            Ledger::Expense => "expense",
            Ledger::Income => "income",
            Ledger::Saving => "saving",
            Ledger::Investment => "investment",
            Ledger::CarLoan => "car_loan",
        }
    }

    /// A human readable name for a single record, e.g. for response messages.
    pub fn record_label(&self) -> &'static str {
        match self {
            Ledger::Expense => "Expense",
            Ledger::Income => "Income",
            Ledger::Saving => "Saving entry",
            Ledger::Investment => "Investment entry",
            Ledger::CarLoan => "Car loan entry",
        }
    }
}

impl Display for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.table())
    }
}

/// The numeric columns that can be summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SumField {
    /// `amount` of an expense, income, saving or investment.
    Amount,
    /// Car loan principal balance before the payment.
    PrincipalBalance,
    /// Car loan payoff balance.
    PayoffBalance,
    /// Car loan payment amount.
    AmountPaid,
    /// Car loan principal portion of the payment.
    Principal,
    /// Car loan interest portion of the payment.
    Finance,
    /// Car loan balance after the payment.
    EndingBalance,
    /// Car loan interest paid year-to-date, may be null.
    InterestYtd,
}

impl SumField {
    /// The column name.
    pub fn column(&self) -> &'static str {
        match self {
            SumField::Amount => "amount",
            SumField::PrincipalBalance => "principal_balance",
            SumField::PayoffBalance => "payoff_balance",
            SumField::AmountPaid => "amount_paid",
            SumField::Principal => "principal",
            SumField::Finance => "finance",
            SumField::EndingBalance => "ending_balance",
            SumField::InterestYtd => "interest_ytd",
        }
    }

    /// Whether `ledger` has this column.
    pub fn belongs_to(&self, ledger: Ledger) -> bool {
        match self {
            SumField::Amount => ledger != Ledger::CarLoan,
            _ => ledger == Ledger::CarLoan,
        }
    }
}

impl Display for SumField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.column())
    }
}

/// Sum the column `field` over every record in `ledger`.
///
/// Null values are skipped and an empty ledger sums to zero.
///
/// # Errors
/// Returns:
/// - [Error::UnknownField] if `ledger` has no column `field`,
/// - or [Error::SqlError] if there is some SQL error.
pub fn sum_field(ledger: Ledger, field: SumField, connection: &Connection) -> Result<f64, Error> {
    if !field.belongs_to(ledger) {
        return Err(Error::UnknownField(ledger, field));
    }

    // TOTAL ignores nulls and returns 0.0 rather than null for no rows.
    let query = format!("SELECT TOTAL({}) FROM {}", field.column(), ledger.table());

    connection
        .query_row(&query, [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// The totals for a ledger whose records each have a single amount.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerSummary<R> {
    /// The sum of every record's amount.
    pub total: f64,
    /// The number of records.
    pub count: u64,
    /// The most recent record, if any.
    pub latest: Option<R>,
}

/// Summarise every record of type `R` from a single snapshot of the database.
///
/// # Errors
/// Returns an [Error::SqlError] if there is some SQL error.
pub fn ledger_summary<R: DatedRecord>(
    connection: &Connection,
) -> Result<LedgerSummary<R>, Error> {
    let snapshot = connection.unchecked_transaction()?;

    let total = sum_field(R::LEDGER, SumField::Amount, &snapshot)?;
    let count: i64 = snapshot.query_row(
        &format!("SELECT COUNT(id) FROM {}", R::LEDGER.table()),
        [],
        |row| row.get(0),
    )?;
    let latest = latest_record::<R>(&snapshot)?;

    snapshot.commit()?;

    Ok(LedgerSummary {
        total,
        // COUNT is never negative.
        count: count.unsigned_abs(),
        latest,
    })
}


#[cfg(test)]
mod ledger_summary_tests {
    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{Income, Saving, db::initialize, ledger::create_record};

    use super::ledger_summary;

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    #[test]
    fn empty_ledger_has_no_latest_record() {
        let connection = get_test_connection();

        let summary = ledger_summary::<Saving>(&connection).unwrap();

        assert_eq!(summary.total, 0.0);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.latest, None);
    }

    #[test]
    fn summarises_every_record() {
        let connection = get_test_connection();
        create_record::<Income>(
            Income::build(1000.0, datetime!(2024-01-15 9:00 UTC)),
            &connection,
        )
        .unwrap();
        let latest = create_record::<Income>(
            Income::build(250.0, datetime!(2024-02-15 9:00 UTC)).source("Freelance"),
            &connection,
        )
        .unwrap();

        let summary = ledger_summary::<Income>(&connection).unwrap();

        assert_eq!(summary.total, 1250.0);
        assert_eq!(summary.count, 2);
        assert_eq!(summary.latest, Some(latest));
    }
}
