//! Set up the application's SQLite database.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error,
    car_loan::create_car_loan_table,
    category::create_category_table,
    deposit::{InvestmentKind, SavingKind, create_deposit_table},
    expense::create_expense_tables,
    income::create_income_table,
};

/// Create the tables and indexes for every ledger if they do not already exist.
///
/// Also enables foreign key enforcement on `connection`, which is required
/// for removing category links when an expense or category is deleted.
///
/// # Errors
/// Returns an [Error::SqlError] if any of the tables cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // Has no effect inside a transaction, so it must come first.
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_category_table(&transaction)?;
    create_expense_tables(&transaction)?;
    create_income_table(&transaction)?;
    create_deposit_table::<SavingKind>(&transaction)?;
    create_deposit_table::<InvestmentKind>(&transaction)?;
    create_car_loan_table(&transaction)?;

    transaction.commit()?;

    tracing::debug!("Database initialised");

    Ok(())
}
