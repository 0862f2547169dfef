//! Ledgerly is a backend for tracking personal finances.
//!
//! It records expenses (grouped by categories), income, savings, investments
//! and the monthly statements of a car loan, and serves them as JSON over
//! HTTP. Listings can be filtered by date range (and by category for
//! expenses), and each ledger has a summary of its totals.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod aggregation;
mod amount;
mod app_state;
mod car_loan;
mod category;
mod database_id;
mod db;
mod deposit;
mod endpoints;
mod expense;
mod filters;
mod income;
mod ledger;
mod logging;
mod month;
mod not_found;
mod ordering;
mod pagination;
mod record_endpoints;
mod routing;

pub use aggregation::{Ledger, LedgerSummary, SumField, ledger_summary, sum_field};
pub use app_state::AppState;
pub use car_loan::{
    CarLoanEntry, CarLoanListing, CarLoanSummary, NewCarLoanEntry, UnresolvedMonth,
    car_loan_summary, create_car_loan, delete_car_loan, get_car_loan, latest_car_loan,
    list_car_loans, update_car_loan,
};
pub use category::{
    Category, CategoryId, CategoryName, NewCategory, create_category, delete_category,
    get_category, list_categories, update_category,
};
pub use database_id::DatabaseId;
pub use db::initialize as initialize_db;
pub use deposit::{
    Deposit, DepositKind, Investment, InvestmentKind, NewDeposit, NewInvestment, NewSaving, Saving,
    SavingKind,
};
pub use expense::{Expense, NewExpense};
pub use filters::{DateRange, ExpenseFilter, PeriodRange, Predicate};
pub use income::{Income, NewIncome};
pub use ledger::{
    DatedRecord, create_record, delete_record, get_record, latest_record, list_records,
    update_record,
};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use month::{LoanPeriod, month_name, month_ordinal};
pub use pagination::{Page, PaginationConfig};
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Could not listen for the ctrl+c signal: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!("Could not listen for the terminate signal: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested record was not found.
    ///
    /// Returned by get, update and delete operations when the ID does not
    /// refer to a stored record. Listing operations never return this error,
    /// an empty listing is a valid result.
    #[error("the requested resource could not be found")]
    NotFound,

    /// A car loan month was not one of the twelve English month names.
    ///
    /// Month names are case-sensitive and must be written in full, e.g.
    /// "June" rather than "Jun" or "june".
    #[error("\"{0}\" is not a recognised month name")]
    UnknownMonth(String),

    /// An amount that must be strictly positive was zero or negative.
    #[error("the amount must be greater than zero, got {0}")]
    NonPositiveAmount(f64),

    /// An amount was NaN or infinite.
    #[error("the amount must be a finite number")]
    NonFiniteAmount,

    /// An empty string was used to create a category name.
    #[error("category name cannot be empty")]
    EmptyCategoryName,

    /// The specified category name already exists in the database.
    #[error("the category \"{0}\" already exists")]
    DuplicateCategoryName(String),

    /// An expense referred to a category ID that does not exist.
    #[error("the category ID {0} does not refer to a valid category")]
    InvalidCategory(CategoryId),

    /// A sum was requested over a column that the ledger does not have.
    #[error("the {0} ledger has no field \"{1}\"")]
    UnknownField(Ledger, SumField),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::DuplicateCategoryName(_) => StatusCode::CONFLICT,
            Error::UnknownMonth(_)
            | Error::NonPositiveAmount(_)
            | Error::NonFiniteAmount
            | Error::EmptyCategoryName
            | Error::InvalidCategory(_)
            | Error::UnknownField(_, _) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::SqlError(_) | Error::DatabaseLockError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let detail = match self {
            // Any errors that are not handled above are not intended to be shown to the client.
            Error::SqlError(_) | Error::DatabaseLockError => {
                tracing::error!("An unexpected error occurred: {}", self);
                "An unexpected error occurred, check the server logs for more details.".to_owned()
            }
            error => error.to_string(),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
