//! Monthly car loan statements.
//!
//! Statements are identified by a month name and a year instead of a date,
//! so they are ordered and filtered in memory after resolving the month.

mod core;
mod endpoints;
mod summary;

pub use core::{
    CarLoanEntry, CarLoanListing, NewCarLoanEntry, UnresolvedMonth, create_car_loan,
    create_car_loan_table, delete_car_loan, get_car_loan, latest_car_loan, list_car_loans,
    update_car_loan,
};
pub use endpoints::{
    car_loan_summary_endpoint, create_car_loan_endpoint, delete_car_loan_endpoint,
    get_car_loan_endpoint, list_car_loans_endpoint, update_car_loan_endpoint,
};
pub use summary::{CarLoanSummary, car_loan_summary};
