//! Money spent, grouped by categories.

mod core;
mod endpoints;

pub use core::{Expense, NewExpense, create_expense_tables};
pub use endpoints::list_expenses_endpoint;
