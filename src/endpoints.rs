//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/expenses/{expense_id}', use [format_endpoint].

/// The root route which returns a welcome message.
pub const ROOT: &str = "/";

/// The route to list and create expenses.
pub const EXPENSES: &str = "/expenses";
/// The route to access a single expense.
pub const EXPENSE: &str = "/expenses/{expense_id}";
/// The route for the expense summary.
pub const EXPENSE_SUMMARY: &str = "/expenses/stats/summary";

/// The route to list and create categories.
pub const CATEGORIES: &str = "/categories";
/// The route to access a single category.
pub const CATEGORY: &str = "/categories/{category_id}";

/// The route to list and create income.
pub const INCOMES: &str = "/incomes";
/// The route to access a single income.
pub const INCOME: &str = "/incomes/{income_id}";
/// The route for the income summary.
pub const INCOME_SUMMARY: &str = "/incomes/stats/summary";

/// The route to list and create saving entries.
pub const SAVINGS: &str = "/savings";
/// The route to access a single saving entry.
pub const SAVING: &str = "/savings/{saving_id}";
/// The route for the savings summary.
pub const SAVING_SUMMARY: &str = "/savings/stats/summary";

/// The route to list and create investment entries.
pub const INVESTMENTS: &str = "/investments";
/// The route to access a single investment entry.
pub const INVESTMENT: &str = "/investments/{investment_id}";
/// The route for the investment summary.
pub const INVESTMENT_SUMMARY: &str = "/investments/stats/summary";

/// The route to list and create car loan entries.
pub const CAR_LOANS: &str = "/car-loans";
/// The route to access a single car loan entry.
pub const CAR_LOAN: &str = "/car-loans/{car_loan_id}";
/// The route for the car loan summary.
pub const CAR_LOAN_SUMMARY: &str = "/car-loans/stats/summary";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter starts with a left brace and ends with a right brace, e.g.
/// '{expense_id}' in '/expenses/{expense_id}'. Only the first parameter is
/// replaced.
///
/// If no parameter is found in `endpoint_path`, the original `endpoint_path`
/// is returned.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{id}{}",
        &endpoint_path[..param_start],
        &endpoint_path[param_end..]
    )
}
