//! The expense listing endpoint.
//!
//! Creating, reading, updating and deleting single expenses goes through the
//! shared ledger endpoints, only the listing has an extra category filter.

use axum::{Json, extract::State, response::Response};
use axum_extra::extract::Query;
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    aggregation::Ledger,
    app_state::lock_connection,
    category::CategoryId,
    expense::Expense,
    filters::{DateRange, ExpenseFilter},
    ledger::list_records,
    pagination::Page,
    record_endpoints::{LedgerState, error_response, query_timestamp},
};

/// The query string for listing expenses.
///
/// `category_ids` may be repeated, e.g. `?category_ids=1&category_ids=3`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExpenseQuery {
    /// The number of expenses to skip.
    pub skip: Option<u64>,
    /// The maximum number of expenses to return.
    pub limit: Option<u64>,
    /// Only include expenses on or after this instant.
    #[serde(default, deserialize_with = "query_timestamp::deserialize")]
    pub start_date: Option<OffsetDateTime>,
    /// Only include expenses on or before this instant.
    #[serde(default, deserialize_with = "query_timestamp::deserialize")]
    pub end_date: Option<OffsetDateTime>,
    /// Only include expenses in any of these categories.
    #[serde(default)]
    pub category_ids: Vec<CategoryId>,
}

impl ExpenseQuery {
    fn filter(&self) -> ExpenseFilter {
        ExpenseFilter {
            range: DateRange::new(self.start_date, self.end_date),
            category_ids: self.category_ids.clone(),
        }
    }
}

/// A route handler for listing expenses, most recent first.
pub async fn list_expenses_endpoint(
    State(state): State<LedgerState>,
    Query(query): Query<ExpenseQuery>,
) -> Result<Json<Vec<Expense>>, Response> {
    let label = Ledger::Expense.record_label();
    let connection =
        lock_connection(&state.db_connection).map_err(|error| error_response(error, label))?;
    let page = Page::from_params(query.skip, query.limit, &state.pagination_config);

    list_records(&query.filter().predicate(), page, &connection)
        .map(Json)
        .map_err(|error| error_response(error, label))
}
