//! JSON endpoints for car loan statements.

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue},
    response::Response,
};
use axum_extra::extract::Query;
use serde_json::Value;

use crate::{
    Error,
    aggregation::Ledger,
    app_state::lock_connection,
    car_loan::{
        CarLoanEntry, CarLoanSummary, NewCarLoanEntry, car_loan_summary, create_car_loan,
        delete_car_loan, get_car_loan, list_car_loans, update_car_loan,
    },
    database_id::DatabaseId,
    filters::PeriodRange,
    record_endpoints::{DateQuery, LedgerState, deleted_response, error_response},
};

/// Lists the IDs of stored statements left out of a listing because their
/// month is unrecognised, e.g. `4,7`. Absent when every month resolved.
pub const UNRESOLVED_IDS_HEADER: &str = "x-unresolved-ids";

fn respond(error: Error) -> Response {
    error_response(error, Ledger::CarLoan.record_label())
}

/// A route handler for listing car loan statements, most recent first.
///
/// `start_date` and `end_date` are reduced to their month and year, so a
/// start date anywhere in June 2023 includes the June 2023 statement.
/// Statements with an unrecognised month are left out and their IDs are
/// reported in the [UNRESOLVED_IDS_HEADER] header.
pub async fn list_car_loans_endpoint(
    State(state): State<LedgerState>,
    Query(query): Query<DateQuery>,
) -> Result<(HeaderMap, Json<Vec<CarLoanEntry>>), Response> {
    let connection = lock_connection(&state.db_connection).map_err(respond)?;

    let listing = list_car_loans(
        PeriodRange::from_dates(query.range()),
        query.page(&state.pagination_config),
        &connection,
    )
    .map_err(respond)?;

    let mut headers = HeaderMap::new();
    if !listing.unresolved.is_empty() {
        let ids = listing
            .unresolved
            .iter()
            .map(|unresolved| unresolved.id.to_string())
            .collect::<Vec<_>>()
            .join(",");

        if let Ok(value) = HeaderValue::from_str(&ids) {
            headers.insert(UNRESOLVED_IDS_HEADER, value);
        }
    }

    Ok((headers, Json(listing.entries)))
}

/// A route handler for creating a car loan statement.
pub async fn create_car_loan_endpoint(
    State(state): State<LedgerState>,
    Json(entry): Json<NewCarLoanEntry>,
) -> Result<Json<CarLoanEntry>, Response> {
    let connection = lock_connection(&state.db_connection).map_err(respond)?;

    create_car_loan(entry, &connection).map(Json).map_err(respond)
}

/// A route handler for getting a car loan statement by its ID.
pub async fn get_car_loan_endpoint(
    State(state): State<LedgerState>,
    Path(id): Path<DatabaseId>,
) -> Result<Json<CarLoanEntry>, Response> {
    let connection = lock_connection(&state.db_connection).map_err(respond)?;

    get_car_loan(id, &connection).map(Json).map_err(respond)
}

/// A route handler for replacing every field of a car loan statement.
pub async fn update_car_loan_endpoint(
    State(state): State<LedgerState>,
    Path(id): Path<DatabaseId>,
    Json(entry): Json<NewCarLoanEntry>,
) -> Result<Json<CarLoanEntry>, Response> {
    let connection = lock_connection(&state.db_connection).map_err(respond)?;

    update_car_loan(id, entry, &connection)
        .map(Json)
        .map_err(respond)
}

/// A route handler for deleting a car loan statement.
pub async fn delete_car_loan_endpoint(
    State(state): State<LedgerState>,
    Path(id): Path<DatabaseId>,
) -> Result<Json<Value>, Response> {
    let connection = lock_connection(&state.db_connection).map_err(respond)?;

    delete_car_loan(id, &connection).map_err(respond)?;

    Ok(deleted_response(Ledger::CarLoan.record_label()))
}

/// A route handler for the car loan totals over every statement.
pub async fn car_loan_summary_endpoint(
    State(state): State<LedgerState>,
) -> Result<Json<CarLoanSummary>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    car_loan_summary(&connection).map(Json)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};

    use crate::{
        AppState, CarLoanEntry, build_router,
        car_loan::core::test_utils::{insert_raw_month, statement},
        endpoints::{self, format_endpoint},
        pagination::PaginationConfig,
    };

    use super::UNRESOLVED_IDS_HEADER;

    fn get_test_state() -> AppState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");

        AppState::new(connection, PaginationConfig::default()).expect("Could not create app state")
    }

    fn get_test_server() -> TestServer {
        TestServer::try_new(build_router(get_test_state())).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn list_reports_unresolved_months_in_header() {
        let state = get_test_state();
        let bad_ids = {
            let connection = state.db_connection.lock().unwrap();
            [
                insert_raw_month("Jun", 2023, &connection),
                insert_raw_month("Sept", 2023, &connection),
            ]
        };
        let server =
            TestServer::try_new(build_router(state)).expect("Could not create test server.");
        server
            .post(endpoints::CAR_LOANS)
            .json(&statement("June", 2023, 300.0, 40.0))
            .await
            .assert_status_ok();

        let response = server.get(endpoints::CAR_LOANS).await;

        response.assert_status_ok();
        assert_eq!(response.json::<Vec<CarLoanEntry>>().len(), 1);
        let header = response.headers().get(UNRESOLVED_IDS_HEADER).unwrap();
        assert_eq!(
            header.to_str().unwrap(),
            format!("{},{}", bad_ids[0], bad_ids[1])
        );
    }

    #[tokio::test]
    async fn list_without_unresolved_months_has_no_header() {
        let server = get_test_server();
        server
            .post(endpoints::CAR_LOANS)
            .json(&statement("June", 2023, 300.0, 40.0))
            .await
            .assert_status_ok();

        let response = server.get(endpoints::CAR_LOANS).await;

        response.assert_status_ok();
        assert!(response.headers().get(UNRESOLVED_IDS_HEADER).is_none());
    }

    #[tokio::test]
    async fn list_reduces_dates_to_months() {
        let server = get_test_server();
        for month in ["May", "June", "July"] {
            server
                .post(endpoints::CAR_LOANS)
                .json(&statement(month, 2023, 300.0, 40.0))
                .await
                .assert_status_ok();
        }

        let got = server
            .get(endpoints::CAR_LOANS)
            .add_query_param("start_date", "2023-06-15T00:00:00Z")
            .await
            .json::<Vec<CarLoanEntry>>();

        let months: Vec<_> = got.iter().map(|entry| entry.month.as_str()).collect();
        assert_eq!(months, vec!["July", "June"]);
    }

    #[tokio::test]
    async fn invalid_month_is_unprocessable() {
        let server = get_test_server();

        let response = server
            .post(endpoints::CAR_LOANS)
            .json(&statement("june", 2023, 300.0, 40.0))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response.json::<Value>()["detail"].is_string());
    }

    #[tokio::test]
    async fn missing_statement_is_not_found() {
        let server = get_test_server();
        let path = format_endpoint(endpoints::CAR_LOAN, 9);

        let response = server.get(&path).await;

        response.assert_status_not_found();
        response.assert_json(&json!({ "detail": "Car loan entry not found" }));
        server.delete(&path).await.assert_status_not_found();
    }

    #[tokio::test]
    async fn delete_responds_with_message() {
        let server = get_test_server();
        let created = server
            .post(endpoints::CAR_LOANS)
            .json(&statement("June", 2023, 300.0, 40.0))
            .await
            .json::<CarLoanEntry>();

        let response = server
            .delete(&format_endpoint(endpoints::CAR_LOAN, created.id))
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({ "message": "Car loan entry deleted successfully" }));
    }

    #[tokio::test]
    async fn summary_of_empty_ledger_is_zero() {
        let server = get_test_server();

        let response = server.get(endpoints::CAR_LOAN_SUMMARY).await;

        response.assert_status_ok();
        response.assert_json(&json!({
            "latest_balance": 0.0,
            "total_interest_paid": 0.0,
            "total_principal_paid": 0.0,
            "total_payments": 0.0,
            "unresolved": [],
        }));
    }
}
