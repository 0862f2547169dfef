//! Application router configuration.

use axum::{Json, Router, routing::get};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;

use crate::{
    AppState, Expense, Income, Investment, Saving,
    car_loan::{
        car_loan_summary_endpoint, create_car_loan_endpoint, delete_car_loan_endpoint,
        get_car_loan_endpoint, list_car_loans_endpoint, update_car_loan_endpoint,
    },
    category::{
        create_category_endpoint, delete_category_endpoint, get_category_endpoint,
        list_categories_endpoint, update_category_endpoint,
    },
    endpoints,
    expense::list_expenses_endpoint,
    ledger::DatedRecord,
    not_found::get_404_not_found,
    record_endpoints::{
        create_record_endpoint, delete_record_endpoint, get_record_endpoint,
        list_records_endpoint, summary_endpoint, update_record_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// Cross-origin requests are allowed from any origin so that a browser
/// frontend served from another host can call the API.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(get_welcome))
        .route(
            endpoints::EXPENSES,
            get(list_expenses_endpoint).post(create_record_endpoint::<Expense>),
        )
        .route(
            endpoints::EXPENSE,
            get(get_record_endpoint::<Expense>)
                .put(update_record_endpoint::<Expense>)
                .delete(delete_record_endpoint::<Expense>),
        )
        .route(endpoints::EXPENSE_SUMMARY, get(summary_endpoint::<Expense>))
        .route(
            endpoints::CATEGORIES,
            get(list_categories_endpoint).post(create_category_endpoint),
        )
        .route(
            endpoints::CATEGORY,
            get(get_category_endpoint)
                .put(update_category_endpoint)
                .delete(delete_category_endpoint),
        )
        .merge(ledger_routes::<Income>(
            endpoints::INCOMES,
            endpoints::INCOME,
            endpoints::INCOME_SUMMARY,
        ))
        .merge(ledger_routes::<Saving>(
            endpoints::SAVINGS,
            endpoints::SAVING,
            endpoints::SAVING_SUMMARY,
        ))
        .merge(ledger_routes::<Investment>(
            endpoints::INVESTMENTS,
            endpoints::INVESTMENT,
            endpoints::INVESTMENT_SUMMARY,
        ))
        .route(
            endpoints::CAR_LOANS,
            get(list_car_loans_endpoint).post(create_car_loan_endpoint),
        )
        .route(
            endpoints::CAR_LOAN,
            get(get_car_loan_endpoint)
                .put(update_car_loan_endpoint)
                .delete(delete_car_loan_endpoint),
        )
        .route(endpoints::CAR_LOAN_SUMMARY, get(car_loan_summary_endpoint))
        .fallback(get_404_not_found)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// The list, create, read, update, delete and summary routes for a ledger without categories.
fn ledger_routes<R>(collection: &str, item: &str, summary: &str) -> Router<AppState>
where
    R: DatedRecord + Serialize + Send + 'static,
    R::Input: DeserializeOwned + Send + 'static,
{
    Router::new()
        .route(
            collection,
            get(list_records_endpoint::<R>).post(create_record_endpoint::<R>),
        )
        .route(
            item,
            get(get_record_endpoint::<R>)
                .put(update_record_endpoint::<R>)
                .delete(delete_record_endpoint::<R>),
        )
        .route(summary, get(summary_endpoint::<R>))
}

async fn get_welcome() -> Json<Value> {
    Json(json!({ "message": "Welcome to Ledgerly" }))
}
