//! JSON endpoints for categories.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, Query, State},
    response::Response,
};
use rusqlite::Connection;
use serde_json::Value;

use crate::{
    AppState,
    app_state::lock_connection,
    category::{
        Category, CategoryId, NewCategory, create_category, delete_category, get_category,
        list_categories, update_category,
    },
    pagination::{PageQuery, PaginationConfig},
    record_endpoints::{deleted_response, error_response},
};

const CATEGORY_LABEL: &str = "Category";

/// The state needed for the category endpoints.
#[derive(Debug, Clone)]
pub struct CategoryState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The default page size when listing categories.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// A route handler for creating a category.
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    Json(new_category): Json<NewCategory>,
) -> Result<Json<Category>, Response> {
    let connection = lock_connection(&state.db_connection)
        .map_err(|error| error_response(error, CATEGORY_LABEL))?;

    create_category(new_category, &connection)
        .map(Json)
        .map_err(|error| error_response(error, CATEGORY_LABEL))
}

/// A route handler for listing categories alphabetically.
pub async fn list_categories_endpoint(
    State(state): State<CategoryState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<Category>>, Response> {
    let connection = lock_connection(&state.db_connection)
        .map_err(|error| error_response(error, CATEGORY_LABEL))?;

    list_categories(query.page(&state.pagination_config), &connection)
        .map(Json)
        .map_err(|error| error_response(error, CATEGORY_LABEL))
}

/// A route handler for getting a category by its ID.
///
/// Responds with 404 if the category does not exist.
pub async fn get_category_endpoint(
    State(state): State<CategoryState>,
    Path(category_id): Path<CategoryId>,
) -> Result<Json<Category>, Response> {
    let connection = lock_connection(&state.db_connection)
        .map_err(|error| error_response(error, CATEGORY_LABEL))?;

    get_category(category_id, &connection)
        .map(Json)
        .map_err(|error| error_response(error, CATEGORY_LABEL))
}

/// A route handler for replacing a category's name and description.
pub async fn update_category_endpoint(
    State(state): State<CategoryState>,
    Path(category_id): Path<CategoryId>,
    Json(new_category): Json<NewCategory>,
) -> Result<Json<Category>, Response> {
    let connection = lock_connection(&state.db_connection)
        .map_err(|error| error_response(error, CATEGORY_LABEL))?;

    update_category(category_id, new_category, &connection)
        .map(Json)
        .map_err(|error| error_response(error, CATEGORY_LABEL))
}

/// A route handler for deleting a category.
pub async fn delete_category_endpoint(
    State(state): State<CategoryState>,
    Path(category_id): Path<CategoryId>,
) -> Result<Json<Value>, Response> {
    let connection = lock_connection(&state.db_connection)
        .map_err(|error| error_response(error, CATEGORY_LABEL))?;

    delete_category(category_id, &connection)
        .map_err(|error| error_response(error, CATEGORY_LABEL))?;

    Ok(deleted_response(CATEGORY_LABEL))
}
