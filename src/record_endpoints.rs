//! JSON endpoints shared by the expense, income, saving and investment ledgers.
//!
//! Each handler is generic over a [DatedRecord] and is routed once per
//! ledger, e.g. `get(get_record_endpoint::<Income>)`.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use rusqlite::Connection;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    aggregation::{LedgerSummary, ledger_summary},
    app_state::lock_connection,
    database_id::DatabaseId,
    filters::DateRange,
    ledger::{DatedRecord, create_record, delete_record, get_record, list_records, update_record},
    pagination::{Page, PaginationConfig},
};

/// The state needed for the ledger endpoints.
#[derive(Debug, Clone)]
pub struct LedgerState {
    /// The database connection for reading and writing records.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The default page size for listings.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for LedgerState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// Deserialize the `start_date` and `end_date` query parameters.
///
/// Accepts an RFC 3339 timestamp (`2024-03-01T09:30:00+13:00`), a timestamp
/// without an offset (`2024-03-01T09:30:00`) or a bare date (`2024-03-01`).
/// The last two are read as UTC, a bare date as midnight.
pub(crate) mod query_timestamp {
    use serde::{Deserialize, Deserializer, de::Error as _};
    use time::{
        Date, OffsetDateTime, PrimitiveDateTime,
        format_description::{BorrowedFormatItem, well_known::Rfc3339},
        macros::format_description,
    };

    const NAIVE_DATE_TIME_FORMAT: &[BorrowedFormatItem] =
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]");
    const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

    pub(crate) fn parse(text: &str) -> Option<OffsetDateTime> {
        OffsetDateTime::parse(text, &Rfc3339)
            .ok()
            .or_else(|| {
                PrimitiveDateTime::parse(text, NAIVE_DATE_TIME_FORMAT)
                    .ok()
                    .map(PrimitiveDateTime::assume_utc)
            })
            .or_else(|| {
                Date::parse(text, DATE_FORMAT)
                    .ok()
                    .map(|date| date.midnight().assume_utc())
            })
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(text) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };

        parse(&text).map(Some).ok_or_else(|| {
            D::Error::custom(format!(
                "invalid timestamp \"{text}\", expected e.g. 2024-03-01T00:00:00Z or 2024-03-01"
            ))
        })
    }
}

/// The query string for listing records by date.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DateQuery {
    /// The number of records to skip.
    pub skip: Option<u64>,
    /// The maximum number of records to return.
    pub limit: Option<u64>,
    /// Only include records on or after this instant.
    #[serde(default, deserialize_with = "query_timestamp::deserialize")]
    pub start_date: Option<OffsetDateTime>,
    /// Only include records on or before this instant.
    #[serde(default, deserialize_with = "query_timestamp::deserialize")]
    pub end_date: Option<OffsetDateTime>,
}

impl DateQuery {
    /// The requested page, falling back to `config` for the limit.
    pub fn page(&self, config: &PaginationConfig) -> Page {
        Page::from_params(self.skip, self.limit, config)
    }

    /// The requested date range.
    pub fn range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }
}

/// Convert `error` into a response, naming the missing record for [Error::NotFound].
pub(crate) fn error_response(error: Error, record_label: &str) -> Response {
    match error {
        Error::NotFound => (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": format!("{record_label} not found") })),
        )
            .into_response(),
        error => error.into_response(),
    }
}

/// The body returned after deleting a record.
pub(crate) fn deleted_response(record_label: &str) -> Json<Value> {
    Json(json!({ "message": format!("{record_label} deleted successfully") }))
}

/// A route handler for listing records, most recent first.
pub async fn list_records_endpoint<R>(
    State(state): State<LedgerState>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<R>>, Response>
where
    R: DatedRecord + Serialize,
{
    let label = R::LEDGER.record_label();
    let connection =
        lock_connection(&state.db_connection).map_err(|error| error_response(error, label))?;

    list_records(
        &query.range().predicate(),
        query.page(&state.pagination_config),
        &connection,
    )
    .map(Json)
    .map_err(|error| error_response(error, label))
}

/// A route handler for creating a record.
pub async fn create_record_endpoint<R>(
    State(state): State<LedgerState>,
    Json(input): Json<R::Input>,
) -> Result<Json<R>, Response>
where
    R: DatedRecord + Serialize,
    R::Input: DeserializeOwned + Send,
{
    let label = R::LEDGER.record_label();
    let connection =
        lock_connection(&state.db_connection).map_err(|error| error_response(error, label))?;

    create_record::<R>(input, &connection)
        .map(Json)
        .map_err(|error| error_response(error, label))
}

/// A route handler for getting a record by its ID.
pub async fn get_record_endpoint<R>(
    State(state): State<LedgerState>,
    Path(id): Path<DatabaseId>,
) -> Result<Json<R>, Response>
where
    R: DatedRecord + Serialize,
{
    let label = R::LEDGER.record_label();
    let connection =
        lock_connection(&state.db_connection).map_err(|error| error_response(error, label))?;

    get_record::<R>(id, &connection)
        .map(Json)
        .map_err(|error| error_response(error, label))
}

/// A route handler for replacing every field of a record.
pub async fn update_record_endpoint<R>(
    State(state): State<LedgerState>,
    Path(id): Path<DatabaseId>,
    Json(input): Json<R::Input>,
) -> Result<Json<R>, Response>
where
    R: DatedRecord + Serialize,
    R::Input: DeserializeOwned + Send,
{
    let label = R::LEDGER.record_label();
    let connection =
        lock_connection(&state.db_connection).map_err(|error| error_response(error, label))?;

    update_record::<R>(id, input, &connection)
        .map(Json)
        .map_err(|error| error_response(error, label))
}

/// A route handler for deleting a record.
pub async fn delete_record_endpoint<R>(
    State(state): State<LedgerState>,
    Path(id): Path<DatabaseId>,
) -> Result<Json<Value>, Response>
where
    R: DatedRecord,
{
    let label = R::LEDGER.record_label();
    let connection =
        lock_connection(&state.db_connection).map_err(|error| error_response(error, label))?;

    delete_record::<R>(id, &connection).map_err(|error| error_response(error, label))?;

    Ok(deleted_response(label))
}

/// A route handler for the totals of every record in a ledger.
///
/// The summary ignores the date range used by listings.
pub async fn summary_endpoint<R>(
    State(state): State<LedgerState>,
) -> Result<Json<LedgerSummary<R>>, Error>
where
    R: DatedRecord + Serialize,
{
    let connection = lock_connection(&state.db_connection)?;

    ledger_summary::<R>(&connection).map(Json)
}
