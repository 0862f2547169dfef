//! Database operations shared by every ledger whose records have a single timestamp.
//!
//! Expenses, income, savings and investments differ only in their columns and
//! validation, so each implements [DatedRecord] and the create, read, update,
//! delete and list operations are written once here.

use rusqlite::{Connection, OptionalExtension, Row, params_from_iter};
use time::{OffsetDateTime, UtcOffset};

use crate::{
    Error, aggregation::Ledger, database_id::DatabaseId, filters::Predicate,
    ordering::NEWEST_FIRST, pagination::Page,
};

/// A record stored in a table with an `id` primary key and a `date` timestamp column.
pub trait DatedRecord: Sized {
    /// The ledger this record belongs to.
    const LEDGER: Ledger;

    /// The columns read by [DatedRecord::map_row], in order.
    const COLUMNS: &'static str;

    /// The data needed to create or replace a record.
    type Input;

    /// Map a row selected with [DatedRecord::COLUMNS] to a record.
    fn map_row(row: &Row) -> Result<Self, rusqlite::Error>;

    /// Validate `input` and insert it as a new record.
    fn insert(input: Self::Input, connection: &Connection) -> Result<Self, Error>;

    /// Validate `input` and overwrite the record `id` with it.
    ///
    /// Returns [Error::NotFound] if there is no record with the ID `id`.
    fn replace(id: DatabaseId, input: Self::Input, connection: &Connection)
    -> Result<Self, Error>;

    /// Fill in data held outside the record's own table.
    fn load_related(_records: &mut [Self], _connection: &Connection) -> Result<(), Error> {
        Ok(())
    }
}

/// Convert `date` to UTC for storage.
///
/// Timestamps are stored as text, so they must share an offset for text
/// comparison to match chronological order.
pub(crate) fn stored_timestamp(date: OffsetDateTime) -> OffsetDateTime {
    date.to_offset(UtcOffset::UTC)
}

/// Create a new record.
///
/// # Errors
/// Returns a validation error if `input` is invalid, or an [Error::SqlError]
/// if there is some other SQL error. Nothing is written on error.
pub fn create_record<R: DatedRecord>(
    input: R::Input,
    connection: &Connection,
) -> Result<R, Error> {
    let record = R::insert(input, connection)?;
    tracing::debug!("Created a record in {}", R::LEDGER);

    Ok(record)
}

/// Retrieve a record by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a stored record,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_record<R: DatedRecord>(id: DatabaseId, connection: &Connection) -> Result<R, Error> {
    let mut record = connection
        .prepare(&format!(
            "SELECT {} FROM {} WHERE id = :id",
            R::COLUMNS,
            R::LEDGER.table()
        ))?
        .query_one(&[(":id", &id)], R::map_row)?;

    R::load_related(std::slice::from_mut(&mut record), connection)?;

    Ok(record)
}

/// Get the records that satisfy `predicate`, most recent first, windowed by `page`.
///
/// # Errors
/// Returns [Error::SqlError] if the query cannot be prepared or executed, or
/// if a row cannot be mapped to a record.
pub fn list_records<R: DatedRecord>(
    predicate: &Predicate,
    page: Page,
    connection: &Connection,
) -> Result<Vec<R>, Error> {
    let query = format!(
        "SELECT {} FROM {} {} {NEWEST_FIRST} {}",
        R::COLUMNS,
        R::LEDGER.table(),
        predicate.where_clause(),
        page.sql_clause(),
    );
    tracing::debug!("Listing {}: {query}", R::LEDGER);

    let mut records = connection
        .prepare(&query)?
        .query_map(params_from_iter(predicate.params()), R::map_row)?
        .collect::<Result<Vec<_>, _>>()?;

    R::load_related(&mut records, connection)?;

    Ok(records)
}

/// Replace every field of the record `id` with `input`.
///
/// # Errors
/// This function will return a:
/// - validation error if `input` is invalid,
/// - [Error::NotFound] if `id` does not refer to a stored record,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_record<R: DatedRecord>(
    id: DatabaseId,
    input: R::Input,
    connection: &Connection,
) -> Result<R, Error> {
    R::replace(id, input, connection)
}

/// Delete the record `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a stored record,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_record<R: DatedRecord>(id: DatabaseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        &format!("DELETE FROM {} WHERE id = ?1", R::LEDGER.table()),
        [id],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    tracing::debug!("Deleted record {id} from {}", R::LEDGER);

    Ok(())
}

/// Get the most recent record, or `None` if there are no records.
///
/// # Errors
/// Returns an [Error::SqlError] if there is some SQL error.
pub fn latest_record<R: DatedRecord>(connection: &Connection) -> Result<Option<R>, Error> {
    let latest = connection
        .prepare(&format!(
            "SELECT {} FROM {} {NEWEST_FIRST} LIMIT 1",
            R::COLUMNS,
            R::LEDGER.table()
        ))?
        .query_row([], R::map_row)
        .optional()?;

    match latest {
        Some(mut record) => {
            R::load_related(std::slice::from_mut(&mut record), connection)?;
            Ok(Some(record))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::{Duration, macros::datetime};

    use crate::{
        Error, Investment, Saving,
        db::initialize,
        filters::DateRange,
        pagination::Page,
    };

    use super::{
        create_record, delete_record, get_record, latest_record, list_records, update_record,
    };

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    #[test]
    fn get_missing_record_is_not_found() {
        let connection = get_test_connection();

        assert_eq!(get_record::<Saving>(42, &connection), Err(Error::NotFound));
    }

    #[test]
    fn lists_most_recent_first() {
        let connection = get_test_connection();
        let start = datetime!(2024-03-01 0:00 UTC);
        for day in 0..5 {
            create_record::<Saving>(
                Saving::build(10.0 + day as f64, start + Duration::days(day)),
                &connection,
            )
            .unwrap();
        }

        let got: Vec<Saving> =
            list_records(&DateRange::default().predicate(), Page::default(), &connection).unwrap();

        let dates: Vec<_> = got.iter().map(|saving| saving.date).collect();
        let mut want = dates.clone();
        want.sort_by(|a, b| b.cmp(a));
        assert_eq!(dates, want);
        assert_eq!(got.len(), 5);
    }

    #[test]
    fn equal_dates_are_ordered_by_descending_id() {
        let connection = get_test_connection();
        let date = datetime!(2024-03-01 12:00 UTC);
        let ids: Vec<_> = (1..=3)
            .map(|i| {
                create_record::<Investment>(Investment::build(i as f64, date), &connection)
                    .unwrap()
                    .id
            })
            .collect();

        let got: Vec<Investment> =
            list_records(&DateRange::default().predicate(), Page::default(), &connection).unwrap();

        let got_ids: Vec<_> = got.iter().map(|investment| investment.id).collect();
        assert_eq!(got_ids, ids.into_iter().rev().collect::<Vec<_>>());
    }

    #[test]
    fn date_range_is_inclusive() {
        let connection = get_test_connection();
        let start = datetime!(2024-03-01 0:00 UTC);
        for day in 0..10 {
            create_record::<Saving>(Saving::build(1.0, start + Duration::days(day)), &connection)
                .unwrap();
        }

        let range = DateRange::new(
            Some(start + Duration::days(2)),
            Some(start + Duration::days(5)),
        );
        let got: Vec<Saving> = list_records(&range.predicate(), Page::default(), &connection).unwrap();

        assert_eq!(got.len(), 4);
        let (first, last) = (start + Duration::days(2), start + Duration::days(5));
        assert!(got.iter().all(|saving| first <= saving.date && saving.date <= last));
    }

    #[test]
    fn range_bounds_in_other_offsets_compare_as_instants() {
        let connection = get_test_connection();
        create_record::<Saving>(
            Saving::build(1.0, datetime!(2024-03-01 10:00 UTC)),
            &connection,
        )
        .unwrap();

        // 11:00 at +02:00 is 09:00 UTC, so the saving is after the start.
        let range = DateRange::new(Some(datetime!(2024-03-01 11:00 +02:00)), None);
        let got: Vec<Saving> = list_records(&range.predicate(), Page::default(), &connection).unwrap();

        assert_eq!(got.len(), 1);
    }

    #[test]
    fn inverted_range_is_empty_not_an_error() {
        let connection = get_test_connection();
        create_record::<Saving>(
            Saving::build(1.0, datetime!(2024-03-10 0:00 UTC)),
            &connection,
        )
        .unwrap();

        let range = DateRange::new(
            Some(datetime!(2024-04-01 0:00 UTC)),
            Some(datetime!(2024-03-01 0:00 UTC)),
        );
        let got: Vec<Saving> = list_records(&range.predicate(), Page::default(), &connection).unwrap();

        assert!(got.is_empty());
    }

    #[test]
    fn page_is_applied_after_ordering() {
        let connection = get_test_connection();
        let start = datetime!(2024-03-01 0:00 UTC);
        for day in 0..10 {
            create_record::<Saving>(
                Saving::build((day + 1) as f64, start + Duration::days(day)),
                &connection,
            )
            .unwrap();
        }

        let got: Vec<Saving> = list_records(
            &DateRange::default().predicate(),
            Page::new(2, 3),
            &connection,
        )
        .unwrap();

        let amounts: Vec<_> = got.iter().map(|saving| saving.amount).collect();
        assert_eq!(amounts, vec![8.0, 7.0, 6.0]);
    }

    #[test]
    fn update_replaces_every_field() {
        let connection = get_test_connection();
        let saving = create_record::<Saving>(
            Saving::build(1.0, datetime!(2024-03-01 0:00 UTC)).description("Rainy day"),
            &connection,
        )
        .unwrap();

        let updated = update_record::<Saving>(
            saving.id,
            Saving::build(2.0, datetime!(2024-03-02 0:00 UTC)),
            &connection,
        )
        .unwrap();

        assert_eq!(updated.id, saving.id);
        assert_eq!(updated.amount, 2.0);
        assert_eq!(updated.description, None);
        assert_eq!(get_record::<Saving>(saving.id, &connection), Ok(updated));
    }

    #[test]
    fn update_missing_record_is_not_found() {
        let connection = get_test_connection();

        let got = update_record::<Saving>(
            7,
            Saving::build(2.0, datetime!(2024-03-02 0:00 UTC)),
            &connection,
        );

        assert_eq!(got, Err(Error::NotFound));
    }

    #[test]
    fn delete_removes_record() {
        let connection = get_test_connection();
        let saving = create_record::<Saving>(
            Saving::build(1.0, datetime!(2024-03-01 0:00 UTC)),
            &connection,
        )
        .unwrap();

        assert_eq!(delete_record::<Saving>(saving.id, &connection), Ok(()));
        assert_eq!(
            get_record::<Saving>(saving.id, &connection),
            Err(Error::NotFound)
        );
        assert_eq!(
            delete_record::<Saving>(saving.id, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn latest_of_empty_ledger_is_none() {
        let connection = get_test_connection();

        assert_eq!(latest_record::<Investment>(&connection), Ok(None));
    }

    #[test]
    fn latest_is_most_recent() {
        let connection = get_test_connection();
        create_record::<Investment>(
            Investment::build(5.0, datetime!(2024-03-05 0:00 UTC)),
            &connection,
        )
        .unwrap();
        let newest = create_record::<Investment>(
            Investment::build(1.0, datetime!(2024-04-01 0:00 UTC)),
            &connection,
        )
        .unwrap();
        create_record::<Investment>(
            Investment::build(3.0, datetime!(2024-02-01 0:00 UTC)),
            &connection,
        )
        .unwrap();

        assert_eq!(latest_record::<Investment>(&connection), Ok(Some(newest)));
    }
}
