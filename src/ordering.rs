//! The order records are listed in.
//!
//! Every ledger lists its most recent records first. Records that happened at
//! the same time are ordered by descending ID so that repeated queries return
//! the same order.

use std::cmp::Ordering;

use crate::{database_id::DatabaseId, month::LoanPeriod};

/// `ORDER BY` clause for ledgers with a `date` column.
pub(crate) const NEWEST_FIRST: &str = "ORDER BY date DESC, id DESC";

/// Compare two car loan statements so that the most recent comes first.
///
/// Statements in the same month are simultaneous, the statement with the
/// higher ID comes first.
pub(crate) fn newest_period_first(
    (a_period, a_id): (LoanPeriod, DatabaseId),
    (b_period, b_id): (LoanPeriod, DatabaseId),
) -> Ordering {
    b_period.cmp(&a_period).then(b_id.cmp(&a_id))
}

/// Sort items keyed by (period, id) so that the most recent comes first.
pub(crate) fn sort_newest_period_first<T>(
    items: &mut [T],
    key: impl Fn(&T) -> (LoanPeriod, DatabaseId),
) {
    items.sort_by(|a, b| newest_period_first(key(a), key(b)));
}
