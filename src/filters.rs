//! Translate date range and category filters into query predicates.
//!
//! Records with a single timestamp are filtered in SQL with a [Predicate].
//! Car loan statements only have a month name and a year, so they are
//! filtered in memory with [PeriodRange] after the month has been resolved.

use rusqlite::ToSql;
use time::{OffsetDateTime, UtcOffset};

use crate::{category::CategoryId, month::LoanPeriod};

/// A conjunction of SQL conditions and the parameters they bind.
///
/// Conditions use positional `?` placeholders, so parameters must be pushed
/// in the same order as the placeholders appear.
#[derive(Default)]
pub struct Predicate {
    conditions: Vec<String>,
    params: Vec<Box<dyn ToSql>>,
}

impl Predicate {
    /// A predicate that matches every row.
    pub fn everything() -> Self {
        Self::default()
    }

    fn push(&mut self, condition: String, params: Vec<Box<dyn ToSql>>) {
        self.conditions.push(condition);
        self.params.extend(params);
    }

    /// The `WHERE` clause for this predicate, or an empty string if it matches everything.
    pub fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    /// The parameters to bind, in placeholder order.
    pub fn params(&self) -> impl Iterator<Item = &dyn ToSql> {
        self.params.iter().map(|param| &**param)
    }
}

impl std::fmt::Debug for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predicate")
            .field("conditions", &self.conditions)
            .field("param_count", &self.params.len())
            .finish()
    }
}

/// An inclusive range of timestamps. A missing bound leaves that side open.
///
/// A range whose start is after its end is valid and matches nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    /// Include records on or after this instant.
    pub start: Option<OffsetDateTime>,
    /// Include records on or before this instant.
    pub end: Option<OffsetDateTime>,
}

impl DateRange {
    /// Create a range from optional bounds.
    pub fn new(start: Option<OffsetDateTime>, end: Option<OffsetDateTime>) -> Self {
        Self { start, end }
    }

    /// Build the predicate over the `date` column.
    ///
    /// Bounds are converted to UTC because timestamps are stored in UTC and
    /// compared as text.
    pub fn predicate(&self) -> Predicate {
        let mut predicate = Predicate::everything();
        self.push_conditions(&mut predicate);
        predicate
    }

    fn push_conditions(&self, predicate: &mut Predicate) {
        if let Some(start) = self.start {
            predicate.push(
                "date >= ?".to_owned(),
                vec![Box::new(start.to_offset(UtcOffset::UTC)) as Box<dyn ToSql>],
            );
        }

        if let Some(end) = self.end {
            predicate.push(
                "date <= ?".to_owned(),
                vec![Box::new(end.to_offset(UtcOffset::UTC)) as Box<dyn ToSql>],
            );
        }
    }
}

/// Filter for listing expenses: a date range plus an optional set of categories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseFilter {
    /// The dates to include.
    pub range: DateRange,
    /// Include expenses in ANY of these categories. Empty means no category constraint.
    pub category_ids: Vec<CategoryId>,
}

impl ExpenseFilter {
    /// Build the predicate over the `expense` table.
    pub fn predicate(&self) -> Predicate {
        let mut predicate = self.range.predicate();

        if !self.category_ids.is_empty() {
            let placeholders = vec!["?"; self.category_ids.len()].join(", ");
            let params = self
                .category_ids
                .iter()
                .map(|&id| Box::new(id) as Box<dyn ToSql>)
                .collect();

            predicate.push(
                format!(
                    "EXISTS (SELECT 1 FROM expense_category \
                    WHERE expense_category.expense_id = expense.id \
                    AND expense_category.category_id IN ({placeholders}))"
                ),
                params,
            );
        }

        predicate
    }
}

/// An inclusive range of car loan periods, compared at month granularity.
///
/// A start of June 2023 includes every statement for June 2023.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodRange {
    /// Include statements in or after this month.
    pub start: Option<LoanPeriod>,
    /// Include statements in or before this month.
    pub end: Option<LoanPeriod>,
}

impl PeriodRange {
    /// Reduce a timestamp range to the months it touches.
    pub fn from_dates(range: DateRange) -> Self {
        Self {
            start: range.start.map(LoanPeriod::from),
            end: range.end.map(LoanPeriod::from),
        }
    }

    /// Whether `period` falls inside the range.
    pub fn contains(&self, period: LoanPeriod) -> bool {
        self.start.is_none_or(|start| period >= start) && self.end.is_none_or(|end| period <= end)
    }
}



#[cfg(test)]
mod period_range_tests {
    use time::macros::datetime;

    use crate::month::LoanPeriod;

    use super::{DateRange, PeriodRange};

    fn period(year: i32, month: &str) -> LoanPeriod {
        LoanPeriod::from_name(year, month).unwrap()
    }

    fn period_range(start: Option<LoanPeriod>, end: Option<LoanPeriod>) -> PeriodRange {
        PeriodRange { start, end }
    }

    #[test]
    fn start_month_is_included() {
        let range = period_range(Some(period(2023, "June")), None);

        assert!(range.contains(period(2023, "June")));
        assert!(!range.contains(period(2023, "May")));
    }

    #[test]
    fn end_month_is_included() {
        let range = period_range(None, Some(period(2023, "June")));

        assert!(range.contains(period(2023, "June")));
        assert!(!range.contains(period(2023, "July")));
    }

    #[test]
    fn later_year_with_earlier_month_is_after_start() {
        let range = period_range(Some(period(2023, "June")), None);

        assert!(range.contains(period(2024, "January")));
        assert!(!range.contains(period(2022, "December")));
    }

    #[test]
    fn timestamps_are_reduced_to_their_month() {
        let range = PeriodRange::from_dates(DateRange::new(
            Some(datetime!(2023-06-15 12:00 UTC)),
            Some(datetime!(2023-08-01 0:00 UTC)),
        ));

        assert!(range.contains(period(2023, "June")));
        assert!(range.contains(period(2023, "August")));
        assert!(!range.contains(period(2023, "September")));
    }

    #[test]
    fn inverted_range_contains_nothing() {
        let range = period_range(Some(period(2024, "March")), Some(period(2023, "March")));

        assert!(!range.contains(period(2023, "September")));
    }
}
