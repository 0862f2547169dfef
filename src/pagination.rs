//! This modules defines the common functionality for paging data.
//!
//! Pages are applied after filtering and ordering, never before.

use serde::Deserialize;

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The maximum number of records to return when a request does not specify a limit.
    pub default_limit: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self { default_limit: 100 }
    }
}

/// A window into an ordered result set: skip `skip` records, then return at most `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// The number of records to skip.
    pub skip: u64,
    /// The maximum number of records to return.
    pub limit: u64,
}

impl Page {
    /// Create a page that skips `skip` records and returns at most `limit` records.
    pub fn new(skip: u64, limit: u64) -> Self {
        Self { skip, limit }
    }

    /// Build a page from optional request parameters, falling back to `config`.
    pub fn from_params(skip: Option<u64>, limit: Option<u64>, config: &PaginationConfig) -> Self {
        Self {
            skip: skip.unwrap_or(0),
            limit: limit.unwrap_or(config.default_limit),
        }
    }

    /// The `LIMIT ... OFFSET ...` clause for this page.
    pub(crate) fn sql_clause(&self) -> String {
        // SQLite integers are signed, clamp instead of wrapping.
        let limit = i64::try_from(self.limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(self.skip).unwrap_or(i64::MAX);

        format!("LIMIT {limit} OFFSET {offset}")
    }

    /// Apply this page to records that have already been filtered and sorted.
    pub(crate) fn apply<T>(&self, records: Vec<T>) -> Vec<T> {
        let skip = usize::try_from(self.skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.limit).unwrap_or(usize::MAX);

        records.into_iter().skip(skip).take(limit).collect()
    }
}

/// The query string parameters for paging through a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PageQuery {
    /// The number of records to skip, zero if omitted.
    pub skip: Option<u64>,
    /// The maximum number of records to return, [PaginationConfig::default_limit] if omitted.
    pub limit: Option<u64>,
}

impl PageQuery {
    /// Resolve the query into a [Page], filling in defaults from `config`.
    pub fn page(&self, config: &PaginationConfig) -> Page {
        Page::from_params(self.skip, self.limit, config)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::from_params(None, None, &PaginationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use crate::pagination::{Page, PaginationConfig};

    #[test]
    fn defaults_to_first_hundred() {
        assert_eq!(Page::default(), Page::new(0, 100));
    }

    #[test]
    fn uses_configured_default_limit() {
        let config = PaginationConfig { default_limit: 5 };

        let page = Page::from_params(Some(10), None, &config);

        assert_eq!(page, Page::new(10, 5));
    }

    #[test]
    fn sql_clause_clamps_large_values() {
        assert_eq!(
            Page::new(0, u64::MAX).sql_clause(),
            format!("LIMIT {} OFFSET 0", i64::MAX)
        );
    }

    #[test]
    fn applies_skip_before_limit() {
        let records: Vec<u32> = (1..=10).collect();

        let got = Page::new(3, 4).apply(records);

        assert_eq!(got, vec![4, 5, 6, 7]);
    }

    #[test]
    fn skip_past_the_end_is_empty() {
        let records: Vec<u32> = (1..=3).collect();

        let got = Page::new(5, 10).apply(records);

        assert!(got.is_empty());
    }

    #[test]
    fn zero_limit_is_empty() {
        let records: Vec<u32> = (1..=3).collect();

        assert!(Page::new(0, 0).apply(records).is_empty());
    }
}
