//! Pagination utilities for the catalog listing.
//!
//! Provides a `Pagination` request with the listing defaults and the derived
//! upstream offset and page-cache key.

pub const DEFAULT_LIMIT: u32 = 10;
pub const DEFAULT_PAGE: u32 = 1;

/// Pagination parameters as received from the caller; absent values take the defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pagination {
    /// items per page
    pub limit: Option<u32>,
    /// 1-based page index
    pub page: Option<u32>,
}

impl Pagination {
    pub fn new(limit: u32, page: u32) -> Self {
        Self { limit: Some(limit), page: Some(page) }
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }

    pub fn page(&self) -> u32 {
        self.page.unwrap_or(DEFAULT_PAGE)
    }

    /// Number of records to skip upstream. Page 0 reads from the start.
    pub fn offset(&self) -> u64 {
        u64::from(self.page().saturating_sub(1)) * u64::from(self.limit())
    }

    /// Page-cache key, `"{limit}-{page}"`.
    pub fn cache_key(&self) -> String {
        page_key(self.limit(), self.page())
    }
}

pub fn page_key(limit: u32, page: u32) -> String {
    format!("{limit}-{page}")
}

#[cfg(test)]
mod tests {
    use super::Pagination;

    #[test]
    fn default_values_are_applied() {
        let p = Pagination::default();
        assert_eq!(p.limit(), 10);
        assert_eq!(p.page(), 1);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.cache_key(), "10-1");
    }

    #[test]
    fn offset_skips_previous_pages() {
        let p = Pagination::new(5, 3);
        assert_eq!(p.offset(), 10);
        assert_eq!(p.cache_key(), "5-3");
    }

    #[test]
    fn page_zero_reads_from_start_but_keeps_its_own_key() {
        let p = Pagination { limit: Some(20), page: Some(0) };
        assert_eq!(p.offset(), 0);
        assert_eq!(p.cache_key(), "20-0");
    }
}
