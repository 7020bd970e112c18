//! Search result pagination rules.
//!
//! The results summary reports a page size and a total result count; the
//! result listing is walked with `start=<offset>` in page-size steps.

/// Page size and total count read from a results summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultsSummary {
    pub page_size: u32,
    pub total: u32,
}

impl ResultsSummary {
    pub fn new(page_size: u32, total: u32) -> Self {
        Self { page_size, total }
    }

    /// Offsets of every result page to fetch.
    ///
    /// - no results, or a zero page size: nothing to fetch
    /// - everything fits on one page: offset 0 only
    /// - otherwise `0, page_size, 2*page_size, ...` below `total`
    pub fn offsets(&self) -> Vec<u32> {
        if self.total == 0 || self.page_size == 0 {
            return Vec::new();
        }
        if self.total <= self.page_size {
            return vec![0];
        }
        (0..self.total).step_by(self.page_size as usize).collect()
    }
}
