//! Pagination utilities shared by the service and server layers
//!
//! Raw page parameters arrive as signed integers (callers may send zero or
//! negative values); `Pagination::normalize` turns them into a `Page` that
//! always satisfies `page >= 1` and `1 <= page_size <= max_page_size`.

/// Page size used when the caller does not supply one (matches a 12-card grid)
pub const DEFAULT_PAGE_SIZE: u64 = 12;
/// Upper bound applied to any requested page size
pub const MAX_PAGE_SIZE: u64 = 100;

/// Defaults and limits used during normalization
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaginationPolicy {
    pub default_page_size: u64,
    pub max_page_size: u64,
}

impl Default for PaginationPolicy {
    fn default() -> Self {
        Self { default_page_size: DEFAULT_PAGE_SIZE, max_page_size: MAX_PAGE_SIZE }
    }
}

/// Raw pagination parameters as received from the caller
#[derive(Clone, Copy, Debug, Default)]
pub struct Pagination {
    /// 1-based page index; `<= 0` means "not provided"
    pub page: i64,
    /// items per page; `<= 0` means "not provided"
    pub page_size: i64,
}

/// Validated pagination window
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub page: u64,
    pub page_size: u64,
}

impl Pagination {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self { page, page_size }
    }

    /// Apply defaults for non-positive values and clamp the page size.
    /// The cap never exceeds `MAX_PAGE_SIZE`, whatever the policy says.
    pub fn normalize(self, policy: PaginationPolicy) -> Page {
        let page = if self.page > 0 { self.page as u64 } else { 1 };
        let requested = if self.page_size > 0 { self.page_size as u64 } else { policy.default_page_size };
        let cap = policy.max_page_size.min(MAX_PAGE_SIZE);
        let page_size = requested.min(cap).max(1);
        Page { page, page_size }
    }
}

impl Page {
    /// Number of rows to skip before this page
    pub fn offset(&self) -> u64 {
        // 存储层按 i64 绑定参数
        (self.page - 1).saturating_mul(self.page_size).min(i64::MAX as u64)
    }

    /// `ceil(total / page_size)`; zero when there is nothing to show
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(page: i64, page_size: i64) -> Page {
        Pagination::new(page, page_size).normalize(PaginationPolicy::default())
    }

    #[test]
    fn non_positive_values_fall_back_to_defaults() {
        assert_eq!(norm(0, 0), Page { page: 1, page_size: 12 });
        assert_eq!(norm(-1, -50), Page { page: 1, page_size: 12 });
    }

    #[test]
    fn page_size_is_clamped_to_max() {
        assert_eq!(norm(1, 101).page_size, 100);
        assert_eq!(norm(1, 10_000).page_size, 100);
        assert_eq!(norm(1, 100).page_size, 100);
    }

    #[test]
    fn offset_follows_page_index() {
        assert_eq!(norm(1, 10).offset(), 0);
        assert_eq!(norm(3, 5).offset(), 10);
    }

    #[test]
    fn total_pages_is_ceiling() {
        let p = norm(1, 5);
        assert_eq!(p.total_pages(8), 2);
        assert_eq!(p.total_pages(10), 2);
        assert_eq!(p.total_pages(11), 3);
        assert_eq!(p.total_pages(0), 0);
        assert_eq!(norm(1, 10).total_pages(8), 1);
    }

    #[test]
    fn custom_policy_is_respected() {
        let policy = PaginationPolicy { default_page_size: 25, max_page_size: 50 };
        assert_eq!(Pagination::default().normalize(policy).page_size, 25);
        assert_eq!(Pagination::new(2, 80).normalize(policy), Page { page: 2, page_size: 50 });
    }

    #[test]
    fn policy_cannot_raise_hard_cap() {
        let loose = PaginationPolicy { default_page_size: 12, max_page_size: 500 };
        assert_eq!(Pagination::new(1, 300).normalize(loose).page_size, MAX_PAGE_SIZE);

        let wide_default = PaginationPolicy { default_page_size: 250, max_page_size: 500 };
        assert_eq!(Pagination::new(1, 0).normalize(wide_default).page_size, MAX_PAGE_SIZE);
    }
}
