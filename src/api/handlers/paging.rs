//! Offset paging shared by list endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

const DEFAULT_PER_PAGE: u64 = 100;
const MAX_PER_PAGE: u64 = 1000;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number (default 1).
    pub page: Option<u64>,
    /// Items per page (default 100, max 1000).
    pub per_page: Option<u64>,
}

impl PageQuery {
    #[must_use]
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    #[must_use]
    pub fn per_page(&self) -> u64 {
        self.per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }

    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::try_from((self.page() - 1).saturating_mul(self.per_page())).unwrap_or(i64::MAX)
    }

    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::try_from(self.per_page()).unwrap_or(i64::MAX)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Page<T> {
    pub page: u64,
    pub per_page: u64,
    pub page_count: u64,
    pub total_count: u64,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(query: &PageQuery, total_count: u64, items: Vec<T>) -> Self {
        let per_page = query.per_page();
        Self {
            page: query.page(),
            per_page,
            page_count: total_count.div_ceil(per_page),
            total_count,
            items,
        }
    }
}
