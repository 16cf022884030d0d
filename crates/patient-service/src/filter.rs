//! List request normalization and paginated results.

use patient_core::PatientRecord;
use patient_storage::{PatientQuery, SortField, SortOrder};
use serde::{Deserialize, Serialize};

/// Default page size when the caller gives none.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound on the page size.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A listing request as supplied by the caller.
///
/// Nothing here is trusted: out-of-range numbers and unknown sort names are
/// replaced by defaults rather than rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientFilter {
    pub search: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub page: i64,
    #[serde(alias = "page_size")]
    pub limit: i64,
    pub sort: Option<String>,
    pub order: Option<String>,
}

/// Page size policy applied during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

/// A filter after normalization: the store query plus the page coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedFilter {
    pub query: PatientQuery,
    pub page: u64,
    pub page_size: u32,
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl PatientFilter {
    /// Applies defaults, clamps and the sort allow-list.
    pub fn normalize(&self, limits: PageLimits) -> NormalizedFilter {
        let page = u64::try_from(self.page).ok().filter(|p| *p > 0).unwrap_or(1);

        let page_size = if self.limit <= 0 {
            limits.default_page_size
        } else {
            u32::try_from(self.limit)
                .unwrap_or(u32::MAX)
                .min(limits.max_page_size)
        };

        let sort = self
            .sort
            .as_deref()
            .map(str::trim)
            .and_then(SortField::from_name)
            .unwrap_or_default();

        let order = self
            .order
            .as_deref()
            .map(str::trim)
            .and_then(SortOrder::from_name)
            .unwrap_or_default();

        let offset = (page - 1).saturating_mul(u64::from(page_size));

        NormalizedFilter {
            query: PatientQuery {
                search: non_blank(&self.search),
                city: non_blank(&self.city),
                province: non_blank(&self.province),
                sort,
                order,
                limit: page_size,
                offset,
            },
            page,
            page_size,
        }
    }
}

/// One page of patients with pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientList {
    pub records: Vec<PatientRecord>,
    pub total: u64,
    pub page: u64,
    pub page_size: u32,
    pub total_pages: u64,
}

impl PatientList {
    pub fn new(records: Vec<PatientRecord>, total: u64, page: u64, page_size: u32) -> Self {
        Self {
            records,
            total,
            page,
            page_size,
            total_pages: total_pages(total, page_size),
        }
    }
}

/// `ceil(total / page_size)`; zero when there is nothing to show.
pub fn total_pages(total: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(u64::from(page_size))
}
