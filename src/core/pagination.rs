//! Pagination helpers shared by the tour, booking and backup listings.

use crate::errors::Result;
use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait, Select};
use serde::Serialize;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PER_PAGE: u64 = 15;
/// Upper bound on the page size a caller may request.
pub const MAX_PER_PAGE: u64 = 100;
/// Highest page number served. The row offset of any page up to this one fits the
/// signed 64-bit `OFFSET` the database takes.
pub const MAX_PAGE: u64 = i64::MAX.unsigned_abs() / MAX_PER_PAGE;

/// A 1-based page request with a clamped page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number
    pub page: u64,
    /// Items per page
    pub per_page: u64,
}

impl PageRequest {
    /// Builds a request from optional caller input, clamping both values into range.
    /// Pages past [`MAX_PAGE`] are served as [`MAX_PAGE`], which is always empty.
    #[must_use]
    pub fn new(page: Option<u64>, per_page: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(1).clamp(1, MAX_PAGE),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results plus the numbers needed to render a pager
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// 1-based page number
    pub current_page: u64,
    /// Last available page (at least 1)
    pub last_page: u64,
    /// Items per page
    pub per_page: u64,
    /// Total number of matching items
    pub total: u64,
}

/// Runs `select` and returns the requested page.
pub async fn fetch_page<C, E>(
    db: &C,
    select: Select<E>,
    request: PageRequest,
) -> Result<Page<E::Model>>
where
    C: ConnectionTrait,
    E: EntityTrait,
    E::Model: Send + Sync + 'static,
{
    let paginator = select.paginate(db, request.per_page);
    let counts = paginator.num_items_and_pages().await?;
    let items = paginator.fetch_page(request.page - 1).await?;

    Ok(Page {
        items,
        current_page: request.page,
        last_page: counts.number_of_pages.max(1),
        per_page: request.per_page,
        total: counts.number_of_items,
    })
}
