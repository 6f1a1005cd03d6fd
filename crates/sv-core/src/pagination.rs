//! Pagination arithmetic shared by every list view.
//!
//! The UI thinks in 1-based page/page-size pairs; the backend expects
//! 0-based offset/limit. Conversions validate their inputs instead of
//! clamping, so a caller bug surfaces as a `CoreError::Validation` rather
//! than a silently wrong query.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Default number of items per page.
pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// Maximum allowed items per page.
pub const MAX_PAGE_SIZE: u32 = 200;

/// 1-based page request as the UI holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-indexed).
    pub page: u32,
    /// Items per page.
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Creates a page request, rejecting `page < 1` or `page_size < 1`.
    pub fn new(page: u32, page_size: u32) -> CoreResult<Self> {
        if page < 1 {
            return Err(CoreError::validation(format!(
                "page must be >= 1, got {page}"
            )));
        }
        if page_size < 1 {
            return Err(CoreError::validation(format!(
                "page_size must be >= 1, got {page_size}"
            )));
        }
        Ok(Self { page, page_size })
    }

    /// Converts to the 0-based offset/limit pair the backend expects.
    pub fn to_offset(self) -> OffsetLimit {
        OffsetLimit {
            offset: u64::from(self.page - 1) * u64::from(self.page_size),
            limit: self.page_size,
        }
    }
}

/// 0-based offset/limit pair as the backend expects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetLimit {
    /// Number of items to skip.
    pub offset: u64,
    /// Maximum number of items to return.
    pub limit: u32,
}

/// Converts a 1-based page/page-size pair to offset/limit.
pub fn page_to_offset(page: u32, page_size: u32) -> CoreResult<OffsetLimit> {
    Ok(PageRequest::new(page, page_size)?.to_offset())
}

/// Converts an offset/limit pair back to the 1-based page it lands on.
pub fn offset_to_page(offset: u64, limit: u32) -> CoreResult<PageRequest> {
    if limit < 1 {
        return Err(CoreError::validation("limit must be >= 1"));
    }
    let page = offset / u64::from(limit) + 1;
    Ok(PageRequest {
        page: u32::try_from(page)
            .map_err(|_| CoreError::validation(format!("offset {offset} out of page range")))?,
        page_size: limit,
    })
}

/// Pagination metadata derived from a backend page response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// Current page number (1-indexed).
    pub page: u32,
    /// Items per page.
    pub page_size: u32,
    /// Total number of pages; 0 when the result set is empty.
    pub total_pages: u32,
    /// Total number of items across all pages.
    pub total_items: u64,
    /// Whether a next page exists.
    pub has_next: bool,
    /// Whether a previous page exists.
    pub has_prev: bool,
}

/// Derives pagination metadata from an offset/limit/total triple.
///
/// `total = 0` yields `total_pages = 0` and `has_next = false`; `limit = 0`
/// is rejected rather than dividing by zero.
pub fn pagination_meta(offset: u64, limit: u32, total: u64) -> CoreResult<PaginationMeta> {
    let request = offset_to_page(offset, limit)?;
    let limit = u64::from(limit);
    let total_pages = total.div_ceil(limit);
    let total_pages = u32::try_from(total_pages)
        .map_err(|_| CoreError::validation(format!("total {total} out of page range")))?;

    Ok(PaginationMeta {
        page: request.page,
        page_size: request.page_size,
        total_pages,
        total_items: total,
        has_next: request.page < total_pages,
        has_prev: request.page > 1,
    })
}
