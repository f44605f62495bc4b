//! Pagination results.
//!
//! A [`Pagination`] is what [`QueryObject::paginate`](crate::QueryObject::paginate)
//! returns: one page of rows plus the totals needed to navigate between pages.
//!
//! # Examples
//!
//! ```
//! use cbv_rs_query::Pagination;
//!
//! let pagination = Pagination::new(2, 10, 25, vec![]);
//! assert_eq!(pagination.pages(), 3);
//! assert!(pagination.has_prev());
//! assert!(pagination.has_next());
//! assert_eq!(pagination.prev_num(), Some(1));
//! assert_eq!(pagination.next_num(), Some(3));
//! ```

use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::Value;

use cbv_rs_core::{CbvError, CbvResult};

/// One page of query results.
#[derive(Debug, Clone, PartialEq)]
pub struct Pagination {
    /// The 1-based page number.
    pub page: usize,
    /// The number of items per page.
    pub per_page: usize,
    /// The total number of items across all pages.
    pub total: usize,
    /// The items on this page.
    pub items: Vec<Value>,
}

impl Pagination {
    /// Creates a pagination result.
    pub const fn new(page: usize, per_page: usize, total: usize, items: Vec<Value>) -> Self {
        Self {
            page,
            per_page,
            total,
            items,
        }
    }

    /// The total number of pages, `0` when `per_page` is `0`.
    pub const fn pages(&self) -> usize {
        if self.per_page == 0 {
            0
        } else {
            self.total.div_ceil(self.per_page)
        }
    }

    /// Returns `true` if a previous page exists.
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Returns `true` if a next page exists.
    pub const fn has_next(&self) -> bool {
        self.page < self.pages()
    }

    /// The previous page number, if any.
    pub const fn prev_num(&self) -> Option<usize> {
        if self.has_prev() {
            Some(self.page - 1)
        } else {
            None
        }
    }

    /// The next page number, if any.
    pub const fn next_num(&self) -> Option<usize> {
        if self.has_next() {
            Some(self.page + 1)
        } else {
            None
        }
    }

    /// Page numbers for a pagination widget, with `None` marking a gap.
    ///
    /// Always includes the first `left_edge` and last `right_edge` pages, plus
    /// `left_current` pages before and `right_current - 1` pages after the
    /// current one.
    ///
    /// ```
    /// use cbv_rs_query::Pagination;
    ///
    /// let pagination = Pagination::new(10, 1, 20, vec![]);
    /// let pages: Vec<_> = pagination.iter_pages(2, 2, 5, 2);
    /// assert_eq!(
    ///     pages,
    ///     vec![
    ///         Some(1), Some(2), None,
    ///         Some(8), Some(9), Some(10), Some(11), Some(12), Some(13), Some(14),
    ///         None, Some(19), Some(20),
    ///     ]
    /// );
    /// ```
    pub fn iter_pages(
        &self,
        left_edge: usize,
        left_current: usize,
        right_current: usize,
        right_edge: usize,
    ) -> Vec<Option<usize>> {
        let pages = self.pages();
        let mut result = Vec::new();
        let mut last = 0;

        for num in 1..=pages {
            let in_left_edge = num <= left_edge;
            let in_window = num + left_current + 1 > self.page && num < self.page + right_current;
            let in_right_edge = num + right_edge > pages;

            if in_left_edge || in_window || in_right_edge {
                if last + 1 != num {
                    result.push(None);
                }
                result.push(Some(num));
                last = num;
            }
        }

        result
    }

    /// [`iter_pages`](Self::iter_pages) with the conventional defaults
    /// `(2, 2, 5, 2)`.
    pub fn page_range(&self) -> Vec<Option<usize>> {
        self.iter_pages(2, 2, 5, 2)
    }
}

impl Serialize for Pagination {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Pagination", 10)?;
        state.serialize_field("page", &self.page)?;
        state.serialize_field("per_page", &self.per_page)?;
        state.serialize_field("total", &self.total)?;
        state.serialize_field("pages", &self.pages())?;
        state.serialize_field("has_prev", &self.has_prev())?;
        state.serialize_field("has_next", &self.has_next())?;
        state.serialize_field("prev_num", &self.prev_num())?;
        state.serialize_field("next_num", &self.next_num())?;
        state.serialize_field("page_range", &self.page_range())?;
        state.serialize_field("items", &self.items)?;
        state.end()
    }
}

/// Validates a requested page number before a backend runs the query.
///
/// # Errors
///
/// Returns [`CbvError::NotFound`] for a page below 1 when `error_out` is set.
pub fn resolve_page(page: i64, error_out: bool) -> CbvResult<usize> {
    match usize::try_from(page) {
        Ok(page) if page >= 1 => Ok(page),
        _ if error_out => Err(CbvError::NotFound(format!("Invalid page ({page})"))),
        _ => Ok(1),
    }
}

/// Rejects an empty page past the first when `error_out` is set.
///
/// # Errors
///
/// Returns [`CbvError::NotFound`] when the page is out of range.
pub fn check_page_items(page: usize, items: &[Value], error_out: bool) -> CbvResult<()> {
    if error_out && items.is_empty() && page != 1 {
        return Err(CbvError::NotFound(format!(
            "Invalid page ({page}): that page contains no results"
        )));
    }
    Ok(())
}

/// The offset of the first row of `page`, or `None` when it lies beyond
/// any addressable row (past `i64::MAX`).
pub(crate) fn page_offset(page: usize, per_page: usize) -> Option<usize> {
    page.saturating_sub(1)
        .checked_mul(per_page)
        .filter(|offset| i64::try_from(*offset).is_ok())
}
