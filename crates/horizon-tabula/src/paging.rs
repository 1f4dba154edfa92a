//! Page arithmetic for paged controls.
//!
//! A [`PagedControl`] divides `total_items` rows into pages of `page_size`
//! and tracks the current page. Pagers attached to the control are recorded
//! by ID so that a page change can redraw every one of them.
//!
//! [`calc_bunch`] decides which numbered buttons a pager shows.

use serde::{Deserialize, Serialize};

/// Page state of a table or other paged control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedControl {
    total_items: usize,
    page_size: usize,
    page_num: usize,
    #[serde(rename = "pagerIds")]
    pager_ids: Vec<String>,
    #[serde(skip, default = "default_page_size")]
    default_page_size: usize,
}

fn default_page_size() -> usize {
    10
}

impl Default for PagedControl {
    fn default() -> Self {
        Self::new(default_page_size())
    }
}

impl PagedControl {
    /// Create page state using `default_page_size` when no size is set.
    pub fn new(default_page_size: usize) -> Self {
        Self {
            total_items: 0,
            page_size: 0,
            page_num: 1,
            pager_ids: Vec::new(),
            default_page_size: default_page_size.max(1),
        }
    }

    /// Set the default used while the page size is 0.
    pub fn set_default_page_size(&mut self, size: usize) {
        self.default_page_size = size.max(1);
    }

    /// Set the total number of rows and clamp the current page into range.
    pub fn set_total_items(&mut self, total: usize) {
        self.total_items = total;
        self.limit_page_number();
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    /// Set the page size. 0 selects the default.
    pub fn set_page_size(&mut self, size: usize) {
        self.page_size = size;
    }

    /// Effective page size.
    pub fn page_size(&self) -> usize {
        if self.page_size == 0 {
            self.default_page_size
        } else {
            self.page_size
        }
    }

    /// Current page, 1-based.
    pub fn page_num(&self) -> usize {
        self.page_num
    }

    /// Set the current page. The value is not clamped; callers clamp.
    /// Page numbers below 1 are stored as 1.
    pub fn set_page_num(&mut self, page: usize) {
        self.page_num = page.max(1);
    }

    /// Number of pages, 0 when there are no rows.
    pub fn calc_page_count(&self) -> usize {
        self.total_items.div_ceil(self.page_size())
    }

    /// Half-open range of absolute row indexes on the current page.
    pub fn slice_offsets(&self) -> (usize, usize) {
        let size = self.page_size();
        let start = (self.page_num - 1).saturating_mul(size);
        let end = self.page_num.saturating_mul(size).min(self.total_items);
        (start.min(end), end)
    }

    /// `(offset, max_rows)` for a database query of the current page.
    pub fn sql_limits(&self) -> (usize, usize) {
        let size = self.page_size();
        ((self.page_num - 1).saturating_mul(size), size)
    }

    /// Attach a pager by ID. Attaching the same pager twice has no effect.
    pub fn add_data_pager(&mut self, pager_id: impl Into<String>) {
        let pager_id = pager_id.into();
        if !self.pager_ids.contains(&pager_id) {
            self.pager_ids.push(pager_id);
        }
    }

    /// IDs of attached pagers, in attachment order.
    pub fn data_pager_ids(&self) -> &[String] {
        &self.pager_ids
    }

    pub fn has_data_pagers(&self) -> bool {
        !self.pager_ids.is_empty()
    }

    fn limit_page_number(&mut self) {
        let page_count = self.calc_page_count();
        if self.page_num > page_count {
            self.page_num = page_count.max(1);
        }
    }
}

/// Fewest buttons a pager can lay out: first, ellipsis, current, ellipsis,
/// last.
pub const MIN_PAGE_BUTTONS: usize = 5;

/// A contiguous window of page numbers, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bunch {
    pub start: usize,
    pub end: usize,
}

impl Bunch {
    /// Iterate the page numbers of the window.
    pub fn pages(&self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.end
    }

    /// Number of pages in the window.
    pub fn len(&self) -> usize {
        (self.end + 1).saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

/// Compute the window of numbered buttons a pager shows.
///
/// When there are more pages than `max_page_buttons`, the window is placed
/// around `page_num` leaving room for the first and last page buttons and
/// the ellipses next to them. Widths below [`MIN_PAGE_BUTTONS`] are raised
/// to it.
pub fn calc_bunch(page_count: usize, page_num: usize, max_page_buttons: usize) -> Bunch {
    let max_page_buttons = max_page_buttons.max(MIN_PAGE_BUTTONS);
    let page_count = page_count.max(1);
    if page_count <= max_page_buttons {
        return Bunch {
            start: 1,
            end: page_count,
        };
    }

    let count = page_count as isize;
    let page = page_num.clamp(1, page_count) as isize;
    let max = max_page_buttons as isize;

    let min_end_of_bunch = (max - 2).min(count);
    let max_start_of_bunch = (count - max + 3).max(1);
    let left_of_bunch = (max - 5) / 2;
    let right_of_bunch = (max - 4) / 2;
    let left_bunch_trigger = left_of_bunch + 4;
    let right_bunch_trigger = max_start_of_bunch + (max - 7) / 2;

    let start = if page < left_bunch_trigger {
        1
    } else {
        max_start_of_bunch.min(page - left_of_bunch)
    };
    let end = if page > right_bunch_trigger {
        count
    } else {
        min_end_of_bunch.max(page + right_of_bunch)
    };

    tracing::trace!(
        target: "horizon_tabula::pager",
        page_count, page_num, max_page_buttons, start, end,
        "computed pager bunch"
    );

    Bunch {
        start: start as usize,
        end: end as usize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count() {
        let mut paging = PagedControl::new(10);
        assert_eq!(paging.calc_page_count(), 0);
        paging.set_total_items(95);
        assert_eq!(paging.calc_page_count(), 10);
        paging.set_page_size(50);
        assert_eq!(paging.calc_page_count(), 2);
        paging.set_page_size(0);
        assert_eq!(paging.page_size(), 10);
    }

    #[test]
    fn test_set_total_items_clamps_page() {
        let mut paging = PagedControl::new(10);
        paging.set_total_items(100);
        paging.set_page_num(10);
        paging.set_total_items(35);
        assert_eq!(paging.page_num(), 4);
        paging.set_total_items(0);
        assert_eq!(paging.page_num(), 1);
    }

    #[test]
    fn test_set_page_num_does_not_clamp() {
        let mut paging = PagedControl::new(10);
        paging.set_total_items(20);
        paging.set_page_num(7);
        assert_eq!(paging.page_num(), 7);
        assert_eq!(paging.slice_offsets(), (20, 20));
    }

    #[test]
    fn test_slice_offsets_and_sql_limits() {
        let mut paging = PagedControl::new(10);
        paging.set_total_items(25);
        paging.set_page_num(3);
        assert_eq!(paging.slice_offsets(), (20, 25));
        assert_eq!(paging.sql_limits(), (20, 10));
    }

    #[test]
    fn test_pager_ids() {
        let mut paging = PagedControl::default();
        assert!(!paging.has_data_pagers());
        paging.add_data_pager("top");
        paging.add_data_pager("bottom");
        paging.add_data_pager("top");
        assert_eq!(paging.data_pager_ids(), ["top", "bottom"]);
    }

    #[test]
    fn test_page_num_invariant_holds_for_all_totals() {
        for size in 1..6 {
            for total in 0..40 {
                for start_page in 1..12 {
                    let mut paging = PagedControl::new(size);
                    paging.set_page_num(start_page);
                    paging.set_total_items(total);
                    let limit = total.div_ceil(size).max(1);
                    assert!(paging.page_num() >= 1 && paging.page_num() <= limit);
                }
            }
        }
    }

    #[test]
    fn test_bunch_small_page_count() {
        assert_eq!(calc_bunch(7, 4, 10), Bunch { start: 1, end: 7 });
        assert_eq!(calc_bunch(0, 1, 10), Bunch { start: 1, end: 1 });
    }

    #[test]
    fn test_bunch_middle() {
        assert_eq!(calc_bunch(100, 50, 10), Bunch { start: 48, end: 53 });
    }

    #[test]
    fn test_bunch_left_edge() {
        assert_eq!(calc_bunch(100, 3, 10), Bunch { start: 1, end: 8 });
    }

    #[test]
    fn test_bunch_right_edge() {
        assert_eq!(calc_bunch(100, 99, 10), Bunch { start: 93, end: 100 });
    }

    #[test]
    fn test_bunch_narrow_width() {
        assert_eq!(calc_bunch(5, 3, 2), Bunch { start: 1, end: 5 });
        assert_eq!(calc_bunch(20, 10, 0), calc_bunch(20, 10, MIN_PAGE_BUTTONS));
        assert_eq!(Bunch { start: 4, end: 2 }.len(), 0);
        assert!(Bunch { start: 4, end: 2 }.is_empty());
    }

    #[test]
    fn test_bunch_properties() {
        for max in 5..14 {
            for count in 1..40 {
                for page in 1..=count {
                    let bunch = calc_bunch(count, page, max);
                    assert!(bunch.start >= 1, "{count} {page} {max}");
                    assert!(bunch.start <= page && page <= bunch.end, "{count} {page} {max}");
                    assert!(bunch.end <= count, "{count} {page} {max}");
                    assert!(bunch.len() <= max, "{count} {page} {max}");
                }
            }
        }
    }
}
