//! Multi-column sort state.

use serde::{Deserialize, Serialize};

use crate::column::Column;

/// Sort state of a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    /// The column has no sort button.
    #[default]
    NotSortable,
    /// Sortable, but not part of the current sort.
    NotSorted,
    /// Sorted in ascending order.
    Ascending,
    /// Sorted in descending order.
    Descending,
}

impl SortDirection {
    /// Returns `true` unless the column is not sortable at all.
    pub fn is_sortable(self) -> bool {
        self != SortDirection::NotSortable
    }

    /// Returns `true` for `Ascending` and `Descending`.
    pub fn is_sorted(self) -> bool {
        matches!(self, SortDirection::Ascending | SortDirection::Descending)
    }

    /// Value for an `aria-sort` attribute.
    pub fn aria_sort(self) -> Option<&'static str> {
        match self {
            SortDirection::Ascending => Some("ascending"),
            SortDirection::Descending => Some("descending"),
            SortDirection::NotSorted => Some("none"),
            SortDirection::NotSortable => None,
        }
    }

    /// Short name, also used as a css class suffix.
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::NotSortable => "none",
            SortDirection::NotSorted => "unsorted",
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

/// IDs of sorted columns, most recent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortHistory {
    ids: Vec<String>,
    limit: usize,
}

impl SortHistory {
    /// Create an empty history keeping at most `limit` columns.
    pub fn new(limit: usize) -> Self {
        Self {
            ids: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Column IDs, primary first.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// The primary sort column.
    pub fn primary(&self) -> Option<&str> {
        self.ids.first().map(String::as_str)
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Change the depth, dropping entries beyond it.
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit.max(1);
        self.ids.truncate(self.limit);
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Forget a column, e.g. after it was removed from the table.
    pub fn remove(&mut self, id: &str) {
        self.ids.retain(|i| i != id);
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Replace the history wholesale. Used when restoring saved state.
    pub(crate) fn set_ids(&mut self, ids: Vec<String>) {
        self.ids = ids;
        self.ids.truncate(self.limit);
    }

    /// Apply a click on the sort button of column `id`.
    ///
    /// Returns the column's new direction, or `None` if the click was
    /// ignored: unknown and non-sortable columns are ignored, and so is every
    /// click while the primary column is not sortable.
    pub fn click(&mut self, columns: &mut [Column], id: &str) -> Option<SortDirection> {
        let clicked = columns.iter().position(|c| c.id() == id)?;
        if !columns[clicked].sort_direction().is_sortable() {
            return None;
        }

        let primary = self
            .primary()
            .and_then(|p| columns.iter().position(|c| c.id() == p));
        if let Some(p) = primary {
            if !columns[p].sort_direction().is_sortable() {
                tracing::debug!(target: "horizon_tabula::table", column = id, "sorting frozen, primary column is not sortable");
                return None;
            }
        }

        if self.ids.is_empty() {
            self.ids.push(id.to_string());
            columns[clicked].set_sort_direction(SortDirection::Ascending);
            return Some(SortDirection::Ascending);
        }

        if self.ids[0] == id {
            let flipped = match columns[clicked].sort_direction() {
                SortDirection::Ascending => SortDirection::Descending,
                _ => SortDirection::Ascending,
            };
            columns[clicked].set_sort_direction(flipped);
            return Some(flipped);
        }

        if let Some(p) = primary {
            columns[p].set_sort_direction(SortDirection::NotSorted);
        }
        self.ids.retain(|i| i != id);
        self.ids.insert(0, id.to_string());
        columns[clicked].set_sort_direction(SortDirection::Ascending);
        self.ids.truncate(self.limit);
        Some(SortDirection::Ascending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(ids: &[&str]) -> Vec<Column> {
        ids.iter()
            .map(|id| Column::key(*id, id.to_uppercase()).with_id(*id).sortable())
            .collect()
    }

    fn direction(columns: &[Column], id: &str) -> SortDirection {
        columns
            .iter()
            .find(|c| c.id() == id)
            .map(Column::sort_direction)
            .unwrap_or_default()
    }

    #[test]
    fn test_first_click_ascending() {
        let mut cols = columns(&["a", "b"]);
        let mut history = SortHistory::new(1);
        assert_eq!(history.click(&mut cols, "a"), Some(SortDirection::Ascending));
        assert_eq!(history.ids(), ["a"]);
    }

    #[test]
    fn test_repeated_clicks_flip() {
        let mut cols = columns(&["a", "x"]);
        let mut history = SortHistory::new(1);
        history.click(&mut cols, "a");
        assert_eq!(history.click(&mut cols, "x"), Some(SortDirection::Ascending));
        assert_eq!(history.click(&mut cols, "x"), Some(SortDirection::Descending));
        assert_eq!(history.primary(), Some("x"));
        assert_eq!(history.click(&mut cols, "x"), Some(SortDirection::Ascending));
        assert_eq!(direction(&cols, "a"), SortDirection::NotSorted);
    }

    #[test]
    fn test_history_trimmed_to_limit() {
        let mut cols = columns(&["a", "b", "c"]);
        let mut history = SortHistory::new(2);
        for id in ["a", "b", "c"] {
            history.click(&mut cols, id);
        }
        assert_eq!(history.ids(), ["c", "b"]);
        assert_eq!(direction(&cols, "a"), SortDirection::NotSorted);
        assert_eq!(direction(&cols, "b"), SortDirection::NotSorted);
        assert_eq!(direction(&cols, "c"), SortDirection::Ascending);
    }

    #[test]
    fn test_reclick_moves_to_front() {
        let mut cols = columns(&["a", "b"]);
        let mut history = SortHistory::new(3);
        history.click(&mut cols, "a");
        history.click(&mut cols, "b");
        history.click(&mut cols, "a");
        assert_eq!(history.ids(), ["a", "b"]);
    }

    #[test]
    fn test_not_sortable_ignored() {
        let mut cols = columns(&["a"]);
        cols.push(Column::key("n", "N").with_id("n"));
        let mut history = SortHistory::new(2);
        assert_eq!(history.click(&mut cols, "n"), None);
        assert_eq!(history.click(&mut cols, "missing"), None);
        assert!(history.is_empty());
    }

    #[test]
    fn test_frozen_when_primary_not_sortable() {
        let mut cols = columns(&["a", "b"]);
        let mut history = SortHistory::new(2);
        history.click(&mut cols, "a");
        cols[0].set_sort_direction(SortDirection::NotSortable);

        assert_eq!(history.click(&mut cols, "b"), None);
        assert_eq!(direction(&cols, "b"), SortDirection::NotSorted);
        assert_eq!(history.ids(), ["a"]);
    }
}
