//! Interactive state of the result grid.
//!
//! Sorting, filtering and paging operate on row indices; the underlying
//! [`Grid`] is never modified.

use std::cmp::Ordering;

use crate::config::PAGE_SIZE_OPTIONS;
use crate::db::Value;
use crate::view::Grid;

/// Sort direction of the sorted column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Header marker.
    pub fn indicator(&self) -> &'static str {
        match self {
            Self::Ascending => "▲",
            Self::Descending => "▼",
        }
    }
}

/// Sorted column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub column: usize,
    pub direction: SortDirection,
}

/// Grid selection, sort, filter and paging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridState {
    pub sort: Option<SortKey>,
    pub filter: String,
    /// Whether keystrokes go to the quick filter.
    pub filter_editing: bool,
    /// Zero-based page.
    pub page: usize,
    pub page_size: usize,
    /// Selected row within the current page.
    pub selected_row: usize,
    pub selected_column: usize,
    /// Field names of the grid this state was built for.
    shape: Vec<String>,
}

impl Default for GridState {
    fn default() -> Self {
        Self::new(20)
    }
}

impl GridState {
    /// Creates a state with the given page size.
    pub fn new(page_size: usize) -> Self {
        Self {
            sort: None,
            filter: String::new(),
            filter_editing: false,
            page: 0,
            page_size,
            selected_row: 0,
            selected_column: 0,
            shape: Vec::new(),
        }
    }

    /// Resets sort and selection when the grid's columns change.
    pub fn sync_shape(&mut self, grid: &Grid) {
        if self.shape.len() == grid.columns.len()
            && self
                .shape
                .iter()
                .zip(&grid.columns)
                .all(|(field, column)| *field == column.field)
        {
            return;
        }

        self.shape = grid.columns.iter().map(|c| c.field.clone()).collect();
        self.sort = None;
        self.page = 0;
        self.selected_row = 0;
        self.selected_column = 0;
    }

    /// Indices of the rows that pass the filter, in display order.
    pub fn visible_rows(&self, grid: &Grid) -> Vec<usize> {
        let needle = self.filter.trim().to_lowercase();

        let mut indices: Vec<usize> = (0..grid.rows.len())
            .filter(|&i| needle.is_empty() || row_matches(grid, i, &needle))
            .collect();

        if let Some(key) = self.sort.filter(|k| k.column < grid.columns.len()) {
            if grid.columns[key.column].sortable {
                indices.sort_by(|&a, &b| {
                    let ordering = compare_values(&grid.rows[a][key.column], &grid.rows[b][key.column]);
                    match key.direction {
                        SortDirection::Ascending => ordering,
                        SortDirection::Descending => ordering.reverse(),
                    }
                });
            }
        }

        indices
    }

    /// Number of pages for `row_count` visible rows (at least one).
    pub fn page_count(&self, row_count: usize) -> usize {
        row_count.div_ceil(self.page_size.max(1)).max(1)
    }

    /// Slice bounds of the current page within the visible rows.
    pub fn page_bounds(&self, row_count: usize) -> (usize, usize) {
        let page = self.page.min(self.page_count(row_count) - 1);
        let start = page * self.page_size;
        let end = (start + self.page_size).min(row_count);
        (start.min(row_count), end)
    }

    /// Returns to the first page after the rows change.
    pub fn rewind(&mut self) {
        self.page = 0;
        self.selected_row = 0;
    }

    /// Cycles the selected column through ascending, descending and unsorted.
    pub fn cycle_sort(&mut self) {
        let column = self.selected_column;
        self.sort = match self.sort {
            Some(SortKey {
                column: c,
                direction: SortDirection::Ascending,
            }) if c == column => Some(SortKey {
                column,
                direction: SortDirection::Descending,
            }),
            Some(SortKey {
                column: c,
                direction: SortDirection::Descending,
            }) if c == column => None,
            _ => Some(SortKey {
                column,
                direction: SortDirection::Ascending,
            }),
        };
        self.page = 0;
        self.selected_row = 0;
    }

    pub fn select_up(&mut self) {
        self.selected_row = self.selected_row.saturating_sub(1);
    }

    pub fn select_down(&mut self, rows_on_page: usize) {
        if self.selected_row + 1 < rows_on_page {
            self.selected_row += 1;
        }
    }

    pub fn select_left(&mut self) {
        self.selected_column = self.selected_column.saturating_sub(1);
    }

    pub fn select_right(&mut self, column_count: usize) {
        if self.selected_column + 1 < column_count {
            self.selected_column += 1;
        }
    }

    pub fn next_page(&mut self, row_count: usize) {
        if self.page + 1 < self.page_count(row_count) {
            self.page += 1;
            self.selected_row = 0;
        }
    }

    pub fn prev_page(&mut self) {
        if self.page > 0 {
            self.page -= 1;
            self.selected_row = 0;
        }
    }

    /// Switches to the next larger page size option.
    pub fn grow_page_size(&mut self) {
        if let Some(&size) = PAGE_SIZE_OPTIONS.iter().find(|&&s| s > self.page_size) {
            self.set_page_size(size);
        }
    }

    /// Switches to the next smaller page size option.
    pub fn shrink_page_size(&mut self) {
        if let Some(&size) = PAGE_SIZE_OPTIONS.iter().rev().find(|&&s| s < self.page_size) {
            self.set_page_size(size);
        }
    }

    fn set_page_size(&mut self, size: usize) {
        self.page_size = size;
        self.page = 0;
        self.selected_row = 0;
    }

    /// Starts editing the quick filter.
    pub fn begin_filter(&mut self) {
        self.filter_editing = true;
    }

    /// Appends to the quick filter.
    pub fn push_filter(&mut self, c: char) {
        self.filter.push(c);
        self.page = 0;
        self.selected_row = 0;
    }

    pub fn pop_filter(&mut self) {
        self.filter.pop();
        self.page = 0;
        self.selected_row = 0;
    }

    /// Stops editing; the filter stays applied.
    pub fn end_filter(&mut self) {
        self.filter_editing = false;
    }

    /// Removes the filter.
    pub fn clear_filter(&mut self) {
        self.filter.clear();
        self.filter_editing = false;
        self.page = 0;
        self.selected_row = 0;
    }
}

fn row_matches(grid: &Grid, row: usize, needle: &str) -> bool {
    grid.columns
        .iter()
        .zip(&grid.rows[row])
        .filter(|(column, _)| column.filterable)
        .any(|(column, value)| column.format_cell(value).to_lowercase().contains(needle))
}

/// Orders nulls first, numbers numerically, everything else by display text.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (false, false) => {}
    }

    match (numeric(a), numeric(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.to_display_string().cmp(&b.to_display_string()),
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Int(_) | Value::Float(_) => value.as_f64(),
        _ => None,
    }
}
