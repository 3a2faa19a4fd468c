//! Pagination and the fixed-column page grid.
//!
//! Indices shown on screen are 1-based positions in the filtered list, and
//! where a cell lands on the page depends only on its index and the page
//! size.

use crate::selection::SelectionState;
use crossterm::style::Stylize;
use serde::{Deserialize, Serialize};
use std::ops::Range;

const ELLIPSIS: &str = "...";
const CELL_GAP: usize = 2;

/// How cells fill the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnLayout {
    /// Top to bottom, then the next column. Column height is
    /// `ceil(page_size / columns)`.
    #[default]
    Column,
    /// Left to right, then the next row.
    Row,
}

/// Rendering options for one selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    pub columns: usize,
    pub column_width: usize,
    pub layout: ColumnLayout,
    pub color: bool,
    pub clear_screen: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            columns: 3,
            column_width: 50,
            layout: ColumnLayout::Column,
            color: false,
            clear_screen: false,
        }
    }
}

/// One page of a list of `total` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub start: usize,
    pub end: usize,
    pub total: usize,
    pub page_size: usize,
}

impl Page {
    /// The page containing `cursor`, clamped to the last page.
    pub fn new(total: usize, cursor: usize, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let start = cursor.min(last_page_start(total, page_size));
        let start = start - start % page_size;
        Self {
            start,
            end: (start + page_size).min(total),
            total,
            page_size,
        }
    }

    /// 1-based page number.
    pub fn number(&self) -> usize {
        self.start / self.page_size + 1
    }

    /// Total number of pages.
    pub fn count(&self) -> usize {
        page_count(self.total, self.page_size)
    }

    pub fn has_next(&self) -> bool {
        self.start + self.page_size < self.total
    }

    pub fn has_prev(&self) -> bool {
        self.start >= self.page_size
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// `ceil(total / page_size)`, never less than one so an empty list still
/// has a page to show.
pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1)).max(1)
}

/// Offset of the first item on the last page.
pub fn last_page_start(total: usize, page_size: usize) -> usize {
    (page_count(total, page_size) - 1) * page_size.max(1)
}

/// Items containing `query`, ignoring case. An empty query keeps everything.
pub fn filter_items<'a>(items: &'a [String], query: &str) -> Vec<&'a str> {
    if query.is_empty() {
        return items.iter().map(String::as_str).collect();
    }
    let query = query.to_lowercase();
    items
        .iter()
        .filter(|item| item.to_lowercase().contains(&query))
        .map(String::as_str)
        .collect()
}

/// Shorten `text` to at most `width` characters, ending in `...` when cut.
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width <= ELLIPSIS.len() {
        return text.chars().take(width).collect();
    }
    let mut cut: String = text.chars().take(width - ELLIPSIS.len()).collect();
    cut.push_str(ELLIPSIS);
    cut
}

/// Row and column of the `offset`-th item of a page.
pub fn cell_position(
    offset: usize,
    page_size: usize,
    columns: usize,
    layout: ColumnLayout,
) -> (usize, usize) {
    let columns = columns.max(1);
    match layout {
        ColumnLayout::Column => {
            let height = page_size.max(1).div_ceil(columns);
            (offset % height, offset / height)
        }
        ColumnLayout::Row => (offset / columns, offset % columns),
    }
}

/// Render the page header, grid and footer rule.
pub fn render_page(
    title: &str,
    items: &[&str],
    page: &Page,
    selection: &SelectionState,
    filter: &str,
    opts: &ViewOptions,
) -> String {
    let rule = "-".repeat((opts.column_width + CELL_GAP) * opts.columns.max(1));
    let mut out = String::new();

    out.push_str(&format!("\n=== {} ({} per page) ===\n", title, page.page_size));
    if page.is_empty() {
        out.push_str("No items to show.\n");
    } else {
        out.push_str(&format!(
            "Items {}-{} of {}",
            page.start + 1,
            page.end,
            page.total
        ));
        if !filter.is_empty() {
            out.push_str(&format!("  (search: \"{}\")", filter));
        }
        out.push('\n');
    }
    out.push_str(&rule);
    out.push('\n');

    for line in grid_lines(items, page, selection, opts) {
        out.push_str(&line);
        out.push('\n');
    }

    out.push_str(&rule);
    out.push('\n');
    out
}

fn grid_lines(
    items: &[&str],
    page: &Page,
    selection: &SelectionState,
    opts: &ViewOptions,
) -> Vec<String> {
    let columns = opts.columns.max(1);
    let mut grid: Vec<Vec<Option<(String, usize)>>> = Vec::new();

    for index in page.range() {
        let (row, col) = cell_position(index - page.start, page.page_size, columns, opts.layout);
        if grid.len() <= row {
            grid.resize_with(row + 1, || vec![None; columns]);
        }
        let name = items[index];
        grid[row][col] = Some(format_cell(index, name, selection.is_kept(name), opts));
    }

    let cell_width = opts.column_width + CELL_GAP;
    grid.into_iter()
        .map(|row| {
            let mut line = String::new();
            for cell in row {
                match cell {
                    Some((text, width)) => {
                        line.push_str(&text);
                        line.push_str(&" ".repeat(cell_width.saturating_sub(width)));
                    }
                    None => line.push_str(&" ".repeat(cell_width)),
                }
            }
            line.trim_end().to_string()
        })
        .collect()
}

/// Cell text and its visible width (styling excluded).
fn format_cell(index: usize, name: &str, kept: bool, opts: &ViewOptions) -> (String, usize) {
    let prefix = format!("{:>3}. ", index + 1);
    let checkbox = if kept { "[X]" } else { "[ ]" };
    let fixed = prefix.chars().count() + checkbox.len() + 1;
    let name = truncate(name, opts.column_width.saturating_sub(fixed));
    let width = fixed + name.chars().count();

    let checkbox = match (opts.color, kept) {
        (true, true) => checkbox.green().bold().to_string(),
        (true, false) => checkbox.dark_grey().to_string(),
        (false, _) => checkbox.to_string(),
    };
    (format!("{}{} {}", prefix, checkbox, name), width)
}
