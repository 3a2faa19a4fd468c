//! Selector state and command handling.

use crate::selection::SelectionState;
use crate::view::{self, Page, ViewOptions};
use log::debug;
use std::collections::BTreeSet;

use super::types::{Action, Command, SelectorKind, HELP_TEXT};

/// State of one selection loop.
///
/// Holds the sorted universe, the kept flags, the page cursor and the search
/// filter. Commands are applied whole or not at all.
pub struct Selector {
    /// Groups or channels
    pub kind: SelectorKind,
    /// Sorted universe
    items: Vec<String>,
    /// Kept flags for the universe
    pub selection: SelectionState,
    /// Items per page
    pub page_size: usize,
    /// Offset of the first item on the current page (filtered order)
    pub cursor: usize,
    /// Active search text, empty when unfiltered
    pub filter: String,
    /// Informational message for the next render
    pub status_message: Option<String>,
    /// Error message for the next render
    pub error_message: Option<String>,
}

impl Selector {
    /// Create a selector over the universe of `selection`.
    pub fn new(kind: SelectorKind, selection: SelectionState, page_size: usize) -> Self {
        let items = selection.items().map(str::to_string).collect();
        Self {
            kind,
            items,
            selection,
            page_size: page_size.max(1),
            cursor: 0,
            filter: String::new(),
            status_message: None,
            error_message: None,
        }
    }

    /// Items matching the current filter, in order.
    pub fn visible(&self) -> Vec<&str> {
        view::filter_items(&self.items, &self.filter)
    }

    /// The current page of the filtered list.
    pub fn page(&self) -> Page {
        Page::new(self.visible().len(), self.cursor, self.page_size)
    }

    pub fn set_error(&mut self, message: &str) {
        self.error_message = Some(message.to_string());
    }

    pub fn set_status(&mut self, message: &str) {
        self.status_message = Some(message.to_string());
    }

    /// Take pending messages, error first.
    pub fn take_messages(&mut self) -> (Option<String>, Option<String>) {
        (self.error_message.take(), self.status_message.take())
    }

    /// Drop a search that matches nothing so the next page is not empty.
    pub fn settle(&mut self) {
        if !self.filter.is_empty() && self.visible().is_empty() {
            debug!("Search '{}' matched no {}", self.filter, self.kind.noun());
            let message = format!("No {} match \"{}\". Search cleared.", self.kind.noun(), self.filter);
            self.set_error(&message);
            self.filter.clear();
            self.cursor = 0;
        }
    }

    /// Parse and apply one input line.
    pub fn handle_input(&mut self, line: &str) -> Action {
        self.handle_command(Command::parse(line))
    }

    /// Apply a command.
    pub fn handle_command(&mut self, command: Command) -> Action {
        match command {
            Command::Quit => Action::Finish,
            Command::NextPage => {
                let page = self.page();
                if page.has_next() {
                    self.cursor = page.start + self.page_size;
                } else {
                    self.set_status("Already on the last page.");
                }
                Action::None
            }
            Command::PrevPage => {
                let page = self.page();
                if page.has_prev() {
                    self.cursor = page.start - self.page_size;
                } else {
                    self.set_status("Already on the first page.");
                }
                Action::None
            }
            Command::SelectPage => {
                self.set_page(true);
                self.set_status("All on page selected.");
                Action::None
            }
            Command::DeselectPage => {
                self.set_page(false);
                let page = self.page();
                if self.kind.deselect_advances() && page.has_next() {
                    self.cursor = page.start + self.page_size;
                }
                self.set_status("All on page deselected.");
                Action::None
            }
            Command::SelectAll => {
                self.selection.set_all(true);
                let message = format!("ALL {} {} selected!", self.selection.len(), self.kind.noun());
                self.set_status(&message);
                Action::Finish
            }
            Command::DeselectAll => {
                self.selection.set_all(false);
                let message = format!("ALL {} {} deselected.", self.selection.len(), self.kind.noun());
                self.set_status(&message);
                Action::None
            }
            Command::Search(query) => {
                self.cursor = 0;
                if query.is_empty() {
                    self.filter.clear();
                    self.set_status("Search cleared.");
                } else {
                    let message = format!("Searching for: {}", query);
                    self.filter = query;
                    self.set_status(&message);
                }
                Action::None
            }
            Command::Toggle { first, last } => {
                self.toggle_range(first, last);
                Action::None
            }
            Command::Help => {
                self.set_status(HELP_TEXT);
                Action::None
            }
            Command::Invalid(input) => {
                let message = if input.is_empty() {
                    "Invalid input. Type h for help.".to_string()
                } else {
                    format!("Invalid input '{}'. Type h for help.", input)
                };
                self.set_error(&message);
                Action::None
            }
        }
    }

    fn set_page(&mut self, kept: bool) {
        let page = self.page();
        let names: Vec<String> = self.visible()[page.range()]
            .iter()
            .map(|s| s.to_string())
            .collect();
        for name in &names {
            self.selection.set(name, kept);
        }
    }

    fn toggle_range(&mut self, first: usize, last: usize) {
        let total = self.visible().len();
        if first > last {
            self.set_error(&format!("Invalid range {}-{}: start is after end.", first, last));
            return;
        }
        if first == 0 || last > total {
            let message = if total == 0 {
                "Nothing to toggle.".to_string()
            } else if first == last {
                format!("No item {}. Enter a number from 1 to {}.", first, total)
            } else {
                format!("Range {}-{} is outside 1-{}.", first, last, total)
            };
            self.set_error(&message);
            return;
        }

        let names: Vec<String> = self.visible()[first - 1..last]
            .iter()
            .map(|s| s.to_string())
            .collect();
        for name in &names {
            self.selection.toggle(name);
        }
    }

    /// Rendered page plus the command hint.
    pub fn render(&self, opts: &ViewOptions) -> String {
        let visible = self.visible();
        let page = Page::new(visible.len(), self.cursor, self.page_size);
        let mut out = view::render_page(
            self.kind.title(),
            &visible,
            &page,
            &self.selection,
            &self.filter,
            opts,
        );
        out.push_str(&format!(
            "{} of {} {} kept\n",
            self.selection.kept_count(),
            self.selection.len(),
            self.kind.noun()
        ));
        out.push_str(self.kind.command_hint());
        out.push('\n');
        out
    }

    /// Input prompt showing the page position.
    pub fn prompt(&self) -> String {
        let page = self.page();
        format!("Page {}/{} > ", page.number(), page.count())
    }

    /// Consume the selector, returning the kept items.
    pub fn into_kept(self) -> BTreeSet<String> {
        self.selection.into_kept()
    }
}
