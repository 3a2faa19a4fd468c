//! Selector type definitions: item kinds, commands and actions.

/// Which universe a selector pages through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorKind {
    /// Group labels
    Groups,
    /// Channels of the kept groups
    Channels,
}

impl SelectorKind {
    /// Page heading.
    pub fn title(&self) -> &'static str {
        match self {
            SelectorKind::Groups => "GROUPS",
            SelectorKind::Channels => "CHANNELS",
        }
    }

    /// Plural noun used in messages.
    pub fn noun(&self) -> &'static str {
        match self {
            SelectorKind::Groups => "groups",
            SelectorKind::Channels => "channels",
        }
    }

    /// Whether deselecting a page also moves to the next one.
    pub fn deselect_advances(&self) -> bool {
        matches!(self, SelectorKind::Channels)
    }

    /// One-line command summary shown under each page.
    pub fn command_hint(&self) -> &'static str {
        match self {
            SelectorKind::Groups => {
                "Commands: n=next p=prev a=all on page d=none on page A=ALL+finish N=NONE /text=search 7|3-9=toggle h=help q=save"
            }
            SelectorKind::Channels => {
                "Commands: n=next p=prev a=all on page d=none on page+next A=ALL+finish N=NONE /text=search 7|3-9=toggle h=help q=save"
            }
        }
    }
}

/// A parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Save and leave the selector
    Quit,
    /// Next page
    NextPage,
    /// Previous page
    PrevPage,
    /// Keep every item on the visible page
    SelectPage,
    /// Drop every item on the visible page
    DeselectPage,
    /// Keep the whole universe and leave
    SelectAll,
    /// Drop the whole universe
    DeselectAll,
    /// Filter by substring; empty clears
    Search(String),
    /// Flip items `first..=last` (1-based, filtered order)
    Toggle { first: usize, last: usize },
    /// Show the command list
    Help,
    /// Anything else
    Invalid(String),
}

impl Command {
    /// Parse one input line. Letters are case-sensitive.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        match input {
            "q" => return Command::Quit,
            "n" => return Command::NextPage,
            "p" => return Command::PrevPage,
            "a" => return Command::SelectPage,
            "d" => return Command::DeselectPage,
            "A" => return Command::SelectAll,
            "N" => return Command::DeselectAll,
            "h" | "?" => return Command::Help,
            _ => {}
        }

        if let Some(query) = input.strip_prefix('/') {
            return Command::Search(query.trim().to_string());
        }

        if let Some(index) = parse_index(input) {
            return Command::Toggle {
                first: index,
                last: index,
            };
        }

        if let Some((first, last)) = input.split_once('-') {
            if let (Some(first), Some(last)) = (parse_index(first.trim()), parse_index(last.trim())) {
                return Command::Toggle { first, last };
            }
        }

        Command::Invalid(input.to_string())
    }
}

fn parse_index(text: &str) -> Option<usize> {
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// What the driver loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Keep prompting
    None,
    /// Leave the selector and return the kept items
    Finish,
}

pub const HELP_TEXT: &str = "\
  q        save selection and continue
  n / p    next / previous page
  a        keep every item on this page
  d        drop every item on this page (channels: then go to the next page)
  A        keep everything and finish
  N        drop everything
  /text    show only items containing text; '/' alone clears the search
  7        toggle item 7
  3-9      toggle items 3 to 9
  h        this help";
