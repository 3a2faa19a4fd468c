//! Interactive paginated selector.
//!
//! [`Selector`] holds the state and applies [`Command`]s; [`run`] drives it
//! against a line-based input and a text output until the user finishes.

mod state;
mod types;

pub use state::Selector;
pub use types::{Action, Command, SelectorKind, HELP_TEXT};

use crate::view::ViewOptions;
use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use log::{debug, info};
use std::collections::BTreeSet;
use std::io::{self, BufRead, Write};

/// Run the selection loop until `q`, `A` or end of input.
///
/// Returns only the kept items.
pub fn run<R: BufRead, W: Write>(
    mut selector: Selector,
    opts: &ViewOptions,
    input: &mut R,
    output: &mut W,
) -> io::Result<BTreeSet<String>> {
    debug!(
        "Starting {} selection over {} items",
        selector.kind.noun(),
        selector.selection.len()
    );

    loop {
        selector.settle();

        if opts.clear_screen {
            queue!(output, Clear(ClearType::All), MoveTo(0, 0))?;
        }
        write_messages(&mut selector, opts, output)?;
        write!(output, "{}", selector.render(opts))?;
        write!(output, "{}", selector.prompt())?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            debug!("Input closed, finishing {} selection", selector.kind.noun());
            writeln!(output)?;
            break;
        }

        if selector.handle_input(&line) == Action::Finish {
            write_messages(&mut selector, opts, output)?;
            break;
        }
    }

    let kept = selector.into_kept();
    info!("Kept {} {}", kept.len(), if kept.len() == 1 { "item" } else { "items" });
    Ok(kept)
}

fn write_messages<W: Write>(selector: &mut Selector, opts: &ViewOptions, output: &mut W) -> io::Result<()> {
    let (error, status) = selector.take_messages();
    if let Some(error) = error {
        if opts.color {
            writeln!(output, "{}", error.red())?;
        } else {
            writeln!(output, "{}", error)?;
        }
    }
    if let Some(status) = status {
        if opts.color {
            writeln!(output, "{}", status.cyan())?;
        } else {
            writeln!(output, "{}", status)?;
        }
    }
    Ok(())
}
