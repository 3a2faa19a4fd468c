//! Line-based prompts used outside the selectors.

use std::io::{self, BufRead, Write};

/// Print `prompt` and read one trimmed line.
///
/// Returns `None` at end of input.
pub fn prompt_line<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> io::Result<Option<String>> {
    write!(output, "{}", prompt)?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        writeln!(output)?;
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Prompt until the answer is non-empty and accepted by `validator`.
///
/// Returns `None` at end of input.
pub fn prompt_with_retry<R, W, F>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
    validator: F,
) -> io::Result<Option<String>>
where
    R: BufRead,
    W: Write,
    F: Fn(&str) -> bool,
{
    loop {
        let Some(value) = prompt_line(input, output, prompt)? else {
            return Ok(None);
        };
        if value.is_empty() {
            writeln!(output, "Empty input not allowed.")?;
            continue;
        }
        if !validator(&value) {
            writeln!(output, "Invalid input. Try again.")?;
            continue;
        }
        return Ok(Some(value));
    }
}

/// Ask a yes/no question where an empty answer means yes.
///
/// End of input counts as no.
pub fn confirm<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> io::Result<bool> {
    let answer = prompt_line(input, output, &format!("{} (y/n) [y]: ", question))?;
    Ok(match answer {
        Some(answer) => matches!(answer.to_lowercase().as_str(), "" | "y" | "yes"),
        None => false,
    })
}
