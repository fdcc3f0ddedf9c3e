//! `!` history references, resolved before the line is parsed.
//!
//! - `!!` is the most recent entry
//! - `!N` is entry N, counting from 1
//! - `!prefix` is the most recent entry starting with `prefix`
//!
//! Only the first word of the line is a reference; the rest is kept and
//! appended to the expanded entry.

use crate::error::ShellError;

/// Expand a leading history reference in `line`.
///
/// Returns `Ok(None)` when the line does not start with a reference.
pub fn expand(history: &[String], line: &str) -> Result<Option<String>, ShellError> {
    let Some(body) = line.strip_prefix('!') else {
        return Ok(None);
    };
    let end = body.find(char::is_whitespace).unwrap_or(body.len());
    let (reference, rest) = body.split_at(end);
    if reference.is_empty() {
        return Ok(None);
    }

    let entry = lookup(history, reference).ok_or(ShellError::EventNotFound)?;
    Ok(Some(format!("{entry}{rest}")))
}

fn lookup<'h>(history: &'h [String], reference: &str) -> Option<&'h str> {
    if reference == "!" {
        return history.last().map(String::as_str);
    }
    if let Ok(n) = reference.parse::<usize>() {
        return n
            .checked_sub(1)
            .and_then(|i| history.get(i))
            .map(String::as_str);
    }
    history
        .iter()
        .rev()
        .find(|entry| entry.starts_with(reference))
        .map(String::as_str)
}
