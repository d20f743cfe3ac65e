//! Message templates with runtime arguments
//!
//! Templates use `{}` for the next argument, `{N}` for a positional argument
//! and `{{` / `}}` for literal braces. Logging must never fail because of a
//! bad template, so [`format_message`] falls back to the raw template.

use super::error::{LoggerError, Result};
use std::fmt::{self, Write};

/// Render `template` with `args`, returning the template unchanged on failure
pub fn format_message(template: &str, args: &[&dyn fmt::Display]) -> String {
    try_format(template, args).unwrap_or_else(|_| template.to_string())
}

/// Render `template` with `args`
pub fn try_format(template: &str, args: &[&dyn fmt::Display]) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    let mut next_arg = 0usize;

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut spec = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => spec.push(c),
                        None => return Err(LoggerError::format(template, "unclosed '{'")),
                    }
                }

                let index = if spec.is_empty() {
                    next_arg += 1;
                    next_arg - 1
                } else {
                    spec.trim().parse::<usize>().map_err(|_| {
                        LoggerError::format(template, format!("invalid placeholder '{{{}}}'", spec))
                    })?
                };

                let arg = args.get(index).ok_or_else(|| {
                    LoggerError::format(template, format!("argument {} is missing", index))
                })?;
                write!(out, "{}", arg)
                    .map_err(|_| LoggerError::format(template, format!("argument {} failed to display", index)))?;
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => return Err(LoggerError::format(template, "unmatched '}'")),
            c => out.push(c),
        }
    }

    Ok(out)
}
