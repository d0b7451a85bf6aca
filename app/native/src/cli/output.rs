//! CLI output formatting: highlighted JSON, tables and small cell formatters.

use std::fmt::Write as _;

use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use tabled::Table;
use tabled::settings::Style;

use crate::error::WinCtxError;

const INDENT: &str = "  ";

/// Serializes `value` and prints it as highlighted JSON.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), WinCtxError> {
    print_highlighted_json(&serde_json::to_value(value)?);
    Ok(())
}

/// Prints JSON with keys in cyan, strings in green, numbers in yellow and
/// booleans/null in magenta.
pub fn print_highlighted_json(value: &Value) { println!("{}", highlight(value, 0)); }

fn highlight(value: &Value, depth: usize) -> String {
    match value {
        Value::Null => "null".magenta().to_string(),
        Value::Bool(b) => b.to_string().magenta().to_string(),
        Value::Number(n) => n.to_string().yellow().to_string(),
        Value::String(_) => value.to_string().green().to_string(),
        Value::Array(items) if items.is_empty() => "[]".white().bold().to_string(),
        Value::Object(map) if map.is_empty() => "{}".white().bold().to_string(),
        Value::Array(items) => {
            let body = items.iter().map(|item| highlight(item, depth + 1));
            block(body, depth, ('[', ']'))
        }
        Value::Object(map) => {
            let body = map.iter().map(|(key, item)| {
                let key = Value::from(key.as_str()).to_string();
                format!("{}{} {}", key.cyan(), ":".white(), highlight(item, depth + 1))
            });
            block(body, depth, ('{', '}'))
        }
    }
}

fn block(items: impl Iterator<Item = String>, depth: usize, (open, close): (char, char)) -> String {
    let inner = INDENT.repeat(depth + 1);
    let mut out = open.to_string().white().bold().to_string();
    let mut first = true;
    for item in items {
        if !first {
            out.push_str(&",".white().to_string());
        }
        first = false;
        let _ = write!(out, "\n{inner}{item}");
    }
    let _ = write!(out, "\n{}{}", INDENT.repeat(depth), close.to_string().white().bold());
    out
}

/// Prints a bold `Title (count)` heading followed by a rounded table.
pub fn print_table(title: &str, table: &mut Table) {
    let count = table.count_rows().saturating_sub(1);
    println!("{}", format!("{title} ({count})").bold());
    println!("{}", table.with(Style::rounded()));
}

/// Prints a dimmed message for empty results.
pub fn print_empty(message: &str) { println!("{}", message.dimmed()); }

/// Truncates to `max_chars` characters, ending with an ellipsis when cut.
#[must_use]
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{kept}…")
}

/// Formats a boolean as a colored check or cross.
#[must_use]
pub fn format_bool(value: bool) -> String {
    if value { "✓".green().to_string() } else { "✗".red().to_string() }
}

/// Formats a volume in `[0.0, 1.0]` as a whole percentage.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn format_volume(volume: f32) -> String { format!("{}%", (volume * 100.0).round() as i32) }
