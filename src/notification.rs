//! Notification text for a pending tool call.
//!
//! Turns a [`HookInput`] into a short title, a body that fits on a lock
//! screen, and an ntfy tag shortcode (rendered as an emoji by the app).
//!
//! | Tool                    | Title                          | Body                         |
//! |-------------------------|--------------------------------|------------------------------|
//! | `Bash`                  | description, else tool name    | `$ <command>`                |
//! | `Edit`                  | `Edit <file name>`             | relative path + first lines  |
//! | `Write`                 | `Write <file name>`            | relative path                |
//! | anything else           | tool name                      | first three `key=value`s     |
//!
//! Every title is prefixed with the project (last component of `cwd`).

use std::path::Path;

use crate::constants::{
    DEFAULT_TAG, DIFF_LINE_CHARS, MAX_PARAMS, PARAM_VALUE_CHARS, TITLE_DESCRIPTION_CHARS,
};
use crate::hook::{display_value, HookInput};

/// Separator between project and summary in titles.
const TITLE_SEPARATOR: &str = " \u{00b7} ";

/// Prefix for removed lines in Edit previews (U+2212 MINUS SIGN).
const REMOVED_PREFIX: &str = "\u{2212} ";

/// Formatted notification content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Notification title (sent as a header, so single-line).
    pub title: String,
    /// Notification body.
    pub body: String,
    /// ntfy tag shortcode.
    pub tag: &'static str,
}

impl Notification {
    /// Builds the notification for a tool call.
    pub fn for_tool_call(input: &HookInput) -> Self {
        let tool = input.tool_name.as_str();
        let cwd = input.cwd.as_str();
        let project = project_name(cwd);
        let mut title = format!("{project}{TITLE_SEPARATOR}{tool}");

        let body = match tool {
            "Bash" => {
                let description = input.input_str("description");
                if !description.is_empty() {
                    title = format!(
                        "{project}{TITLE_SEPARATOR}{}",
                        truncate_chars(&description, TITLE_DESCRIPTION_CHARS)
                    );
                }
                let command = input.input_str("command");
                if command.is_empty() {
                    "(empty command)".to_string()
                } else {
                    format!("$ {command}")
                }
            }
            "Edit" => {
                let file_path = input.input_str("file_path");
                title = format!("{project}{TITLE_SEPARATOR}Edit {}", file_name(&file_path));
                let mut lines = vec![relative_path(&file_path, cwd).to_string()];
                if let Some(old) = first_line(&input.input_str("old_string")) {
                    lines.push(format!("{REMOVED_PREFIX}{old}"));
                }
                if let Some(new) = first_line(&input.input_str("new_string")) {
                    lines.push(format!("+ {new}"));
                }
                lines.join("\n")
            }
            "Write" => {
                let file_path = input.input_str("file_path");
                title = format!("{project}{TITLE_SEPARATOR}Write {}", file_name(&file_path));
                relative_path(&file_path, cwd).to_string()
            }
            _ => {
                let params = input
                    .tool_input
                    .iter()
                    .take(MAX_PARAMS)
                    .map(|(key, value)| {
                        format!("{key}={}", truncate_chars(&display_value(value), PARAM_VALUE_CHARS))
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                if params.is_empty() {
                    tool.to_string()
                } else {
                    params
                }
            }
        };

        Self {
            title: sanitize_header(&title),
            body,
            tag: tag_for_tool(tool),
        }
    }
}

/// ntfy tag shortcode for a tool.
pub fn tag_for_tool(tool: &str) -> &'static str {
    match tool {
        "Bash" => "computer",
        "Edit" => "pencil2",
        "Write" => "page_facing_up",
        "Read" => "eyes",
        "Glob" | "Grep" => "mag",
        "WebFetch" | "WebSearch" => "globe_with_meridians",
        _ => DEFAULT_TAG,
    }
}

/// Last path component of `cwd`, or `unknown`.
fn project_name(cwd: &str) -> &str {
    match file_name(cwd) {
        "" => "unknown",
        name => name,
    }
}

fn file_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("")
}

/// Makes `file_path` relative to `cwd` when it lies underneath it.
///
/// Falls back to the original path when `cwd` is empty, the file is
/// elsewhere, or stripping would leave nothing.
pub fn relative_path<'a>(file_path: &'a str, cwd: &str) -> &'a str {
    if cwd.is_empty() {
        return file_path;
    }
    match Path::new(file_path).strip_prefix(cwd) {
        Ok(rel) => rel
            .to_str()
            .map(|r| r.trim_start_matches('/'))
            .filter(|r| !r.is_empty())
            .unwrap_or(file_path),
        Err(_) => file_path,
    }
}

/// First line of the trimmed text, truncated for a diff preview.
///
/// A bare `\r` and the Unicode line/paragraph separators also end a line.
fn first_line(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let line = trimmed.split(is_line_break).next().unwrap_or("");
    Some(truncate_chars(line, DIFF_LINE_CHARS))
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Truncates to at most `max` characters without splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Replaces control characters so the title is a valid header value.
fn sanitize_header(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}
