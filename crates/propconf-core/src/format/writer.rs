//! Property-file writer.
//!
//! Output layout:
//!
//! ```text
//! #<header line 1>
//! #<header line 2>
//! #<timestamp>
//! #<comment for key a>
//! a=...
//! b=...
//! ```
//!
//! Entries are always written sorted by key so that two saves of the same
//! entry set produce the same bytes (apart from the timestamp line) and
//! version-control diffs stay minimal.

use std::collections::BTreeMap;
use std::path::Path;

use super::escape::{escape, push_unicode_escape};
use super::FormatError;

/// Options controlling how entries are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Write every non-ASCII character as `\uXXXX`.
    pub escape_unicode: bool,
    /// Write a `#<date>` line under the header.
    pub timestamp: bool,
}

impl Default for WriteOptions {
    /// | Field          | Default |
    /// |----------------|---------|
    /// | escape_unicode | `true`  |
    /// | timestamp      | `true`  |
    fn default() -> Self {
        Self {
            escape_unicode: true,
            timestamp: true,
        }
    }
}

/// A value together with the free-text comment written above its line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    pub value: String,
    pub comment: Option<String>,
}

impl Entry {
    /// Creates an entry without a comment.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            comment: None,
        }
    }

    /// Creates an entry with a comment.  An empty comment is dropped.
    pub fn commented(value: impl Into<String>, comment: impl Into<String>) -> Self {
        let comment = comment.into();
        Self {
            value: value.into(),
            comment: (!comment.is_empty()).then_some(comment),
        }
    }
}

impl From<String> for Entry {
    fn from(value: String) -> Self {
        Entry::new(value)
    }
}

impl From<&str> for Entry {
    fn from(value: &str) -> Self {
        Entry::new(value)
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Renders `entries` as property text.
///
/// # Examples
///
/// ```rust
/// use std::collections::BTreeMap;
/// use propconf_core::format::{parse_str, write_string, Entry, WriteOptions};
///
/// let mut entries = BTreeMap::new();
/// entries.insert("ui.title".to_string(), Entry::new("a = b # c"));
/// let options = WriteOptions { timestamp: false, ..WriteOptions::default() };
///
/// let text = write_string(Some("settings"), &entries, options);
/// assert_eq!(text, "#settings\nui.title=a \\= b \\# c\n");
/// assert_eq!(parse_str(&text).entries["ui.title"], "a = b # c");
/// ```
pub fn write_string(
    header: Option<&str>,
    entries: &BTreeMap<String, Entry>,
    options: WriteOptions,
) -> String {
    let mut out = String::new();

    if let Some(header) = header {
        write_comment(&mut out, header, options.escape_unicode);
    }
    if options.timestamp {
        out.push('#');
        out.push_str(&timestamp());
        out.push('\n');
    }

    for (key, entry) in entries {
        if let Some(comment) = &entry.comment {
            write_comment(&mut out, comment, options.escape_unicode);
        }
        out.push_str(&escape(key, true, options.escape_unicode));
        out.push('=');
        out.push_str(&escape(&entry.value, false, options.escape_unicode));
        out.push('\n');
    }

    out
}

/// Writes `entries` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`FormatError::Io`] if the directory or file cannot be written.
pub fn write_file(
    path: &Path,
    header: Option<&str>,
    entries: &BTreeMap<String, Entry>,
    options: WriteOptions,
) -> Result<(), FormatError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| FormatError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let text = write_string(header, entries, options);
    std::fs::write(path, text).map_err(|source| FormatError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Writes a free-text comment, one `#` line per embedded line break.
///
/// Lines that already start with `#` or `!` are written as they are.
fn write_comment(out: &mut String, comment: &str, escape_unicode: bool) {
    let normalized = comment.replace("\r\n", "\n").replace('\r', "\n");
    for line in normalized.split('\n') {
        if !(line.starts_with('#') || line.starts_with('!')) {
            out.push('#');
        }
        for c in line.chars() {
            if escape_unicode && (c as u32) > 0x7E {
                push_unicode_escape(out, c);
            } else {
                out.push(c);
            }
        }
        out.push('\n');
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%a %b %d %H:%M:%S %:z %Y").to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
