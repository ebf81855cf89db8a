//! Property-file reader: logical lines, key/value split and decoding.
//!
//! Reading happens in two passes over one logical line at a time:
//!
//! 1. [`LineReader`] turns physical lines into logical lines.  It skips
//!    leading whitespace, blank lines and `#`/`!` comment lines, and joins a
//!    line ending in an unescaped `\` with the next one (whose leading
//!    whitespace is dropped).
//! 2. [`split_entry`] cuts the logical line into a raw key and raw value at
//!    the first unescaped `=`, `:` or whitespace, and both halves go through
//!    [`unescape`].
//!
//! A line whose escapes cannot be decoded is reported in
//! [`ParsedProperties::malformed`] and skipped; every other line still
//! loads.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, warn};

use super::escape::unescape;
use super::FormatError;

/// One logical line that was skipped because it could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLine {
    /// 1-based physical line number where the logical line starts.
    pub line: usize,
    /// Human-readable reason.
    pub reason: String,
}

/// The result of reading a property text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedProperties {
    /// Decoded entries.  A key that appears twice keeps its last value.
    pub entries: BTreeMap<String, String>,
    /// Lines that were skipped.
    pub malformed: Vec<MalformedLine>,
}

/// A logical line: its starting physical line number and its raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LogicalLine {
    pub(crate) number: usize,
    pub(crate) text: Vec<char>,
}

/// Splits a character stream into logical lines.
pub(crate) struct LineReader<I: Iterator<Item = char>> {
    chars: I,
    physical_line: usize,
    skip_lf: bool,
}

impl<I: Iterator<Item = char>> LineReader<I> {
    pub(crate) fn new(chars: I) -> Self {
        Self {
            chars,
            physical_line: 1,
            skip_lf: false,
        }
    }

    /// Returns the next logical line, or `None` at end of input.
    pub(crate) fn next_line(&mut self) -> Option<LogicalLine> {
        let mut buf: Vec<char> = Vec::new();
        let mut start = self.physical_line;
        let mut skip_white_space = true;
        let mut is_new_line = true;
        let mut is_comment_line = false;
        let mut appended_line_begin = false;
        let mut preceding_backslash = false;

        loop {
            let Some(c) = self.chars.next() else {
                if is_comment_line || buf.is_empty() {
                    return None;
                }
                if preceding_backslash {
                    buf.pop();
                }
                return Some(LogicalLine { number: start, text: buf });
            };

            if self.skip_lf {
                self.skip_lf = false;
                if c == '\n' {
                    continue;
                }
            }

            if c == '\r' {
                self.skip_lf = true;
            }
            if c == '\r' || c == '\n' {
                self.physical_line += 1;
            }

            if skip_white_space {
                if matches!(c, ' ' | '\t' | '\u{000C}') {
                    continue;
                }
                if !appended_line_begin && (c == '\r' || c == '\n') {
                    start = self.physical_line;
                    continue;
                }
                skip_white_space = false;
                appended_line_begin = false;
            }

            if is_new_line {
                is_new_line = false;
                if c == '#' || c == '!' {
                    is_comment_line = true;
                    continue;
                }
            }

            if c != '\n' && c != '\r' {
                if is_comment_line {
                    continue;
                }
                buf.push(c);
                preceding_backslash = c == '\\' && !preceding_backslash;
                continue;
            }

            // Line terminator.
            if is_comment_line || buf.is_empty() {
                is_comment_line = false;
                is_new_line = true;
                skip_white_space = true;
                preceding_backslash = false;
                buf.clear();
                start = self.physical_line;
                continue;
            }

            if preceding_backslash {
                buf.pop();
                skip_white_space = true;
                appended_line_begin = true;
                preceding_backslash = false;
                continue;
            }

            return Some(LogicalLine { number: start, text: buf });
        }
    }
}

/// Cuts a logical line into its raw (still escaped) key and value.
pub(crate) fn split_entry(line: &[char]) -> (String, String) {
    let limit = line.len();
    let mut key_len = 0;
    let mut value_start = limit;
    let mut has_sep = false;
    let mut preceding_backslash = false;

    while key_len < limit {
        let c = line[key_len];
        if (c == '=' || c == ':') && !preceding_backslash {
            value_start = key_len + 1;
            has_sep = true;
            break;
        } else if matches!(c, ' ' | '\t' | '\u{000C}') && !preceding_backslash {
            value_start = key_len + 1;
            break;
        }
        preceding_backslash = c == '\\' && !preceding_backslash;
        key_len += 1;
    }

    while value_start < limit {
        let c = line[value_start];
        if !matches!(c, ' ' | '\t' | '\u{000C}') {
            if !has_sep && (c == '=' || c == ':') {
                has_sep = true;
            } else {
                break;
            }
        }
        value_start += 1;
    }

    let key: String = line[..key_len].iter().collect();
    let value: String = line[value_start..].iter().collect();
    (key, value)
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Parses property text.
///
/// # Examples
///
/// ```rust
/// use propconf_core::format::parse_str;
///
/// let parsed = parse_str("# comment\nplayback.volume = 0.5\nui.skin:dark\n");
/// assert_eq!(parsed.entries["playback.volume"], "0.5");
/// assert_eq!(parsed.entries["ui.skin"], "dark");
/// assert!(parsed.malformed.is_empty());
/// ```
pub fn parse_str(text: &str) -> ParsedProperties {
    parse_chars(text.chars())
}

/// Parses an ISO-8859-1 byte stream: every byte is one character.
pub fn parse_latin1(bytes: &[u8]) -> ParsedProperties {
    parse_chars(bytes.iter().map(|&b| char::from(b)))
}

/// Reads and parses a property file.
///
/// The file is decoded as UTF-8 when valid and as ISO-8859-1 otherwise, so
/// both hand-edited UTF-8 files and escaped pure-ASCII files load.
///
/// # Errors
///
/// Returns [`FormatError::Io`] when the file cannot be read.
pub fn read_file(path: &Path) -> Result<ParsedProperties, FormatError> {
    let bytes = std::fs::read(path).map_err(|source| FormatError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed = match std::str::from_utf8(&bytes) {
        Ok(text) => parse_str(text),
        Err(_) => {
            debug!("{} is not UTF-8; reading as ISO-8859-1", path.display());
            parse_latin1(&bytes)
        }
    };
    Ok(parsed)
}

fn parse_chars(chars: impl Iterator<Item = char>) -> ParsedProperties {
    let mut reader = LineReader::new(chars);
    let mut parsed = ParsedProperties::default();

    while let Some(line) = reader.next_line() {
        let (raw_key, raw_value) = split_entry(&line.text);
        match (unescape(&raw_key), unescape(&raw_value)) {
            (Ok(key), Ok(value)) => {
                parsed.entries.insert(key, value);
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!("skipping malformed property line {}: {e}", line.number);
                parsed.malformed.push(MalformedLine {
                    line: line.number,
                    reason: e.to_string(),
                });
            }
        }
    }

    parsed
}

// ── Tests ─────────────────────────────────────────────────────────────────────
