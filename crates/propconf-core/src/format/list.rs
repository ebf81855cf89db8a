//! List-of-values encoding inside a single property value.
//!
//! Elements are separated by `;`.  Inside an element `\` and `;` are
//! escaped with a backslash, so a list of lists simply escapes twice.  An
//! empty last element is followed by an extra `;` which keeps `[]`, `[""]`
//! and `["a", ""]` distinguishable:
//!
//! | List          | Text    |
//! |---------------|---------|
//! | `[]`          | ``      |
//! | `[""]`        | `;`     |
//! | `["a"]`       | `a`     |
//! | `["a", ""]`   | `a;;`   |
//! | `["a;b", "c"]`| `a\;b;c`|
//!
//! [`join_list_reserving`] additionally marks elements equal to a reserved
//! word (the converters reserve `null`) so they survive a split.

/// Element separator.
pub const SEPARATOR: char = ';';

/// Joins list elements into one value.
pub fn join_list<S: AsRef<str>>(elements: &[S]) -> String {
    join(elements, None)
}

/// Like [`join_list`], but an element equal to `reserved` is written with a
/// leading backslash.  [`split_list_raw`] keeps that backslash, so a reader
/// can tell the bare reserved word from an element that merely has the same
/// text.
///
/// ```rust
/// use propconf_core::format::{join_list_reserving, split_list, split_list_raw};
///
/// let text = join_list_reserving(&["null", "a"], "null");
/// assert_eq!(text, "\\null;a");
/// assert_eq!(split_list_raw(&text), vec!["\\null", "a"]);
/// assert_eq!(split_list(&text), vec!["null", "a"]);
/// ```
pub fn join_list_reserving<S: AsRef<str>>(elements: &[S], reserved: &str) -> String {
    join(elements, Some(reserved))
}

fn join<S: AsRef<str>>(elements: &[S], reserved: Option<&str>) -> String {
    let mut out = String::new();
    for (i, element) in elements.iter().enumerate() {
        if i > 0 {
            out.push(SEPARATOR);
        }
        let element = element.as_ref();
        if reserved == Some(element) {
            out.push('\\');
        }
        for c in element.chars() {
            if c == '\\' || c == SEPARATOR {
                out.push('\\');
            }
            out.push(c);
        }
    }
    if elements.last().is_some_and(|e| e.as_ref().is_empty()) {
        out.push(SEPARATOR);
    }
    out
}

/// Splits a value produced by [`join_list`] (or written by hand) back into
/// its elements.  A trailing `;` terminates the last element.
pub fn split_list(text: &str) -> Vec<String> {
    split_list_raw(text).iter().map(|raw| unescape_element(raw)).collect()
}

/// Splits like [`split_list`] but leaves each element's escapes in place.
/// Decode an element with [`unescape_element`].
pub fn split_list_raw(text: &str) -> Vec<String> {
    let mut elements = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                current.push(c);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            SEPARATOR => elements.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }

    if !text.is_empty() && !text_ends_with_separator(text) {
        elements.push(current);
    }
    elements
}

/// Removes the list-level escapes of one raw element.
pub fn unescape_element(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// `true` when `text` ends in an unescaped separator.
fn text_ends_with_separator(text: &str) -> bool {
    if !text.ends_with(SEPARATOR) {
        return false;
    }
    let backslashes = text[..text.len() - 1]
        .chars()
        .rev()
        .take_while(|&c| c == '\\')
        .count();
    backslashes % 2 == 0
}

// ── Tests ─────────────────────────────────────────────────────────────────────
