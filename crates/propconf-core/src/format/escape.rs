//! Escape decoding and encoding for a single key or value.
//!
//! [`unescape`] is applied to the raw key and value slices the reader cuts
//! out of a logical line; [`escape`] is its syntactic inverse and is used by
//! the writer.  For every string `s`:
//!
//! ```rust
//! use propconf_core::format::{escape, unescape};
//!
//! let s = "a = b # c\nd \u{e9}";
//! assert_eq!(unescape(&escape(s, false, true)).unwrap(), s);
//! ```

use super::FormatError;

/// Decodes the escape sequences of one key or value.
///
/// - `\t`, `\r`, `\n`, `\f` map to the matching control character.
/// - `\uXXXX` (exactly four hex digits) decodes to that UTF-16 code unit;
///   a high surrogate must be followed by a `\u` low surrogate and the pair
///   decodes to one supplementary character.
/// - Any other `\x` decodes to `x`.
/// - A lone trailing backslash is dropped.
///
/// # Errors
///
/// Returns [`FormatError::MalformedEscape`] for a short or non-hex `\u`
/// sequence and [`FormatError::UnpairedSurrogate`] for a surrogate that is
/// not part of a valid pair.
pub fn unescape(input: &str) -> Result<String, FormatError> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    let mut high: Option<u16> = None;

    while let Some(c) = chars.next() {
        if c != '\\' {
            if let Some(unit) = high.take() {
                return Err(FormatError::UnpairedSurrogate(unit));
            }
            out.push(c);
            continue;
        }

        let Some(escaped) = chars.next() else {
            break;
        };

        if escaped == 'u' {
            let unit = read_hex_unit(&mut chars)?;
            match (high.take(), unit) {
                (None, 0xD800..=0xDBFF) => high = Some(unit),
                (None, 0xDC00..=0xDFFF) => return Err(FormatError::UnpairedSurrogate(unit)),
                (None, _) => out.push(char::from_u32(u32::from(unit)).unwrap_or('\u{FFFD}')),
                (Some(hi), 0xDC00..=0xDFFF) => {
                    let code = 0x10000 + ((u32::from(hi) - 0xD800) << 10) + (u32::from(unit) - 0xDC00);
                    out.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
                }
                (Some(hi), _) => return Err(FormatError::UnpairedSurrogate(hi)),
            }
            continue;
        }

        if let Some(unit) = high.take() {
            return Err(FormatError::UnpairedSurrogate(unit));
        }
        out.push(match escaped {
            't' => '\t',
            'r' => '\r',
            'n' => '\n',
            'f' => '\u{000C}',
            other => other,
        });
    }

    match high {
        Some(unit) => Err(FormatError::UnpairedSurrogate(unit)),
        None => Ok(out),
    }
}

/// Encodes one key or value so the reader decodes it back unchanged.
///
/// `escape_space` escapes every space (used for keys); otherwise only a
/// leading space is escaped.  `escape_unicode` writes every character
/// above `~` as `\uXXXX` (as a surrogate pair above U+FFFF), which keeps the
/// output pure ASCII.  Control characters without a short form are always
/// written as `\uXXXX`.
pub fn escape(input: &str, escape_space: bool, escape_unicode: bool) -> String {
    let mut out = String::with_capacity(input.len() * 2);

    for (i, c) in input.chars().enumerate() {
        match c {
            ' ' if i == 0 || escape_space => out.push_str("\\ "),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{000C}' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || ((c as u32) > 0x7E && escape_unicode) => {
                push_unicode_escape(&mut out, c);
            }
            c => out.push(c),
        }
    }

    out
}

/// Appends `c` as one or two `\uXXXX` escapes.
pub(crate) fn push_unicode_escape(out: &mut String, c: char) {
    let mut units = [0u16; 2];
    for unit in c.encode_utf16(&mut units) {
        out.push_str(&format!("\\u{:04X}", unit));
    }
}

fn read_hex_unit(chars: &mut std::str::Chars<'_>) -> Result<u16, FormatError> {
    let mut unit: u16 = 0;
    let mut seen = String::with_capacity(4);
    for _ in 0..4 {
        let Some(c) = chars.next() else {
            return Err(FormatError::MalformedEscape(format!("\\u{seen}")));
        };
        seen.push(c);
        let digit = c
            .to_digit(16)
            .ok_or_else(|| FormatError::MalformedEscape(format!("\\u{seen}")))?;
        unit = (unit << 4) | digit as u16;
    }
    Ok(unit)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
