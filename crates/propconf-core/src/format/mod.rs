//! Text Format Engine: the line-oriented property-file grammar.
//!
//! This module knows nothing about types.  It exchanges plain
//! `key -> value` string maps (optionally with a comment per key) with its
//! caller and guarantees that any value survives a write/read cycle
//! unchanged.
//!
//! # What does a property file look like? (for beginners)
//!
//! ```text
//! # Player settings
//! #Mon Oct 19 10:00:00 +02:00 2026
//! playback.volume=0.75
//! ui.skin=Dark\ Matter
//! library.folders=/music;/mnt/nas/music
//! ```
//!
//! - `#` or `!` starts a full-line comment.
//! - The key ends at the first unescaped `=`, `:` or whitespace.
//! - A trailing `\` continues the logical line on the next physical line.
//! - `\t`, `\n`, `\r`, `\f` and `\uXXXX` escapes are decoded; any other
//!   `\x` decodes to `x`.
//!
//! # Sub-modules
//!
//! - **`escape`** – decoding (`unescape`) and encoding (`escape`) of a single
//!   key or value.
//! - **`reader`** – splits text into logical lines and lines into entries.
//! - **`writer`** – writes a sorted, commented, escaped entry set.
//! - **`list`**   – joins and splits list-of-values with nested escaping.

pub mod escape;
pub mod list;
pub mod reader;
pub mod writer;

use std::path::PathBuf;

use thiserror::Error;

pub use escape::{escape, unescape};
pub use list::{join_list, join_list_reserving, split_list, split_list_raw, unescape_element};
pub use reader::{parse_latin1, parse_str, read_file, MalformedLine, ParsedProperties};
pub use writer::{write_file, write_string, Entry, WriteOptions};

/// Errors produced while reading or writing property text.
#[derive(Debug, Error)]
pub enum FormatError {
    /// A `\u` escape was not followed by exactly four hex digits.
    #[error("malformed \\uXXXX escape: {0:?}")]
    MalformedEscape(String),

    /// A UTF-16 surrogate escape was not part of a valid high/low pair.
    #[error("unpaired UTF-16 surrogate \\u{0:04X}")]
    UnpairedSurrogate(u16),

    /// The file could not be read or written.
    #[error("I/O error accessing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
