//! JSON shapes printed by `propconf dump --json`.
//!
//! ```json
//! {
//!   "path": "player.cfg",
//!   "entries": { "playback.volume": "0.8", "ui.skin": "Default" },
//!   "malformed": [ { "line": 7, "reason": "unpaired UTF-16 surrogate ..." } ]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use propconf_core::format::{MalformedLine, ParsedProperties};
use serde::{Deserialize, Serialize};

/// Everything read from one property file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dump {
    pub path: String,
    /// Decoded entries, sorted by key.
    pub entries: BTreeMap<String, String>,
    pub malformed: Vec<Malformed>,
}

/// A skipped line, with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Malformed {
    pub line: usize,
    pub reason: String,
}

impl Dump {
    pub fn new(path: &Path, parsed: ParsedProperties) -> Self {
        Self {
            path: path.display().to_string(),
            entries: parsed.entries,
            malformed: parsed.malformed.into_iter().map(Malformed::from).collect(),
        }
    }
}

impl From<MalformedLine> for Malformed {
    fn from(line: MalformedLine) -> Self {
        Self {
            line: line.line,
            reason: line.reason,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use propconf_core::format::parse_str;

    #[test]
    fn test_dump_serializes_entries_as_object() {
        // Arrange
        let parsed = parse_str("b=2\na=1\n");

        // Act
        let json = serde_json::to_value(Dump::new(Path::new("x.cfg"), parsed)).unwrap();

        // Assert
        assert_eq!(json["path"], "x.cfg");
        assert_eq!(json["entries"]["a"], "1");
        assert_eq!(json["malformed"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_dump_keeps_malformed_line_numbers() {
        let parsed = parse_str("ok=1\nbad=\\u00\n");

        let dump = Dump::new(Path::new("x.cfg"), parsed);

        assert_eq!(dump.entries.len(), 1);
        assert_eq!(dump.malformed[0].line, 2);
    }
}
