//! The `propconf` subcommands.
//!
//! Every command takes the file it works on plus the [`FileOptions`] that
//! control how the file is rewritten, and returns the text to print.  The
//! binary only parses arguments and prints; everything testable lives here.
//!
//! # Raw versus typed commands (for beginners)
//!
//! `dump`, `get`, `set`, `remove`, `normalize` and `check` treat a file as a
//! plain `key -> text` map.  They never need to know what a value means.
//!
//! `init-player` and `show-player` load the file into the demo
//! [`Player`](crate::player::Player), so values are converted, validated
//! against constraints and applied to real fields.  Keys the player does not
//! know are kept and written back unchanged.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use propconf_core::config::normalize_key;
use propconf_core::format::{escape, read_file, FormatError, ParsedProperties, WriteOptions};
use propconf_core::{Configuration, ConfigurationError, Converters, LoadSummary};
use thiserror::Error;
use tracing::{info, warn};

use crate::player::{Diagnostics, Player};
use crate::report::Dump;

// ── Error type ────────────────────────────────────────────────────────────────

/// Errors a command reports to the user.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The requested key is not in the file.
    #[error("no entry {key:?} in {}", path.display())]
    MissingKey { key: String, path: PathBuf },

    /// `check` found lines that cannot be decoded.
    #[error("{} has {count} malformed line(s): {details}", path.display())]
    Malformed {
        path: PathBuf,
        count: usize,
        details: String,
    },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("cannot encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// ── Options ───────────────────────────────────────────────────────────────────

/// How commands that rewrite a file write it.
///
/// | Field  | Default                  |
/// |--------|--------------------------|
/// | title  | `"Settings"`             |
/// | write  | `WriteOptions::default()`|
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOptions {
    /// Header comment on the first line.
    pub title: String,
    pub write: WriteOptions,
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            title: "Settings".to_string(),
            write: WriteOptions::default(),
        }
    }
}

// ── Raw commands ──────────────────────────────────────────────────────────────

/// Lists every entry, one `key=value` per line, or the whole file as JSON.
///
/// # Errors
///
/// [`CommandError::Format`] if the file cannot be read.
pub fn dump(path: &Path, json: bool) -> Result<String, CommandError> {
    let parsed = read_file(path)?;
    if json {
        return Ok(serde_json::to_string_pretty(&Dump::new(path, parsed))?);
    }

    let mut out = String::new();
    for (key, value) in &parsed.entries {
        // Escaped so a multi-line value stays on one output line.
        let _ = writeln!(out, "{key}={}", escape(value, false, false));
    }
    for line in &parsed.malformed {
        warn!("line {} skipped: {}", line.line, line.reason);
    }
    Ok(out)
}

/// The decoded value of `key`.  A key that is not in the file verbatim is
/// looked up again in its normalised form.
///
/// # Errors
///
/// [`CommandError::MissingKey`] if the file has no such entry.
pub fn get(path: &Path, key: &str) -> Result<String, CommandError> {
    let mut parsed = read_file(path)?;
    let exact = parsed.entries.remove(key);
    exact
        .or_else(|| {
            let wanted = normalize_key(key);
            let found = parsed.entries.keys().find(|k| normalize_key(k) == wanted).cloned()?;
            parsed.entries.remove(&found)
        })
        .ok_or_else(|| CommandError::MissingKey {
            key: key.to_string(),
            path: path.to_path_buf(),
        })
}

/// Sets `key` to `value` and rewrites the file.  A missing file is created.
///
/// # Errors
///
/// [`CommandError::Format`] if the file cannot be read or written.
pub fn set(path: &Path, key: &str, value: &str, options: &FileOptions) -> Result<String, CommandError> {
    let configuration = open_raw(path, options)?;
    let previous = configuration.raw_get(key);
    configuration.raw_put(key, value);
    configuration.save(&options.title, path)?;

    Ok(match previous {
        Some(previous) => format!("{key}: {previous:?} -> {value:?}"),
        None => format!("{key}: set to {value:?}"),
    })
}

/// Removes `key` and rewrites the file.
///
/// # Errors
///
/// [`CommandError::MissingKey`] if the file has no such entry.
pub fn remove(path: &Path, key: &str, options: &FileOptions) -> Result<String, CommandError> {
    let configuration = open_raw(path, options)?;
    let removed = configuration.raw_remove(key).ok_or_else(|| CommandError::MissingKey {
        key: key.to_string(),
        path: path.to_path_buf(),
    })?;
    configuration.save(&options.title, path)?;
    Ok(format!("{key}: removed {removed:?}"))
}

/// Rewrites the file sorted and escaped.  Malformed lines are dropped.
///
/// # Errors
///
/// [`CommandError::Format`] if the file cannot be read or written.
pub fn normalize(path: &Path, options: &FileOptions) -> Result<String, CommandError> {
    let configuration = open_raw(path, options)?;
    configuration.save(&options.title, path)?;
    Ok(format!("{}: {} entries written", path.display(), configuration.raw_keys().len()))
}

/// Verifies that every line of the file decodes.
///
/// # Errors
///
/// [`CommandError::Malformed`] listing the bad lines.
pub fn check(path: &Path) -> Result<String, CommandError> {
    let parsed = read_file(path)?;
    if parsed.malformed.is_empty() {
        return Ok(format!("{}: {} entries, no malformed lines", path.display(), parsed.entries.len()));
    }

    let details = parsed
        .malformed
        .iter()
        .map(|m| format!("line {}: {}", m.line, m.reason))
        .collect::<Vec<_>>()
        .join("; ");
    Err(CommandError::Malformed {
        path: path.to_path_buf(),
        count: parsed.malformed.len(),
        details,
    })
}

/// A configuration holding every decodable entry of `path` as a raw value.
fn open_raw(path: &Path, options: &FileOptions) -> Result<Configuration, CommandError> {
    let parsed = match read_file(path) {
        Ok(parsed) => parsed,
        Err(FormatError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            info!("{} does not exist yet; starting empty", path.display());
            ParsedProperties::default()
        }
        Err(e) => return Err(e.into()),
    };
    for line in &parsed.malformed {
        warn!("line {} will be dropped: {}", line.line, line.reason);
    }

    let configuration = Configuration::new(Arc::new(Converters::new())).with_write_options(options.write);
    for (key, value) in parsed.entries {
        configuration.raw_put(key, value);
    }
    Ok(configuration)
}

// ── Player commands ───────────────────────────────────────────────────────────

/// A configuration with the demo player and its diagnostics collected.
///
/// # Errors
///
/// [`CommandError::Configuration`] if a declaration is invalid.
pub fn player_configuration(
    options: &FileOptions,
) -> Result<(Configuration, Arc<Player>), CommandError> {
    let configuration = Configuration::new(Arc::new(Converters::new())).with_write_options(options.write);
    let player = Player::new();
    configuration.collect_discovered(&player)?;
    configuration.collect_static::<Diagnostics>()?;
    Ok((configuration, player))
}

/// Writes the player's settings (defaults, or the values already in the
/// file) to `path`.
///
/// # Errors
///
/// [`CommandError::Format`] if the file cannot be written.
pub fn init_player(path: &Path, options: &FileOptions) -> Result<String, CommandError> {
    let (configuration, _player) = player_configuration(options)?;
    let summary = configuration.load(path);
    configuration.save(&options.title, path)?;
    Ok(format!(
        "{}: {} player settings written{}",
        path.display(),
        configuration.configs().len(),
        describe_load(&summary)
    ))
}

/// Loads `path` into the player and lists every setting by group, followed
/// by the available actions.
///
/// # Errors
///
/// [`CommandError::Configuration`] if a value cannot be converted back to
/// text.
pub fn show_player(path: &Path, options: &FileOptions) -> Result<String, CommandError> {
    let (configuration, _player) = player_configuration(options)?;
    let summary = configuration.load(path);
    let converters = configuration.converters();

    let mut out = String::new();
    for group in configuration.groups() {
        let _ = writeln!(out, "[{group}]");
        for config in configuration.configs_in(&group) {
            let value = config.value_as_string(converters).map_err(ConfigurationError::from)?;
            let mode = converters.to_string(&config.edit_mode()).map_err(ConfigurationError::from)?;
            let _ = writeln!(out, "  {} = {}  ({mode})", config.key(), escape(&value, false, false));
            if !config.info().is_empty() {
                let _ = writeln!(out, "      {}", config.info());
            }
        }
    }

    let actions = configuration.actions();
    if !actions.is_empty() {
        let _ = writeln!(out, "[Actions]");
        for action in actions {
            let _ = writeln!(out, "  {}  {}", action.key(), action.name());
        }
    }

    let unknown: Vec<String> = configuration
        .raw_keys()
        .into_iter()
        .filter(|key| configuration.config(key).is_none())
        .collect();
    if !unknown.is_empty() {
        let _ = writeln!(out, "[Not used by the player]");
        for key in unknown {
            let _ = writeln!(out, "  {key}");
        }
    }

    if summary.rejected > 0 || !summary.malformed.is_empty() {
        let _ = writeln!(out, "{}", describe_load(&summary).trim_start_matches(", "));
    }
    Ok(out)
}

fn describe_load(summary: &LoadSummary) -> String {
    if !summary.found {
        return String::new();
    }
    format!(
        ", {} loaded, {} rejected, {} malformed",
        summary.applied,
        summary.rejected,
        summary.malformed.len()
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> FileOptions {
        FileOptions {
            title: "Test".to_string(),
            write: WriteOptions {
                escape_unicode: true,
                timestamp: false,
            },
        }
    }

    fn file(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.cfg");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_dump_lists_sorted_entries() {
        // Arrange
        let (_dir, path) = file("b=2\n# comment\na=multi\\nline\n");

        // Act
        let out = dump(&path, false).unwrap();

        // Assert
        assert_eq!(out, "a=multi\\nline\nb=2\n");
    }

    #[test]
    fn test_dump_json() {
        let (_dir, path) = file("a=1\n");

        let out = dump(&path, true).unwrap();
        let parsed: Dump = serde_json::from_str(&out).unwrap();

        assert_eq!(parsed.entries["a"], "1");
    }

    #[test]
    fn test_get_missing_key() {
        let (_dir, path) = file("a=1\n");

        assert_eq!(get(&path, "a").unwrap(), "1");
        assert!(matches!(get(&path, "b"), Err(CommandError::MissingKey { .. })));
    }

    #[test]
    fn test_get_and_set_match_mixed_case_keys() {
        // Arrange
        let (_dir, path) = file("Playback.Volume=0.3\n");

        // Act
        let before = get(&path, "playback.volume").unwrap();
        set(&path, "PLAYBACK.VOLUME", "0.5", &options()).unwrap();

        // Assert
        assert_eq!(before, "0.3");
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("playback.volume=0.5"), "{text}");
        assert!(!text.contains("Playback.Volume"), "{text}");
    }

    #[test]
    fn test_set_creates_file_and_keeps_other_entries() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.cfg");

        // Act
        set(&path, "a", "1", &options()).unwrap();
        let message = set(&path, "b", "x = y", &options()).unwrap();

        // Assert
        assert!(message.contains("set to"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "#Test\na=1\nb=x \\= y\n");
        assert_eq!(get(&path, "b").unwrap(), "x = y");
    }

    #[test]
    fn test_remove() {
        let (_dir, path) = file("a=1\nb=2\n");

        remove(&path, "a", &options()).unwrap();

        assert!(get(&path, "a").is_err());
        assert!(matches!(remove(&path, "a", &options()), Err(CommandError::MissingKey { .. })));
    }

    #[test]
    fn test_normalize_sorts_and_drops_malformed_lines() {
        let (_dir, path) = file("z = last\n  a:first\nbad=\\uD800\n");

        normalize(&path, &options()).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "#Test\na=first\nz=last\n");
    }

    #[test]
    fn test_check_reports_malformed_lines() {
        let (_dir, path) = file("a=1\nbad=\\u12\nc=3\n");

        let err = check(&path).unwrap_err();

        assert!(matches!(err, CommandError::Malformed { count: 1, .. }));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_check_clean_file() {
        let (_dir, path) = file("a=1\n");

        assert!(check(&path).unwrap().contains("no malformed lines"));
    }

    #[test]
    fn test_init_player_keeps_existing_values_and_unknown_keys() {
        // Arrange
        let (_dir, path) = file("playback.volume=0.4\nplugin.eq=Rock\n");

        // Act
        init_player(&path, &options()).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();

        // Assert
        assert!(written.contains("playback.volume=0.4\n"));
        assert!(written.contains("plugin.eq=Rock\n"));
        assert!(written.contains("ui.skin=Default\n"));
        assert!(written.contains("#Playback volume, from 0 (mute) to 1\n"));
    }

    #[test]
    fn test_show_player_lists_groups_actions_and_unknown_keys() {
        let (_dir, path) = file("playback.repeat=one\nplugin.eq=Rock\n");

        let out = show_player(&path, &options()).unwrap();

        assert!(out.contains("[Playback]"));
        assert!(out.contains("  playback.repeat = ONE  (USER)"));
        assert!(out.contains("  library.scan_depth = 4  (APP)"));
        assert!(out.contains("  playback.version = "));
        assert!(out.contains("[Actions]"));
        assert!(out.contains("  playback.shuffle  Toggle shuffle"));
        assert!(out.contains("[Not used by the player]\n  plugin.eq\n"));
    }

    #[test]
    fn test_show_player_reports_rejected_values() {
        let (_dir, path) = file("ui.skin=Neon\n");

        let out = show_player(&path, &options()).unwrap();

        assert!(out.contains("ui.skin = Default"));
        assert!(out.contains("1 rejected"));
    }
}
