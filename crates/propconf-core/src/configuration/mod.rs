//! The configuration orchestrator.
//!
//! [`Configuration`] is the registry that ties everything together:
//!
//! - it **collects** configs from [`Configurable`]s and keys them by
//!   `group.name` (lower-cased, spaces as `_`);
//! - it keeps a **raw map** of `key -> text` entries read from files, so
//!   that settings of components that are not loaded yet survive a
//!   load/save cycle untouched.  Keys are normalised on the way in, so
//!   `Playback.Volume` in a file means `playback.volume`;
//! - it **applies** raw entries to typed configs on load and whenever a
//!   matching config is collected later;
//! - it **saves** typed values plus leftover raw entries back to a file;
//! - it synthesises a toggle **action** for every user-editable boolean.
//!
//! # Reconciliation (for beginners)
//!
//! ```text
//!  file ──load──▶ raw map ──(key matches a collected config)──▶ Config<T>
//!                    ▲                                              │
//!                    └────────── save: typed value wins ◀───────────┘
//! ```
//!
//! When the same key is contributed by two configurables, the first one
//! collected keeps the key and the later one is ignored with a warning.

pub mod action;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, error, info, warn};

pub use action::Action;

use crate::config::{normalize_key, AnyConfig, ConfigError};
use crate::convert::{ConvertError, Converters};
use crate::discovery::{
    discover, discover_static, Configurable, DeclaredConfigurable, Discoverable, DiscoverableStatic, DiscoveryError,
};
use crate::format::{self, Entry, FormatError, MalformedLine, ParsedProperties, WriteOptions};

/// Errors returned by [`Configuration`] operations that can fail.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("no config registered under {0:?}")]
    UnknownKey(String),

    #[error("no action registered under {0:?}")]
    UnknownAction(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Format(#[from] FormatError),
}

/// What a [`Configuration::load`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// `false` if the file did not exist or could not be read.
    pub found: bool,
    /// Entries read from the file.
    pub entries: usize,
    /// Lines skipped because they could not be decoded.
    pub malformed: Vec<MalformedLine>,
    /// Raw entries written to a typed config.
    pub applied: usize,
    /// Raw entries a typed config refused (bad text or constraint).
    pub rejected: usize,
}

/// The thread-safe configuration registry.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use propconf_core::config::{AnyConfig, ValueConfig};
/// use propconf_core::configuration::Configuration;
/// use propconf_core::convert::Converters;
/// use propconf_core::discovery::ListConfigurable;
///
/// let configuration = Configuration::new(Arc::new(Converters::new()));
/// configuration.raw_put("net.port", "9000");
///
/// let port: Arc<dyn AnyConfig> = Arc::new(ValueConfig::new("port", 80u16).group("net").build());
/// configuration.collect(&ListConfigurable::new(vec![Arc::clone(&port)]));
///
/// assert_eq!(port.downcast_ref::<u16>().unwrap().value(), 9000);
/// ```
pub struct Configuration {
    converters: Arc<Converters>,
    configs: RwLock<BTreeMap<String, Arc<dyn AnyConfig>>>,
    raw: RwLock<BTreeMap<String, String>>,
    actions: RwLock<BTreeMap<String, Action>>,
    options: WriteOptions,
}

impl std::fmt::Debug for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Configuration")
            .field("configs", &self.configs.read().len())
            .field("raw", &self.raw.read().len())
            .field("actions", &self.actions.read().len())
            .finish()
    }
}

impl Configuration {
    pub fn new(converters: Arc<Converters>) -> Self {
        Self {
            converters,
            configs: RwLock::new(BTreeMap::new()),
            raw: RwLock::new(BTreeMap::new()),
            actions: RwLock::new(BTreeMap::new()),
            options: WriteOptions::default(),
        }
    }

    /// Overrides how files are written by [`Configuration::save`].
    pub fn with_write_options(mut self, options: WriteOptions) -> Self {
        self.options = options;
        self
    }

    pub fn converters(&self) -> &Arc<Converters> {
        &self.converters
    }

    // ── Collecting ────────────────────────────────────────────────────────────

    /// Registers every config of `configurable`.  Returns how many were
    /// newly registered.
    ///
    /// A raw entry already loaded for a config's key is applied right away
    /// if the config is editable by the application.
    pub fn collect(&self, configurable: &dyn Configurable) -> usize {
        let mut added = 0;

        for config in configurable.configs() {
            let key = config.key();
            {
                let mut configs = self.configs.write();
                if let Some(existing) = configs.get(&key) {
                    if !same_config(existing, &config) {
                        warn!("config key {key} is already registered; ignoring later duplicate");
                    }
                    continue;
                }
                configs.insert(key.clone(), Arc::clone(&config));
            }
            added += 1;

            if config.edit_mode().is_by_app() {
                let raw = self.raw.read().get(&key).cloned();
                if let Some(text) = raw {
                    self.apply_raw(config.as_ref(), &key, &text);
                }
            }

            if let Some(action) = Action::toggle(&config) {
                self.actions.write().insert(key, action);
            }
        }

        debug!("collected {added} config(s)");
        added
    }

    /// Discovers and collects the configs of `instance`.  The returned
    /// configurable can later be passed to
    /// [`Configuration::drop_configurable`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Discovery`] if the declaration of `C`
    /// is invalid.  Nothing is collected in that case.
    pub fn collect_discovered<C: Discoverable>(
        &self,
        instance: &Arc<C>,
    ) -> Result<DeclaredConfigurable, ConfigurationError> {
        let configurable = discover(instance)?;
        self.collect(&configurable);
        Ok(configurable)
    }

    /// Discovers and collects the process-wide configs of `C`.
    ///
    /// # Errors
    ///
    /// As [`Configuration::collect_discovered`].
    pub fn collect_static<C: DiscoverableStatic>(&self) -> Result<DeclaredConfigurable, ConfigurationError> {
        let configurable = discover_static::<C>()?;
        self.collect(&configurable);
        Ok(configurable)
    }

    /// Unregisters the configs (and their actions) contributed by
    /// `configurable`.  Keys held by another configurable are left alone.
    /// Raw entries are kept, so the values are still saved.
    pub fn drop_configurable(&self, configurable: &dyn Configurable) -> usize {
        let mut dropped = Vec::new();
        {
            let mut configs = self.configs.write();
            let mut actions = self.actions.write();
            for config in configurable.configs() {
                let key = config.key();
                if configs.get(&key).is_some_and(|existing| same_config(existing, &config)) {
                    configs.remove(&key);
                    actions.remove(&key);
                    dropped.push((key, config));
                }
            }
        }

        let removed = dropped.len();
        let kept: Vec<(String, String)> = dropped
            .into_iter()
            .filter_map(|(key, config)| config.value_as_string(&self.converters).ok().map(|text| (key, text)))
            .collect();
        self.raw.write().extend(kept);
        debug!("dropped {removed} config(s)");
        removed
    }

    /// Adds an application-defined action.
    pub fn add_action(&self, action: Action) {
        self.actions.write().insert(action.key().to_string(), action);
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    /// The config registered under `key`.
    pub fn config(&self, key: &str) -> Option<Arc<dyn AnyConfig>> {
        self.configs.read().get(&normalize_key(key)).cloned()
    }

    /// All configs, sorted by key.
    pub fn configs(&self) -> Vec<Arc<dyn AnyConfig>> {
        self.configs.read().values().cloned().collect()
    }

    /// Distinct group names, sorted.
    pub fn groups(&self) -> Vec<String> {
        let mut groups: Vec<String> = self.configs.read().values().map(|c| c.group().to_string()).collect();
        groups.sort();
        groups.dedup();
        groups
    }

    /// Configs of `group`, sorted by key.
    pub fn configs_in(&self, group: &str) -> Vec<Arc<dyn AnyConfig>> {
        self.configs
            .read()
            .values()
            .filter(|c| c.group() == group)
            .cloned()
            .collect()
    }

    /// The current text of the config under `key`.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::UnknownKey`], or a conversion error.
    pub fn value_as_string(&self, key: &str) -> Result<String, ConfigurationError> {
        let config = self.config(key).ok_or_else(|| ConfigurationError::UnknownKey(key.to_string()))?;
        Ok(config.value_as_string(&self.converters)?)
    }

    /// Sets the config under `key` on behalf of the end user and applies it.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::UnknownKey`] if no config has that key.
    /// - [`ConfigError::NotEditable`] if the config is not user-editable.
    /// - Any conversion or constraint error.
    pub fn set_by_user(&self, key: &str, text: &str) -> Result<(), ConfigurationError> {
        let config = self.config(key).ok_or_else(|| ConfigurationError::UnknownKey(key.to_string()))?;
        if !config.edit_mode().is_by_user() {
            return Err(ConfigError::NotEditable {
                key: key.to_string(),
                by: "user",
            }
            .into());
        }
        config.set_value_from_string(&self.converters, text)?;
        config.apply_value();
        Ok(())
    }

    // ── Actions ───────────────────────────────────────────────────────────────

    /// All actions, sorted by key.
    pub fn actions(&self) -> Vec<Action> {
        self.actions.read().values().cloned().collect()
    }

    pub fn action(&self, key: &str) -> Option<Action> {
        self.actions.read().get(&normalize_key(key)).cloned()
    }

    /// Runs the action under `key`.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::UnknownAction`] if there is none.
    pub fn run_action(&self, key: &str) -> Result<(), ConfigurationError> {
        let action = self
            .action(key)
            .ok_or_else(|| ConfigurationError::UnknownAction(key.to_string()))?;
        action.run();
        Ok(())
    }

    // ── Raw entries ───────────────────────────────────────────────────────────

    pub fn raw_get(&self, key: &str) -> Option<String> {
        self.raw.read().get(&normalize_key(key)).cloned()
    }

    /// Stores a raw entry.  It is applied by the next
    /// [`Configuration::raw_set`] or when a matching config is collected.
    pub fn raw_put(&self, key: impl Into<String>, value: impl Into<String>) {
        let key: String = key.into();
        self.raw.write().insert(normalize_key(&key), value.into());
    }

    pub fn raw_remove(&self, key: &str) -> Option<String> {
        self.raw.write().remove(&normalize_key(key))
    }

    /// Raw keys, sorted.
    pub fn raw_keys(&self) -> Vec<String> {
        self.raw.read().keys().cloned().collect()
    }

    /// Applies every raw entry to the config with the same key, if that
    /// config is editable by the application.  Entries that cannot be
    /// applied are logged and skipped.  Returns how many were applied.
    pub fn raw_set(&self) -> usize {
        self.apply_all_raw().0
    }

    // ── Defaults ──────────────────────────────────────────────────────────────

    /// Resets every writable config to its default value and applies it.
    pub fn to_default(&self) {
        for config in self.configs() {
            if !config.is_writable() {
                continue;
            }
            match config.reset_to_default() {
                Ok(()) => config.apply_value(),
                Err(e) => warn!("cannot reset {} to default: {e}", config.key()),
            }
        }
    }

    // ── Persistence ───────────────────────────────────────────────────────────

    /// The entries a save writes: every typed config (with its info as the
    /// comment) plus raw entries no typed config claims.
    pub fn entries(&self) -> BTreeMap<String, Entry> {
        let configs: Vec<(String, Arc<dyn AnyConfig>)> =
            self.configs.read().iter().map(|(k, c)| (k.clone(), Arc::clone(c))).collect();
        let raw = self.raw.read().clone();
        let mut entries = BTreeMap::new();

        for (key, config) in configs {
            match config.value_as_string(&self.converters) {
                Ok(text) => {
                    entries.insert(key, Entry::commented(text, config.info()));
                }
                Err(e) => {
                    warn!("cannot convert {key} for saving: {e}");
                    if let Some(text) = raw.get(&key) {
                        entries.insert(key, Entry::new(text.clone()));
                    }
                }
            }
        }
        for (key, text) in raw {
            entries.entry(key).or_insert_with(|| Entry::new(text));
        }

        entries
    }

    /// Renders what [`Configuration::save`] would write.
    pub fn save_to_string(&self, title: &str) -> String {
        format::write_string(Some(title), &self.entries(), self.options)
    }

    /// Writes all configs and leftover raw entries to `path`.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::Format`] if the file cannot be written.  The
    /// error is also logged.
    pub fn save(&self, title: &str, path: &Path) -> Result<(), ConfigurationError> {
        let entries = self.entries();
        match format::write_file(path, Some(title), &entries, self.options) {
            Ok(()) => {
                info!("saved {} setting(s) to {}", entries.len(), path.display());
                Ok(())
            }
            Err(e) => {
                error!("failed to save settings: {e}");
                Err(e.into())
            }
        }
    }

    /// Reads `path` into the raw map and applies it.
    ///
    /// Never fails: a missing or unreadable file leaves every config at its
    /// current value, and the problem is logged.
    pub fn load(&self, path: &Path) -> LoadSummary {
        match format::read_file(path) {
            Ok(parsed) => {
                let summary = self.merge(parsed);
                info!(
                    "loaded {} setting(s) from {} ({} applied, {} rejected, {} malformed)",
                    summary.entries,
                    path.display(),
                    summary.applied,
                    summary.rejected,
                    summary.malformed.len()
                );
                summary
            }
            Err(FormatError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                info!("no settings file at {}; using defaults", path.display());
                LoadSummary::default()
            }
            Err(e) => {
                warn!("cannot read settings; using defaults: {e}");
                LoadSummary::default()
            }
        }
    }

    /// Like [`Configuration::load`] for text already in memory.
    pub fn load_str(&self, text: &str) -> LoadSummary {
        self.merge(format::parse_str(text))
    }

    fn merge(&self, parsed: ParsedProperties) -> LoadSummary {
        let entries = parsed.entries.len();
        self.raw
            .write()
            .extend(parsed.entries.into_iter().map(|(key, text)| (normalize_key(&key), text)));
        let (applied, rejected) = self.apply_all_raw();
        LoadSummary {
            found: true,
            entries,
            malformed: parsed.malformed,
            applied,
            rejected,
        }
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn apply_all_raw(&self) -> (usize, usize) {
        let raw: Vec<(String, String)> = self.raw.read().iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        let (mut applied, mut rejected) = (0, 0);

        for (key, text) in raw {
            let Some(config) = self.config(&key) else {
                continue;
            };
            if !config.edit_mode().is_by_app() {
                debug!("{key} is not editable by the application; raw value ignored");
                continue;
            }
            if self.apply_raw(config.as_ref(), &key, &text) {
                applied += 1;
            } else {
                rejected += 1;
            }
        }

        (applied, rejected)
    }

    fn apply_raw(&self, config: &dyn AnyConfig, key: &str, text: &str) -> bool {
        match config.set_value_from_string(&self.converters, text) {
            Ok(()) => {
                config.apply_value();
                true
            }
            Err(e) => {
                warn!("skipping stored value for {key}: {e}");
                false
            }
        }
    }
}

/// Identity of two shared configs, ignoring vtable pointers.
fn same_config(a: &Arc<dyn AnyConfig>, b: &Arc<dyn AnyConfig>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::config::{EditMode, Range, ValueConfig};
    use crate::discovery::{ListConfigurable, MockConfigurable};

    fn configuration() -> Configuration {
        Configuration::new(Arc::new(Converters::new())).with_write_options(WriteOptions {
            escape_unicode: true,
            timestamp: false,
        })
    }

    fn shared<T: crate::convert::Convertible>(config: ValueConfig<T>) -> Arc<dyn AnyConfig> {
        Arc::new(config.build())
    }

    #[test]
    fn test_collect_registers_by_lowercase_key() {
        let configuration = configuration();
        let list = ListConfigurable::new(vec![shared(ValueConfig::new("Max Volume", 1.0f64).group("Playback"))]);

        let added = configuration.collect(&list);

        assert_eq!(added, 1);
        assert!(configuration.config("playback.max_volume").is_some());
    }

    #[test]
    fn test_first_collected_config_keeps_duplicate_key() {
        // Arrange
        let configuration = configuration();
        let first = shared(ValueConfig::new("n", 1u8).group("g"));
        let second = shared(ValueConfig::new("n", 2u8).group("g"));

        // Act
        configuration.collect(&ListConfigurable::new(vec![Arc::clone(&first)]));
        let added = configuration.collect(&ListConfigurable::new(vec![second]));

        // Assert
        assert_eq!(added, 0);
        assert_eq!(configuration.value_as_string("g.n").unwrap(), "1");
    }

    #[test]
    fn test_collect_applies_pending_raw_value() {
        let configuration = configuration();
        configuration.raw_put("net.port", "9000");
        let port = shared(ValueConfig::new("port", 80u16).group("net"));

        configuration.collect(&ListConfigurable::new(vec![Arc::clone(&port)]));

        assert_eq!(port.value_as_string(configuration.converters()).unwrap(), "9000");
    }

    #[test]
    fn test_collect_skips_raw_value_for_never_editable_config() {
        let configuration = configuration();
        configuration.raw_put("about.build", "999");
        let build: Arc<dyn AnyConfig> = Arc::new(
            crate::config::Config::from_parts(
                "build".to_string(),
                "about".to_string(),
                String::new(),
                EditMode::Never,
                Arc::new(crate::config::FieldBacking::read_only(|| 7u32)),
                Vec::new(),
                None,
            ),
        );

        configuration.collect(&ListConfigurable::new(vec![Arc::clone(&build)]));

        assert_eq!(configuration.value_as_string("about.build").unwrap(), "7");
    }

    #[test]
    fn test_collect_from_mocked_configurable() {
        let mut mock = MockConfigurable::new();
        mock.expect_configs()
            .times(1)
            .returning(|| vec![shared(ValueConfig::new("a", 1u8).group("m"))]);
        let configuration = configuration();

        assert_eq!(configuration.collect(&mock), 1);
    }

    #[test]
    fn test_toggle_action_synthesised_for_user_bool_only() {
        // Arrange
        let configuration = configuration();
        let applied = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&applied);
        let list = ListConfigurable::new(vec![
            shared(
                ValueConfig::new("shuffle", false)
                    .group("playback")
                    .on_apply(move |_| {
                        counter.fetch_add(1, Ordering::SeqCst);
                    }),
            ),
            shared(ValueConfig::new("telemetry", false).group("app").editable(EditMode::App)),
            shared(ValueConfig::new("volume", 0.5f64).group("playback")),
        ]);

        // Act
        configuration.collect(&list);
        configuration.run_action("playback.shuffle").unwrap();

        // Assert
        let keys: Vec<String> = configuration.actions().iter().map(|a| a.key().to_string()).collect();
        assert_eq!(keys, vec!["playback.shuffle"]);
        assert_eq!(configuration.value_as_string("playback.shuffle").unwrap(), "true");
        assert_eq!(applied.load(Ordering::SeqCst), 1);
        assert_eq!(configuration.action("playback.shuffle").unwrap().name(), "Toggle shuffle");
    }

    #[test]
    fn test_raw_set_skips_bad_entries_and_applies_the_rest() {
        // Arrange
        let configuration = configuration();
        configuration.collect(&ListConfigurable::new(vec![
            shared(ValueConfig::new("a", 1u8).group("g")),
            shared(ValueConfig::new("b", 0.5f64).group("g").constraint(Range { min: 0.0, max: 1.0 })),
            shared(ValueConfig::new("c", 3u8).group("g")),
        ]));
        configuration.raw_put("g.a", "not a number");
        configuration.raw_put("g.b", "7.0");
        configuration.raw_put("g.c", "9");

        // Act
        let applied = configuration.raw_set();

        // Assert
        assert_eq!(applied, 1);
        assert_eq!(configuration.value_as_string("g.a").unwrap(), "1");
        assert_eq!(configuration.value_as_string("g.b").unwrap(), "0.5");
        assert_eq!(configuration.value_as_string("g.c").unwrap(), "9");
    }

    #[test]
    fn test_set_by_user_respects_edit_mode() {
        let configuration = configuration();
        configuration.collect(&ListConfigurable::new(vec![
            shared(ValueConfig::new("theme", "dark".to_string()).group("ui")),
            shared(ValueConfig::new("cache", 64u32).group("ui").editable(EditMode::App)),
        ]));

        configuration.set_by_user("ui.theme", "light").unwrap();
        let denied = configuration.set_by_user("ui.cache", "1");
        let unknown = configuration.set_by_user("ui.nope", "1");

        assert_eq!(configuration.value_as_string("ui.theme").unwrap(), "light");
        assert!(matches!(denied, Err(ConfigurationError::Config(ConfigError::NotEditable { .. }))));
        assert!(matches!(unknown, Err(ConfigurationError::UnknownKey(_))));
    }

    #[test]
    fn test_to_default_resets_and_applies() {
        let configuration = configuration();
        let applied = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&applied);
        configuration.collect(&ListConfigurable::new(vec![shared(
            ValueConfig::new("n", 5u8).group("g").on_apply(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        )]));
        configuration.set_by_user("g.n", "9").unwrap();

        configuration.to_default();

        assert_eq!(configuration.value_as_string("g.n").unwrap(), "5");
        assert_eq!(applied.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_entries_merge_typed_values_and_leftover_raw() {
        // Arrange
        let configuration = configuration();
        configuration.raw_put("g.n", "stale");
        configuration.raw_put("other.plugin", "kept");
        configuration.collect(&ListConfigurable::new(vec![shared(
            ValueConfig::new("n", 5u8).group("g").info("A number"),
        )]));

        // Act
        let text = configuration.save_to_string("Settings");

        // Assert – the stale raw value was rejected, the typed one is written
        assert_eq!(text, "#Settings\n#A number\ng.n=5\nother.plugin=kept\n");
    }

    #[test]
    fn test_drop_configurable_keeps_value_as_raw() {
        let configuration = configuration();
        let list = ListConfigurable::new(vec![shared(ValueConfig::new("n", 5u8).group("g"))]);
        configuration.collect(&list);
        configuration.set_by_user("g.n", "6").unwrap();

        let removed = configuration.drop_configurable(&list);

        assert_eq!(removed, 1);
        assert!(configuration.config("g.n").is_none());
        assert_eq!(configuration.raw_get("g.n").as_deref(), Some("6"));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let configuration = configuration();
        let dir = tempfile::tempdir().unwrap();

        let summary = configuration.load(&dir.path().join("absent.cfg"));

        assert!(!summary.found);
        assert_eq!(summary, LoadSummary::default());
    }

    #[test]
    fn test_load_str_reports_counts() {
        let configuration = configuration();
        configuration.collect(&ListConfigurable::new(vec![
            shared(ValueConfig::new("a", 1u8).group("g")),
            shared(ValueConfig::new("b", 1u8).group("g")),
        ]));

        let summary = configuration.load_str("g.a=2\ng.b=x\nbad=\\uZZZZ\nunclaimed=1\n");

        assert!(summary.found);
        assert_eq!(summary.entries, 3);
        assert_eq!(summary.malformed.len(), 1);
        assert_eq!(summary.applied, 1);
        assert_eq!(summary.rejected, 1);
        assert_eq!(configuration.raw_get("unclaimed").as_deref(), Some("1"));
    }

    #[test]
    fn test_load_matches_keys_regardless_of_case() {
        // Arrange
        let configuration = configuration();
        let volume = shared(ValueConfig::new("volume", 0.8f64).group("Playback"));
        configuration.collect(&ListConfigurable::new(vec![Arc::clone(&volume)]));

        // Act
        let summary = configuration.load_str("Playback.Volume=0.3\nLibrary.Folders=/music\n");

        // Assert
        assert_eq!(summary.applied, 1);
        assert_eq!(volume.value_as_string(configuration.converters()).unwrap(), "0.3");
        let keys: Vec<String> = configuration.entries().into_keys().collect();
        assert_eq!(keys, vec!["library.folders", "playback.volume"]);
    }

    #[test]
    fn test_raw_entries_are_stored_under_normalised_key() {
        let configuration = configuration();

        configuration.raw_put("Net.Port", "9000");

        assert_eq!(configuration.raw_keys(), vec!["net.port"]);
        assert_eq!(configuration.raw_get("NET.PORT").as_deref(), Some("9000"));
        assert_eq!(configuration.raw_remove("net.Port").as_deref(), Some("9000"));
        assert!(configuration.raw_keys().is_empty());
    }

    #[test]
    fn test_groups_are_distinct_and_sorted() {
        let configuration = configuration();
        configuration.collect(&ListConfigurable::new(vec![
            shared(ValueConfig::new("a", 1u8).group("ui")),
            shared(ValueConfig::new("b", 1u8).group("audio")),
            shared(ValueConfig::new("c", 1u8).group("ui")),
        ]));

        assert_eq!(configuration.groups(), vec!["audio", "ui"]);
        assert_eq!(configuration.configs_in("ui").len(), 2);
    }
}
