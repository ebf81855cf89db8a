//! `Config<T>`: one named, typed, grouped configuration value.
//!
//! A config does not own its value.  It reads and writes through a
//! [`Backing`]: a getter/setter pair on some object, an observable
//! [`Property`], a [`ListProperty`], or a private cell.  That lets a plain
//! struct field, a UI-bound property and a free-standing value all be
//! persisted the same way.

use std::any::{Any, TypeId};
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use super::constraint::Constraint;
use super::edit_mode::EditMode;
use super::property::{ListProperty, Property, ReadOnlyProperty};
use crate::convert::{ConvertError, ConvertResult, Convertible, Converters};

/// Errors raised when writing a config value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A constraint rejected the candidate value.
    #[error("value rejected for {key}: {reason}")]
    Constraint { key: String, reason: String },

    /// The config's backing cannot be written.
    #[error("{key} is read-only")]
    ReadOnly { key: String },

    /// The edit mode does not allow this kind of change.
    #[error("{key} cannot be edited by the {by}")]
    NotEditable { key: String, by: &'static str },

    /// The text could not be converted to the config's type.
    #[error("cannot set {key}: {source}")]
    Convert {
        key: String,
        #[source]
        source: ConvertError,
    },
}

/// Derives the storage key of a config: `group.name`, lower-cased, with
/// spaces replaced by `_`.
///
/// ```rust
/// use propconf_core::config::config_key;
///
/// assert_eq!(config_key("Playback", "Crossfade Duration"), "playback.crossfade_duration");
/// ```
pub fn config_key(group: &str, name: &str) -> String {
    normalize_key(&format!("{group}.{name}"))
}

/// Brings a key written by hand (in a file or on a command line) into the
/// form [`config_key`] produces.
///
/// ```rust
/// use propconf_core::config::normalize_key;
///
/// assert_eq!(normalize_key("Playback.Output Device"), "playback.output_device");
/// ```
pub fn normalize_key(key: &str) -> String {
    key.replace(' ', "_").to_lowercase()
}

// ── Backings ──────────────────────────────────────────────────────────────────

/// Where a config's value lives.
pub trait Backing<T>: Send + Sync {
    fn get(&self) -> T;

    /// Writes `value`.  Only called when [`Backing::is_writable`] is `true`.
    fn set(&self, value: T);

    fn is_writable(&self) -> bool;
}

type Getter<T> = Arc<dyn Fn() -> T + Send + Sync>;
type Setter<T> = Arc<dyn Fn(T) + Send + Sync>;

/// A getter and an optional setter, typically closures over a field of a
/// shared object.
pub struct FieldBacking<T> {
    get: Getter<T>,
    set: Option<Setter<T>>,
}

impl<T> FieldBacking<T> {
    pub fn new(get: impl Fn() -> T + Send + Sync + 'static, set: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            get: Arc::new(get),
            set: Some(Arc::new(set)),
        }
    }

    pub fn read_only(get: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self {
            get: Arc::new(get),
            set: None,
        }
    }
}

impl<T> Backing<T> for FieldBacking<T> {
    fn get(&self) -> T {
        (self.get)()
    }

    fn set(&self, value: T) {
        if let Some(set) = &self.set {
            set(value);
        }
    }

    fn is_writable(&self) -> bool {
        self.set.is_some()
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Backing<T> for Arc<Property<T>> {
    fn get(&self) -> T {
        Property::get(self)
    }

    fn set(&self, value: T) {
        Property::set(self, value);
    }

    fn is_writable(&self) -> bool {
        true
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Backing<T> for ReadOnlyProperty<T> {
    fn get(&self) -> T {
        ReadOnlyProperty::get(self)
    }

    fn set(&self, _value: T) {}

    fn is_writable(&self) -> bool {
        false
    }
}

impl<E: Clone + PartialEq + Send + Sync + 'static> Backing<Vec<E>> for Arc<ListProperty<E>> {
    fn get(&self) -> Vec<E> {
        ListProperty::get(self)
    }

    fn set(&self, value: Vec<E>) {
        self.set_all(value);
    }

    fn is_writable(&self) -> bool {
        true
    }
}

/// A private value cell.  Used by configs that are not attached to any
/// object.
pub struct ValueBacking<T>(RwLock<T>);

impl<T> ValueBacking<T> {
    pub fn new(value: T) -> Self {
        Self(RwLock::new(value))
    }
}

impl<T: Clone + Send + Sync> Backing<T> for ValueBacking<T> {
    fn get(&self) -> T {
        self.0.read().clone()
    }

    fn set(&self, value: T) {
        *self.0.write() = value;
    }

    fn is_writable(&self) -> bool {
        true
    }
}

// ── Config ────────────────────────────────────────────────────────────────────

pub(crate) type Applier<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A named, typed configuration value.
///
/// The default value is captured from the backing when the config is
/// created.
pub struct Config<T: Convertible> {
    name: String,
    group: String,
    info: String,
    edit_mode: EditMode,
    default: T,
    backing: Arc<dyn Backing<T>>,
    constraints: Vec<Arc<dyn Constraint<T>>>,
    applier: Option<Applier<T>>,
}

impl<T: Convertible> std::fmt::Debug for Config<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("group", &self.group)
            .field("name", &self.name)
            .field("edit_mode", &self.edit_mode)
            .field("value", &self.value())
            .finish()
    }
}

impl<T: Convertible> Config<T> {
    pub(crate) fn from_parts(
        name: String,
        group: String,
        info: String,
        edit_mode: EditMode,
        backing: Arc<dyn Backing<T>>,
        constraints: Vec<Arc<dyn Constraint<T>>>,
        applier: Option<Applier<T>>,
    ) -> Self {
        let default = backing.get();
        Self {
            name,
            group,
            info,
            edit_mode,
            default,
            backing,
            constraints,
            applier,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn info(&self) -> &str {
        &self.info
    }

    pub fn edit_mode(&self) -> EditMode {
        self.edit_mode
    }

    pub fn key(&self) -> String {
        config_key(&self.group, &self.name)
    }

    /// The current value, read through the backing.
    pub fn value(&self) -> T {
        self.backing.get()
    }

    pub fn default_value(&self) -> &T {
        &self.default
    }

    pub fn is_writable(&self) -> bool {
        self.backing.is_writable()
    }

    /// Checks `value` against every constraint.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::Constraint`] raised.
    pub fn validate(&self, value: &T) -> Result<(), ConfigError> {
        for constraint in &self.constraints {
            constraint.check(value).map_err(|reason| ConfigError::Constraint {
                key: self.key(),
                reason,
            })?;
        }
        Ok(())
    }

    /// Validates and writes `value`.  Does not run the applier.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ReadOnly`] if the backing cannot be written.
    /// - [`ConfigError::Constraint`] if a constraint rejects the value.
    pub fn set_value(&self, value: T) -> Result<(), ConfigError> {
        if !self.backing.is_writable() {
            return Err(ConfigError::ReadOnly { key: self.key() });
        }
        self.validate(&value)?;
        self.backing.set(value);
        Ok(())
    }

    /// Writes `value` and then applies it.
    pub fn set_and_apply(&self, value: T) -> Result<(), ConfigError> {
        self.set_value(value)?;
        self.apply_value();
        Ok(())
    }

    /// Runs the apply callback with the current value, if there is one.
    pub fn apply_value(&self) {
        if let Some(applier) = &self.applier {
            applier(&self.value());
        }
    }

    /// Writes the default value back.  A read-only config is left alone.
    pub fn reset_to_default(&self) -> Result<(), ConfigError> {
        if !self.backing.is_writable() {
            return Ok(());
        }
        self.set_value(self.default.clone())
    }

    pub fn value_as_string(&self, converters: &Converters) -> ConvertResult<String> {
        converters.to_string(&self.value())
    }

    /// Parses `text` and writes the result.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Convert`] for unparsable text, otherwise as
    /// [`Config::set_value`].
    pub fn set_value_from_string(&self, converters: &Converters, text: &str) -> Result<(), ConfigError> {
        let value = converters
            .from_string::<T>(text)
            .map_err(|source| ConfigError::Convert { key: self.key(), source })?;
        self.set_value(value)
    }
}

// ── Type-erased view ──────────────────────────────────────────────────────────

/// A config of unknown value type.
///
/// This is what registries and file code work with.  Use
/// `<dyn AnyConfig>::downcast_ref` to get the typed [`Config<T>`] back.
pub trait AnyConfig: Send + Sync {
    fn name(&self) -> &str;
    fn group(&self) -> &str;
    fn info(&self) -> &str;
    fn edit_mode(&self) -> EditMode;
    fn is_writable(&self) -> bool;

    /// `TypeId` of the value type.
    fn value_type(&self) -> TypeId;
    fn value_type_name(&self) -> &'static str;

    fn value_as_string(&self, converters: &Converters) -> ConvertResult<String>;
    fn default_as_string(&self, converters: &Converters) -> ConvertResult<String>;
    fn set_value_from_string(&self, converters: &Converters, text: &str) -> Result<(), ConfigError>;
    fn apply_value(&self);
    fn reset_to_default(&self) -> Result<(), ConfigError>;

    fn as_any(&self) -> &dyn Any;

    fn key(&self) -> String {
        config_key(self.group(), self.name())
    }
}

impl<T: Convertible> AnyConfig for Config<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn group(&self) -> &str {
        &self.group
    }

    fn info(&self) -> &str {
        &self.info
    }

    fn edit_mode(&self) -> EditMode {
        self.edit_mode
    }

    fn is_writable(&self) -> bool {
        Config::is_writable(self)
    }

    fn value_type(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn value_type_name(&self) -> &'static str {
        T::type_name()
    }

    fn value_as_string(&self, converters: &Converters) -> ConvertResult<String> {
        Config::value_as_string(self, converters)
    }

    fn default_as_string(&self, converters: &Converters) -> ConvertResult<String> {
        converters.to_string(&self.default)
    }

    fn set_value_from_string(&self, converters: &Converters, text: &str) -> Result<(), ConfigError> {
        Config::set_value_from_string(self, converters, text)
    }

    fn apply_value(&self) {
        Config::apply_value(self);
    }

    fn reset_to_default(&self) -> Result<(), ConfigError> {
        Config::reset_to_default(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl dyn AnyConfig {
    /// The typed config, if the value type is `T`.
    pub fn downcast_ref<T: Convertible>(&self) -> Option<&Config<T>> {
        self.as_any().downcast_ref::<Config<T>>()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
