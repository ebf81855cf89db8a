//! The converter registry.
//!
//! [`Converters`] maps a Rust type to its [`Converter`].  Lookup for `T`
//! goes:
//!
//! 1. the converter resolved earlier for `T` (cache),
//! 2. a converter registered for exactly `T`,
//! 3. a converter registered for the first ancestor in `T::lineage()`,
//! 4. a converter built from what `T` declares: parse strategy, then
//!    enumeration constants, then factory.  To-string always falls back to
//!    [`Convertible::native_text`].
//! 5. if `T` declares no way to parse itself, the converter its first
//!    parseable ancestor resolves to, so a newtype over `f64` works with the
//!    built-in `f64` conversion even when nothing was registered.
//!
//! The result of step 2-5 is cached, including the fact that `T` cannot be
//! parsed, so resolution work and the "unsupported" warning happen at most
//! once per type.  Registering a converter clears the cache because types
//! that inherited from an ancestor may now resolve differently.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use super::converter::{ConvertError, ConvertResult, Converter, FromFn, Origin, ToFn, NULL};
use super::strategy::{Convertible, FromText, ToText};

pub(crate) type Erased = Arc<dyn Any + Send + Sync>;
pub(crate) type Registered = HashMap<TypeId, Erased>;

#[derive(Default)]
struct Tables {
    registered: Registered,
    resolved: HashMap<TypeId, Erased>,
}

/// Thread-safe registry of per-type converters.
///
/// One registry is normally shared (behind an `Arc`) by everything that
/// reads or writes configuration.
///
/// # Examples
///
/// ```rust
/// use propconf_core::convert::Converters;
///
/// let converters = Converters::new();
/// assert_eq!(converters.to_string(&42u32).unwrap(), "42");
/// assert_eq!(converters.from_string::<u32>("42").unwrap(), 42);
/// assert_eq!(converters.from_string::<Option<u32>>("null").unwrap(), None);
/// ```
#[derive(Default)]
pub struct Converters {
    tables: RwLock<Tables>,
}

impl std::fmt::Debug for Converters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tables = self.tables.read();
        f.debug_struct("Converters")
            .field("registered", &tables.registered.len())
            .field("resolved", &tables.resolved.len())
            .finish()
    }
}

impl Converters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `converter` for exactly `T`, replacing any earlier one.
    pub fn register<T: Convertible>(&self, converter: Converter<T>) {
        let mut tables = self.tables.write();
        tables
            .registered
            .insert(TypeId::of::<T>(), Arc::new(converter.with_registered_origin()));
        tables.resolved.clear();
        debug!("converter registered for {}", T::type_name());
    }

    /// `true` if a converter was registered for exactly `T`.
    pub fn is_registered<T: Convertible>(&self) -> bool {
        self.tables.read().registered.contains_key(&TypeId::of::<T>())
    }

    /// Returns the converter for `T`, resolving and caching it on first use.
    pub fn get<T: Convertible>(&self) -> Converter<T> {
        let id = TypeId::of::<T>();

        if let Some(converter) = self.tables.read().resolved.get(&id).and_then(downcast::<T>) {
            return converter;
        }

        let mut tables = self.tables.write();
        // Another thread may have resolved it while we waited for the lock.
        if let Some(converter) = tables.resolved.get(&id).and_then(downcast::<T>) {
            return converter;
        }

        let converter = resolve::<T>(&tables.registered);
        if !converter.can_parse() {
            warn!("no from-string strategy for {}; its values cannot be parsed", T::type_name());
        }
        debug!("converter for {} resolved ({:?})", T::type_name(), converter.origin());
        tables.resolved.insert(id, Arc::new(converter.clone()));
        converter
    }

    /// `true` if `T` can be parsed from text.
    pub fn can_parse<T: Convertible>(&self) -> bool {
        self.get::<T>().can_parse()
    }

    /// Converts `value` to text.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Format`] if a custom to-string strategy fails.
    pub fn to_string<T: Convertible>(&self, value: &T) -> ConvertResult<String> {
        self.get::<T>().to_text(self, value)
    }

    /// Converts an optional value; `None` becomes the null sentinel.
    pub fn to_string_opt<T: Convertible>(&self, value: Option<&T>) -> ConvertResult<String> {
        match value {
            Some(value) => self.to_string(value),
            None => Ok(NULL.to_string()),
        }
    }

    /// Parses `text` as a `T`.
    ///
    /// The null sentinel parses to [`Convertible::null_value`].
    ///
    /// # Errors
    ///
    /// - [`ConvertError::NoNullValue`] for the sentinel on a type without a
    ///   null value.
    /// - [`ConvertError::Unsupported`] when `T` cannot be parsed at all.
    /// - Any error of the resolved strategy for invalid text.
    pub fn from_string<T: Convertible>(&self, text: &str) -> ConvertResult<T> {
        if text == NULL {
            return T::null_value().ok_or(ConvertError::NoNullValue { ty: T::type_name() });
        }
        self.get::<T>().from_text(self, text)
    }
}

fn downcast<T: Convertible>(erased: &Erased) -> Option<Converter<T>> {
    erased.downcast_ref::<Converter<T>>().cloned()
}

// ── Resolution ────────────────────────────────────────────────────────────────

/// Runs steps 2-5 of the lookup.  Called with the tables already locked,
/// so ancestors are resolved here rather than through [`Converters::get`].
pub(crate) fn resolve<T: Convertible>(registered: &Registered) -> Converter<T> {
    if let Some(converter) = registered.get(&TypeId::of::<T>()).and_then(downcast::<T>) {
        return converter;
    }

    let lineage = T::lineage();
    for ancestor in &lineage {
        if let Some(erased) = registered.get(&ancestor.ancestor_type()) {
            if let Some(converter) = ancestor.adapt(erased.as_ref()) {
                return converter;
            }
        }
    }

    let built = build::<T>();
    if built.can_parse() {
        return built;
    }
    lineage
        .iter()
        .map(|ancestor| ancestor.resolve_through(registered))
        .find(Converter::can_parse)
        .unwrap_or(built)
}

/// Builds a converter from what `T` declares about itself.
fn build<T: Convertible>() -> Converter<T> {
    let (from_decl, to_decl) = match T::parse_strategy() {
        Some(strategy) => (strategy.from, strategy.to),
        None => (FromText::Inherit, ToText::Native),
    };

    let singleton = match &from_decl {
        FromText::Singleton(instance) => Some(Arc::clone(instance)),
        _ => None,
    };

    let (from, origin): (Option<FromFn<T>>, Origin) = match from_decl {
        FromText::Method(f) | FromText::Constructor(f) => (Some(f), Origin::Declared),
        FromText::Singleton(instance) => {
            let from: FromFn<T> = Arc::new(move |_: &Converters, _: &str| Ok(instance()));
            (Some(from), Origin::Declared)
        }
        FromText::Inherit => match (T::enum_constants(), T::factory()) {
            (Some(constants), _) => (Some(constant_lookup(constants)), Origin::Constants),
            (None, Some(factory)) => (Some(factory), Origin::Factory),
            (None, None) => (None, Origin::Unsupported),
        },
    };

    let to: ToFn<T> = match to_decl {
        ToText::Method(f) => f,
        ToText::Constant(text) => Arc::new(move |_: &Converters, _: &T| Ok(text.clone())),
        ToText::Singleton => match singleton {
            Some(instance) => {
                let text = instance().native_text();
                Arc::new(move |_: &Converters, _: &T| Ok(text.clone()))
            }
            None => native::<T>(),
        },
        ToText::Native => native::<T>(),
    };

    Converter::with_origin(to, from, origin)
}

fn native<T: Convertible>() -> ToFn<T> {
    Arc::new(|_: &Converters, value: &T| Ok(value.native_text()))
}

/// Exact name match first, then a case-insensitive one.
fn constant_lookup<T: Convertible>(constants: Vec<(&'static str, T)>) -> FromFn<T> {
    Arc::new(move |_: &Converters, text: &str| {
        let exact = constants.iter().find(|(name, _)| *name == text);
        let found = exact.or_else(|| {
            let wanted = text.to_lowercase();
            constants.iter().find(|(name, _)| name.to_lowercase() == wanted)
        });
        found
            .map(|(_, value)| value.clone())
            .ok_or_else(|| ConvertError::UnknownConstant {
                ty: T::type_name(),
                text: text.to_string(),
            })
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
