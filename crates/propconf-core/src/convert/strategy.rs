//! The [`Convertible`] trait and the declarations a type can make about how
//! it converts to and from text.
//!
//! # How a type becomes convertible (for beginners)
//!
//! There is no runtime reflection in Rust, so a type *declares* what the
//! registry may use to build a converter for it:
//!
//! | Declaration            | Used for                                            |
//! |------------------------|-----------------------------------------------------|
//! | [`Convertible::lineage`]        | ancestors whose registered converter may be reused |
//! | [`Convertible::parse_strategy`] | an explicit from/to-text strategy pair             |
//! | [`Convertible::enum_constants`] | name-to-value table of an enumeration              |
//! | [`Convertible::factory`]        | a single-string constructor (usually `FromStr`)    |
//! | [`Convertible::native_text`]    | the value's own textual representation             |
//!
//! Everything has a default, so the smallest implementation is an empty
//! `impl Convertible for MyType {}` (which can be formatted but not parsed).
//! The [`convertible_from_str!`](crate::convertible_from_str) and
//! [`convertible_enum!`](crate::convertible_enum) macros cover the two most
//! common cases.

use std::any::TypeId;
use std::fmt::{Debug, Display};
use std::str::FromStr;
use std::sync::Arc;

use super::converter::{format_with, parse_with, Converter, FromFn, ToFn};
use super::registry::{self, Registered};

/// A type that can be stored in a configuration file.
///
/// Implementations must not call back into the [`Converters`] registry from
/// these declaration functions; they run while the registry builds and
/// caches a converter.
///
/// [`Converters`]: super::Converters
pub trait Convertible: Clone + Debug + Send + Sync + 'static {
    /// Name used in error messages and logs.
    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }

    /// The value's own textual representation.  Used by to-string when no
    /// more specific strategy exists.
    fn native_text(&self) -> String {
        format!("{self:?}")
    }

    /// The value the null sentinel parses to, if the type has one.
    fn null_value() -> Option<Self> {
        None
    }

    /// Ancestors whose registered converter is reused for this type,
    /// most specific first.
    fn lineage() -> Vec<Ancestor<Self>> {
        Vec::new()
    }

    /// An explicit conversion strategy.
    fn parse_strategy() -> Option<ParseStrategy<Self>> {
        None
    }

    /// Enumeration constants by canonical name.
    fn enum_constants() -> Option<Vec<(&'static str, Self)>> {
        None
    }

    /// A single-string constructor.
    fn factory() -> Option<FromFn<Self>> {
        None
    }
}

// ── Parse strategies ──────────────────────────────────────────────────────────

/// An explicit from/to pair declared by a type.
pub struct ParseStrategy<T> {
    pub from: FromText<T>,
    pub to: ToText<T>,
}

/// How text becomes a value.
pub enum FromText<T> {
    /// A static parse method.
    Method(FromFn<T>),
    /// A constructor taking the text.
    Constructor(FromFn<T>),
    /// Every text parses to the one instance the type has.
    Singleton(Arc<dyn Fn() -> T + Send + Sync>),
    /// No declaration; constants and factory are still tried.
    Inherit,
}

/// How a value becomes text.
pub enum ToText<T> {
    /// A method producing the text.
    Method(ToFn<T>),
    /// The native text of the type's singleton instance.
    Singleton,
    /// The same fixed text for every value.
    Constant(String),
    /// [`Convertible::native_text`].
    Native,
}

impl<T: Convertible> FromText<T> {
    /// A parse method declaring error type `E`.
    pub fn method<E, G>(parse: G) -> Self
    where
        E: Display,
        G: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
    {
        FromText::Method(parse_with(parse))
    }

    /// A constructor declaring error type `E`.
    pub fn constructor<E, G>(construct: G) -> Self
    where
        E: Display,
        G: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
    {
        FromText::Constructor(parse_with(construct))
    }

    pub fn singleton(instance: impl Fn() -> T + Send + Sync + 'static) -> Self {
        FromText::Singleton(Arc::new(instance))
    }
}

impl<T: Convertible> ToText<T> {
    /// A format method declaring error type `E`.
    pub fn method<E, F>(format: F) -> Self
    where
        E: Display,
        F: Fn(&T) -> Result<String, E> + Send + Sync + 'static,
    {
        ToText::Method(format_with(format))
    }

    pub fn constant(text: impl Into<String>) -> Self {
        ToText::Constant(text.into())
    }
}

// ── Ancestors ─────────────────────────────────────────────────────────────────

type Adapter<T> = Arc<dyn Fn(&(dyn std::any::Any + Send + Sync)) -> Option<Converter<T>> + Send + Sync>;
type Through<T> = Arc<dyn Fn(&Registered) -> Converter<T> + Send + Sync>;

/// One entry of a type's lineage: an ancestor type `A` plus the two
/// mappings that let `A`'s converter serve `T`.
///
/// `up` views a `T` as an `A` for to-string.  `down` narrows a parsed `A`
/// back to a `T`; returning `None` makes from-string fail with
/// [`ConvertError::Incompatible`](super::ConvertError::Incompatible).
pub struct Ancestor<T> {
    id: TypeId,
    name: &'static str,
    adapt: Adapter<T>,
    through: Through<T>,
}

impl<T: Convertible> Ancestor<T> {
    pub fn of<A, U, W>(up: U, down: W) -> Self
    where
        A: Convertible,
        U: Fn(&T) -> A + Send + Sync + 'static,
        W: Fn(A) -> Option<T> + Send + Sync + 'static,
    {
        let up = Arc::new(up);
        let down = Arc::new(down);
        let (through_up, through_down) = (Arc::clone(&up), Arc::clone(&down));
        Self {
            id: TypeId::of::<A>(),
            name: A::type_name(),
            adapt: Arc::new(move |erased| {
                let base = erased.downcast_ref::<Converter<A>>()?.clone();
                Some(base.adapt(Arc::clone(&up), Arc::clone(&down)))
            }),
            through: Arc::new(move |registered| {
                registry::resolve::<A>(registered).adapt(Arc::clone(&through_up), Arc::clone(&through_down))
            }),
        }
    }

    pub fn ancestor_type(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Builds a converter for `T` from the ancestor's erased converter.
    pub(crate) fn adapt(&self, erased: &(dyn std::any::Any + Send + Sync)) -> Option<Converter<T>> {
        (self.adapt)(erased)
    }

    /// Resolves the ancestor itself, then adapts whatever it resolved to.
    pub(crate) fn resolve_through(&self, registered: &Registered) -> Converter<T> {
        (self.through)(registered)
    }
}

// ── Helpers for implementors ──────────────────────────────────────────────────

/// A factory built on [`FromStr`].
pub fn factory_from_str<T>() -> FromFn<T>
where
    T: Convertible + FromStr,
    T::Err: Display,
{
    parse_with(|text: &str| text.parse::<T>())
}

/// Implements [`Convertible`] for types with `FromStr` + `Display`.
///
/// ```rust
/// use propconf_core::convert::Converters;
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Port(u16);
///
/// impl std::str::FromStr for Port {
///     type Err = std::num::ParseIntError;
///     fn from_str(s: &str) -> Result<Self, Self::Err> {
///         s.parse().map(Port)
///     }
/// }
///
/// impl std::fmt::Display for Port {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         write!(f, "{}", self.0)
///     }
/// }
///
/// propconf_core::convertible_from_str!(Port);
///
/// let converters = Converters::new();
/// assert_eq!(converters.from_string::<Port>("8080").unwrap(), Port(8080));
/// ```
#[macro_export]
macro_rules! convertible_from_str {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::convert::Convertible for $ty {
                fn native_text(&self) -> ::std::string::String {
                    ::std::string::ToString::to_string(self)
                }

                fn factory() -> ::std::option::Option<$crate::convert::FromFn<Self>> {
                    ::std::option::Option::Some($crate::convert::factory_from_str::<Self>())
                }
            }
        )+
    };
}

/// Implements [`Convertible`] for a field-less enum by listing each
/// variant with its canonical name.
///
/// ```rust
/// use propconf_core::convert::Converters;
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Color { Red, Green }
///
/// propconf_core::convertible_enum!(Color { Red => "RED", Green => "Green" });
///
/// let converters = Converters::new();
/// assert_eq!(converters.to_string(&Color::Red).unwrap(), "RED");
/// assert_eq!(converters.from_string::<Color>("green").unwrap(), Color::Green);
/// ```
#[macro_export]
macro_rules! convertible_enum {
    ($ty:ty { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $crate::convert::Convertible for $ty {
            fn native_text(&self) -> ::std::string::String {
                match self {
                    $(Self::$variant => ::std::string::String::from($name),)+
                }
            }

            fn enum_constants() -> ::std::option::Option<::std::vec::Vec<(&'static str, Self)>> {
                ::std::option::Option::Some(::std::vec![$(($name, Self::$variant)),+])
            }
        }
    };
}
