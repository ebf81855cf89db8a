//! The per-type converter record and its error type.

use std::fmt::Display;
use std::sync::Arc;

use thiserror::Error;

use super::registry::Converters;
use super::strategy::Convertible;

/// The reserved text standing for "no value" for every type.
pub const NULL: &str = "null";

/// Message used when a declared error carries no text of its own.
pub const GENERIC_FAILURE: &str = "conversion failed";

/// Errors returned by conversions.  Conversions never panic for bad input
/// text; a panic inside a custom strategy is a programming defect and is
/// left to propagate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// The text is not a valid value of an otherwise convertible type.
    #[error("cannot parse {text:?} as {ty}: {message}")]
    Parse {
        ty: &'static str,
        text: String,
        message: String,
    },

    /// No constant of the enumeration matches the text.
    #[error("{text:?} is not a constant of {ty}")]
    UnknownConstant { ty: &'static str, text: String },

    /// The type has no from-string strategy at all.  Permanent.
    #[error("unsupported type {ty}: no from-string strategy")]
    Unsupported { ty: &'static str },

    /// The null sentinel was given for a type without a null value.
    #[error("{ty} has no null value")]
    NoNullValue { ty: &'static str },

    /// An ancestor's converter produced a value that is not a `ty`.
    #[error("{ancestor} value parsed from {text:?} is not a valid {ty}")]
    Incompatible {
        ty: &'static str,
        ancestor: &'static str,
        text: String,
    },

    /// A custom to-string strategy failed.
    #[error("cannot format {ty}: {message}")]
    Format { ty: &'static str, message: String },
}

/// Result of a conversion.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// A to-string function.  The registry is passed in so composite types can
/// convert their elements.
pub type ToFn<T> = Arc<dyn Fn(&Converters, &T) -> ConvertResult<String> + Send + Sync>;

/// A from-string function.
pub type FromFn<T> = Arc<dyn Fn(&Converters, &str) -> ConvertResult<T> + Send + Sync>;

/// Where a converter came from.  Useful for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Registered explicitly for this exact type.
    Registered,
    /// Registered for the named ancestor and adapted.
    Inherited(&'static str),
    /// Built from the type's declared parsing strategy.
    Declared,
    /// Built from the type's enumeration constants.
    Constants,
    /// Built from the type's single-string factory.
    Factory,
    /// Nothing could parse this type.
    Unsupported,
}

/// A bidirectional string codec for `T`.
///
/// Cheap to clone: both functions are reference counted.  Once built, a
/// converter is immutable, so it can be used from any thread.
pub struct Converter<T> {
    to: ToFn<T>,
    from: Option<FromFn<T>>,
    origin: Origin,
}

impl<T> Clone for Converter<T> {
    fn clone(&self) -> Self {
        Self {
            to: Arc::clone(&self.to),
            from: self.from.clone(),
            origin: self.origin,
        }
    }
}

impl<T: Convertible> Converter<T> {
    /// Creates a converter from registry-aware functions.
    pub fn new(to: ToFn<T>, from: FromFn<T>) -> Self {
        Self {
            to,
            from: Some(from),
            origin: Origin::Registered,
        }
    }

    /// Creates a converter from two plain functions.
    ///
    /// Errors of the declared type `E` are normalised into
    /// [`ConvertError::Parse`] / [`ConvertError::Format`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use propconf_core::convert::{Converter, Converters};
    ///
    /// let percent = Converter::<f64>::from_fns(
    ///     |v: &f64| Ok::<_, std::num::ParseFloatError>(format!("{}%", v * 100.0)),
    ///     |s: &str| s.trim_end_matches('%').parse::<f64>().map(|v| v / 100.0),
    /// );
    /// let converters = Converters::new();
    /// converters.register(percent);
    /// assert_eq!(converters.to_string(&0.25f64).unwrap(), "25%");
    /// assert_eq!(converters.from_string::<f64>("50%").unwrap(), 0.5);
    /// ```
    pub fn from_fns<E, F, G>(to: F, from: G) -> Self
    where
        E: Display,
        F: Fn(&T) -> Result<String, E> + Send + Sync + 'static,
        G: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
    {
        Self::new(format_with(to), parse_with(from))
    }

    pub(crate) fn with_origin(to: ToFn<T>, from: Option<FromFn<T>>, origin: Origin) -> Self {
        Self { to, from, origin }
    }

    pub(crate) fn with_registered_origin(self) -> Self {
        Self {
            origin: Origin::Registered,
            ..self
        }
    }

    /// Converts `value` to text.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Format`] if a custom to-string strategy fails.
    pub fn to_text(&self, converters: &Converters, value: &T) -> ConvertResult<String> {
        (self.to)(converters, value)
    }

    /// Parses `text`.  The null sentinel is handled by the registry, not
    /// here.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Unsupported`] when the type cannot be parsed
    /// at all, or the strategy's own error for invalid text.
    pub fn from_text(&self, converters: &Converters, text: &str) -> ConvertResult<T> {
        match &self.from {
            Some(from) => from(converters, text),
            None => Err(ConvertError::Unsupported { ty: T::type_name() }),
        }
    }

    /// `false` when this converter records a resolution failure.
    pub fn can_parse(&self) -> bool {
        self.from.is_some()
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Re-targets this ancestor converter at the descendant type `D`.
    pub(crate) fn adapt<D, U, W>(self, up: Arc<U>, down: Arc<W>) -> Converter<D>
    where
        D: Convertible,
        U: Fn(&D) -> T + Send + Sync + 'static,
        W: Fn(T) -> Option<D> + Send + Sync + 'static,
    {
        let base_to = self.to;
        let to: ToFn<D> = Arc::new(move |converters: &Converters, value: &D| base_to(converters, &up(value)));
        let from = self.from.map(|base_from| -> FromFn<D> {
            Arc::new(move |converters: &Converters, text: &str| {
                let ancestor_value = base_from(converters, text)?;
                down(ancestor_value).ok_or_else(|| ConvertError::Incompatible {
                    ty: D::type_name(),
                    ancestor: T::type_name(),
                    text: text.to_string(),
                })
            })
        });
        Converter::with_origin(to, from, Origin::Inherited(T::type_name()))
    }
}

// ── Error normalisation ───────────────────────────────────────────────────────

/// Turns a declared error into the message carried by a [`ConvertError`].
pub(crate) fn caught_message<E: Display>(error: E) -> String {
    let message = error.to_string();
    if message.is_empty() {
        GENERIC_FAILURE.to_string()
    } else {
        message
    }
}

/// Wraps a fallible parse function declaring error type `E`.
pub(crate) fn parse_with<T, E, G>(from: G) -> FromFn<T>
where
    T: Convertible,
    E: Display,
    G: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
{
    Arc::new(move |_: &Converters, text: &str| {
        from(text).map_err(|e| ConvertError::Parse {
            ty: T::type_name(),
            text: text.to_string(),
            message: caught_message(e),
        })
    })
}

/// Wraps a fallible format function declaring error type `E`.
pub(crate) fn format_with<T, E, F>(to: F) -> ToFn<T>
where
    T: Convertible,
    E: Display,
    F: Fn(&T) -> Result<String, E> + Send + Sync + 'static,
{
    Arc::new(move |_: &Converters, value: &T| {
        to(value).map_err(|e| ConvertError::Format {
            ty: T::type_name(),
            message: caught_message(e),
        })
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    struct Silent;

    impl Display for Silent {
        fn fmt(&self, _f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            Ok(())
        }
    }

    #[test]
    fn test_declared_error_message_is_kept() {
        // Arrange
        let converter = Converter::<u32>::from_fns(
            |v: &u32| Ok::<_, String>(v.to_string()),
            |s: &str| s.parse::<u32>().map_err(|e| e.to_string()),
        );
        let converters = Converters::new();

        // Act
        let result = converter.from_text(&converters, "x");

        // Assert
        match result {
            Err(ConvertError::Parse { text, message, .. }) => {
                assert_eq!(text, "x");
                assert_eq!(message, "invalid digit found in string");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_declared_error_without_message_gets_generic_label() {
        let converter = Converter::<u32>::from_fns(|_: &u32| Err(Silent), |_: &str| Err(Silent));
        let converters = Converters::new();

        let parse = converter.from_text(&converters, "1");
        let format = converter.to_text(&converters, &1);

        assert!(matches!(parse, Err(ConvertError::Parse { message, .. }) if message == GENERIC_FAILURE));
        assert!(matches!(format, Err(ConvertError::Format { message, .. }) if message == GENERIC_FAILURE));
    }

    #[test]
    #[should_panic(expected = "defect")]
    fn test_undeclared_failure_propagates_as_panic() {
        let converter = Converter::<u32>::from_fns(
            |v: &u32| Ok::<_, String>(v.to_string()),
            |_: &str| -> Result<u32, String> { panic!("defect") },
        );
        let _ = converter.from_text(&Converters::new(), "1");
    }

    #[test]
    fn test_converter_without_from_reports_unsupported() {
        let to: ToFn<u32> = Arc::new(|_: &Converters, v: &u32| Ok(v.to_string()));
        let converter = Converter::with_origin(to, None, Origin::Unsupported);

        assert!(!converter.can_parse());
        assert!(matches!(
            converter.from_text(&Converters::new(), "1"),
            Err(ConvertError::Unsupported { .. })
        ));
    }
}
