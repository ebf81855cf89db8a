//! Type converter registry.
//!
//! Every configuration value is stored as text.  This module turns typed
//! values into that text and back:
//!
//! - [`Convertible`] is implemented by every type that can be stored.
//! - [`Converter`] is the resolved codec for one type.
//! - [`Converters`] is the shared, thread-safe registry that resolves and
//!   caches converters, honouring explicit registrations and ancestor
//!   lineage.
//!
//! The reserved text [`NULL`] stands for "no value" for every type.

pub mod builtin;
pub mod converter;
pub mod registry;
pub mod strategy;

pub use converter::{ConvertError, ConvertResult, Converter, FromFn, Origin, ToFn, GENERIC_FAILURE, NULL};
pub use registry::Converters;
pub use strategy::{factory_from_str, Ancestor, Convertible, FromText, ParseStrategy, ToText};
