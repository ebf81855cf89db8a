//! Configuration values.
//!
//! - **`edit_mode`**    – who may change a value.
//! - **`constraint`**   – validation of candidate values.
//! - **`property`**     – observable value holders a config can be bound to.
//! - **`typed`**        – [`Config<T>`], its backings and the erased
//!   [`AnyConfig`] view.
//! - **`value_config`** – configs that own their value.

pub mod constraint;
pub mod edit_mode;
pub mod property;
pub mod typed;
pub mod value_config;

pub use constraint::{Constraint, ConstraintRef, Max, Min, NonEmpty, OneOf, Predicate, Range};
pub use edit_mode::EditMode;
pub use property::{ListProperty, Property, ReadOnlyProperty};
pub use typed::{config_key, normalize_key, AnyConfig, Backing, Config, ConfigError, FieldBacking, ValueBacking};
pub use value_config::ValueConfig;
