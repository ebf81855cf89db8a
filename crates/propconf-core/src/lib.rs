//! # propconf-core
//!
//! Typed, discoverable application settings persisted as property files.
//!
//! # Architecture overview (for beginners)
//!
//! An application has many settings scattered over many components: a
//! volume on the player, a skin name on the UI, a list of folders on the
//! library scanner.  This crate lets each component declare its settings
//! once and then takes care of reading, validating, applying and saving
//! them.
//!
//! - **`format`** – The text layer.  Reads and writes the line-oriented
//!   `key=value` property format, including escapes, comments, line
//!   continuations and list values.  Knows nothing about types.
//!
//! - **`convert`** – The type layer.  A registry of per-type converters
//!   between values and text, with support for enums, ancestor types,
//!   optional values and lists.
//!
//! - **`config`** – A single typed setting: `Config<T>` with its name,
//!   group, description, edit mode, constraints and apply callback.
//!
//! - **`discovery`** – Turns a component's declared members into configs.
//!
//! - **`configuration`** – The orchestrator.  Collects configs, keeps raw
//!   file entries for components that are not loaded yet, and loads/saves
//!   everything.
//!
//! ```text
//!  component ──declare──▶ discovery ──▶ Config<T> ──▶ Configuration ◀──▶ file
//!                                          │               │
//!                                          └── convert ────┴── format
//! ```

pub mod config;
pub mod configuration;
pub mod convert;
pub mod discovery;
pub mod format;

// Re-export the most-used types at the crate root so callers can write
// `propconf_core::Configuration` instead of the full module path.
pub use config::{AnyConfig, Config, ConfigError, EditMode, ValueConfig};
pub use configuration::{Action, Configuration, ConfigurationError, LoadSummary};
pub use convert::{ConvertError, Convertible, Converters};
pub use discovery::{Configurable, Discoverable, DiscoverableStatic, DiscoveryError, Member, Members};
pub use format::FormatError;
