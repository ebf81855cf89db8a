//! propconf-cli library crate.
//!
//! The `propconf` command-line tool for inspecting and editing property
//! files, plus a demo player that consumes `propconf-core` the way an
//! application would.
//!
//! # Layout
//!
//! ```text
//! main.rs        clap arguments, logging setup, printing
//!   └── commands/  One function per subcommand, returning the text to print
//!         ├── report/  serde shapes for `dump --json`
//!         └── player/  Demo settings declared through discovery
//!                ↕
//!          propconf-core
//! ```
//!
//! # For beginners: why a library and a binary?
//!
//! Keeping the commands in a library makes them callable from unit tests
//! with a temporary file, without spawning a process or capturing stdout.

/// Subcommand implementations.
pub mod commands;

/// Demo player settings.
pub mod player;

/// JSON output shapes.
pub mod report;
