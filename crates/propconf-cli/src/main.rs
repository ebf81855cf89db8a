//! propconf: inspect and edit property files.
//!
//! # Usage
//!
//! ```text
//! propconf [OPTIONS] <COMMAND>
//!
//! Commands:
//!   dump         Print every entry, or the whole file as JSON with --json
//!   get          Print the value of one key
//!   set          Set one key and rewrite the file
//!   remove       Remove one key and rewrite the file
//!   normalize    Rewrite the file sorted and escaped
//!   check        Fail if any line cannot be decoded
//!   init-player  Write the demo player's settings
//!   show-player  Load a file into the demo player and list its settings
//!
//! Options:
//!   --title <TITLE>        Header comment of rewritten files [default: Settings]
//!   --no-unicode-escape    Write non-ASCII characters as they are
//!   --no-timestamp         Do not write the date comment under the header
//!   -v, --verbose          Log at debug level unless RUST_LOG is set
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable                      | Default    | Description                  |
//! |-------------------------------|------------|------------------------------|
//! | `PROPCONF_TITLE`              | `Settings` | Header comment               |
//! | `PROPCONF_NO_UNICODE_ESCAPE`  | `false`    | Keep non-ASCII characters    |
//! | `PROPCONF_NO_TIMESTAMP`       | `false`    | Skip the date comment        |
//! | `RUST_LOG`                    | `info`     | Log filter                   |
//!
//! Logs go to stderr so that command output can be piped.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use propconf_core::format::WriteOptions;
use tracing_subscriber::EnvFilter;

use propconf_cli::commands::{self, FileOptions};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Inspect and edit property files.
///
/// The `#[derive(Parser)]` macro from `clap` generates the argument parser
/// automatically from the struct fields and their `#[arg(...)]` attributes.
#[derive(Debug, Parser)]
#[command(name = "propconf", about = "Inspect and edit property files", version)]
struct Cli {
    /// Header comment written on the first line of rewritten files.
    #[arg(long, global = true, default_value = "Settings", env = "PROPCONF_TITLE")]
    title: String,

    /// Write non-ASCII characters as they are instead of as `\uXXXX`.
    #[arg(long, global = true, env = "PROPCONF_NO_UNICODE_ESCAPE")]
    no_unicode_escape: bool,

    /// Do not write the date comment under the header.
    #[arg(long, global = true, env = "PROPCONF_NO_TIMESTAMP")]
    no_timestamp: bool,

    /// Log at debug level.  `RUST_LOG` takes precedence when set.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print every entry as `key=value`, or the whole file as JSON.
    Dump {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Print the decoded value of one key.
    Get { file: PathBuf, key: String },
    /// Set one key and rewrite the file.  The file is created if missing.
    Set { file: PathBuf, key: String, value: String },
    /// Remove one key and rewrite the file.
    Remove { file: PathBuf, key: String },
    /// Rewrite the file sorted and escaped, dropping malformed lines.
    Normalize { file: PathBuf },
    /// Exit with an error if any line cannot be decoded.
    Check { file: PathBuf },
    /// Write the demo player's settings, keeping values already in the file.
    InitPlayer { file: PathBuf },
    /// Load a file into the demo player and list its settings.
    ShowPlayer { file: PathBuf },
}

impl Cli {
    /// Converts the global flags into [`FileOptions`].
    fn file_options(&self) -> FileOptions {
        FileOptions {
            title: self.title.clone(),
            write: WriteOptions {
                escape_unicode: !self.no_unicode_escape,
                timestamp: !self.no_timestamp,
            },
        }
    }
}

/// Runs one subcommand and returns what to print.
fn run(command: &Command, options: &FileOptions) -> Result<String, commands::CommandError> {
    match command {
        Command::Dump { file, json } => commands::dump(file, *json),
        Command::Get { file, key } => commands::get(file, key),
        Command::Set { file, key, value } => commands::set(file, key, value, options),
        Command::Remove { file, key } => commands::remove(file, key, options),
        Command::Normalize { file } => commands::normalize(file, options),
        Command::Check { file } => commands::check(file),
        Command::InitPlayer { file } => commands::init_player(file, options),
        Command::ShowPlayer { file } => commands::show_player(file, options),
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ─────────────────────────────────────────────────────────
    //
    // `EnvFilter::try_from_default_env()` reads the `RUST_LOG` environment
    // variable.  If it is absent or invalid, we fall back to `info` level
    // (`debug` with --verbose).
    let fallback = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with_writer(std::io::stderr)
        .init();

    let options = cli.file_options();
    let output = run(&cli.command, &options).with_context(|| format!("{:?} failed", cli.command))?;
    if !output.is_empty() {
        println!("{}", output.trim_end());
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
