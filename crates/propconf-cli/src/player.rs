//! Demo player settings.
//!
//! A small music player that declares its settings through the discovery
//! API, the way a real application component would.  The `init-player` and
//! `show-player` commands use it to show the framework end to end.
//!
//! | Key                        | Kind              | Edit mode |
//! |----------------------------|-------------------|-----------|
//! | `playback.volume`          | field, 0 to 1     | USER      |
//! | `playback.repeat`          | enum property     | USER      |
//! | `playback.shuffle`         | bool field        | USER      |
//! | `playback.crossfade`       | duration field    | USER      |
//! | `playback.output_device`   | optional property | USER      |
//! | `playback.version`         | read-only field   | NONE      |
//! | `library.folders`          | list property     | USER      |
//! | `library.scan_depth`       | field, 1 to 16    | APP       |
//! | `ui.skin`                  | property, one of  | USER      |
//! | `diagnostics.trace_scans`  | static bool       | USER      |
//! | `diagnostics.history_size` | static number     | USER      |

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use propconf_core::config::{ListProperty, Max, NonEmpty, OneOf, Property, Range};
use propconf_core::discovery::{Discoverable, DiscoverableStatic, Member, Members};
use propconf_core::EditMode;
use tracing::debug;

/// Skins shipped with the player.
pub const SKINS: [&str; 3] = ["Default", "Dark Matter", "High Contrast"];

// ── Repeat mode ───────────────────────────────────────────────────────────────

/// What happens at the end of the play queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Repeat {
    #[default]
    Off,
    One,
    All,
}

propconf_core::convertible_enum!(Repeat { Off => "OFF", One => "ONE", All => "ALL" });

// ── Player ────────────────────────────────────────────────────────────────────

/// Instance settings of the player.
pub struct Player {
    volume: RwLock<f64>,
    repeat: Arc<Property<Repeat>>,
    shuffle: RwLock<bool>,
    crossfade: RwLock<Duration>,
    output_device: Arc<Property<Option<String>>>,
    folders: Arc<ListProperty<PathBuf>>,
    scan_depth: RwLock<u8>,
    skin: Arc<Property<String>>,
}

impl Player {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            volume: RwLock::new(0.8),
            repeat: Property::new(Repeat::Off),
            shuffle: RwLock::new(false),
            crossfade: RwLock::new(Duration::from_secs(2)),
            output_device: Property::new(None),
            folders: ListProperty::new(vec![PathBuf::from("~/Music")]),
            scan_depth: RwLock::new(4),
            skin: Property::new(SKINS[0].to_string()),
        })
    }

    pub fn volume(&self) -> f64 {
        *self.volume.read()
    }

    pub fn repeat(&self) -> Repeat {
        self.repeat.get()
    }

    pub fn shuffle(&self) -> bool {
        *self.shuffle.read()
    }

    pub fn crossfade(&self) -> Duration {
        *self.crossfade.read()
    }

    pub fn output_device(&self) -> Option<String> {
        self.output_device.get()
    }

    pub fn folders(&self) -> Vec<PathBuf> {
        self.folders.get()
    }

    pub fn scan_depth(&self) -> u8 {
        *self.scan_depth.read()
    }

    pub fn skin(&self) -> String {
        self.skin.get()
    }
}

impl Discoverable for Player {
    const GROUP: &'static str = "Playback";

    fn declare(this: &Arc<Self>, members: &mut Members) {
        let (get_volume, set_volume) = (Arc::clone(this), Arc::clone(this));
        let (get_shuffle, set_shuffle) = (Arc::clone(this), Arc::clone(this));
        let (get_fade, set_fade) = (Arc::clone(this), Arc::clone(this));
        let (get_depth, set_depth) = (Arc::clone(this), Arc::clone(this));

        members
            .add(
                Member::field(
                    "volume",
                    move || *get_volume.volume.read(),
                    move |v| *set_volume.volume.write() = v,
                )
                .info("Playback volume, from 0 (mute) to 1")
                .constraint(Range { min: 0.0, max: 1.0 })
                .on_apply(|v| debug!("volume applied: {v}")),
            )
            .add(Member::property("repeat", &this.repeat).info("Repeat mode: OFF, ONE or ALL"))
            .add(
                Member::field(
                    "shuffle",
                    move || *get_shuffle.shuffle.read(),
                    move |v| *set_shuffle.shuffle.write() = v,
                )
                .info("Play the queue in random order"),
            )
            .add(
                Member::field(
                    "crossfade",
                    move || *get_fade.crossfade.read(),
                    move |v| *set_fade.crossfade.write() = v,
                )
                .info("Overlap between consecutive tracks")
                .constraint(Max(Duration::from_secs(10))),
            )
            .add(
                Member::property("output device", &this.output_device)
                    .info("Audio device name, or null for the system default"),
            )
            .add(Member::read_only_field("version", || env!("CARGO_PKG_VERSION").to_string()))
            .add(
                Member::list("folders", &this.folders)
                    .group("Library")
                    .info("Folders scanned for music")
                    .constraint(NonEmpty),
            )
            .add(
                Member::field(
                    "scan depth",
                    move || *get_depth.scan_depth.read(),
                    move |v| *set_depth.scan_depth.write() = v,
                )
                .group("Library")
                .info("How many folder levels the scanner descends")
                .editable(EditMode::App)
                .constraint(Range { min: 1, max: 16 }),
            )
            .add(
                Member::property("skin", &this.skin)
                    .group("UI")
                    .constraint(OneOf(SKINS.iter().map(|s| s.to_string()).collect())),
            );
    }
}

// ── Diagnostics ───────────────────────────────────────────────────────────────

static TRACE_SCANS: AtomicBool = AtomicBool::new(false);
static HISTORY_SIZE: AtomicUsize = AtomicUsize::new(100);

/// Process-wide diagnostic switches.
#[derive(Debug)]
pub struct Diagnostics;

impl Diagnostics {
    pub fn trace_scans() -> bool {
        TRACE_SCANS.load(Ordering::Relaxed)
    }

    pub fn history_size() -> usize {
        HISTORY_SIZE.load(Ordering::Relaxed)
    }
}

impl DiscoverableStatic for Diagnostics {
    const GROUP: &'static str = "Diagnostics";

    fn declare(members: &mut Members) {
        members
            .add(
                Member::field(
                    "trace scans",
                    || TRACE_SCANS.load(Ordering::Relaxed),
                    |v| TRACE_SCANS.store(v, Ordering::Relaxed),
                )
                .info("Log every file visited by the library scanner"),
            )
            .add(
                Member::field(
                    "history size",
                    || HISTORY_SIZE.load(Ordering::Relaxed),
                    |v| HISTORY_SIZE.store(v, Ordering::Relaxed),
                )
                .info("Number of recently played tracks to remember")
                .constraint(Range { min: 1, max: 10_000 }),
            );
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
