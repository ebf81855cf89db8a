//! Config discovery.
//!
//! A type makes its settings configurable by implementing [`Discoverable`]
//! (for members of an instance) or [`DiscoverableStatic`] (for process-wide
//! settings) and listing each member once in `declare`.  Discovery runs the
//! declaration, checks it, and turns every member into a [`Config`].
//!
//! # Why declare instead of annotate? (for beginners)
//!
//! Rust has no runtime reflection, so there is no way to walk a struct's
//! fields and look for a marker.  Instead, the type hands over a getter and
//! setter (or an observable property) for each setting.  The checks a
//! reflective system would do on the fly (read-only versus editable,
//! constraint types, duplicate names) all run once, here, when the
//! declaration is built.
//!
//! ```rust
//! use std::sync::Arc;
//! use parking_lot::RwLock;
//! use propconf_core::config::Range;
//! use propconf_core::discovery::{discover, Configurable, Discoverable, Member, Members};
//!
//! #[derive(Default)]
//! struct Player {
//!     volume: RwLock<f64>,
//! }
//!
//! impl Discoverable for Player {
//!     const GROUP: &'static str = "Playback";
//!
//!     fn declare(this: &Arc<Self>, members: &mut Members) {
//!         let (get, set) = (Arc::clone(this), Arc::clone(this));
//!         members.add(
//!             Member::field("volume", move || *get.volume.read(), move |v| *set.volume.write() = v)
//!                 .info("Playback volume")
//!                 .constraint(Range { min: 0.0, max: 1.0 }),
//!         );
//!     }
//! }
//!
//! let player = Arc::new(Player::default());
//! let configurable = discover(&player).unwrap();
//! assert_eq!(configurable.configs()[0].key(), "playback.volume");
//! ```
//!
//! [`Config`]: crate::config::Config

pub mod configurable;
pub mod member;

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::config::EditMode;

pub use configurable::{CompositeConfigurable, Configurable, DeclaredConfigurable, ListConfigurable};
#[cfg(test)]
pub use configurable::MockConfigurable;
pub use member::{Member, Members};

/// Errors in a member declaration.  These are programming errors in the
/// declaring type and are reported once, at discovery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    #[error("{owner}: member name must not be empty")]
    EmptyName { owner: &'static str },

    #[error("{owner}: member {group}.{member} is declared twice")]
    DuplicateMember {
        owner: &'static str,
        group: String,
        member: String,
    },

    #[error("{owner}.{member}: read-only member declared with edit mode {edit_mode:?}")]
    ReadOnlyEditable {
        owner: &'static str,
        member: String,
        edit_mode: EditMode,
    },

    #[error("{owner}.{member}: writable member declared as never editable")]
    WritableNeverEditable { owner: &'static str, member: String },

    #[error("{owner}.{member}: constraint {constraint} applies to {expected}, not {actual}")]
    ConstraintTypeMismatch {
        owner: &'static str,
        member: String,
        constraint: String,
        expected: &'static str,
        actual: &'static str,
    },
}

/// A type whose instances carry configurable members.
pub trait Discoverable: Send + Sync + 'static {
    /// Group of members that do not name one.
    const GROUP: &'static str;

    /// Adds one [`Member`] per configurable setting of `this`.
    fn declare(this: &Arc<Self>, members: &mut Members);
}

/// A type with process-wide configurable settings.
pub trait DiscoverableStatic: 'static {
    /// Group of members that do not name one.
    const GROUP: &'static str;

    fn declare(members: &mut Members);
}

/// Discovers the configs of one instance.
///
/// # Errors
///
/// Returns the first [`DiscoveryError`] in the declaration.
pub fn discover<C: Discoverable>(instance: &Arc<C>) -> Result<DeclaredConfigurable, DiscoveryError> {
    let owner = std::any::type_name::<C>();
    let mut members = Members::new(owner, C::GROUP);
    C::declare(instance, &mut members);
    let configs = members.build()?;
    debug!(owner, count = configs.len(), "configs discovered");
    Ok(DeclaredConfigurable::new(owner, configs))
}

/// Discovers the process-wide configs of `C`.
///
/// # Errors
///
/// Returns the first [`DiscoveryError`] in the declaration.
pub fn discover_static<C: DiscoverableStatic>() -> Result<DeclaredConfigurable, DiscoveryError> {
    let owner = std::any::type_name::<C>();
    let mut members = Members::new(owner, C::GROUP);
    C::declare(&mut members);
    let configs = members.build()?;
    debug!(owner, count = configs.len(), "static configs discovered");
    Ok(DeclaredConfigurable::new(owner, configs))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use parking_lot::RwLock;

    use super::*;
    use crate::config::{ConstraintRef, ListProperty, Max, Property, Range};
    use crate::convert::Converters;

    struct Library {
        folders: Arc<ListProperty<String>>,
        skin: Arc<Property<String>>,
        scan_depth: RwLock<u32>,
        version: &'static str,
    }

    impl Library {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                folders: ListProperty::new(vec!["/music".to_string()]),
                skin: Property::new("Dark".to_string()),
                scan_depth: RwLock::new(4),
                version: "1.2.0",
            })
        }
    }

    impl Discoverable for Library {
        const GROUP: &'static str = "Library";

        fn declare(this: &Arc<Self>, members: &mut Members) {
            let (get, set) = (Arc::clone(this), Arc::clone(this));
            let version = this.version;
            members
                .add(Member::list("folders", &this.folders).info("Folders to scan"))
                .add(Member::property("skin", &this.skin).group("UI"))
                .add(
                    Member::field("scan depth", move || *get.scan_depth.read(), move |v| *set.scan_depth.write() = v)
                        .constraint(Range { min: 1, max: 16 })
                        .editable(EditMode::App),
                )
                .add(Member::read_only_field("version", move || version.to_string()));
        }
    }

    #[test]
    fn test_discover_builds_one_config_per_member() {
        // Arrange
        let library = Library::new();

        // Act
        let configurable = discover(&library).unwrap();

        // Assert
        let keys: Vec<String> = configurable.configs().iter().map(|c| c.key()).collect();
        assert_eq!(
            keys,
            vec!["library.folders", "ui.skin", "library.scan_depth", "library.version"]
        );
        assert!(configurable.owner().ends_with("Library"));
    }

    #[test]
    fn test_discovered_edit_modes_follow_writability() {
        let configurable = discover(&Library::new()).unwrap();

        assert_eq!(configurable.config("folders").unwrap().edit_mode(), EditMode::User);
        assert_eq!(configurable.config("scan depth").unwrap().edit_mode(), EditMode::App);
        assert_eq!(configurable.config("version").unwrap().edit_mode(), EditMode::Never);
    }

    #[test]
    fn test_discovered_config_writes_through_to_instance() {
        // Arrange
        let library = Library::new();
        let configurable = discover(&library).unwrap();
        let converters = Converters::new();

        // Act
        configurable
            .config("folders")
            .unwrap()
            .set_value_from_string(&converters, "/a;/b")
            .unwrap();
        configurable
            .config("scan depth")
            .unwrap()
            .set_value_from_string(&converters, "8")
            .unwrap();

        // Assert
        assert_eq!(library.folders.get(), vec!["/a".to_string(), "/b".to_string()]);
        assert_eq!(*library.scan_depth.read(), 8);
    }

    #[test]
    fn test_discovered_constraint_is_enforced() {
        let configurable = discover(&Library::new()).unwrap();
        let converters = Converters::new();

        let result = configurable
            .config("scan depth")
            .unwrap()
            .set_value_from_string(&converters, "99");

        assert!(result.is_err());
    }

    struct ReadOnlyButEditable;

    impl Discoverable for ReadOnlyButEditable {
        const GROUP: &'static str = "bad";

        fn declare(_this: &Arc<Self>, members: &mut Members) {
            members.add(Member::read_only_field("id", || 1u8).editable(EditMode::User));
        }
    }

    #[test]
    fn test_read_only_member_with_user_edit_mode_is_rejected() {
        let result = discover(&Arc::new(ReadOnlyButEditable));
        assert!(matches!(result, Err(DiscoveryError::ReadOnlyEditable { member, .. }) if member == "id"));
    }

    struct WritableButNever(RwLock<u8>);

    impl Discoverable for WritableButNever {
        const GROUP: &'static str = "bad";

        fn declare(this: &Arc<Self>, members: &mut Members) {
            let (get, set) = (Arc::clone(this), Arc::clone(this));
            members.add(Member::field("n", move || *get.0.read(), move |v| *set.0.write() = v).editable(EditMode::Never));
        }
    }

    #[test]
    fn test_writable_member_with_never_edit_mode_is_rejected() {
        let result = discover(&Arc::new(WritableButNever(RwLock::new(0))));
        assert!(matches!(result, Err(DiscoveryError::WritableNeverEditable { .. })));
    }

    struct MismatchedConstraint(Arc<Property<String>>);

    impl Discoverable for MismatchedConstraint {
        const GROUP: &'static str = "bad";

        fn declare(this: &Arc<Self>, members: &mut Members) {
            members.add(Member::property("name", &this.0).constraint_ref(ConstraintRef::new::<u32>("max", Max(3u32))));
        }
    }

    #[test]
    fn test_constraint_for_other_type_is_rejected() {
        let result = discover(&Arc::new(MismatchedConstraint(Property::new(String::new()))));

        match result {
            Err(DiscoveryError::ConstraintTypeMismatch { expected, actual, .. }) => {
                assert_eq!(expected, "u32");
                assert!(actual.contains("String"));
            }
            other => panic!("unexpected {:?}", other.map(|c| c.len())),
        }
    }

    struct Duplicated;

    impl Discoverable for Duplicated {
        const GROUP: &'static str = "dup";

        fn declare(_this: &Arc<Self>, members: &mut Members) {
            members
                .add(Member::read_only_field("Same Name", || 1u8))
                .add(Member::read_only_field("same_name", || 2u8));
        }
    }

    #[test]
    fn test_members_mapping_to_same_key_are_rejected() {
        let result = discover(&Arc::new(Duplicated));
        assert!(matches!(result, Err(DiscoveryError::DuplicateMember { .. })));
    }

    static VERBOSE: AtomicBool = AtomicBool::new(false);

    struct Logging;

    impl DiscoverableStatic for Logging {
        const GROUP: &'static str = "Logging";

        fn declare(members: &mut Members) {
            members.add(Member::field(
                "verbose",
                || VERBOSE.load(Ordering::SeqCst),
                |v| VERBOSE.store(v, Ordering::SeqCst),
            ));
        }
    }

    #[test]
    fn test_discover_static_binds_process_wide_state() {
        let configurable = discover_static::<Logging>().unwrap();
        let converters = Converters::new();

        configurable
            .config("verbose")
            .unwrap()
            .set_value_from_string(&converters, "true")
            .unwrap();

        assert!(VERBOSE.load(Ordering::SeqCst));
    }
}
