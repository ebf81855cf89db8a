//! Member declarations: the description of one config before it is built.

use std::collections::HashSet;
use std::sync::Arc;

use super::DiscoveryError;
use crate::config::typed::Applier;
use crate::config::{
    config_key, AnyConfig, Backing, Config, Constraint, ConstraintRef, EditMode, FieldBacking, ListProperty, Property,
    ReadOnlyProperty,
};
use crate::convert::Convertible;

/// Declaration of one configurable member.
///
/// Writable members default to [`EditMode::User`], read-only ones to
/// [`EditMode::Never`].  Declaring a read-only member as editable, or a
/// writable field as never editable, is a [`DiscoveryError`].
pub struct Member<T: Convertible> {
    name: String,
    group: Option<String>,
    info: String,
    edit_mode: Option<EditMode>,
    backing: Arc<dyn Backing<T>>,
    constraints: Vec<Arc<dyn Constraint<T>>>,
    constraint_refs: Vec<ConstraintRef>,
    applier: Option<Applier<T>>,
}

impl<T: Convertible> Member<T> {
    fn with_backing(name: impl Into<String>, backing: Arc<dyn Backing<T>>) -> Self {
        Self {
            name: name.into(),
            group: None,
            info: String::new(),
            edit_mode: None,
            backing,
            constraints: Vec::new(),
            constraint_refs: Vec::new(),
            applier: None,
        }
    }

    /// A plain field read and written through the given closures.
    pub fn field(
        name: impl Into<String>,
        get: impl Fn() -> T + Send + Sync + 'static,
        set: impl Fn(T) + Send + Sync + 'static,
    ) -> Self {
        Self::with_backing(name, Arc::new(FieldBacking::new(get, set)))
    }

    /// A field that can be read but not written.
    pub fn read_only_field(name: impl Into<String>, get: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self::with_backing(name, Arc::new(FieldBacking::read_only(get)))
    }

    /// Any other backing.
    pub fn backed_by(name: impl Into<String>, backing: Arc<dyn Backing<T>>) -> Self {
        Self::with_backing(name, backing)
    }

    /// Overrides the declaring type's default group.
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Description shown to users and written as a comment in files.
    pub fn info(mut self, info: impl Into<String>) -> Self {
        self.info = info.into();
        self
    }

    pub fn editable(mut self, edit_mode: EditMode) -> Self {
        self.edit_mode = Some(edit_mode);
        self
    }

    pub fn constraint(mut self, constraint: impl Constraint<T> + 'static) -> Self {
        self.constraints.push(Arc::new(constraint));
        self
    }

    /// A type-erased constraint.  Its target type is checked when the
    /// member is built.
    pub fn constraint_ref(mut self, constraint: ConstraintRef) -> Self {
        self.constraint_refs.push(constraint);
        self
    }

    pub fn on_apply(mut self, applier: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.applier = Some(Arc::new(applier));
        self
    }
}

impl<T: Convertible + PartialEq> Member<T> {
    pub fn property(name: impl Into<String>, property: &Arc<Property<T>>) -> Self {
        Self::with_backing(name, Arc::new(Arc::clone(property)))
    }

    pub fn read_only_property(name: impl Into<String>, property: ReadOnlyProperty<T>) -> Self {
        Self::with_backing(name, Arc::new(property))
    }
}

impl<E: Convertible + PartialEq> Member<Vec<E>> {
    pub fn list(name: impl Into<String>, list: &Arc<ListProperty<E>>) -> Self {
        Self::with_backing(name, Arc::new(Arc::clone(list)))
    }
}

// ── Erased declarations ───────────────────────────────────────────────────────

pub(crate) trait MemberDecl: Send + Sync {
    fn name(&self) -> &str;
    fn group_override(&self) -> Option<&str>;
    fn build(self: Box<Self>, owner: &'static str, group: String) -> Result<Arc<dyn AnyConfig>, DiscoveryError>;
}

impl<T: Convertible> MemberDecl for Member<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn group_override(&self) -> Option<&str> {
        self.group.as_deref()
    }

    fn build(self: Box<Self>, owner: &'static str, group: String) -> Result<Arc<dyn AnyConfig>, DiscoveryError> {
        let member = *self;
        let writable = member.backing.is_writable();
        let edit_mode = member
            .edit_mode
            .unwrap_or(if writable { EditMode::User } else { EditMode::Never });

        if !writable && edit_mode != EditMode::Never {
            return Err(DiscoveryError::ReadOnlyEditable {
                owner,
                member: member.name,
                edit_mode,
            });
        }
        if writable && edit_mode == EditMode::Never {
            return Err(DiscoveryError::WritableNeverEditable {
                owner,
                member: member.name,
            });
        }

        let mut constraints = member.constraints;
        for erased in &member.constraint_refs {
            let bound = erased.bind::<T>().ok_or_else(|| DiscoveryError::ConstraintTypeMismatch {
                owner,
                member: member.name.clone(),
                constraint: erased.name().to_string(),
                expected: erased.target_name(),
                actual: T::type_name(),
            })?;
            constraints.push(bound);
        }

        Ok(Arc::new(Config::from_parts(
            member.name,
            group,
            member.info,
            edit_mode,
            member.backing,
            constraints,
            member.applier,
        )))
    }
}

/// Collects member declarations for one declaring type.
pub struct Members {
    owner: &'static str,
    group: String,
    decls: Vec<Box<dyn MemberDecl>>,
}

impl Members {
    pub(crate) fn new(owner: &'static str, group: &str) -> Self {
        Self {
            owner,
            group: group.to_string(),
            decls: Vec::new(),
        }
    }

    /// Adds a member.
    pub fn add<T: Convertible>(&mut self, member: Member<T>) -> &mut Self {
        self.decls.push(Box::new(member));
        self
    }

    /// Builds every declared member into a config.
    pub(crate) fn build(self) -> Result<Vec<Arc<dyn AnyConfig>>, DiscoveryError> {
        let mut seen = HashSet::new();
        let mut configs = Vec::with_capacity(self.decls.len());

        for decl in self.decls {
            if decl.name().trim().is_empty() {
                return Err(DiscoveryError::EmptyName { owner: self.owner });
            }
            let group = decl.group_override().unwrap_or(self.group.as_str()).to_string();
            if !seen.insert(config_key(&group, decl.name())) {
                return Err(DiscoveryError::DuplicateMember {
                    owner: self.owner,
                    group,
                    member: decl.name().to_string(),
                });
            }
            configs.push(decl.build(self.owner, group)?);
        }

        Ok(configs)
    }
}
