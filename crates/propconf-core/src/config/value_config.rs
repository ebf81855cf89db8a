//! Configs that are not attached to any object.

use std::sync::Arc;

use super::constraint::Constraint;
use super::edit_mode::EditMode;
use super::typed::{Applier, Config, ValueBacking};
use crate::convert::Convertible;

/// Builder for a free-standing value/applier pair.
///
/// # Examples
///
/// ```rust
/// use propconf_core::config::{EditMode, ValueConfig};
///
/// let threads = ValueConfig::new("worker threads", 4usize)
///     .group("engine")
///     .info("Decoder threads")
///     .editable(EditMode::App)
///     .on_apply(|n| println!("resizing pool to {n}"))
///     .build();
///
/// assert_eq!(threads.key(), "engine.worker_threads");
/// assert_eq!(threads.value(), 4);
/// ```
pub struct ValueConfig<T: Convertible> {
    name: String,
    group: String,
    info: String,
    edit_mode: EditMode,
    value: T,
    constraints: Vec<Arc<dyn Constraint<T>>>,
    applier: Option<Applier<T>>,
}

impl<T: Convertible> ValueConfig<T> {
    /// Starts a builder with `value` as both current and default value.
    pub fn new(name: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            group: String::new(),
            info: String::new(),
            edit_mode: EditMode::User,
            value,
            constraints: Vec::new(),
            applier: None,
        }
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn info(mut self, info: impl Into<String>) -> Self {
        self.info = info.into();
        self
    }

    pub fn editable(mut self, edit_mode: EditMode) -> Self {
        self.edit_mode = edit_mode;
        self
    }

    pub fn constraint(mut self, constraint: impl Constraint<T> + 'static) -> Self {
        self.constraints.push(Arc::new(constraint));
        self
    }

    pub fn on_apply(mut self, applier: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.applier = Some(Arc::new(applier));
        self
    }

    pub fn build(self) -> Config<T> {
        Config::from_parts(
            self.name,
            self.group,
            self.info,
            self.edit_mode,
            Arc::new(ValueBacking::new(self.value)),
            self.constraints,
            self.applier,
        )
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;
    use crate::config::constraint::Min;

    #[test]
    fn test_value_config_holds_its_own_value() {
        let config = ValueConfig::new("retries", 3u8).group("net").build();

        config.set_value(5).unwrap();

        assert_eq!(config.value(), 5);
        assert_eq!(*config.default_value(), 3);
        assert_eq!(config.edit_mode(), EditMode::User);
    }

    #[test]
    fn test_value_config_applier_and_constraint() {
        // Arrange
        let applied = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&applied);
        let config = ValueConfig::new("threads", 2u32)
            .constraint(Min(1u32))
            .on_apply(move |n| sink.lock().push(*n))
            .build();

        // Act
        let rejected = config.set_and_apply(0);
        config.set_and_apply(8).unwrap();

        // Assert
        assert!(rejected.is_err());
        assert_eq!(*applied.lock(), vec![8]);
    }
}
