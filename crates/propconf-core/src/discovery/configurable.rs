//! Sources of configs.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::AnyConfig;

/// Anything that exposes a set of configs.
#[cfg_attr(test, mockall::automock)]
pub trait Configurable: Send + Sync {
    /// The configs, in declaration order.
    fn configs(&self) -> Vec<Arc<dyn AnyConfig>>;

    /// The first config named `name`.
    fn config(&self, name: &str) -> Option<Arc<dyn AnyConfig>> {
        self.configs().into_iter().find(|c| c.name() == name)
    }
}

/// The configs discovered on one declaring type.
pub struct DeclaredConfigurable {
    owner: &'static str,
    configs: Vec<Arc<dyn AnyConfig>>,
}

impl DeclaredConfigurable {
    pub(crate) fn new(owner: &'static str, configs: Vec<Arc<dyn AnyConfig>>) -> Self {
        Self { owner, configs }
    }

    /// Name of the declaring type.
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

impl Configurable for DeclaredConfigurable {
    fn configs(&self) -> Vec<Arc<dyn AnyConfig>> {
        self.configs.clone()
    }
}

/// A hand-assembled, growable list of configs.
#[derive(Default)]
pub struct ListConfigurable {
    configs: RwLock<Vec<Arc<dyn AnyConfig>>>,
}

impl ListConfigurable {
    pub fn new(configs: Vec<Arc<dyn AnyConfig>>) -> Self {
        Self {
            configs: RwLock::new(configs),
        }
    }

    pub fn push(&self, config: Arc<dyn AnyConfig>) {
        self.configs.write().push(config);
    }
}

impl Configurable for ListConfigurable {
    fn configs(&self) -> Vec<Arc<dyn AnyConfig>> {
        self.configs.read().clone()
    }
}

/// Several configurables presented as one.
#[derive(Default)]
pub struct CompositeConfigurable {
    parts: Vec<Arc<dyn Configurable>>,
}

impl CompositeConfigurable {
    pub fn new(parts: Vec<Arc<dyn Configurable>>) -> Self {
        Self { parts }
    }

    pub fn with(mut self, part: Arc<dyn Configurable>) -> Self {
        self.parts.push(part);
        self
    }
}

impl Configurable for CompositeConfigurable {
    fn configs(&self) -> Vec<Arc<dyn AnyConfig>> {
        self.parts.iter().flat_map(|part| part.configs()).collect()
    }

    fn config(&self, name: &str) -> Option<Arc<dyn AnyConfig>> {
        self.parts.iter().find_map(|part| part.config(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValueConfig;

    fn config(name: &str) -> Arc<dyn AnyConfig> {
        Arc::new(ValueConfig::new(name, 0u8).group("g").build())
    }

    #[test]
    fn test_list_configurable_lookup_by_name() {
        let list = ListConfigurable::new(vec![config("a")]);
        list.push(config("b"));

        assert_eq!(list.configs().len(), 2);
        assert!(list.config("b").is_some());
        assert!(list.config("c").is_none());
    }

    #[test]
    fn test_composite_flattens_parts_in_order() {
        // Arrange
        let mut mock = MockConfigurable::new();
        mock.expect_configs().returning(|| vec![config("m")]);
        mock.expect_config().returning(|_| None);
        let composite = CompositeConfigurable::new(vec![Arc::new(ListConfigurable::new(vec![config("a")]))])
            .with(Arc::new(mock));

        // Act
        let names: Vec<String> = composite.configs().iter().map(|c| c.name().to_string()).collect();

        // Assert
        assert_eq!(names, vec!["a", "m"]);
        assert!(composite.config("a").is_some());
        assert!(composite.config("zzz").is_none());
    }
}
