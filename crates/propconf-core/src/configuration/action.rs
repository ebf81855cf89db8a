//! Named, runnable actions exposed next to configs.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::AnyConfig;

/// A user-invocable action such as "toggle shuffle".
#[derive(Clone)]
pub struct Action {
    key: String,
    name: String,
    group: String,
    info: String,
    run: Arc<dyn Fn() + Send + Sync>,
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Action").field("key", &self.key).field("name", &self.name).finish()
    }
}

impl Action {
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        group: impl Into<String>,
        info: impl Into<String>,
        run: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            group: group.into(),
            info: info.into(),
            run: Arc::new(run),
        }
    }

    /// A toggle for a user-editable boolean config, or `None` for any other
    /// config.
    pub(crate) fn toggle(config: &Arc<dyn AnyConfig>) -> Option<Self> {
        if config.downcast_ref::<bool>().is_none() || !config.edit_mode().is_by_user() {
            return None;
        }
        let target = Arc::clone(config);
        Some(Self::new(
            config.key(),
            format!("Toggle {}", config.name()),
            config.group(),
            config.info(),
            move || flip(&target),
        ))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn info(&self) -> &str {
        &self.info
    }

    pub fn run(&self) {
        (self.run)();
    }
}

fn flip(config: &Arc<dyn AnyConfig>) {
    let Some(typed) = config.downcast_ref::<bool>() else {
        return;
    };
    let next = !typed.value();
    match typed.set_and_apply(next) {
        Ok(()) => debug!("{} toggled to {next}", typed.key()),
        Err(e) => warn!("cannot toggle {}: {e}", typed.key()),
    }
}
