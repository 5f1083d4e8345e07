use crate::traits::{LiveboardError, RenderBackend, Renderable, Result};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Lifecycle manager for named live widgets
///
/// Holds at most one live renderable per key. Replacing a key always
/// destroys the stale renderable before the replacement is constructed;
/// renderables are never partially reused across configurations. The
/// registry is purely a rendering-state container and never initiates
/// network activity.
///
/// # Type Parameters
/// - `B`: RenderBackend implementation (rendering library boundary)
pub struct WidgetRegistry<B: RenderBackend> {
    backend: B,
    widgets: HashMap<String, B::Renderable>,
}

impl<B: RenderBackend> WidgetRegistry<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            widgets: HashMap::new(),
        }
    }

    /// Create or replace the widget for `key`.
    ///
    /// The target is resolved first; an unresolvable target leaves the
    /// registry unchanged. An existing renderable for `key` is destroyed
    /// before the replacement is constructed, so no two live renderables
    /// ever share a key.
    ///
    /// # Errors
    /// - `LiveboardError::Resolution` when `target` cannot be resolved
    /// - construction errors from the backend; the key is left empty
    ///   because the stale renderable was already destroyed
    pub fn upsert(&mut self, key: impl Into<String>, target: &str, config: &Value) -> Result<()> {
        let key = key.into();
        let resolved = self.backend.resolve(target).ok_or_else(|| {
            warn!(%key, %target, "render target not found");
            LiveboardError::Resolution(target.to_string())
        })?;

        if let Some(mut stale) = self.widgets.remove(&key) {
            debug!(%key, "destroying stale widget before replacement");
            stale.destroy();
        }

        let widget = self.backend.create(&resolved, config)?;
        self.widgets.insert(key, widget);
        Ok(())
    }

    /// Push new data into the widget for `key` without reconstructing it.
    ///
    /// No-op if the key is absent. Update failures are logged; the widget
    /// stays registered.
    pub fn update(&mut self, key: &str, data: Value) {
        match self.widgets.get_mut(key) {
            Some(widget) => {
                if let Err(e) = widget.update(data) {
                    warn!(%key, "widget update failed: {}", e);
                }
            }
            None => debug!(%key, "update for unknown widget ignored"),
        }
    }

    /// Destroy and forget the widget for `key`. No-op if absent.
    pub fn remove(&mut self, key: &str) {
        if let Some(mut widget) = self.widgets.remove(key) {
            debug!(%key, "widget removed");
            widget.destroy();
        }
    }

    /// Destroy all widgets. Used on full teardown.
    pub fn clear(&mut self) {
        for (key, mut widget) in self.widgets.drain() {
            debug!(%key, "widget destroyed on teardown");
            widget.destroy();
        }
    }

    /// Check if a widget exists for `key`
    pub fn contains(&self, key: &str) -> bool {
        self.widgets.contains_key(key)
    }

    /// Number of live widgets
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }
}

impl<B: RenderBackend> Drop for WidgetRegistry<B> {
    fn drop(&mut self) {
        self.clear();
    }
}
