use crate::traits::Result;
use serde_json::Value;

/// A live visual instance bound to a render target
///
/// Renderables are exclusively owned by the `WidgetRegistry` that created
/// them; callers must not retain references across an upsert replacement.
pub trait Renderable: Send + 'static {
    /// Push new data into the renderable without reconstructing it
    fn update(&mut self, data: Value) -> Result<()>;

    /// Release the resources held by this renderable.
    ///
    /// Called exactly once, before the registry forgets or replaces it.
    fn destroy(&mut self);
}

/// Boundary to the rendering library: target resolution and construction
///
/// The registry makes no assumptions beyond this capability set, so the
/// backend can be a real rendering surface or a recording test double.
pub trait RenderBackend: Send + 'static {
    /// A resolved rendering target
    type Target;
    /// The renderable type this backend constructs
    type Renderable: Renderable;

    /// Resolve a named render target, or `None` if it does not exist
    fn resolve(&self, target: &str) -> Option<Self::Target>;

    /// Construct a renderable bound to `target` using `config`
    fn create(&self, target: &Self::Target, config: &Value) -> Result<Self::Renderable>;
}
