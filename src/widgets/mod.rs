//! Named live-widget lifecycle management.

pub mod registry;

pub use registry::WidgetRegistry;
