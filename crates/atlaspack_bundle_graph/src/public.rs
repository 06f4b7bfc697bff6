//! Read-only views handed to plugins
//!
//! Views are cached per options identity and wrapped value, so asking for the
//! same asset, dependency or bundle twice under the same options returns the
//! same `Arc`.
pub use asset::AssetView;
pub use bundle::BundleView;
pub use bundle_graph::{BundleGraphView, SymbolResolutionView};
pub use dependency::DependencyView;
pub use view_cache::ViewCache;

mod asset;
mod bundle;
mod bundle_graph;
mod dependency;
mod view_cache;
