//! The bundle graph of the atlaspack bundler
//!
//! After bundling, assets and dependencies from the asset graph are placed into
//! bundles and bundle groups. This crate holds that graph, answers the queries
//! packagers and runtimes ask of it, follows re-export chains to the asset
//! defining a symbol, and defines the runtime plugin interface.
pub mod bundle_graph;
pub mod error;
pub mod graph;
pub mod plugin;
pub mod public;
pub mod types;

pub use bundle_graph::BundleGraph;
pub use error::BundleGraphError;
