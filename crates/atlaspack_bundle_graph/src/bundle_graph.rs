pub mod bundle_graph;
mod queries;
pub mod serialize;
mod symbols;
pub mod types;

pub use bundle_graph::BundleGraph;
pub use symbols::{ResolvedSymbol, SymbolResolution};
pub use types::{BundleGraphEdgeType, BundleGraphNode};
