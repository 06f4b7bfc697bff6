use thiserror::Error;

/// Defects in a bundle graph handed over by the bundler
///
/// These are upstream bugs rather than user errors, so they abort the build.
#[derive(Debug, Error)]
pub enum BundleGraphError {
  #[error("Node {id} referenced by an edge does not exist in the bundle graph")]
  MissingNode { id: String },

  #[error("Unknown bundle graph edge type {0}")]
  UnknownEdgeType(u8),

  #[error(
    "Entry asset {entry_asset_id} of bundle group {bundle_group_id} is contained by {count} of its bundles, expected exactly one"
  )]
  InvalidBundleGroupEntry {
    bundle_group_id: String,
    entry_asset_id: String,
    count: usize,
  },

  #[error("Bundle {bundle_id} has not been named")]
  UnnamedBundle { bundle_id: String },

  #[error("Failed to parse serialized bundle graph: {0}")]
  Serialization(#[from] serde_json::Error),
}
