use std::path::PathBuf;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;

use super::bundle::MaybeBundleBehavior;
use super::environment::Environment;
use super::file_type::FileType;
use super::json::JSONObject;
use super::symbol::ExportSymbol;
use super::BundleBehavior;

pub type AssetId = String;

/// An asset is a compiled unit of source, such as a single JavaScript module
///
/// Assets are produced by transformers before bundling and are read-only from
/// the bundle graph's point of view.
#[derive(Default, PartialEq, Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
  /// Stable identity of the asset for the whole build
  pub id: AssetId,

  /// Controls which bundle the asset is placed into
  #[serde(default)]
  pub bundle_behavior: MaybeBundleBehavior,

  /// The environment of the asset
  #[serde(default)]
  pub env: Arc<Environment>,

  /// The file path to the asset
  pub file_path: PathBuf,

  /// The file type of the asset, which may change during transformation
  #[serde(rename = "type")]
  pub file_type: FileType,

  /// Plugin specific metadata for the asset
  #[serde(default)]
  pub meta: JSONObject,

  /// The export table, keyed by exported name, in declaration order
  #[serde(default)]
  pub symbols: IndexMap<String, ExportSymbol>,
}

impl Asset {
  pub fn is_inline(&self) -> bool {
    self.bundle_behavior == Some(BundleBehavior::Inline)
  }

  /// Isolated assets are referenced by URL and never share a bundle with their parent
  pub fn is_isolated(&self) -> bool {
    self.bundle_behavior == Some(BundleBehavior::Isolated)
  }

  /// Looks up an entry in the export table
  pub fn export(&self, exported: &str) -> Option<&ExportSymbol> {
    self.symbols.get(exported)
  }
}
