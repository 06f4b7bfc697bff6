use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use serde_repr::Deserialize_repr;
use serde_repr::Serialize_repr;

use super::asset::AssetId;
use super::environment::Environment;
use super::file_type::FileType;
use super::target::Target;

#[derive(Clone, Copy, Debug, Deserialize_repr, Eq, Hash, PartialEq, Serialize_repr)]
#[repr(u8)]
pub enum BundleBehavior {
  /// Inline bundles are embedded into their parent instead of written to a separate file
  Inline = 0,
  /// Isolated bundles do not share assets with their parent and are referenced by URL
  Isolated = 1,
}

pub type MaybeBundleBehavior = Option<BundleBehavior>;

/// An output unit grouping a reachable set of assets
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
  pub id: String,

  /// A shortened version of the id, used in public urls and registries
  #[serde(default)]
  pub public_id: Option<String>,

  #[serde(default)]
  pub bundle_behavior: MaybeBundleBehavior,

  #[serde(rename = "type")]
  pub bundle_type: FileType,

  /// The assets that are executed when the bundle loads, in order
  #[serde(default)]
  pub entry_asset_ids: Vec<AssetId>,

  pub env: Arc<Environment>,

  #[serde(default)]
  pub main_entry_id: Option<AssetId>,

  /// The file name of the bundle, relative to the target's dist dir
  ///
  /// Bundles are named before runtimes are applied.
  #[serde(default)]
  pub name: Option<String>,

  pub target: Target,
}

impl Bundle {
  pub fn is_inline(&self) -> bool {
    self.bundle_behavior == Some(BundleBehavior::Inline)
  }

  /// The output path of a named bundle
  pub fn file_path(&self) -> Option<PathBuf> {
    self
      .name
      .as_ref()
      .map(|name| self.target.dist_dir.join(name))
  }
}

/// Bundles that must load together to satisfy one split point
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleGroup {
  pub entry_asset_id: AssetId,
  pub target: Target,
}

impl BundleGroup {
  pub fn new(entry_asset_id: impl Into<AssetId>, target: Target) -> Self {
    BundleGroup {
      entry_asset_id: entry_asset_id.into(),
      target,
    }
  }

  pub fn id(&self) -> String {
    format!("bundle_group:{}{}", self.target.name, self.entry_asset_id)
  }
}
