use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

/// A target is a named output location for a set of bundles
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
  /// The output folder for compiled bundles
  pub dist_dir: PathBuf,

  /// The name of the target
  pub name: String,

  /// The base URL bundles are served from at runtime
  #[serde(default = "default_public_url")]
  pub public_url: String,
}

fn default_public_url() -> String {
  String::from("/")
}
