use serde::Deserialize;
use serde::Serialize;

use super::AssetId;

/// The name used for namespace and wildcard symbols
pub const STAR_SYMBOL: &str = "*";

/// A symbol imported or re-exported through a dependency
///
/// A dependency carrying `*` as both its local and exported name is a wildcard
/// re-export (`export * from './x'`).
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Symbol {
  /// The name of the symbol in the importing asset
  pub local: String,

  /// The name the symbol is exported under by the imported asset
  pub exported: String,

  /// Weak symbols are only re-exported, not used by the importing asset
  #[serde(default)]
  pub is_weak: bool,
}

impl Symbol {
  pub fn is_wildcard(&self) -> bool {
    self.local == STAR_SYMBOL && self.exported == STAR_SYMBOL
  }
}

/// An entry in an asset's export table
///
/// When `asset` is the exporting asset itself the symbol is defined locally
/// under the identifier `local`. Otherwise the entry is a re-export of
/// `export_symbol` from `asset`.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSymbol {
  pub asset: AssetId,
  pub export_symbol: String,
  #[serde(default)]
  pub local: String,
}

impl ExportSymbol {
  pub fn local(asset: impl Into<AssetId>, local: impl Into<String>) -> Self {
    let local = local.into();
    ExportSymbol {
      asset: asset.into(),
      export_symbol: local.clone(),
      local,
    }
  }

  pub fn reexport(asset: impl Into<AssetId>, export_symbol: impl Into<String>) -> Self {
    ExportSymbol {
      asset: asset.into(),
      export_symbol: export_symbol.into(),
      local: String::new(),
    }
  }
}
