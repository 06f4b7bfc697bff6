use serde::Deserialize;
use serde::Serialize;
use serde_repr::Deserialize_repr;
use serde_repr::Serialize_repr;

use super::asset::AssetId;
use super::json::JSONObject;
use super::symbol::Symbol;

/// A dependency denotes a connection between two assets
#[derive(PartialEq, Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
  pub id: String,

  /// Plugin-specific metadata for the dependency
  ///
  /// For example, `webworker: true` marks a dependency created by `new Worker(...)`.
  #[serde(default)]
  pub meta: JSONObject,

  /// Determines when the dependency should be loaded
  #[serde(default)]
  pub priority: Priority,

  /// The id of the asset with this dependency
  ///
  /// Entry dependencies have no source asset.
  #[serde(default)]
  pub source_asset_id: Option<AssetId>,

  /// The import or export specifier that connects two assets together
  pub specifier: String,

  /// How the specifier should be interpreted
  #[serde(default)]
  pub specifier_type: SpecifierType,

  /// Symbols imported or re-exported through this dependency, in declaration order
  #[serde(default)]
  pub symbols: Vec<Symbol>,
}

impl Dependency {
  pub fn is_async(&self) -> bool {
    self.priority == Priority::Lazy
  }

  /// URL dependencies must resolve to something that evaluates to a URL at runtime
  pub fn is_url(&self) -> bool {
    self.specifier_type == SpecifierType::Url
  }

  pub fn is_webworker(&self) -> bool {
    self
      .meta
      .get("webworker")
      .is_some_and(|value| value.as_bool() == Some(true))
  }

  /// Whether this dependency is an `export * from` re-export
  pub fn is_wildcard_reexport(&self) -> bool {
    self.symbols.iter().any(Symbol::is_wildcard)
  }
}

/// Determines when a dependency should load
#[derive(Clone, Copy, Debug, Default, Deserialize_repr, Eq, Hash, PartialEq, Serialize_repr)]
#[repr(u32)]
pub enum Priority {
  /// Resolves the dependency synchronously, placing the resolved asset in the same bundle as the parent or another bundle that is already on the page
  #[default]
  Sync = 0,
  /// Places the dependency in a separate bundle loaded in parallel with the current bundle
  Parallel = 1,
  /// The dependency should be placed in a separate bundle that is loaded later
  Lazy = 2,
}

/// The type of the import specifier
#[derive(Clone, Copy, Debug, Default, Deserialize_repr, Eq, Hash, PartialEq, Serialize_repr)]
#[repr(u8)]
pub enum SpecifierType {
  /// An ES Module specifier
  #[default]
  Esm = 0,

  /// A CommonJS specifier
  CommonJS = 1,

  /// A URL that works as in a browser
  ///
  /// Bare specifiers are treated as relative URLs.
  Url = 2,

  /// A custom specifier that must be handled by a custom resolver plugin
  Custom = 3,
}
