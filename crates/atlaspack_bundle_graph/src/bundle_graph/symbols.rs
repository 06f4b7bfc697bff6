use std::collections::HashSet;
use std::sync::Arc;

use tracing::instrument;

use super::bundle_graph::BundleGraph;
use crate::types::{Asset, AssetId, STAR_SYMBOL};

/// What a symbol resolved to in its defining asset
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ResolvedSymbol {
  /// The symbol is defined by the asset under this local identifier
  Local(String),
  /// The symbol could not be traced statically and must be read off the
  /// asset's namespace object at runtime
  Dynamic,
}

/// The result of following an export through re-export chains
#[derive(Clone, Debug, PartialEq)]
pub struct SymbolResolution {
  /// The asset the chain ended at
  pub asset: Arc<Asset>,
  /// The exported name in `asset`
  pub export_symbol: String,
  pub symbol: ResolvedSymbol,
}

impl SymbolResolution {
  fn dynamic(asset: &Arc<Asset>, export_symbol: &str) -> Self {
    SymbolResolution {
      asset: Arc::clone(asset),
      export_symbol: export_symbol.to_string(),
      symbol: ResolvedSymbol::Dynamic,
    }
  }

  pub fn is_dynamic(&self) -> bool {
    self.symbol == ResolvedSymbol::Dynamic
  }
}

impl BundleGraph {
  /// Follows `symbol` through the export tables of `asset` and the assets it
  /// re-exports from, to the asset that defines it
  ///
  /// Wildcard re-exports are tried in declaration order. When the symbol
  /// cannot be traced, or the chain revisits an (asset, symbol) pair, the
  /// result is [`ResolvedSymbol::Dynamic`] at the last asset reached.
  #[instrument(level = "trace", skip_all, fields(asset = %asset.id, symbol = %symbol))]
  pub fn resolve_symbol(&self, asset: &Asset, symbol: &str) -> SymbolResolution {
    let mut visited = HashSet::new();
    self.resolve_symbol_from(self.expect_asset(&asset.id), symbol, &mut visited)
  }

  fn resolve_symbol_from(
    &self,
    asset: &Arc<Asset>,
    symbol: &str,
    visited: &mut HashSet<(AssetId, String)>,
  ) -> SymbolResolution {
    let mut asset: &Arc<Asset> = asset;
    let mut symbol: &str = symbol;

    // Named re-export chains are followed in a loop, only wildcard re-exports recurse
    loop {
      if symbol == STAR_SYMBOL {
        return SymbolResolution::dynamic(asset, symbol);
      }

      if !visited.insert((asset.id.clone(), symbol.to_string())) {
        tracing::debug!(asset = %asset.id, symbol, "Re-export cycle, falling back to namespace lookup");
        return SymbolResolution::dynamic(asset, symbol);
      }

      let Some(export) = asset.export(symbol) else {
        break;
      };

      if export.asset == asset.id {
        return SymbolResolution {
          asset: Arc::clone(asset),
          export_symbol: symbol.to_string(),
          symbol: ResolvedSymbol::Local(export.local.clone()),
        };
      }

      asset = self.expect_asset(&export.asset);
      symbol = &export.export_symbol;
    }

    // `export *` never forwards a default export
    if symbol != "default" {
      for dependency in self.get_dependencies(asset) {
        if !dependency.is_wildcard_reexport() {
          continue;
        }

        let Some(resolved) = self.get_dependency_resolution(dependency) else {
          continue;
        };

        let result = self.resolve_symbol_from(resolved, symbol, visited);
        if !result.is_dynamic() {
          return result;
        }
      }
    }

    tracing::debug!(asset = %asset.id, symbol, "Unresolved symbol, falling back to namespace lookup");
    SymbolResolution::dynamic(asset, symbol)
  }

  /// Resolves every symbol `asset` exports, including names it forwards
  /// through wildcard re-exports
  ///
  /// Direct exports come first in declaration order, then wildcard exports in
  /// the order their dependencies were declared.
  #[instrument(level = "trace", skip_all, fields(asset = %asset.id))]
  pub fn get_exported_symbols(&self, asset: &Asset) -> Vec<SymbolResolution> {
    let asset = self.expect_asset(&asset.id);
    let mut resolutions: Vec<SymbolResolution> = asset
      .symbols
      .keys()
      .map(|name| self.resolve_symbol(asset, name))
      .collect();

    let mut names: HashSet<&str> = asset.symbols.keys().map(String::as_str).collect();
    let mut visited_assets = HashSet::from([asset.id.as_str()]);
    self.collect_wildcard_exports(asset, &mut names, &mut visited_assets, &mut resolutions);

    resolutions
  }

  fn collect_wildcard_exports<'g>(
    &'g self,
    asset: &'g Asset,
    names: &mut HashSet<&'g str>,
    visited_assets: &mut HashSet<&'g str>,
    resolutions: &mut Vec<SymbolResolution>,
  ) {
    for dependency in self.get_dependencies(asset) {
      if !dependency.is_wildcard_reexport() {
        continue;
      }

      let Some(resolved) = self.get_dependency_resolution(dependency) else {
        continue;
      };

      if !visited_assets.insert(resolved.id.as_str()) {
        continue;
      }

      for name in resolved.symbols.keys() {
        if name == "default" || !names.insert(name.as_str()) {
          continue;
        }

        resolutions.push(self.resolve_symbol(resolved, name));
      }

      self.collect_wildcard_exports(resolved, names, visited_assets, resolutions);
    }
  }
}
