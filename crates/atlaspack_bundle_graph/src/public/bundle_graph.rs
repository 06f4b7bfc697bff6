use std::fmt::Debug;
use std::sync::Arc;

use super::view_cache::address;
use super::{AssetView, BundleView, DependencyView, ViewCache};
use crate::bundle_graph::{BundleGraph, ResolvedSymbol, SymbolResolution};
use crate::graph::TraversalActions;
use crate::types::{Asset, AtlaspackOptions, Bundle, BundleGroup, Dependency, FileType, OptionsId};

/// [`SymbolResolution`] with the asset wrapped in a view
#[derive(Clone, Debug)]
pub struct SymbolResolutionView {
  pub asset: Arc<AssetView>,
  pub export_symbol: String,
  pub symbol: ResolvedSymbol,
}

/// The bundle graph as plugins see it
///
/// Every query is answered by the underlying [`BundleGraph`], with results
/// wrapped into views cached under the same options.
pub struct BundleGraphView {
  bundle_graph: Arc<BundleGraph>,
  options_id: OptionsId,
}

impl BundleGraphView {
  pub fn new(bundle_graph: &Arc<BundleGraph>, options: &AtlaspackOptions) -> Arc<Self> {
    Self::with_options_id(bundle_graph, options.id())
  }

  pub fn with_options_id(bundle_graph: &Arc<BundleGraph>, options_id: OptionsId) -> Arc<Self> {
    ViewCache::global().get_or_create(options_id, address(bundle_graph), || BundleGraphView {
      bundle_graph: Arc::clone(bundle_graph),
      options_id,
    })
  }

  pub fn inner(&self) -> &Arc<BundleGraph> {
    &self.bundle_graph
  }

  pub fn options_id(&self) -> OptionsId {
    self.options_id
  }

  fn asset_view(&self, asset: &Arc<Asset>) -> Arc<AssetView> {
    AssetView::new(asset, self.options_id)
  }

  fn bundle_view(&self, bundle: &Arc<Bundle>) -> Arc<BundleView> {
    BundleView::new(bundle, &self.bundle_graph, self.options_id)
  }

  fn bundle_views(&self, bundles: Vec<&Arc<Bundle>>) -> Vec<Arc<BundleView>> {
    bundles
      .into_iter()
      .map(|bundle| self.bundle_view(bundle))
      .collect()
  }

  fn dependency_views(&self, dependencies: Vec<&Arc<Dependency>>) -> Vec<Arc<DependencyView>> {
    dependencies
      .into_iter()
      .map(|dependency| DependencyView::new(dependency, self.options_id))
      .collect()
  }

  fn resolution_view(&self, resolution: SymbolResolution) -> SymbolResolutionView {
    SymbolResolutionView {
      asset: self.asset_view(&resolution.asset),
      export_symbol: resolution.export_symbol,
      symbol: resolution.symbol,
    }
  }

  pub fn get_bundle_by_id(&self, id: &str) -> Option<Arc<BundleView>> {
    self
      .bundle_graph
      .get_bundle_by_id(id)
      .map(|bundle| self.bundle_view(bundle))
  }

  pub fn get_dependency_resolution(&self, dependency: &DependencyView) -> Option<Arc<AssetView>> {
    self
      .bundle_graph
      .get_dependency_resolution(dependency)
      .map(|asset| self.asset_view(asset))
  }

  pub fn get_incoming_dependencies(&self, asset: &AssetView) -> Vec<Arc<DependencyView>> {
    self.dependency_views(self.bundle_graph.get_incoming_dependencies(asset))
  }

  pub fn get_dependencies(&self, asset: &AssetView) -> Vec<Arc<DependencyView>> {
    self.dependency_views(self.bundle_graph.get_dependencies(asset))
  }

  pub fn resolve_external_dependency(&self, dependency: &DependencyView) -> Option<Arc<BundleGroup>> {
    self
      .bundle_graph
      .resolve_external_dependency(dependency)
      .cloned()
  }

  pub fn get_external_dependencies(&self, bundle: &BundleView) -> Vec<Arc<DependencyView>> {
    self.dependency_views(self.bundle_graph.get_external_dependencies(bundle))
  }

  pub fn get_bundle_groups_containing_bundle(&self, bundle: &BundleView) -> Vec<Arc<BundleGroup>> {
    self
      .bundle_graph
      .get_bundle_groups_containing_bundle(bundle)
      .into_iter()
      .cloned()
      .collect()
  }

  pub fn get_bundles_in_bundle_group(&self, bundle_group: &BundleGroup) -> Vec<Arc<BundleView>> {
    self.bundle_views(self.bundle_graph.get_bundles_in_bundle_group(bundle_group))
  }

  pub fn get_sibling_bundles(&self, bundle: &BundleView) -> Vec<Arc<BundleView>> {
    self.bundle_views(self.bundle_graph.get_sibling_bundles(bundle))
  }

  pub fn get_child_bundles(&self, bundle: &BundleView) -> Vec<Arc<BundleView>> {
    self.bundle_views(self.bundle_graph.get_child_bundles(bundle))
  }

  pub fn get_parent_bundles(&self, bundle: &BundleView) -> Vec<Arc<BundleView>> {
    self.bundle_views(self.bundle_graph.get_parent_bundles(bundle))
  }

  pub fn get_bundles(&self) -> Vec<Arc<BundleView>> {
    self.bundle_views(self.bundle_graph.get_bundles())
  }

  pub fn find_bundles_with_asset(&self, asset: &AssetView) -> Vec<Arc<BundleView>> {
    self.bundle_views(self.bundle_graph.find_bundles_with_asset(asset))
  }

  pub fn is_asset_in_ancestor_bundles(&self, bundle: &BundleView, asset: &AssetView) -> bool {
    self.bundle_graph.is_asset_in_ancestor_bundles(bundle, asset)
  }

  pub fn is_asset_referenced(&self, asset: &AssetView) -> bool {
    self.bundle_graph.is_asset_referenced(asset)
  }

  pub fn is_asset_referenced_by_asset_type(&self, asset: &AssetView, file_type: &FileType) -> bool {
    self
      .bundle_graph
      .is_asset_referenced_by_asset_type(asset, file_type)
  }

  pub fn has_parent_bundle_of_type(&self, bundle: &BundleView, file_type: &FileType) -> bool {
    self
      .bundle_graph
      .has_parent_bundle_of_type(bundle, file_type)
  }

  pub fn resolve_symbol(&self, asset: &AssetView, symbol: &str) -> SymbolResolutionView {
    self.resolution_view(self.bundle_graph.resolve_symbol(asset, symbol))
  }

  pub fn get_exported_symbols(&self, asset: &AssetView) -> Vec<SymbolResolutionView> {
    self
      .bundle_graph
      .get_exported_symbols(asset)
      .into_iter()
      .map(|resolution| self.resolution_view(resolution))
      .collect()
  }

  /// Walks the bundle hierarchy, handing each bundle to `visit` as a view
  pub fn traverse_bundles<C, F>(&self, mut visit: F, start: Option<&BundleView>) -> Option<C>
  where
    C: Clone,
    F: FnMut(&Arc<BundleView>, Option<&C>, &mut TraversalActions) -> Option<C>,
  {
    self.bundle_graph.traverse_bundles(
      |bundle, context, actions| visit(&self.bundle_view(bundle), context, actions),
      start.map(|bundle| bundle.inner().as_ref()),
    )
  }
}

impl Debug for BundleGraphView {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("BundleGraphView")
      .field("options_id", &self.options_id)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;
  use crate::types::Target;

  fn bundle_graph() -> Arc<BundleGraph> {
    let mut bundle_graph = BundleGraph::new();
    bundle_graph.add_asset(Arc::new(Asset {
      id: "entry".into(),
      ..Asset::default()
    }));
    bundle_graph.add_asset(Arc::new(Asset {
      id: "lib".into(),
      ..Asset::default()
    }));
    bundle_graph.add_dependency(Arc::new(Dependency {
      id: "entry->lib".into(),
      source_asset_id: Some("entry".into()),
      specifier: "./lib".into(),
      ..Dependency::default()
    }));
    bundle_graph.add_edge("entry", "entry->lib", Default::default());
    bundle_graph.add_edge("entry->lib", "lib", Default::default());

    bundle_graph.add_bundle(Arc::new(Bundle {
      id: "main".into(),
      name: Some("main.js".into()),
      entry_asset_ids: vec!["entry".into()],
      main_entry_id: Some("entry".into()),
      ..Bundle::default()
    }));
    let group_id =
      bundle_graph.add_bundle_group(Arc::new(BundleGroup::new("entry", Target::default())));
    bundle_graph.add_bundle_group_loader(bundle_graph.root_id(), &group_id);
    bundle_graph.add_bundle_to_bundle_group(&group_id, "main");
    for id in ["entry", "entry->lib", "lib"] {
      bundle_graph.add_to_bundle("main", id);
    }

    Arc::new(bundle_graph)
  }

  #[test]
  fn repeated_queries_return_the_same_views() {
    let options = AtlaspackOptions::default();
    let bundle_graph = bundle_graph();
    let view = BundleGraphView::new(&bundle_graph, &options);

    assert!(Arc::ptr_eq(
      &view,
      &BundleGraphView::new(&bundle_graph, &options)
    ));

    let bundles = view.get_bundles();
    let again = view.get_bundles();
    assert!(Arc::ptr_eq(&bundles[0], &again[0]));

    let entries = bundles[0].get_entry_assets();
    assert!(Arc::ptr_eq(
      &entries[0],
      &bundles[0].get_main_entry().unwrap()
    ));
  }

  #[test]
  fn views_are_not_shared_between_options() {
    let first = AtlaspackOptions::default();
    let second = AtlaspackOptions::default();
    let bundle_graph = bundle_graph();

    let first_bundles = BundleGraphView::new(&bundle_graph, &first).get_bundles();
    let second_bundles = BundleGraphView::new(&bundle_graph, &second).get_bundles();

    assert_eq!(first_bundles[0].id, second_bundles[0].id);
    assert!(!Arc::ptr_eq(&first_bundles[0], &second_bundles[0]));
  }

  #[test]
  fn bundle_views_follow_the_graph_they_were_requested_from() {
    let options = AtlaspackOptions::default();
    let original = bundle_graph();
    let mut changed = BundleGraph::clone(&original);
    let extra = Arc::new(Asset {
      id: "extra".into(),
      ..Asset::default()
    });
    changed.add_asset(Arc::clone(&extra));
    changed.add_to_bundle("main", "extra");
    let changed = Arc::new(changed);

    let before = BundleGraphView::new(&original, &options)
      .get_bundle_by_id("main")
      .unwrap();
    let after = BundleGraphView::new(&changed, &options)
      .get_bundle_by_id("main")
      .unwrap();

    assert!(Arc::ptr_eq(before.inner(), after.inner()));
    assert!(!Arc::ptr_eq(&before, &after));
    assert!(!before.has_asset(&extra));
    assert!(after.has_asset(&extra));
  }

  #[test]
  fn dropping_options_releases_their_views() {
    let options = AtlaspackOptions::default();
    let options_id = options.id();
    let view = BundleGraphView::new(&bundle_graph(), &options);
    view.get_bundles();
    assert!(ViewCache::global().view_count(options_id) > 0);

    drop(options);

    assert!(!ViewCache::global().is_registered(options_id));
    assert_eq!(ViewCache::global().view_count(options_id), 0);
  }

  #[test]
  fn traverses_bundle_assets_as_views() {
    let options = AtlaspackOptions::default();
    let view = BundleGraphView::new(&bundle_graph(), &options);
    let main = view.get_bundle_by_id("main").unwrap();

    let mut visited = Vec::new();
    main.traverse_assets::<(), _>(|asset, _, _| {
      visited.push(asset.id.clone());
      None
    });

    assert_eq!(visited, vec!["entry", "lib"]);

    let lib = view.get_dependency_resolution(&view.get_dependencies(&main.get_entry_assets()[0])[0]);
    assert!(view.is_asset_referenced(&lib.unwrap()));
    assert!(!view.is_asset_referenced(&main.get_entry_assets()[0]));
  }
}
