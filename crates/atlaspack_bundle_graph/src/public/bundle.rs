use std::fmt::Debug;
use std::ops::Deref;
use std::sync::Arc;

use super::view_cache::address;
use super::{AssetView, ViewCache};
use crate::bundle_graph::{BundleGraph, BundleGraphNode};
use crate::graph::TraversalActions;
use crate::types::{Asset, Bundle, OptionsId};

/// A bundle together with the graph it belongs to
pub struct BundleView {
  bundle: Arc<Bundle>,
  bundle_graph: Arc<BundleGraph>,
  options_id: OptionsId,
}

impl BundleView {
  pub fn new(
    bundle: &Arc<Bundle>,
    bundle_graph: &Arc<BundleGraph>,
    options_id: OptionsId,
  ) -> Arc<Self> {
    let key = (address(bundle_graph), address(bundle));
    ViewCache::global().get_or_create(options_id, key, || BundleView {
      bundle: Arc::clone(bundle),
      bundle_graph: Arc::clone(bundle_graph),
      options_id,
    })
  }

  pub fn inner(&self) -> &Arc<Bundle> {
    &self.bundle
  }

  pub fn get_entry_assets(&self) -> Vec<Arc<AssetView>> {
    self
      .bundle_graph
      .get_entry_assets(&self.bundle)
      .into_iter()
      .map(|asset| AssetView::new(asset, self.options_id))
      .collect()
  }

  /// The entry asset whose exports the bundle exposes, if it has one
  pub fn get_main_entry(&self) -> Option<Arc<AssetView>> {
    let main_entry_id = self.bundle.main_entry_id.as_deref()?;
    let asset = self.bundle_graph.expect_asset(main_entry_id);
    Some(AssetView::new(asset, self.options_id))
  }

  pub fn has_asset(&self, asset: &Asset) -> bool {
    self.bundle_graph.bundle_has_asset(&self.bundle, asset)
  }

  /// Walks the assets of the bundle, see [`BundleGraph::traverse_bundle`]
  pub fn traverse_assets<C, F>(&self, mut visit: F) -> Option<C>
  where
    C: Clone,
    F: FnMut(&Arc<AssetView>, Option<&C>, &mut TraversalActions) -> Option<C>,
  {
    self
      .bundle_graph
      .traverse_bundle(&self.bundle, |node, context, actions| match node {
        BundleGraphNode::Asset(asset) => visit(
          &AssetView::new(asset, self.options_id),
          context,
          actions,
        ),
        _ => context.cloned(),
      })
  }
}

impl Deref for BundleView {
  type Target = Bundle;

  fn deref(&self) -> &Self::Target {
    &self.bundle
  }
}

impl Debug for BundleView {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("BundleView")
      .field("bundle", &self.bundle)
      .field("options_id", &self.options_id)
      .finish()
  }
}
