use std::sync::Arc;

use tracing::instrument;

use super::types::{BundleGraphEdgeType, BundleGraphNode, ROOT_NODE_ID};
use crate::error::BundleGraphError;
use crate::graph::Graph;
use crate::types::{Asset, Bundle, BundleGroup, Dependency};

/// The output of bundling: assets and dependencies from the asset graph,
/// partitioned into bundles and bundle groups
///
/// The graph is built by the bundler and is read-only once runtimes are being
/// applied. Node lookups by id panic when the id is not in the graph, since a
/// dangling reference means the bundler produced a corrupt graph.
#[derive(Clone, Debug)]
pub struct BundleGraph {
  pub(crate) graph: Graph<BundleGraphNode, BundleGraphEdgeType>,
}

impl Default for BundleGraph {
  fn default() -> Self {
    Self::new()
  }
}

impl BundleGraph {
  pub fn new() -> Self {
    let mut graph = Graph::new();
    graph.set_root_node(BundleGraphNode::Root);

    BundleGraph { graph }
  }

  /// The underlying typed graph
  pub fn graph(&self) -> &Graph<BundleGraphNode, BundleGraphEdgeType> {
    &self.graph
  }

  pub fn root_id(&self) -> &'static str {
    ROOT_NODE_ID
  }

  pub fn add_asset(&mut self, asset: Arc<Asset>) {
    self.graph.add_node(BundleGraphNode::Asset(asset));
  }

  pub fn add_dependency(&mut self, dependency: Arc<Dependency>) {
    self.graph.add_node(BundleGraphNode::Dependency(dependency));
  }

  /// Adds a bundle group, returning its id
  pub fn add_bundle_group(&mut self, bundle_group: Arc<BundleGroup>) -> String {
    let id = bundle_group.id();
    self.graph.add_node(BundleGraphNode::BundleGroup(bundle_group));
    id
  }

  pub fn add_bundle(&mut self, bundle: Arc<Bundle>) {
    self.graph.add_node(BundleGraphNode::Bundle(bundle));
  }

  /// Connects two nodes, ignoring edges that already exist
  ///
  /// Panics when either node is missing.
  #[track_caller]
  pub fn add_edge(&mut self, from: &str, to: &str, edge_type: BundleGraphEdgeType) {
    self.graph.add_edge(from, to, edge_type);
  }

  /// Places an asset or dependency into a bundle
  #[track_caller]
  pub fn add_to_bundle(&mut self, bundle_id: &str, node_id: &str) {
    self.graph.add_edge(bundle_id, node_id, BundleGraphEdgeType::Contains);
  }

  /// Makes a bundle a member of a bundle group
  #[track_caller]
  pub fn add_bundle_to_bundle_group(&mut self, bundle_group_id: &str, bundle_id: &str) {
    self
      .graph
      .add_edge(bundle_group_id, bundle_id, BundleGraphEdgeType::Bundle);
  }

  /// Records that `bundle_id` loads a bundle group
  ///
  /// Passing the root id marks the group as an entry of the build.
  #[track_caller]
  pub fn add_bundle_group_loader(&mut self, bundle_id: &str, bundle_group_id: &str) {
    self
      .graph
      .add_edge(bundle_id, bundle_group_id, BundleGraphEdgeType::Bundle);
  }

  /// Records that `sibling_id` must be loaded alongside `bundle_id`
  #[track_caller]
  pub fn add_bundle_reference(&mut self, bundle_id: &str, sibling_id: &str) {
    self
      .graph
      .add_edge(bundle_id, sibling_id, BundleGraphEdgeType::References);
  }

  /// Removes a node and every edge touching it
  ///
  /// Dependencies whose source asset is removed this way become stale.
  pub fn remove_node(&mut self, id: &str) -> Option<BundleGraphNode> {
    self.graph.remove_node(id)
  }

  pub fn get_asset_by_id(&self, id: &str) -> Option<&Arc<Asset>> {
    self.graph.get_node(id).and_then(BundleGraphNode::as_asset)
  }

  pub fn get_dependency_by_id(&self, id: &str) -> Option<&Arc<Dependency>> {
    self
      .graph
      .get_node(id)
      .and_then(BundleGraphNode::as_dependency)
  }

  pub fn get_bundle_by_id(&self, id: &str) -> Option<&Arc<Bundle>> {
    self.graph.get_node(id).and_then(BundleGraphNode::as_bundle)
  }

  pub fn get_bundle_group_by_id(&self, id: &str) -> Option<&Arc<BundleGroup>> {
    self
      .graph
      .get_node(id)
      .and_then(BundleGraphNode::as_bundle_group)
  }

  #[track_caller]
  pub(crate) fn expect_asset(&self, id: &str) -> &Arc<Asset> {
    match self.graph.get_node(id) {
      Some(BundleGraphNode::Asset(asset)) => asset,
      Some(node) => panic!("Expected {id} to be an asset, found {node:?}"),
      None => panic!("Asset {id} does not exist in the bundle graph"),
    }
  }

  /// Checks the structural rules the bundler must uphold
  ///
  /// Every bundle group's entry asset must be contained by exactly one of the
  /// group's bundles, and every bundle must be named by the time runtimes run.
  #[instrument(level = "debug", skip_all)]
  pub fn validate(&self) -> Result<(), BundleGraphError> {
    for node in self.graph.nodes() {
      match node {
        BundleGraphNode::BundleGroup(bundle_group) => {
          let bundle_group_id = bundle_group.id();
          let count = self
            .graph
            .get_nodes_connected_from(&bundle_group_id, BundleGraphEdgeType::Bundle)
            .into_iter()
            .filter_map(BundleGraphNode::as_bundle)
            .filter(|bundle| {
              self.graph.has_node(&bundle_group.entry_asset_id)
                && self.graph.has_edge(
                  &bundle.id,
                  &bundle_group.entry_asset_id,
                  BundleGraphEdgeType::Contains,
                )
            })
            .count();

          if count != 1 {
            return Err(BundleGraphError::InvalidBundleGroupEntry {
              bundle_group_id,
              entry_asset_id: bundle_group.entry_asset_id.clone(),
              count,
            });
          }
        }
        BundleGraphNode::Bundle(bundle) if bundle.name.is_none() => {
          return Err(BundleGraphError::UnnamedBundle {
            bundle_id: bundle.id.clone(),
          });
        }
        _ => {}
      }
    }

    tracing::debug!(nodes = self.graph.node_count(), "Bundle graph is valid");
    Ok(())
  }
}
