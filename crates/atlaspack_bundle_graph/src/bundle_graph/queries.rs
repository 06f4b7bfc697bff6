use std::collections::HashSet;
use std::sync::Arc;

use petgraph::stable_graph::NodeIndex;
use petgraph::Direction;

use super::bundle_graph::BundleGraph;
use super::types::{BundleGraphEdgeType, BundleGraphNode};
use crate::graph::{EdgeFilter, GraphNode, GraphVisitor, TraversalActions};
use crate::types::{Asset, Bundle, BundleGroup, Dependency, FileType};

impl BundleGraph {
  /// The asset a dependency resolves to within the build
  ///
  /// Dependencies that cross into another bundle group resolve externally
  /// instead and return `None` here, see
  /// [`BundleGraph::resolve_external_dependency`].
  pub fn get_dependency_resolution(&self, dependency: &Dependency) -> Option<&Arc<Asset>> {
    let connected = self
      .graph
      .get_nodes_connected_from(&dependency.id, BundleGraphEdgeType::Null);

    if connected
      .iter()
      .any(|node| matches!(node, BundleGraphNode::BundleGroup(_)))
    {
      return None;
    }

    connected.into_iter().find_map(BundleGraphNode::as_asset)
  }

  /// The bundle group a dependency loads, if it crosses a bundle group boundary
  pub fn resolve_external_dependency(&self, dependency: &Dependency) -> Option<&Arc<BundleGroup>> {
    self
      .graph
      .get_nodes_connected_from(&dependency.id, BundleGraphEdgeType::Null)
      .into_iter()
      .find_map(BundleGraphNode::as_bundle_group)
  }

  /// The dependencies of an asset, in the order they were declared
  pub fn get_dependencies(&self, asset: &Asset) -> Vec<&Arc<Dependency>> {
    self
      .graph
      .get_nodes_connected_from(&asset.id, BundleGraphEdgeType::Null)
      .into_iter()
      .filter_map(BundleGraphNode::as_dependency)
      .collect()
  }

  /// Dependencies that resolve to an asset
  ///
  /// Dependencies whose source asset has been removed from the graph are stale
  /// and ignored.
  pub fn get_incoming_dependencies(&self, asset: &Asset) -> Vec<&Arc<Dependency>> {
    self
      .graph
      .get_nodes_connected_to(&asset.id, BundleGraphEdgeType::Null)
      .into_iter()
      .filter_map(BundleGraphNode::as_dependency)
      .filter(|dependency| {
        dependency
          .source_asset_id
          .as_ref()
          .is_none_or(|source_asset_id| self.graph.has_node(source_asset_id))
      })
      .collect()
  }

  pub fn is_asset_referenced(&self, asset: &Asset) -> bool {
    !self.get_incoming_dependencies(asset).is_empty()
  }

  /// Whether an asset is referenced by a dependency from an asset of the given type
  pub fn is_asset_referenced_by_asset_type(&self, asset: &Asset, file_type: &FileType) -> bool {
    self
      .get_incoming_dependencies(asset)
      .into_iter()
      .filter_map(|dependency| dependency.source_asset_id.as_deref())
      .filter_map(|source_asset_id| self.get_asset_by_id(source_asset_id))
      .any(|source| &source.file_type == file_type)
  }

  /// The assets a bundle executes when it loads, in order
  pub fn get_entry_assets(&self, bundle: &Bundle) -> Vec<&Arc<Asset>> {
    bundle
      .entry_asset_ids
      .iter()
      .map(|id| self.expect_asset(id))
      .collect()
  }

  pub fn bundle_has_asset(&self, bundle: &Bundle, asset: &Asset) -> bool {
    self.bundle_contains(bundle, &asset.id)
  }

  fn bundle_contains(&self, bundle: &Bundle, node_id: &str) -> bool {
    self.graph.has_node(node_id)
      && self
        .graph
        .has_edge(&bundle.id, node_id, BundleGraphEdgeType::Contains)
  }

  /// Bundles that contain an asset
  pub fn find_bundles_with_asset(&self, asset: &Asset) -> Vec<&Arc<Bundle>> {
    self
      .graph
      .get_nodes_connected_to(&asset.id, BundleGraphEdgeType::Contains)
      .into_iter()
      .filter_map(BundleGraphNode::as_bundle)
      .collect()
  }

  /// Walks the assets and dependencies contained by a bundle
  ///
  /// The walk starts from the bundle's entry assets in order and follows
  /// dependency edges, pruning anything the bundle does not contain. Bundles
  /// without entries, such as shared bundles, are walked from their contents.
  pub fn traverse_bundle<C, F>(&self, bundle: &Bundle, visit: F) -> Option<C>
  where
    C: Clone,
    F: FnMut(&BundleGraphNode, Option<&C>, &mut TraversalActions) -> Option<C>,
  {
    let bundle_index = self.graph.node_index(&bundle.id);
    let roots: Vec<NodeIndex> = if bundle.entry_asset_ids.is_empty() {
      self.graph.neighbors(
        bundle_index,
        Direction::Outgoing,
        EdgeFilter::Only(BundleGraphEdgeType::Contains),
      )
    } else {
      bundle
        .entry_asset_ids
        .iter()
        .map(|id| self.graph.node_index(id))
        .collect()
    };

    let mut visitor = BundleContentsVisitor {
      bundle_graph: self,
      bundle,
      visit,
    };

    self.graph.dfs(
      bundle_index,
      |node_index| {
        if node_index == bundle_index {
          roots.clone()
        } else {
          self.graph.neighbors(
            node_index,
            Direction::Outgoing,
            EdgeFilter::Only(BundleGraphEdgeType::Null),
          )
        }
      },
      &mut visitor,
    )
  }

  /// The assets of a bundle, in bundle traversal order
  pub fn get_bundle_assets(&self, bundle: &Bundle) -> Vec<&Arc<Asset>> {
    let mut ids = Vec::new();
    self.traverse_bundle::<(), _>(bundle, |node, _, _| {
      if let BundleGraphNode::Asset(asset) = node {
        ids.push(asset.id.clone());
      }
      None
    });

    ids.iter().map(|id| self.expect_asset(id)).collect()
  }

  /// Dependencies in a bundle that are not satisfied by an asset in the same bundle group
  ///
  /// These are the dependencies a runtime has to load something for.
  pub fn get_external_dependencies(&self, bundle: &Bundle) -> Vec<&Arc<Dependency>> {
    let mut ids = Vec::new();
    self.traverse_bundle::<(), _>(bundle, |node, _, _| {
      if let BundleGraphNode::Dependency(dependency) = node {
        if self.get_dependency_resolution(dependency).is_none()
          || self.resolve_external_dependency(dependency).is_some()
        {
          ids.push(dependency.id.clone());
        }
      }
      None
    });

    ids
      .iter()
      .filter_map(|id| self.get_dependency_by_id(id))
      .collect()
  }

  /// Bundle groups that have this bundle as a member
  pub fn get_bundle_groups_containing_bundle(&self, bundle: &Bundle) -> Vec<&Arc<BundleGroup>> {
    self
      .graph
      .get_nodes_connected_to(&bundle.id, BundleGraphEdgeType::Bundle)
      .into_iter()
      .filter_map(BundleGraphNode::as_bundle_group)
      .collect()
  }

  pub fn get_bundles_in_bundle_group(&self, bundle_group: &BundleGroup) -> Vec<&Arc<Bundle>> {
    self
      .graph
      .get_nodes_connected_from(&bundle_group.id(), BundleGraphEdgeType::Bundle)
      .into_iter()
      .filter_map(BundleGraphNode::as_bundle)
      .collect()
  }

  /// Bundles that load alongside this one
  ///
  /// These are the other members of every bundle group containing the bundle,
  /// followed by bundles it references directly, each listed once.
  pub fn get_sibling_bundles(&self, bundle: &Bundle) -> Vec<&Arc<Bundle>> {
    let mut seen = HashSet::from([bundle.id.as_str()]);
    let grouped = self
      .get_bundle_groups_containing_bundle(bundle)
      .into_iter()
      .flat_map(|bundle_group| self.get_bundles_in_bundle_group(bundle_group));

    let referenced = self
      .graph
      .get_nodes_connected_from(&bundle.id, BundleGraphEdgeType::References)
      .into_iter()
      .filter_map(BundleGraphNode::as_bundle);

    grouped
      .chain(referenced)
      .filter(|sibling| seen.insert(sibling.id.as_str()))
      .collect()
  }

  /// Bundles that load a bundle group this bundle belongs to
  pub fn get_parent_bundles(&self, bundle: &Bundle) -> Vec<&Arc<Bundle>> {
    let mut seen = HashSet::new();
    self
      .get_bundle_groups_containing_bundle(bundle)
      .into_iter()
      .flat_map(|bundle_group| {
        self
          .graph
          .get_nodes_connected_to(&bundle_group.id(), BundleGraphEdgeType::Bundle)
      })
      .filter_map(BundleGraphNode::as_bundle)
      .filter(|parent| seen.insert(parent.id.as_str()))
      .collect()
  }

  /// Whether the bundle has parents and all of them have the given type
  pub fn has_parent_bundle_of_type(&self, bundle: &Bundle, file_type: &FileType) -> bool {
    let parents = self.get_parent_bundles(bundle);
    !parents.is_empty()
      && parents
        .iter()
        .all(|parent| &parent.bundle_type == file_type)
  }

  /// Bundles reachable from this bundle through the bundle groups it loads
  ///
  /// Only direct children are returned, not their descendants.
  pub fn get_child_bundles(&self, bundle: &Bundle) -> Vec<&Arc<Bundle>> {
    let mut children = Vec::new();
    self.traverse_bundles::<(), _>(
      |child, _, actions| {
        if child.id != bundle.id {
          children.push(child.id.clone());
          actions.skip_children();
        }
        None
      },
      Some(bundle),
    );

    children
      .iter()
      .filter_map(|id| self.get_bundle_by_id(id))
      .collect()
  }

  /// Every bundle reachable from the root, in traversal order
  pub fn get_bundles(&self) -> Vec<&Arc<Bundle>> {
    let mut bundles = Vec::new();
    self.traverse_bundles::<(), _>(
      |bundle, _, _| {
        bundles.push(bundle.id.clone());
        None
      },
      None,
    );

    bundles
      .iter()
      .filter_map(|id| self.get_bundle_by_id(id))
      .collect()
  }

  /// Walks the bundle hierarchy depth first, from `start` or the root
  ///
  /// The visitor only sees bundles, bundle groups are walked through.
  pub fn traverse_bundles<C, F>(&self, visit: F, start: Option<&Bundle>) -> Option<C>
  where
    C: Clone,
    F: FnMut(&Arc<Bundle>, Option<&C>, &mut TraversalActions) -> Option<C>,
  {
    self.graph.filtered_traverse(
      |node| node.as_bundle().cloned(),
      visit,
      start.map(|bundle| bundle.id.as_str()),
      EdgeFilter::Only(BundleGraphEdgeType::Bundle),
    )
  }

  /// Whether an asset is guaranteed to be loaded whenever `bundle` loads
  ///
  /// This holds when every path from the root to the bundle passes through a
  /// bundle containing the asset. Bundles in entry bundle groups have a path
  /// with no ancestors, so this is always false for them.
  pub fn is_asset_in_ancestor_bundles(&self, bundle: &Bundle, asset: &Asset) -> bool {
    let mut in_progress = HashSet::new();
    self.is_asset_in_parents(bundle, &asset.id, &mut in_progress)
  }

  fn is_asset_in_parents(
    &self,
    bundle: &Bundle,
    asset_id: &str,
    in_progress: &mut HashSet<String>,
  ) -> bool {
    // A path that loops back to a bundle already being checked is covered by
    // the remaining paths into that bundle
    if !in_progress.insert(bundle.id.clone()) {
      return true;
    }

    let bundle_groups = self.get_bundle_groups_containing_bundle(bundle);
    let result = !bundle_groups.is_empty()
      && bundle_groups.into_iter().all(|bundle_group| {
        let loaders = self
          .graph
          .get_nodes_connected_to(&bundle_group.id(), BundleGraphEdgeType::Bundle);

        if loaders.is_empty()
          || loaders
            .iter()
            .any(|node| matches!(node, BundleGraphNode::Root))
        {
          return false;
        }

        loaders
          .into_iter()
          .filter_map(BundleGraphNode::as_bundle)
          .all(|parent| {
            self.bundle_contains(parent, asset_id)
              || self.is_asset_in_parents(parent, asset_id, in_progress)
          })
      });

    in_progress.remove(&bundle.id);
    result
  }
}

/// Feeds the nodes a bundle contains to a visitor and prunes everything else
struct BundleContentsVisitor<'g, F> {
  bundle_graph: &'g BundleGraph,
  bundle: &'g Bundle,
  visit: F,
}

impl<C, F> GraphVisitor<BundleGraphNode, C> for BundleContentsVisitor<'_, F>
where
  F: FnMut(&BundleGraphNode, Option<&C>, &mut TraversalActions) -> Option<C>,
{
  fn enter(
    &mut self,
    node: &BundleGraphNode,
    context: Option<&C>,
    actions: &mut TraversalActions,
  ) -> Option<C> {
    if let BundleGraphNode::Bundle(bundle) = node {
      if bundle.id == self.bundle.id {
        return None;
      }
    }

    if !self.bundle_graph.bundle_contains(self.bundle, &node.id()) {
      actions.skip_children();
      return None;
    }

    (self.visit)(node, context, actions)
  }
}
