use std::sync::Arc;

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::error::BundleGraphError;
use crate::graph::GraphNode;
use crate::types::{Asset, Bundle, BundleGroup, Dependency};

pub const ROOT_NODE_ID: &str = "@@root";

/// Edge types in the bundle graph.
///
/// Numeric values match the serialized edge type codes.
#[derive(Clone, Copy, Debug, Default, Deserialize_repr, Eq, Hash, PartialEq, Serialize_repr)]
#[repr(u8)]
pub enum BundleGraphEdgeType {
  /// Structural edges: asset -> dependency, dependency -> asset or bundle group,
  /// root -> entry asset
  #[default]
  Null = 1,
  /// Bundle -> each asset and dependency it contains
  Contains = 2,
  /// Bundle hierarchy: root -> bundle group, bundle -> bundle group it loads,
  /// bundle group -> member bundle
  Bundle = 3,
  /// Bundle -> sibling bundle that must be loaded alongside it
  References = 4,
}

impl TryFrom<u8> for BundleGraphEdgeType {
  type Error = BundleGraphError;

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    match value {
      1 => Ok(BundleGraphEdgeType::Null),
      2 => Ok(BundleGraphEdgeType::Contains),
      3 => Ok(BundleGraphEdgeType::Bundle),
      4 => Ok(BundleGraphEdgeType::References),
      _ => Err(BundleGraphError::UnknownEdgeType(value)),
    }
  }
}

#[derive(Clone, Debug, PartialEq)]
pub enum BundleGraphNode {
  Root,
  Asset(Arc<Asset>),
  Dependency(Arc<Dependency>),
  BundleGroup(Arc<BundleGroup>),
  Bundle(Arc<Bundle>),
}

impl GraphNode for BundleGraphNode {
  fn id(&self) -> String {
    match self {
      BundleGraphNode::Root => ROOT_NODE_ID.to_string(),
      BundleGraphNode::Asset(asset) => asset.id.clone(),
      BundleGraphNode::Dependency(dependency) => dependency.id.clone(),
      BundleGraphNode::BundleGroup(bundle_group) => bundle_group.id(),
      BundleGraphNode::Bundle(bundle) => bundle.id.clone(),
    }
  }
}

impl BundleGraphNode {
  pub fn as_asset(&self) -> Option<&Arc<Asset>> {
    match self {
      BundleGraphNode::Asset(asset) => Some(asset),
      _ => None,
    }
  }

  pub fn as_dependency(&self) -> Option<&Arc<Dependency>> {
    match self {
      BundleGraphNode::Dependency(dependency) => Some(dependency),
      _ => None,
    }
  }

  pub fn as_bundle_group(&self) -> Option<&Arc<BundleGroup>> {
    match self {
      BundleGraphNode::BundleGroup(bundle_group) => Some(bundle_group),
      _ => None,
    }
  }

  pub fn as_bundle(&self) -> Option<&Arc<Bundle>> {
    match self {
      BundleGraphNode::Bundle(bundle) => Some(bundle),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn converts_edge_type_codes() {
    assert_eq!(
      BundleGraphEdgeType::try_from(2).ok(),
      Some(BundleGraphEdgeType::Contains)
    );
    assert!(matches!(
      BundleGraphEdgeType::try_from(9),
      Err(BundleGraphError::UnknownEdgeType(9))
    ));
  }
}
