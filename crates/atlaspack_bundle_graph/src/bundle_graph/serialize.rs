use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::bundle_graph::BundleGraph;
use super::types::{BundleGraphEdgeType, BundleGraphNode};
use crate::error::BundleGraphError;
use crate::graph::GraphNode;
use crate::types::{Asset, Bundle, BundleGroup, Dependency};

#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum SerializedNode {
  #[serde(rename = "root")]
  Root,
  #[serde(rename = "asset")]
  Asset { value: Asset },
  #[serde(rename = "dependency")]
  Dependency { value: Dependency },
  #[serde(rename = "bundle_group")]
  BundleGroup { value: BundleGroup },
  #[serde(rename = "bundle")]
  Bundle { value: Bundle },
}

/// A bundle graph as a flat node list and `[from, to, edgeType]` edge triples
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SerializedBundleGraph {
  pub nodes: Vec<SerializedNode>,
  pub edges: Vec<(String, String, u8)>,
}

impl From<SerializedNode> for BundleGraphNode {
  fn from(node: SerializedNode) -> Self {
    match node {
      SerializedNode::Root => BundleGraphNode::Root,
      SerializedNode::Asset { value } => BundleGraphNode::Asset(Arc::new(value)),
      SerializedNode::Dependency { value } => BundleGraphNode::Dependency(Arc::new(value)),
      SerializedNode::BundleGroup { value } => BundleGraphNode::BundleGroup(Arc::new(value)),
      SerializedNode::Bundle { value } => BundleGraphNode::Bundle(Arc::new(value)),
    }
  }
}

impl BundleGraph {
  /// Builds a bundle graph from its serialized form
  ///
  /// Unlike graph lookups, which treat a dangling id as a fatal defect, this
  /// reports every integrity problem as an error. The result is validated.
  #[instrument(level = "debug", skip_all, fields(nodes = serialized.nodes.len(), edges = serialized.edges.len()))]
  pub fn from_serialized(serialized: SerializedBundleGraph) -> Result<Self, BundleGraphError> {
    let mut bundle_graph = BundleGraph::new();

    for node in serialized.nodes {
      let node = BundleGraphNode::from(node);
      if node != BundleGraphNode::Root {
        bundle_graph.graph.add_node(node);
      }
    }

    for (from, to, edge_type) in serialized.edges {
      let edge_type = BundleGraphEdgeType::try_from(edge_type)?;
      for id in [&from, &to] {
        if !bundle_graph.graph.has_node(id) {
          return Err(BundleGraphError::MissingNode { id: id.clone() });
        }
      }

      bundle_graph.graph.add_edge(&from, &to, edge_type);
    }

    bundle_graph.validate()?;
    Ok(bundle_graph)
  }

  pub fn from_json(json: &str) -> Result<Self, BundleGraphError> {
    Self::from_serialized(serde_json::from_str(json)?)
  }

  pub fn to_serialized(&self) -> SerializedBundleGraph {
    let nodes = self
      .graph
      .nodes()
      .map(|node| match node {
        BundleGraphNode::Root => SerializedNode::Root,
        BundleGraphNode::Asset(asset) => SerializedNode::Asset {
          value: Asset::clone(asset),
        },
        BundleGraphNode::Dependency(dependency) => SerializedNode::Dependency {
          value: Dependency::clone(dependency),
        },
        BundleGraphNode::BundleGroup(bundle_group) => SerializedNode::BundleGroup {
          value: BundleGroup::clone(bundle_group),
        },
        BundleGraphNode::Bundle(bundle) => SerializedNode::Bundle {
          value: Bundle::clone(bundle),
        },
      })
      .collect();

    let edges = self
      .graph
      .edges()
      .map(|(from, to, edge_type)| (from.id(), to.id(), edge_type as u8))
      .collect();

    SerializedBundleGraph { nodes, edges }
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  const GRAPH: &str = r#"{
    "nodes": [
      { "type": "root" },
      {
        "type": "asset",
        "value": {
          "id": "entry",
          "filePath": "/app/index.js",
          "type": "js",
          "env": { "context": "browser", "outputFormat": "esmodule" }
        }
      },
      {
        "type": "bundle_group",
        "value": { "entryAssetId": "entry", "target": { "distDir": "/dist", "name": "default" } }
      },
      {
        "type": "bundle",
        "value": {
          "id": "bundle",
          "type": "js",
          "name": "index.js",
          "entryAssetIds": ["entry"],
          "env": { "context": "browser", "outputFormat": "esmodule" },
          "target": { "distDir": "/dist", "name": "default" }
        }
      }
    ],
    "edges": [
      ["@@root", "bundle_group:defaultentry", 3],
      ["bundle_group:defaultentry", "bundle", 3],
      ["bundle", "entry", 1],
      ["bundle", "entry", 2]
    ]
  }"#;

  #[test]
  fn builds_a_graph_from_json() {
    let bundle_graph = BundleGraph::from_json(GRAPH).unwrap();

    assert_eq!(
      bundle_graph
        .get_bundles()
        .iter()
        .map(|bundle| bundle.id.as_str())
        .collect::<Vec<_>>(),
      vec!["bundle"]
    );

    let bundle = bundle_graph.get_bundle_by_id("bundle").unwrap();
    let entry = bundle_graph.get_asset_by_id("entry").unwrap();
    assert!(bundle_graph.bundle_has_asset(bundle, entry));
  }

  #[test]
  fn round_trips_through_the_serialized_form() {
    let bundle_graph = BundleGraph::from_json(GRAPH).unwrap();
    let rebuilt = BundleGraph::from_serialized(bundle_graph.to_serialized()).unwrap();

    assert_eq!(rebuilt.graph.node_count(), bundle_graph.graph.node_count());
    assert_eq!(rebuilt.to_serialized().edges, bundle_graph.to_serialized().edges);
  }

  #[test]
  fn rejects_edges_to_missing_nodes() {
    let json = GRAPH.replace(r#"["bundle", "entry", 2]"#, r#"["bundle", "ghost", 2]"#);

    assert!(matches!(
      BundleGraph::from_json(&json),
      Err(BundleGraphError::MissingNode { id }) if id == "ghost"
    ));
  }

  #[test]
  fn rejects_unknown_edge_types() {
    let json = GRAPH.replace(r#"["bundle", "entry", 2]"#, r#"["bundle", "entry", 7]"#);

    assert!(matches!(
      BundleGraph::from_json(&json),
      Err(BundleGraphError::UnknownEdgeType(7))
    ));
  }

  #[test]
  fn validates_the_result() {
    let json = GRAPH.replace(r#",
      ["bundle", "entry", 2]"#, "");

    assert!(matches!(
      BundleGraph::from_json(&json),
      Err(BundleGraphError::InvalidBundleGroupEntry { count: 0, .. })
    ));
  }
}
