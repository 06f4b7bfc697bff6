//! A directed graph of tagged nodes addressed by string ids.
//!
//! Nodes live in a petgraph arena and are looked up through an id index.
//! Edges carry a type so that several relationships (for example containment
//! and sibling) can exist between the same pair of nodes.
use std::collections::HashMap;
use std::fmt::Debug;

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::Direction;

pub use self::traversal::{GraphVisitor, TraversalActions};

mod traversal;

/// A node that can be stored in a [`Graph`]
pub trait GraphNode {
  /// Content key of the node, unique within a graph
  fn id(&self) -> String;
}

/// Restricts edge lookups to one edge type
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EdgeFilter<E> {
  All,
  Only(E),
}

impl<E: PartialEq> EdgeFilter<E> {
  fn matches(&self, edge_type: &E) -> bool {
    match self {
      EdgeFilter::All => true,
      EdgeFilter::Only(expected) => expected == edge_type,
    }
  }
}

impl<E> From<E> for EdgeFilter<E> {
  fn from(edge_type: E) -> Self {
    EdgeFilter::Only(edge_type)
  }
}

#[derive(Clone, Debug)]
pub struct Graph<N, E> {
  graph: StableDiGraph<N, E>,
  node_index_by_id: HashMap<String, NodeIndex>,
  root_node_index: Option<NodeIndex>,
}

impl<N: GraphNode, E: Copy + Debug + PartialEq> Default for Graph<N, E> {
  fn default() -> Self {
    Self::new()
  }
}

impl<N: GraphNode, E: Copy + Debug + PartialEq> Graph<N, E> {
  pub fn new() -> Self {
    Graph {
      graph: StableDiGraph::new(),
      node_index_by_id: HashMap::new(),
      root_node_index: None,
    }
  }

  /// Adds a node, replacing the value of an existing node with the same id
  ///
  /// The replacement must be the same kind of node. Two kinds of node sharing
  /// an id is an integrity defect.
  pub fn add_node(&mut self, node: N) -> NodeIndex {
    let id = node.id();
    if let Some(node_index) = self.node_index_by_id.get(&id) {
      debug_assert!(
        std::mem::discriminant(&self.graph[*node_index]) == std::mem::discriminant(&node),
        "Node {id} is already in the graph as a different kind of node"
      );
      self.graph[*node_index] = node;
      return *node_index;
    }

    let node_index = self.graph.add_node(node);
    self.node_index_by_id.insert(id, node_index);
    node_index
  }

  pub fn set_root_node(&mut self, node: N) -> NodeIndex {
    let node_index = self.add_node(node);
    self.root_node_index = Some(node_index);
    node_index
  }

  pub fn root_node(&self) -> Option<&N> {
    self.root_node_index.map(|node_index| &self.graph[node_index])
  }

  /// Removes a node together with all of its edges
  pub fn remove_node(&mut self, id: &str) -> Option<N> {
    let node_index = self.node_index_by_id.remove(id)?;
    if self.root_node_index == Some(node_index) {
      self.root_node_index = None;
    }
    self.graph.remove_node(node_index)
  }

  pub fn has_node(&self, id: &str) -> bool {
    self.node_index_by_id.contains_key(id)
  }

  pub fn get_node(&self, id: &str) -> Option<&N> {
    let node_index = self.node_index_by_id.get(id)?;
    self.graph.node_weight(*node_index)
  }

  pub fn nodes(&self) -> impl Iterator<Item = &N> {
    self.graph.node_weights()
  }

  pub fn node_count(&self) -> usize {
    self.graph.node_count()
  }

  /// All edges as `(from, to, type)`
  pub fn edges(&self) -> impl Iterator<Item = (&N, &N, E)> {
    self.graph.edge_references().map(move |edge| {
      (
        &self.graph[edge.source()],
        &self.graph[edge.target()],
        *edge.weight(),
      )
    })
  }

  /// Resolves an id to its arena index
  ///
  /// Panics when the id is not in the graph. Ids handed to the graph must come
  /// from the graph, so a miss is a referential integrity defect.
  #[track_caller]
  pub(crate) fn node_index(&self, id: &str) -> NodeIndex {
    match self.node_index_by_id.get(id) {
      Some(node_index) => *node_index,
      None => panic!("Node {id} does not exist in the graph"),
    }
  }

  pub(crate) fn node_weight(&self, node_index: NodeIndex) -> &N {
    &self.graph[node_index]
  }

  /// Adds a typed edge. Adding the same edge twice is a no-op.
  #[track_caller]
  pub fn add_edge(&mut self, from: &str, to: &str, edge_type: E) -> bool {
    let from_index = self.node_index(from);
    let to_index = self.node_index(to);
    if self.has_edge_between(from_index, to_index, edge_type) {
      return false;
    }

    self.graph.add_edge(from_index, to_index, edge_type);
    true
  }

  pub fn has_edge(&self, from: &str, to: &str, edge_type: E) -> bool {
    match (
      self.node_index_by_id.get(from),
      self.node_index_by_id.get(to),
    ) {
      (Some(from_index), Some(to_index)) => {
        self.has_edge_between(*from_index, *to_index, edge_type)
      }
      _ => false,
    }
  }

  fn has_edge_between(&self, from: NodeIndex, to: NodeIndex, edge_type: E) -> bool {
    self
      .graph
      .edges_connecting(from, to)
      .any(|edge| *edge.weight() == edge_type)
  }

  pub fn remove_edge(&mut self, from: &str, to: &str, edge_type: E) -> bool {
    let (Some(from_index), Some(to_index)) = (
      self.node_index_by_id.get(from).copied(),
      self.node_index_by_id.get(to).copied(),
    ) else {
      return false;
    };

    let edge = self
      .graph
      .edges_connecting(from_index, to_index)
      .find(|edge| *edge.weight() == edge_type)
      .map(|edge| edge.id());

    match edge {
      Some(edge) => self.graph.remove_edge(edge).is_some(),
      None => false,
    }
  }

  /// Neighbour indices in edge insertion order
  pub(crate) fn neighbors(
    &self,
    node_index: NodeIndex,
    direction: Direction,
    edge_filter: EdgeFilter<E>,
  ) -> Vec<NodeIndex> {
    // petgraph walks a node's edge list newest first
    let mut neighbors = self
      .graph
      .edges_directed(node_index, direction)
      .filter(|edge| edge_filter.matches(edge.weight()))
      .map(|edge| match direction {
        Direction::Outgoing => edge.target(),
        Direction::Incoming => edge.source(),
      })
      .collect::<Vec<_>>();
    neighbors.reverse();
    neighbors
  }

  #[track_caller]
  pub fn get_nodes_connected_from(
    &self,
    id: &str,
    edge_filter: impl Into<EdgeFilter<E>>,
  ) -> Vec<&N> {
    self
      .neighbors(self.node_index(id), Direction::Outgoing, edge_filter.into())
      .into_iter()
      .map(|node_index| self.node_weight(node_index))
      .collect()
  }

  #[track_caller]
  pub fn get_nodes_connected_to(&self, id: &str, edge_filter: impl Into<EdgeFilter<E>>) -> Vec<&N> {
    self
      .neighbors(self.node_index(id), Direction::Incoming, edge_filter.into())
      .into_iter()
      .map(|node_index| self.node_weight(node_index))
      .collect()
  }
}
