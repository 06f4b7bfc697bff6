use std::collections::HashSet;
use std::fmt::Debug;

use petgraph::stable_graph::NodeIndex;
use petgraph::Direction;

use super::{EdgeFilter, Graph, GraphNode};

/// Lets a visitor control the traversal in progress
#[derive(Debug, Default)]
pub struct TraversalActions {
  skipped: bool,
  stopped: bool,
}

impl TraversalActions {
  /// Do not descend into the children of the node being visited
  pub fn skip_children(&mut self) {
    self.skipped = true;
  }

  /// End the traversal, returning the current context
  pub fn stop(&mut self) {
    self.stopped = true;
  }
}

/// A visitor with enter and exit hooks
///
/// Returning `Some` from a hook replaces the context handed to the children
/// of the node.
pub trait GraphVisitor<N, C> {
  fn enter(&mut self, node: &N, context: Option<&C>, actions: &mut TraversalActions) -> Option<C>;

  fn exit(&mut self, _node: &N, _context: Option<&C>, _actions: &mut TraversalActions) -> Option<C> {
    None
  }
}

struct EnterVisitor<F>(F);

impl<N, C, F> GraphVisitor<N, C> for EnterVisitor<F>
where
  F: FnMut(&N, Option<&C>, &mut TraversalActions) -> Option<C>,
{
  fn enter(&mut self, node: &N, context: Option<&C>, actions: &mut TraversalActions) -> Option<C> {
    (self.0)(node, context, actions)
  }
}

/// Only shows the visitor nodes the filter maps to a value
struct FilteredVisitor<'v, F, V> {
  filter: F,
  visitor: &'v mut V,
}

impl<'v, N, T, C, F, V> GraphVisitor<N, C> for FilteredVisitor<'v, F, V>
where
  F: Fn(&N) -> Option<T>,
  V: GraphVisitor<T, C>,
{
  fn enter(&mut self, node: &N, context: Option<&C>, actions: &mut TraversalActions) -> Option<C> {
    let value = (self.filter)(node)?;
    self.visitor.enter(&value, context, actions)
  }

  fn exit(&mut self, node: &N, context: Option<&C>, actions: &mut TraversalActions) -> Option<C> {
    let value = (self.filter)(node)?;
    self.visitor.exit(&value, context, actions)
  }
}

impl<N: GraphNode, E: Copy + Debug + PartialEq> Graph<N, E> {
  /// Depth-first traversal from `start` (or the root) along edges matching `edge_filter`
  ///
  /// Each node is visited once. The result is the context at the point the
  /// visitor called [`TraversalActions::stop`], or `None` when the traversal ran
  /// to completion.
  pub fn traverse<C, F>(&self, visit: F, start: Option<&str>, edge_filter: EdgeFilter<E>) -> Option<C>
  where
    C: Clone,
    F: FnMut(&N, Option<&C>, &mut TraversalActions) -> Option<C>,
  {
    self.traverse_with(&mut EnterVisitor(visit), start, edge_filter)
  }

  pub fn traverse_with<C, V>(
    &self,
    visitor: &mut V,
    start: Option<&str>,
    edge_filter: EdgeFilter<E>,
  ) -> Option<C>
  where
    C: Clone,
    V: GraphVisitor<N, C>,
  {
    let start = self.start_node_index(start);
    self.dfs(
      start,
      |node_index| self.neighbors(node_index, Direction::Outgoing, edge_filter),
      visitor,
    )
  }

  /// Like [`Graph::traverse`], but the visitor only sees nodes that `filter` maps to a value
  ///
  /// Nodes the filter rejects are still walked through.
  pub fn filtered_traverse<T, C, F, G>(
    &self,
    filter: F,
    visit: G,
    start: Option<&str>,
    edge_filter: EdgeFilter<E>,
  ) -> Option<C>
  where
    C: Clone,
    F: Fn(&N) -> Option<T>,
    G: FnMut(&T, Option<&C>, &mut TraversalActions) -> Option<C>,
  {
    let mut visitor = EnterVisitor(visit);
    self.traverse_with(
      &mut FilteredVisitor {
        filter,
        visitor: &mut visitor,
      },
      start,
      edge_filter,
    )
  }

  #[track_caller]
  fn start_node_index(&self, start: Option<&str>) -> NodeIndex {
    match (start, self.root_node_index) {
      (Some(id), _) => self.node_index(id),
      (None, Some(root)) => root,
      (None, None) => panic!("Graph has no root node to start a traversal from"),
    }
  }

  /// Depth-first walk driven by an explicit stack, so deep graphs cannot
  /// exhaust the thread stack
  pub(crate) fn dfs<C, V, G>(&self, start: NodeIndex, get_children: G, visitor: &mut V) -> Option<C>
  where
    C: Clone,
    V: GraphVisitor<N, C>,
    G: Fn(NodeIndex) -> Vec<NodeIndex>,
  {
    let mut visited = HashSet::from([start]);
    let mut actions = TraversalActions::default();
    let mut stack = Vec::new();

    match self.enter(start, None, &get_children, visitor, &mut actions) {
      Entered::Descend(frame) => stack.push(frame),
      Entered::Skipped => return None,
      Entered::Stopped(context) => return context,
    }

    while let Some(frame) = stack.last_mut() {
      if let Some(child) = frame.children.next() {
        if !visited.insert(child) {
          continue;
        }

        let context = frame.context.clone();
        match self.enter(child, context, &get_children, visitor, &mut actions) {
          Entered::Descend(frame) => stack.push(frame),
          Entered::Skipped => {}
          Entered::Stopped(context) => return context,
        }
        continue;
      }

      let Some(Frame {
        node_index,
        mut context,
        ..
      }) = stack.pop()
      else {
        break;
      };

      let node = self.node_weight(node_index);
      if let Some(next) = visitor.exit(node, context.as_ref(), &mut actions) {
        context = Some(next);
      }

      if actions.stopped {
        return context;
      }
    }

    None
  }

  fn enter<C, V, G>(
    &self,
    node_index: NodeIndex,
    mut context: Option<C>,
    get_children: &G,
    visitor: &mut V,
    actions: &mut TraversalActions,
  ) -> Entered<C>
  where
    V: GraphVisitor<N, C>,
    G: Fn(NodeIndex) -> Vec<NodeIndex>,
  {
    actions.skipped = false;

    let node = self.node_weight(node_index);
    if let Some(next) = visitor.enter(node, context.as_ref(), actions) {
      context = Some(next);
    }

    match (actions.skipped, actions.stopped) {
      (true, true) => Entered::Stopped(None),
      (true, false) => Entered::Skipped,
      (false, true) => Entered::Stopped(context),
      (false, false) => Entered::Descend(Frame {
        node_index,
        context,
        children: get_children(node_index).into_iter(),
      }),
    }
  }
}

/// A node whose children are still being walked
struct Frame<C> {
  node_index: NodeIndex,
  context: Option<C>,
  children: std::vec::IntoIter<NodeIndex>,
}

enum Entered<C> {
  Descend(Frame<C>),
  Skipped,
  Stopped(Option<C>),
}
