//! The executable graph plan: ordered nodes, ordered barriers, callbacks.
//!
//! A plan is built once per frame configuration and replayed verbatim while
//! the configuration holds. The executor never mutates it, so it is safe to
//! keep across frames and read from multiple consumers.

use std::collections::HashMap;

use crate::backend::GraphBackend;
use crate::binding::BindingTable;
use crate::error::{FrameGraphError, GraphResult};
use crate::node::{destination_node_id, GraphNode, NodeId};
use crate::planner::Barrier;

/// Everything a pass callback may touch while recording its GPU work.
///
/// Bindings are read-only here; layout tracking belongs to the executor.
pub struct ExecuteContext<'a> {
    /// The node currently executing.
    pub node: &'a GraphNode,
    /// The frame's resource bindings.
    pub bindings: &'a BindingTable,
    /// The backend recording seam.
    pub backend: &'a mut dyn GraphBackend,
}

/// Deferred execution callback for one node.
///
/// The executor only invokes it, never introspects it.
pub type PassCallback = Box<dyn Fn(&mut ExecuteContext<'_>) -> GraphResult<()>>;

/// The immutable bundle handed to the executor.
pub struct GraphPlan {
    nodes: Vec<GraphNode>,
    barriers: Vec<Barrier>,
    callbacks: HashMap<NodeId, PassCallback>,
}

impl GraphPlan {
    /// Assemble a plan from its parts.
    ///
    /// Normally produced by [`GraphBuilder::build`](crate::builder::GraphBuilder::build);
    /// constructing one by hand is useful for replay tooling and tests.
    pub fn new(
        nodes: Vec<GraphNode>,
        barriers: Vec<Barrier>,
        callbacks: HashMap<NodeId, PassCallback>,
    ) -> Self {
        Self {
            nodes,
            barriers,
            callbacks,
        }
    }

    /// The plan's nodes in execution order.
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// The plan's barriers, ordered by destination access appearance.
    pub fn barriers(&self) -> &[Barrier] {
        &self.barriers
    }

    /// Number of nodes in the plan.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Look up a node's execute callback.
    pub fn callback(&self, id: &NodeId) -> Option<&PassCallback> {
        self.callbacks.get(id)
    }

    /// Structural self-check before replaying a cached plan.
    ///
    /// Verifies that every node has a callback and every barrier's
    /// destination belongs to a node in the plan. Execution performs the
    /// same checks lazily; this surfaces them up front.
    pub fn validate(&self) -> GraphResult<()> {
        for node in &self.nodes {
            if !self.callbacks.contains_key(node.id()) {
                return Err(FrameGraphError::MissingCallback(node.id().to_string()));
            }
        }
        for barrier in &self.barriers {
            let dest_node = destination_node_id(&barrier.destination_access);
            if !self.nodes.iter().any(|n| n.id().as_str() == dest_node) {
                return Err(FrameGraphError::DanglingBarrier(
                    barrier.destination_access.clone(),
                ));
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for GraphPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphPlan")
            .field("nodes", &self.nodes.len())
            .field("barriers", &self.barriers.len())
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}
