//! Graph declaration: node collection and the feature-module seam.
//!
//! Feature modules are independent producers; each receives the builder and
//! a declaration context and contributes zero or more nodes with execute
//! callbacks. The builder is the sole scheduling authority: `build` orders
//! nodes by phase, then by insertion order within a phase. There is no
//! separate topological sort.

use std::collections::HashMap;

use crate::error::{FrameGraphError, GraphResult};
use crate::node::{GraphNode, NodeId};
use crate::plan::{GraphPlan, PassCallback};
use crate::planner::plan_barriers;

/// Resolves a logical resource name to an index-based physical address,
/// e.g. a texture-array layer.
pub type ResourceIndexResolver<'a> = dyn Fn(&str) -> Option<u32> + 'a;

/// Inputs handed to every feature module during declaration.
pub struct DeclareContext<'a> {
    /// Shader/feature modules active for this frame configuration.
    pub active_shader_modules: &'a [String],
    /// Logical name to array-layer index resolution.
    pub resource_index_resolver: &'a ResourceIndexResolver<'a>,
}

impl<'a> DeclareContext<'a> {
    /// Create a context for one declaration round.
    pub fn new(
        active_shader_modules: &'a [String],
        resource_index_resolver: &'a ResourceIndexResolver<'a>,
    ) -> Self {
        Self {
            active_shader_modules,
            resource_index_resolver,
        }
    }

    /// Resolve a logical resource name to its array-layer index.
    pub fn resolve_index(&self, resource: &str) -> Option<u32> {
        (self.resource_index_resolver)(resource)
    }

    /// Check whether a shader module is active.
    pub fn is_module_active(&self, module: &str) -> bool {
        self.active_shader_modules.iter().any(|m| m == module)
    }
}

/// One feature's pass contribution logic.
///
/// Implementations own their pass structure entirely; the core makes no
/// assumption about what a callback does internally.
pub trait FeatureModule {
    /// Stable feature identifier, the first component of its node ids.
    fn feature_id(&self) -> &str;

    /// Contribute this feature's nodes for the current configuration.
    fn declare_passes(
        &self,
        builder: &mut GraphBuilder,
        ctx: &DeclareContext<'_>,
    ) -> GraphResult<()>;
}

/// Registered set of feature modules, invoked in registration order.
#[derive(Default)]
pub struct FeatureRegistry {
    modules: Vec<Box<dyn FeatureModule>>,
}

impl FeatureRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a feature module. Registration order is the fixed
    /// feature-processing order.
    pub fn register(&mut self, module: Box<dyn FeatureModule>) {
        log::debug!("registered feature '{}'", module.feature_id());
        self.modules.push(module);
    }

    /// Invoke every module's declaration in registration order.
    pub fn declare_all(
        &self,
        builder: &mut GraphBuilder,
        ctx: &DeclareContext<'_>,
    ) -> GraphResult<()> {
        for module in &self.modules {
            module.declare_passes(builder, ctx)?;
        }
        Ok(())
    }

    /// Number of registered modules.
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Ids of registered features, in registration order.
    pub fn feature_ids(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|m| m.feature_id())
    }
}

/// Collects nodes and callbacks, then builds the frame's plan.
#[derive(Default)]
pub struct GraphBuilder {
    nodes: Vec<GraphNode>,
    callbacks: HashMap<NodeId, PassCallback>,
}

impl GraphBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node with its execute callback.
    ///
    /// Node ids must be unique across the whole frame; a collision is a
    /// caller bug and fails immediately rather than silently overwriting.
    pub fn add_node(&mut self, node: GraphNode, callback: PassCallback) -> GraphResult<()> {
        if self.callbacks.contains_key(node.id()) {
            return Err(FrameGraphError::DuplicateNodeId(node.id().to_string()));
        }
        log::trace!(
            "declared node '{}' ({:?}, {} accesses)",
            node.id(),
            node.phase(),
            node.accesses().len()
        );
        self.callbacks.insert(node.id().clone(), callback);
        self.nodes.push(node);
        Ok(())
    }

    /// Number of declared nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Order nodes, plan barriers, and assemble the executable plan.
    ///
    /// Nodes are sorted primarily by phase (in its fixed enumeration order)
    /// and secondarily by insertion order within a phase; the sort is stable
    /// so insertion order is preserved. The returned plan is validated.
    pub fn build(mut self) -> GraphResult<GraphPlan> {
        self.nodes.sort_by_key(GraphNode::phase);

        let barriers = plan_barriers(&self.nodes);
        log::debug!(
            "built plan: {} nodes, {} barriers",
            self.nodes.len(),
            barriers.len()
        );

        let plan = GraphPlan::new(self.nodes, barriers, self.callbacks);
        plan.validate()?;
        Ok(plan)
    }
}
