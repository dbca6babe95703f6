//! Graph execution: barriers, layout tracking, callback dispatch.
//!
//! The executor walks the plan's nodes in order, applies each node's due
//! barriers (updating the binding table and validating consistency as it
//! goes), then invokes the node's callback. It never reorders, never skips,
//! and never parallelizes; GPU command buffers are a strictly ordered
//! instruction stream, so correctness here is deterministic ordering.

use crate::backend::GraphBackend;
use crate::binding::BindingTable;
use crate::error::{FrameGraphError, GraphResult};
use crate::node::destination_node_id;
use crate::plan::{ExecuteContext, GraphPlan};
use crate::planner::{Barrier, SubresourceRange};

/// Walks an executable plan node by node.
///
/// The construction-time mode flag decides whether backend synchronization
/// calls are actually issued: with `record_backend_commands = false` the
/// executor performs only the logical bookkeeping (layout tracking and
/// validation), which exercises the whole sequencing path with no graphics
/// device present. Callback order and final tracked layouts are identical
/// in both modes.
#[derive(Debug)]
pub struct GraphExecutor {
    record_backend_commands: bool,
}

impl GraphExecutor {
    /// Create an executor.
    ///
    /// `record_backend_commands = true` issues real backend transitions and
    /// barriers; `false` is logical-only (dry-run) mode.
    pub fn new(record_backend_commands: bool) -> Self {
        Self {
            record_backend_commands,
        }
    }

    /// Whether this executor issues backend commands.
    pub fn records_backend_commands(&self) -> bool {
        self.record_backend_commands
    }

    /// Run every node in plan order.
    ///
    /// Fails fast on the first inconsistency; a malformed plan replays the
    /// same error deterministically, so nothing is retried.
    pub fn execute(
        &self,
        plan: &GraphPlan,
        bindings: &mut BindingTable,
        backend: &mut dyn GraphBackend,
    ) -> GraphResult<()> {
        log::debug!(
            "executing plan: {} nodes, {} barriers ({} mode, backend '{}')",
            plan.node_count(),
            plan.barriers().len(),
            if self.record_backend_commands {
                "full"
            } else {
                "dry-run"
            },
            backend.name()
        );

        for node in plan.nodes() {
            // Barriers are visited in the barrier list's own order, which
            // already matches destination order within a node.
            for barrier in plan
                .barriers()
                .iter()
                .filter(|b| destination_node_id(&b.destination_access) == node.id().as_str())
            {
                self.apply_barrier(barrier, bindings, backend)?;
            }

            let callback = plan
                .callback(node.id())
                .ok_or_else(|| FrameGraphError::MissingCallback(node.id().to_string()))?;

            log::trace!("executing node '{}'", node.id());
            let mut ctx = ExecuteContext {
                node,
                bindings,
                backend,
            };
            callback(&mut ctx)?;
        }

        Ok(())
    }

    /// Validate and apply one barrier, updating the tracked layout.
    fn apply_barrier(
        &self,
        barrier: &Barrier,
        bindings: &mut BindingTable,
        backend: &mut dyn GraphBackend,
    ) -> GraphResult<()> {
        let binding = bindings.resolve_image(&barrier.resource)?;

        let actual = binding.current_layout();
        if actual != barrier.before_layout {
            return Err(FrameGraphError::LayoutMismatch {
                resource: barrier.resource.clone(),
                expected: barrier.before_layout,
                actual,
            });
        }

        let handle = binding.handle();
        let aspect_mask = binding.aspect_mask();

        if self.record_backend_commands {
            backend.record_barrier(barrier.hazard, &barrier.resource)?;
            if barrier.before_layout != barrier.after_layout {
                // The planner only knows layouts; the bound format decides
                // the real aspect mask.
                let range = SubresourceRange {
                    aspect_mask,
                    ..barrier.subresource
                };
                backend.transition_resource(
                    handle,
                    barrier.before_layout,
                    barrier.after_layout,
                    &range,
                )?;
            }
        }

        bindings.transition_to(&barrier.resource, barrier.after_layout)
    }
}
