//! Hazard classification and barrier planning.
//!
//! The planner consumes the ordered node list and, for every resource
//! touched by more than one access, classifies the relationship between
//! consecutive accesses as a hazard (or not) and emits an ordered barrier
//! list. It is a pure function of the node list: it never consults the
//! binding table. The executor is solely responsible for reconciling
//! planned layouts with tracked state.

use std::collections::HashMap;

use crate::binding::{AspectMask, ImageLayout};
use crate::node::{AccessKind, GraphNode, ResourceAccess};

/// The ordering requirement between two accesses to the same resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HazardKind {
    /// A read must observe a prior write (RAW).
    ReadAfterWrite,
    /// A write must not begin before prior reads complete (WAR).
    WriteAfterRead,
    /// Two writes must be serialized (WAW).
    WriteAfterWrite,
}

/// The image subresource range a barrier affects.
///
/// Zero/full range for non-image resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubresourceRange {
    pub aspect_mask: AspectMask,
    pub base_layer: u32,
    pub layer_count: u32,
    pub base_mip: u32,
    pub mip_count: u32,
}

impl SubresourceRange {
    /// The full range of an image with the given aspect.
    pub fn full(aspect_mask: AspectMask) -> Self {
        Self {
            aspect_mask,
            base_layer: 0,
            layer_count: crate::node::ALL_SUBRESOURCES,
            base_mip: 0,
            mip_count: crate::node::ALL_SUBRESOURCES,
        }
    }

    /// The range covered by a declared access.
    fn for_access(access: &ResourceAccess) -> Self {
        Self {
            aspect_mask: aspect_for_layout(access.usage.required_layout()),
            base_layer: access.base_layer,
            layer_count: access.layer_count,
            base_mip: access.base_mip,
            mip_count: access.mip_count,
        }
    }
}

/// Aspect implied by a layout alone.
///
/// The planner has no access to bound formats, so depth layouts map to
/// `DEPTH` and everything else to `COLOR`; the executor widens the mask to
/// the bound format's actual aspects when issuing the backend transition.
fn aspect_for_layout(layout: ImageLayout) -> AspectMask {
    if layout.is_depth_stencil() {
        AspectMask::DEPTH
    } else {
        AspectMask::COLOR
    }
}

/// The unit of required synchronization between two accesses on one resource.
#[derive(Debug, Clone)]
pub struct Barrier {
    /// Logical resource name.
    pub resource: String,
    /// Fully-qualified id of the access being synchronized against.
    pub source_access: String,
    /// Fully-qualified id of the access this barrier protects.
    pub destination_access: String,
    /// Which hazard this barrier resolves.
    pub hazard: HazardKind,
    /// Required layout immediately before the barrier executes.
    pub before_layout: ImageLayout,
    /// Required layout immediately after the barrier executes.
    pub after_layout: ImageLayout,
    /// The affected subresource range.
    pub subresource: SubresourceRange,
    /// A synchronization point is still required even though
    /// `before_layout == after_layout` (WAW/WAR hazards that need a memory
    /// barrier but no layout transition).
    pub force_even_if_layout_unchanged: bool,
}

/// One access position in the per-resource access history.
#[derive(Debug, Clone, Copy)]
struct HistoryEntry {
    node_index: usize,
    sub_index: usize,
}

impl HistoryEntry {
    fn access<'a>(&self, nodes: &'a [GraphNode]) -> &'a ResourceAccess {
        &nodes[self.node_index].accesses()[self.sub_index]
    }

    fn access_id(&self, nodes: &[GraphNode]) -> String {
        nodes[self.node_index].access_id(self.sub_index)
    }
}

/// Classify a consecutive access pair. `None` means no hazard.
fn classify(prev: AccessKind, next: AccessKind) -> Option<HazardKind> {
    match (prev, next) {
        (AccessKind::Read, AccessKind::Read) => None,
        (AccessKind::Write, AccessKind::Read) => Some(HazardKind::ReadAfterWrite),
        (AccessKind::Read, AccessKind::Write) => Some(HazardKind::WriteAfterRead),
        (AccessKind::Write, AccessKind::Write) => Some(HazardKind::WriteAfterWrite),
    }
}

/// Produce the ordered barrier list for an ordered node list.
///
/// Barriers for a given resource come out in the same order their
/// destination accesses appear in the node sequence, and the returned list
/// as a whole is ordered by destination appearance; the executor relies on
/// this to process barriers as it advances through nodes without reordering
/// or searching ahead.
pub fn plan_barriers(nodes: &[GraphNode]) -> Vec<Barrier> {
    // Linear access history per resource, in node order then sub-index order.
    let mut histories: HashMap<&str, Vec<HistoryEntry>> = HashMap::new();
    for (node_index, node) in nodes.iter().enumerate() {
        for (sub_index, access) in node.accesses().iter().enumerate() {
            histories.entry(&access.resource).or_default().push(HistoryEntry {
                node_index,
                sub_index,
            });
        }
    }

    // Keyed emission so the final ordering is independent of map iteration.
    let mut keyed: Vec<((usize, usize), Barrier)> = Vec::new();

    for (resource, history) in &histories {
        // Single-access and all-read resources produce zero barriers.
        if history.len() < 2 {
            continue;
        }

        // Layout established by the last emitted barrier; seeded with the
        // first access's requirement, which the orchestrator must bind the
        // resource in. Intervening no-hazard pairs do not move it.
        let mut planned_layout = history[0].access(nodes).usage.required_layout();

        for pair in history.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            let prev_access = prev.access(nodes);
            let next_access = next.access(nodes);

            let Some(hazard) = classify(prev_access.kind(), next_access.kind()) else {
                continue;
            };

            let before_layout = planned_layout;
            let after_layout = next_access.usage.required_layout();

            keyed.push((
                (next.node_index, next.sub_index),
                Barrier {
                    resource: (*resource).to_string(),
                    source_access: prev.access_id(nodes),
                    destination_access: next.access_id(nodes),
                    hazard,
                    before_layout,
                    after_layout,
                    subresource: SubresourceRange::for_access(next_access),
                    force_even_if_layout_unchanged: before_layout == after_layout,
                },
            ));

            planned_layout = after_layout;
        }
    }

    keyed.sort_by_key(|(key, _)| *key);
    let barriers: Vec<Barrier> = keyed.into_iter().map(|(_, barrier)| barrier).collect();

    log::debug!(
        "planned {} barriers across {} nodes",
        barriers.len(),
        nodes.len()
    );
    barriers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{PassPhase, ResourceUsage};
    use rstest::rstest;

    fn writer(feature: &str, resource: &str, usage: ResourceUsage, phase: PassPhase) -> GraphNode {
        GraphNode::new(feature, "pass", 0, phase).with_resource(resource, usage)
    }

    #[rstest]
    #[case(AccessKind::Read, AccessKind::Read, None)]
    #[case(AccessKind::Write, AccessKind::Read, Some(HazardKind::ReadAfterWrite))]
    #[case(AccessKind::Read, AccessKind::Write, Some(HazardKind::WriteAfterRead))]
    #[case(AccessKind::Write, AccessKind::Write, Some(HazardKind::WriteAfterWrite))]
    fn test_classify_pairs(
        #[case] prev: AccessKind,
        #[case] next: AccessKind,
        #[case] expected: Option<HazardKind>,
    ) {
        assert_eq!(classify(prev, next), expected);
    }

    #[test]
    fn test_single_access_no_barriers() {
        let nodes = vec![writer(
            "geometry",
            "scene_color",
            ResourceUsage::RenderTargetWrite,
            PassPhase::Main,
        )];
        assert!(plan_barriers(&nodes).is_empty());
    }

    #[test]
    fn test_all_reads_no_barriers() {
        let nodes = vec![
            writer("a", "env_map", ResourceUsage::ShaderRead, PassPhase::Main),
            writer("b", "env_map", ResourceUsage::ShaderRead, PassPhase::Main),
            writer("c", "env_map", ResourceUsage::ShaderRead, PassPhase::PostMain),
        ];
        assert!(plan_barriers(&nodes).is_empty());
    }

    #[test]
    fn test_read_after_write_transition() {
        let nodes = vec![
            writer(
                "geometry",
                "scene_color",
                ResourceUsage::RenderTargetWrite,
                PassPhase::Main,
            ),
            writer("post", "scene_color", ResourceUsage::ShaderRead, PassPhase::PostMain),
        ];

        let barriers = plan_barriers(&nodes);
        assert_eq!(barriers.len(), 1);

        let barrier = &barriers[0];
        assert_eq!(barrier.resource, "scene_color");
        assert_eq!(barrier.hazard, HazardKind::ReadAfterWrite);
        assert_eq!(barrier.before_layout, ImageLayout::ColorAttachment);
        assert_eq!(barrier.after_layout, ImageLayout::ShaderReadOnly);
        assert!(!barrier.force_even_if_layout_unchanged);
        assert_eq!(barrier.source_access, "geometry:pass#0#0:write");
        assert_eq!(barrier.destination_access, "post:pass#0#0:read");
    }

    #[test]
    fn test_write_after_write_same_layout_forced() {
        let nodes = vec![
            writer("a", "scene_color", ResourceUsage::RenderTargetWrite, PassPhase::Main),
            writer("b", "scene_color", ResourceUsage::RenderTargetWrite, PassPhase::Main),
        ];

        let barriers = plan_barriers(&nodes);
        assert_eq!(barriers.len(), 1);
        assert_eq!(barriers[0].hazard, HazardKind::WriteAfterWrite);
        assert_eq!(barriers[0].before_layout, barriers[0].after_layout);
        assert!(barriers[0].force_even_if_layout_unchanged);
    }

    #[test]
    fn test_write_after_read() {
        let nodes = vec![
            writer("sample", "history", ResourceUsage::ShaderRead, PassPhase::Main),
            writer("update", "history", ResourceUsage::RenderTargetWrite, PassPhase::PostMain),
        ];

        let barriers = plan_barriers(&nodes);
        assert_eq!(barriers.len(), 1);
        assert_eq!(barriers[0].hazard, HazardKind::WriteAfterRead);
        assert_eq!(barriers[0].before_layout, ImageLayout::ShaderReadOnly);
        assert_eq!(barriers[0].after_layout, ImageLayout::ColorAttachment);
    }

    #[test]
    fn test_intervening_reads_keep_chain_consistent() {
        // write -> read (barrier) -> read (none) -> write. The final WAR
        // barrier must depart from the layout the first barrier established,
        // not from the second read's nominal layout.
        let nodes = vec![
            writer("g", "scene_depth", ResourceUsage::DepthStencilWrite, PassPhase::Main),
            writer("ssao", "scene_depth", ResourceUsage::ShaderRead, PassPhase::PostMain),
            writer("fog", "scene_depth", ResourceUsage::ShaderRead, PassPhase::PostMain),
            writer("reuse", "scene_depth", ResourceUsage::DepthStencilWrite, PassPhase::Auxiliary),
        ];

        let barriers = plan_barriers(&nodes);
        assert_eq!(barriers.len(), 2);

        assert_eq!(barriers[0].hazard, HazardKind::ReadAfterWrite);
        assert_eq!(barriers[0].before_layout, ImageLayout::DepthStencilAttachment);
        assert_eq!(barriers[0].after_layout, ImageLayout::ShaderReadOnly);

        assert_eq!(barriers[1].hazard, HazardKind::WriteAfterRead);
        assert_eq!(barriers[1].before_layout, ImageLayout::ShaderReadOnly);
        assert_eq!(barriers[1].after_layout, ImageLayout::DepthStencilAttachment);
    }

    #[test]
    fn test_barriers_ordered_by_destination() {
        // Two independent resources interleaved across three nodes; the
        // barrier list must follow destination appearance order globally.
        let nodes = vec![
            GraphNode::new("shadow", "cascade", 0, PassPhase::PreMain)
                .with_resource("shadow_atlas", ResourceUsage::DepthStencilWrite),
            GraphNode::new("geometry", "main", 0, PassPhase::Main)
                .with_resource("shadow_atlas", ResourceUsage::ShaderRead)
                .with_resource("scene_color", ResourceUsage::RenderTargetWrite),
            GraphNode::new("post", "composite", 0, PassPhase::PostMain)
                .with_resource("scene_color", ResourceUsage::ShaderRead),
        ];

        let barriers = plan_barriers(&nodes);
        assert_eq!(barriers.len(), 2);
        assert_eq!(barriers[0].resource, "shadow_atlas");
        assert_eq!(barriers[0].destination_access, "geometry:main#0#0:read");
        assert_eq!(barriers[1].resource, "scene_color");
        assert_eq!(barriers[1].destination_access, "post:composite#0#0:read");
    }

    #[test]
    fn test_multiple_accesses_within_one_node() {
        // A node that both samples and re-writes the same resource hazards
        // against itself in sub-index order.
        let nodes = vec![
            writer("a", "ping", ResourceUsage::RenderTargetWrite, PassPhase::Main),
            GraphNode::new("b", "pong", 0, PassPhase::PostMain)
                .with_resource("ping", ResourceUsage::ShaderRead)
                .with_resource("ping", ResourceUsage::RenderTargetWrite),
        ];

        let barriers = plan_barriers(&nodes);
        assert_eq!(barriers.len(), 2);
        assert_eq!(barriers[0].destination_access, "b:pong#0#0:read");
        assert_eq!(barriers[1].destination_access, "b:pong#0#1:write");
        assert_eq!(barriers[1].hazard, HazardKind::WriteAfterRead);
    }

    #[test]
    fn test_storage_read_write_forces_memory_barrier() {
        let nodes = vec![
            writer("sim", "particles", ResourceUsage::StorageReadWrite, PassPhase::PreMain),
            writer("sort", "particles", ResourceUsage::StorageReadWrite, PassPhase::PreMain),
        ];

        let barriers = plan_barriers(&nodes);
        assert_eq!(barriers.len(), 1);
        assert_eq!(barriers[0].hazard, HazardKind::WriteAfterWrite);
        assert_eq!(barriers[0].before_layout, ImageLayout::General);
        assert!(barriers[0].force_even_if_layout_unchanged);
    }

    #[test]
    fn test_subresource_range_from_access() {
        let nodes = vec![
            GraphNode::new("shadow", "cascade", 1, PassPhase::PreMain).with_access(
                ResourceAccess::new("shadow_atlas", ResourceUsage::DepthStencilWrite)
                    .with_array_layers(1, 1),
            ),
            GraphNode::new("geometry", "main", 0, PassPhase::Main).with_access(
                ResourceAccess::new("shadow_atlas", ResourceUsage::ShaderRead)
                    .with_array_layers(1, 1),
            ),
        ];

        let barriers = plan_barriers(&nodes);
        assert_eq!(barriers.len(), 1);
        assert_eq!(barriers[0].subresource.base_layer, 1);
        assert_eq!(barriers[0].subresource.layer_count, 1);
        assert_eq!(barriers[0].subresource.aspect_mask, AspectMask::COLOR);
    }
}
