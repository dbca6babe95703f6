//! Common utilities for frame graph integration tests.
//!
//! Provides small feature modules that mimic a real renderer's producers
//! (shadow cascades, main geometry, post composite) plus a backend double
//! that records every synchronization call for inspection.

use std::cell::RefCell;
use std::rc::Rc;

use frame_graph::{
    BindingTable, DeclareContext, FeatureModule, GraphBackend, GraphBuilder, GraphNode,
    GraphResult, HazardKind, ImageHandle, ImageLayout, PassPhase, ResourceAccess, ResourceUsage,
    SubresourceRange, TextureFormat,
};

/// Shared log of callback invocations, by node id.
pub type ExecutionLog = Rc<RefCell<Vec<String>>>;

/// Create an empty execution log.
pub fn execution_log() -> ExecutionLog {
    Rc::new(RefCell::new(Vec::new()))
}

fn logging_callback(log: &ExecutionLog, node_id: String) -> frame_graph::PassCallback {
    let log = Rc::clone(log);
    Box::new(move |_ctx| {
        log.borrow_mut().push(node_id.clone());
        Ok(())
    })
}

/// Shadow feature: one depth-only pass per cascade, each writing its own
/// layer of the shadow atlas. Uses the index resolver for the base layer.
pub struct ShadowFeature {
    pub cascade_count: u32,
    pub log: ExecutionLog,
}

impl FeatureModule for ShadowFeature {
    fn feature_id(&self) -> &str {
        "shadow"
    }

    fn declare_passes(
        &self,
        builder: &mut GraphBuilder,
        ctx: &DeclareContext<'_>,
    ) -> GraphResult<()> {
        let base_layer = ctx.resolve_index("shadow_atlas").unwrap_or(0);
        for cascade in 0..self.cascade_count {
            let node = GraphNode::new("shadow", "cascade", cascade, PassPhase::PreMain)
                .with_access(
                    ResourceAccess::new("shadow_atlas", ResourceUsage::DepthStencilWrite)
                        .with_array_layers(base_layer + cascade, 1),
                );
            let id = node.id().to_string();
            builder.add_node(node, logging_callback(&self.log, id))?;
        }
        Ok(())
    }
}

/// Main geometry feature: samples the shadow atlas, writes scene color and
/// depth.
pub struct GeometryFeature {
    pub log: ExecutionLog,
}

impl FeatureModule for GeometryFeature {
    fn feature_id(&self) -> &str {
        "geometry"
    }

    fn declare_passes(
        &self,
        builder: &mut GraphBuilder,
        _ctx: &DeclareContext<'_>,
    ) -> GraphResult<()> {
        let node = GraphNode::new("geometry", "opaque", 0, PassPhase::Main)
            .with_resource("shadow_atlas", ResourceUsage::ShaderRead)
            .with_resource("scene_color", ResourceUsage::RenderTargetWrite)
            .with_resource("scene_depth", ResourceUsage::DepthStencilWrite)
            .with_required_scope("shadow");
        let id = node.id().to_string();
        builder.add_node(node, logging_callback(&self.log, id))
    }
}

/// Post composite feature: samples scene color, writes the backbuffer.
/// Marked side-effectful because the backbuffer has no declared consumer.
pub struct CompositeFeature {
    pub log: ExecutionLog,
}

impl FeatureModule for CompositeFeature {
    fn feature_id(&self) -> &str {
        "post"
    }

    fn declare_passes(
        &self,
        builder: &mut GraphBuilder,
        _ctx: &DeclareContext<'_>,
    ) -> GraphResult<()> {
        let node = GraphNode::new("post", "composite", 0, PassPhase::PostMain)
            .with_resource("scene_color", ResourceUsage::ShaderRead)
            .with_resource("backbuffer", ResourceUsage::RenderTargetWrite)
            .with_side_effects();
        let id = node.id().to_string();
        builder.add_node(node, logging_callback(&self.log, id))
    }
}

/// One synchronization call observed by [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Transition {
        resource_handle: u64,
        from: ImageLayout,
        to: ImageLayout,
    },
    Barrier {
        hazard: HazardKind,
        resource: String,
    },
}

/// Backend double that records every call the executor issues.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub calls: Vec<RecordedCall>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GraphBackend for RecordingBackend {
    fn name(&self) -> &str {
        "Recording"
    }

    fn transition_resource(
        &mut self,
        handle: ImageHandle,
        from: ImageLayout,
        to: ImageLayout,
        _range: &SubresourceRange,
    ) -> GraphResult<()> {
        self.calls.push(RecordedCall::Transition {
            resource_handle: handle.raw(),
            from,
            to,
        });
        Ok(())
    }

    fn record_barrier(&mut self, hazard: HazardKind, resource: &str) -> GraphResult<()> {
        self.calls.push(RecordedCall::Barrier {
            hazard,
            resource: resource.to_string(),
        });
        Ok(())
    }
}

/// Bind the frame's resource universe with layouts matching first use.
pub fn standard_bindings() -> BindingTable {
    let mut table = BindingTable::new();
    table.bind(
        "shadow_atlas",
        ImageHandle::from_raw(1),
        TextureFormat::Depth32Float,
        ImageLayout::DepthStencilAttachment,
    );
    table.bind(
        "scene_color",
        ImageHandle::from_raw(2),
        TextureFormat::Rgba16Float,
        ImageLayout::ColorAttachment,
    );
    table.bind(
        "scene_depth",
        ImageHandle::from_raw(3),
        TextureFormat::Depth24PlusStencil8,
        ImageLayout::DepthStencilAttachment,
    );
    table.bind(
        "backbuffer",
        ImageHandle::from_raw(4),
        TextureFormat::Bgra8Unorm,
        ImageLayout::ColorAttachment,
    );
    table
}
