//! # frame-graph
//!
//! Per-frame render dependency graph: turns independently declared
//! rendering passes into a single, correctly-synchronized sequence of GPU
//! work.
//!
//! ## Overview
//!
//! Four components, built bottom-up:
//!
//! - [`BindingTable`] - logical resource name to physical handle plus
//!   tracked image layout
//! - [`GraphBuilder`] - collects nodes contributed by feature modules,
//!   orders them by phase then declaration order
//! - [`plan_barriers`] - classifies RAW/WAR/WAW hazards between consecutive
//!   accesses and emits the ordered barrier list
//! - [`GraphExecutor`] - applies barriers (validating tracked state) and
//!   invokes each node's callback, in plan order
//!
//! ## Example
//!
//! ```
//! use frame_graph::{
//!     BindingTable, DummyBackend, GraphBuilder, GraphExecutor, GraphNode, ImageHandle,
//!     ImageLayout, PassPhase, ResourceUsage, TextureFormat,
//! };
//!
//! let mut builder = GraphBuilder::new();
//! builder.add_node(
//!     GraphNode::new("geometry", "main", 0, PassPhase::Main)
//!         .with_resource("scene_color", ResourceUsage::RenderTargetWrite),
//!     Box::new(|_ctx| Ok(())),
//! )?;
//! builder.add_node(
//!     GraphNode::new("post", "composite", 0, PassPhase::PostMain)
//!         .with_resource("scene_color", ResourceUsage::ShaderRead),
//!     Box::new(|_ctx| Ok(())),
//! )?;
//! let plan = builder.build()?;
//!
//! let mut bindings = BindingTable::new();
//! bindings.bind(
//!     "scene_color",
//!     ImageHandle::from_raw(1),
//!     TextureFormat::Rgba16Float,
//!     ImageLayout::ColorAttachment,
//! );
//!
//! let mut backend = DummyBackend::new();
//! GraphExecutor::new(true).execute(&plan, &mut bindings, &mut backend)?;
//! # Ok::<(), frame_graph::FrameGraphError>(())
//! ```
//!
//! Scheduling is single-threaded, fully deterministic replay: a plan either
//! executes to completion or raises a fatal, frame-aborting error.

pub mod backend;
pub mod binding;
pub mod builder;
pub mod error;
pub mod executor;
pub mod node;
pub mod plan;
pub mod planner;

pub use backend::{DummyBackend, GraphBackend};
pub use binding::{
    AspectMask, BindingTable, ImageHandle, ImageLayout, ResourceBinding, TextureFormat,
};
pub use builder::{DeclareContext, FeatureModule, FeatureRegistry, GraphBuilder};
pub use error::{FrameGraphError, GraphResult};
pub use executor::GraphExecutor;
pub use node::{
    destination_node_id, AccessKind, GraphNode, NodeId, PassPhase, ResourceAccess, ResourceUsage,
};
pub use plan::{ExecuteContext, GraphPlan, PassCallback};
pub use planner::{plan_barriers, Barrier, HazardKind, SubresourceRange};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log the crate version; call once before building frame graphs.
pub fn init() {
    log::info!("frame-graph v{VERSION} initialized");
}
