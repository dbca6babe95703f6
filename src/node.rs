//! Graph nodes and their resource access declarations.
//!
//! A node is one scheduled rendering pass instance. Nodes carry an ordered
//! sequence of resource accesses; the position of an access in that sequence
//! is its sub-index, and `"<node_id>#<sub>:<read|write>"` is the
//! fully-qualified access id used to anchor barriers.

use std::fmt;

use crate::binding::ImageLayout;

/// Coarse ordering bucket for nodes.
///
/// Phases never reorder relative to each other once assigned; within a
/// phase, declaration order is preserved. The derived `Ord` follows the
/// declaration order below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PassPhase {
    /// Shadow and other utility passes that run before the main scene.
    PreMain,
    /// Primary geometry and lighting.
    Main,
    /// Post-composite passes.
    PostMain,
    /// Anything else, e.g. recursive or planar captures.
    Auxiliary,
}

/// Whether an access reads or writes the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessKind {
    Read,
    Write,
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
        }
    }
}

/// How an access uses the resource.
///
/// The usage determines both the access kind (read/write) and the layout
/// the resource must be in for the operation to be valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceUsage {
    /// Written as color render target.
    RenderTargetWrite,
    /// Written as depth/stencil render target.
    DepthStencilWrite,
    /// Read-only depth/stencil (sampling + depth test).
    DepthStencilReadOnly,
    /// Sampled in a shader.
    ShaderRead,
    /// Read/write as storage image.
    StorageReadWrite,
    /// Source of a copy operation.
    TransferRead,
    /// Destination of a copy operation.
    TransferWrite,
}

impl ResourceUsage {
    /// The access kind this usage implies. `StorageReadWrite` counts as a
    /// write for hazard purposes.
    pub fn kind(self) -> AccessKind {
        match self {
            Self::RenderTargetWrite
            | Self::DepthStencilWrite
            | Self::StorageReadWrite
            | Self::TransferWrite => AccessKind::Write,
            Self::DepthStencilReadOnly | Self::ShaderRead | Self::TransferRead => AccessKind::Read,
        }
    }

    /// The layout the resource must be in for this usage.
    pub fn required_layout(self) -> ImageLayout {
        match self {
            Self::RenderTargetWrite => ImageLayout::ColorAttachment,
            Self::DepthStencilWrite => ImageLayout::DepthStencilAttachment,
            Self::DepthStencilReadOnly => ImageLayout::DepthStencilReadOnly,
            Self::ShaderRead => ImageLayout::ShaderReadOnly,
            Self::StorageReadWrite => ImageLayout::General,
            Self::TransferRead => ImageLayout::TransferSrc,
            Self::TransferWrite => ImageLayout::TransferDst,
        }
    }

    /// Check if this usage writes the resource.
    pub fn is_write(self) -> bool {
        self.kind() == AccessKind::Write
    }

    /// Check if this usage only reads the resource.
    pub fn is_read(self) -> bool {
        self.kind() == AccessKind::Read
    }
}

/// Stable string identity of a node, conventionally
/// `"<feature_id>:<pass_id>#<instance>"`.
///
/// The instance index disambiguates a feature that emits the same pass
/// multiple times, e.g. once per shadow cascade.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeId(String);

impl NodeId {
    /// Create a node id from an already-formatted string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create the conventional `"<feature>:<pass>#<instance>"` id.
    pub fn for_pass(feature_id: &str, pass_id: &str, instance: u32) -> Self {
        Self(format!("{feature_id}:{pass_id}#{instance}"))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Extract the node id out of a fully-qualified access id.
///
/// Strips the trailing `"#<sub>:<kind>"` suffix by truncating at the last
/// `#`. An id without a `#` is returned unchanged.
pub fn destination_node_id(access_id: &str) -> &str {
    match access_id.rfind('#') {
        Some(pos) => &access_id[..pos],
        None => access_id,
    }
}

/// One declared read or write performed by a node.
#[derive(Debug, Clone)]
pub struct ResourceAccess {
    /// Logical resource name, resolved against the binding table at
    /// execution time.
    pub resource: String,
    /// How the resource is accessed.
    pub usage: ResourceUsage,
    /// Starting array layer.
    pub base_layer: u32,
    /// Number of array layers; `ALL_SUBRESOURCES` for the full range.
    pub layer_count: u32,
    /// Starting mip level.
    pub base_mip: u32,
    /// Number of mip levels; `ALL_SUBRESOURCES` for the full range.
    pub mip_count: u32,
}

/// Sentinel meaning "all remaining layers/mips" in a subresource range.
pub const ALL_SUBRESOURCES: u32 = u32::MAX;

impl ResourceAccess {
    /// Create an access covering the resource's full subresource range.
    pub fn new(resource: impl Into<String>, usage: ResourceUsage) -> Self {
        Self {
            resource: resource.into(),
            usage,
            base_layer: 0,
            layer_count: ALL_SUBRESOURCES,
            base_mip: 0,
            mip_count: ALL_SUBRESOURCES,
        }
    }

    /// Restrict the access to an array layer range.
    pub fn with_array_layers(mut self, base: u32, count: u32) -> Self {
        self.base_layer = base;
        self.layer_count = count;
        self
    }

    /// Restrict the access to a mip level range.
    pub fn with_mip_levels(mut self, base: u32, count: u32) -> Self {
        self.base_mip = base;
        self.mip_count = count;
        self
    }

    /// The access kind implied by the usage.
    pub fn kind(&self) -> AccessKind {
        self.usage.kind()
    }
}

/// One scheduled unit of GPU work in the frame graph.
#[derive(Debug, Clone)]
pub struct GraphNode {
    id: NodeId,
    feature_id: String,
    pass_id: String,
    phase: PassPhase,
    accesses: Vec<ResourceAccess>,
    required_feature_scopes: Vec<String>,
    has_side_effects: bool,
}

impl GraphNode {
    /// Create a node with the conventional `"<feature>:<pass>#<instance>"` id.
    pub fn new(feature_id: &str, pass_id: &str, instance: u32, phase: PassPhase) -> Self {
        Self {
            id: NodeId::for_pass(feature_id, pass_id, instance),
            feature_id: feature_id.to_string(),
            pass_id: pass_id.to_string(),
            phase,
            accesses: Vec::new(),
            required_feature_scopes: Vec::new(),
            has_side_effects: false,
        }
    }

    /// Append a resource access to the node's access sequence.
    pub fn with_access(mut self, access: ResourceAccess) -> Self {
        self.accesses.push(access);
        self
    }

    /// Shorthand for appending a full-range access.
    pub fn with_resource(self, resource: impl Into<String>, usage: ResourceUsage) -> Self {
        self.with_access(ResourceAccess::new(resource, usage))
    }

    /// Declare a logical dependency on another feature's scope.
    ///
    /// Consumed by validation upstream; not a scheduling input here.
    pub fn with_required_scope(mut self, feature_id: impl Into<String>) -> Self {
        self.required_feature_scopes.push(feature_id.into());
        self
    }

    /// Mark the node as having side effects, i.e. it must execute even with
    /// no declared consumer. Carried through for upstream dead-pass analysis;
    /// this core never elides nodes.
    pub fn with_side_effects(mut self) -> Self {
        self.has_side_effects = true;
        self
    }

    /// The node's stable identity.
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// The contributing feature's id.
    pub fn feature_id(&self) -> &str {
        &self.feature_id
    }

    /// The pass id within the feature.
    pub fn pass_id(&self) -> &str {
        &self.pass_id
    }

    /// The ordering bucket this node was assigned to.
    pub fn phase(&self) -> PassPhase {
        self.phase
    }

    /// The node's ordered access sequence.
    pub fn accesses(&self) -> &[ResourceAccess] {
        &self.accesses
    }

    /// Accesses that read their resource.
    pub fn reads(&self) -> impl Iterator<Item = &ResourceAccess> {
        self.accesses.iter().filter(|a| a.usage.is_read())
    }

    /// Accesses that write their resource.
    pub fn writes(&self) -> impl Iterator<Item = &ResourceAccess> {
        self.accesses.iter().filter(|a| a.usage.is_write())
    }

    /// Feature scopes this node logically depends on.
    pub fn required_feature_scopes(&self) -> &[String] {
        &self.required_feature_scopes
    }

    /// Whether the node must execute even with no declared consumer.
    pub fn has_side_effects(&self) -> bool {
        self.has_side_effects
    }

    /// Format the fully-qualified access id for one of this node's accesses.
    ///
    /// Panics if `sub_index` is out of range; access ids are only formed for
    /// accesses that exist.
    pub fn access_id(&self, sub_index: usize) -> String {
        let access = &self.accesses[sub_index];
        format!("{}#{}:{}", self.id, sub_index, access.kind())
    }
}
