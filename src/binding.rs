//! Resource binding table: the seam between logical names and physical images.
//!
//! Feature modules declare resources by name ("scene_color", "shadow_atlas");
//! the backend resource layer decides the physical allocation. The binding
//! table is the single place where the two meet, and the only mutable shared
//! state in the core: `current_layout` is updated exclusively by the executor
//! as barriers are applied.

use std::collections::HashMap;

use crate::error::{FrameGraphError, GraphResult};

/// Logical usage state of an image resource.
///
/// These mirror the layout states a graphics backend distinguishes for
/// images (render-target-writable vs. shader-readable and so on). `General`
/// doubles as the generic layout for non-image resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageLayout {
    /// Initial state, contents undefined.
    #[default]
    Undefined,
    /// Optimal for color attachment writes.
    ColorAttachment,
    /// Optimal for depth/stencil attachment writes.
    DepthStencilAttachment,
    /// Optimal for depth read-only (sampling + depth testing).
    DepthStencilReadOnly,
    /// Optimal for shader sampling.
    ShaderReadOnly,
    /// Optimal for transfer source operations.
    TransferSrc,
    /// Optimal for transfer destination operations.
    TransferDst,
    /// Optimal for presentation to the swapchain.
    PresentSrc,
    /// General layout; least optimal but most flexible.
    General,
}

impl ImageLayout {
    /// Check if this is a depth/stencil layout.
    pub fn is_depth_stencil(self) -> bool {
        matches!(
            self,
            Self::DepthStencilAttachment | Self::DepthStencilReadOnly
        )
    }
}

bitflags::bitflags! {
    /// Which aspects of an image a barrier affects.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AspectMask: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

/// Texture formats the binding table distinguishes for aspect resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    Rgba8Unorm,
    Bgra8Unorm,
    Rgba16Float,
    R32Float,
    Depth32Float,
    Depth24PlusStencil8,
}

impl TextureFormat {
    /// Check if this format has a depth component.
    pub fn has_depth(self) -> bool {
        matches!(self, Self::Depth32Float | Self::Depth24PlusStencil8)
    }

    /// Check if this format has a stencil component.
    pub fn has_stencil(self) -> bool {
        matches!(self, Self::Depth24PlusStencil8)
    }

    /// The full aspect mask for this format.
    pub fn aspect(self) -> AspectMask {
        if self.has_depth() {
            if self.has_stencil() {
                AspectMask::DEPTH | AspectMask::STENCIL
            } else {
                AspectMask::DEPTH
            }
        } else {
            AspectMask::COLOR
        }
    }
}

/// Handle to a physical image owned by the backend resource layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle(u64);

impl ImageHandle {
    /// Create a handle from a raw backend value.
    pub fn from_raw(handle: u64) -> Self {
        Self(handle)
    }

    /// Get the raw handle value.
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// A logical resource name bound to a physical handle plus its tracked state.
#[derive(Debug, Clone)]
pub struct ResourceBinding {
    resource: String,
    handle: ImageHandle,
    format: TextureFormat,
    aspect_mask: AspectMask,
    current_layout: ImageLayout,
}

impl ResourceBinding {
    /// The logical resource name.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The physical image handle.
    pub fn handle(&self) -> ImageHandle {
        self.handle
    }

    /// The image format.
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    /// The image aspect mask, derived from the bound format.
    pub fn aspect_mask(&self) -> AspectMask {
        self.aspect_mask
    }

    /// The tracked layout; reflects the resource's true state after every
    /// executed barrier.
    pub fn current_layout(&self) -> ImageLayout {
        self.current_layout
    }
}

/// The live mapping from logical resource name to physical handle.
///
/// Owned by the frame orchestrator and passed by reference into execution;
/// there is no ambient singleton. Physical handles persist across frames,
/// only `current_layout` changes as a side effect of execution.
#[derive(Debug, Default)]
pub struct BindingTable {
    bindings: HashMap<String, ResourceBinding>,
}

impl BindingTable {
    /// Create an empty binding table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource under a logical name.
    ///
    /// Rebinding an existing name replaces the previous binding; the backend
    /// resource layer owns allocation lifetimes, not this table.
    pub fn bind(
        &mut self,
        resource: impl Into<String>,
        handle: ImageHandle,
        format: TextureFormat,
        initial_layout: ImageLayout,
    ) {
        let resource = resource.into();
        log::trace!(
            "bind '{}' -> {:?} ({:?}, initial {:?})",
            resource,
            handle,
            format,
            initial_layout
        );
        let aspect_mask = format.aspect();
        self.bindings.insert(
            resource.clone(),
            ResourceBinding {
                resource,
                handle,
                format,
                aspect_mask,
                current_layout: initial_layout,
            },
        );
    }

    /// Look up the binding for a logical name.
    pub fn resolve_image(&self, resource: &str) -> GraphResult<&ResourceBinding> {
        self.bindings
            .get(resource)
            .ok_or_else(|| FrameGraphError::ResourceNotBound(resource.to_string()))
    }

    /// Check whether a name is bound.
    pub fn contains(&self, resource: &str) -> bool {
        self.bindings.contains_key(resource)
    }

    /// Number of bound resources.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Reset every tracked layout, typically to `Undefined` at frame start.
    pub fn reset_layouts(&mut self, layout: ImageLayout) {
        for binding in self.bindings.values_mut() {
            binding.current_layout = layout;
        }
    }

    /// Update the tracked layout of a resource.
    ///
    /// Only the executor calls this, exclusively in plan order as barriers
    /// are applied.
    pub(crate) fn transition_to(&mut self, resource: &str, layout: ImageLayout) -> GraphResult<()> {
        let binding = self
            .bindings
            .get_mut(resource)
            .ok_or_else(|| FrameGraphError::ResourceNotBound(resource.to_string()))?;
        log::trace!(
            "transition '{}': {:?} -> {:?}",
            resource,
            binding.current_layout,
            layout
        );
        binding.current_layout = layout;
        Ok(())
    }
}
