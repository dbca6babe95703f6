//! Backend abstraction for barrier and layout-transition recording.
//!
//! The graph core never talks to a graphics API directly: the executor
//! calls through [`GraphBackend`], and the concrete API (or a test double)
//! implements it. [`DummyBackend`] is the in-crate no-GPU implementation.

pub mod dummy;

pub use dummy::DummyBackend;

use crate::binding::ImageHandle;
use crate::binding::ImageLayout;
use crate::error::GraphResult;
use crate::planner::{HazardKind, SubresourceRange};

/// The executor-to-backend seam.
///
/// Implementations record real synchronization commands into whatever
/// command stream they manage; the executor only calls these through its
/// mode gate, so scheduling correctness is testable without a device.
pub trait GraphBackend {
    /// Backend name for diagnostics.
    fn name(&self) -> &str;

    /// Record an image layout transition.
    fn transition_resource(
        &mut self,
        handle: ImageHandle,
        from: ImageLayout,
        to: ImageLayout,
        range: &SubresourceRange,
    ) -> GraphResult<()>;

    /// Record an execution/memory barrier for a hazard.
    fn record_barrier(&mut self, hazard: HazardKind, resource: &str) -> GraphResult<()>;
}
