//! Dummy backend for testing and development.
//!
//! Performs no GPU work; every call is logged and counted so tests can
//! assert on what the executor issued without a device present.

use crate::binding::{ImageHandle, ImageLayout};
use crate::error::GraphResult;
use crate::planner::{HazardKind, SubresourceRange};

use super::GraphBackend;

/// No-op backend that counts recorded commands.
#[derive(Debug, Default)]
pub struct DummyBackend {
    transition_count: usize,
    barrier_count: usize,
}

impl DummyBackend {
    /// Create a new dummy backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of layout transitions recorded so far.
    pub fn transition_count(&self) -> usize {
        self.transition_count
    }

    /// Number of hazard barriers recorded so far.
    pub fn barrier_count(&self) -> usize {
        self.barrier_count
    }
}

impl GraphBackend for DummyBackend {
    fn name(&self) -> &str {
        "Dummy"
    }

    fn transition_resource(
        &mut self,
        handle: ImageHandle,
        from: ImageLayout,
        to: ImageLayout,
        range: &SubresourceRange,
    ) -> GraphResult<()> {
        log::trace!(
            "DummyBackend: transition {:?} {:?} -> {:?} (layers {}+{}, mips {}+{})",
            handle,
            from,
            to,
            range.base_layer,
            range.layer_count,
            range.base_mip,
            range.mip_count
        );
        self.transition_count += 1;
        Ok(())
    }

    fn record_barrier(&mut self, hazard: HazardKind, resource: &str) -> GraphResult<()> {
        log::trace!("DummyBackend: {:?} barrier on '{}'", hazard, resource);
        self.barrier_count += 1;
        Ok(())
    }
}
