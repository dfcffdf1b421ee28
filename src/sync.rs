//! Fence wrapper ([`Fence`]) and its observable state
//! ([`FenceStatus`]).
//!
//! A fence is a binary CPU–GPU synchronisation object: queue
//! submissions signal it, the host polls it. This crate only manages
//! the fence's lifetime and exposes status/reset through the owning
//! device ([`fence_status`](LogicalDevice::fence_status),
//! [`reset_fence`](LogicalDevice::reset_fence)); waiting policy and
//! submission are external collaborators' business.

use std::sync::{Arc, Weak};

use ash::vk;

use crate::device::LogicalDevice;

/// The two healthy states of a fence.
///
/// Native error statuses (device loss) are reported separately through
/// the `Err` arm of [`fence_status`](LogicalDevice::fence_status).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceStatus {
    Signaled,
    Unsignaled,
}

/// An owned `VkFence` bound to the device that created it.
///
/// Create in the signaled state (`vk::FenceCreateFlags::SIGNALED`) when
/// the first wait in a frame loop should return immediately.
pub struct Fence {
    parent: Weak<LogicalDevice>,
    handle: vk::Fence,
}

impl std::fmt::Debug for Fence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fence")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

impl Fence {
    pub(crate) fn new(parent: &Arc<LogicalDevice>, handle: vk::Fence) -> Self {
        Self {
            parent: Arc::downgrade(parent),
            handle,
        }
    }

    pub fn raw_fence(&self) -> vk::Fence {
        self.handle
    }

    /// Upgrade the back-reference to the creating device.
    ///
    /// `None` means the device was destroyed first, which violates the
    /// device-outlives-children precondition.
    pub fn parent(&self) -> Option<Arc<LogicalDevice>> {
        self.parent.upgrade()
    }

    pub(crate) fn is_parent(&self, device: &LogicalDevice) -> bool {
        std::ptr::eq(self.parent.as_ptr(), device)
    }

    pub(crate) fn take(&mut self) -> vk::Fence {
        std::mem::replace(&mut self.handle, vk::Fence::null())
    }
}

impl Drop for Fence {
    fn drop(&mut self) {
        if self.handle == vk::Fence::null() {
            return;
        }
        let Some(parent) = self.parent.upgrade() else {
            tracing::error!(
                "Fence {:?} outlived its device; handle leaked",
                self.handle
            );
            return;
        };
        tracing::debug!("Dropping fence {:?}", self.handle);
        // SAFETY: handle was created from parent and is owned by this
        // wrapper. No GPU work may still reference this fence.
        unsafe { parent.destroy_raw_fence(self.handle) };
    }
}
