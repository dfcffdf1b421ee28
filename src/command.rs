//! Command pool wrapper: [`CommandPool`].
//!
//! Command buffers are the one resource kind this crate hands out as
//! raw handles
//! ([`allocate_command_buffer`](LogicalDevice::allocate_command_buffer)):
//! a `VkCommandBuffer` is owned by the pool it came from, and
//! `vkDestroyCommandPool` implicitly frees every buffer allocated from
//! the pool. The device's releaser therefore has no command-buffer
//! entry — releasing the pool is what ends their lifetime.
//!
//! Pool-level operations (allocation, reset) require external
//! synchronization at the native layer; callers sharing a pool across
//! threads must serialize access themselves.

use std::sync::{Arc, Weak};

use ash::vk;

use crate::device::LogicalDevice;

/// An owned `VkCommandPool` bound to the device that created it.
pub struct CommandPool {
    parent: Weak<LogicalDevice>,
    handle: vk::CommandPool,
}

impl std::fmt::Debug for CommandPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandPool")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

impl CommandPool {
    pub(crate) fn new(
        parent: &Arc<LogicalDevice>,
        handle: vk::CommandPool,
    ) -> Self {
        Self {
            parent: Arc::downgrade(parent),
            handle,
        }
    }

    pub fn raw_command_pool(&self) -> vk::CommandPool {
        self.handle
    }

    pub fn parent(&self) -> Option<Arc<LogicalDevice>> {
        self.parent.upgrade()
    }

    pub(crate) fn is_parent(&self, device: &LogicalDevice) -> bool {
        std::ptr::eq(self.parent.as_ptr(), device)
    }

    pub(crate) fn take(&mut self) -> vk::CommandPool {
        std::mem::replace(&mut self.handle, vk::CommandPool::null())
    }
}

impl Drop for CommandPool {
    fn drop(&mut self) {
        if self.handle == vk::CommandPool::null() {
            return;
        }
        let Some(parent) = self.parent.upgrade() else {
            tracing::error!(
                "Command pool {:?} outlived its device; handle leaked",
                self.handle
            );
            return;
        };
        tracing::debug!("Dropping command pool {:?}", self.handle);
        // SAFETY: handle was created from parent and is owned by this
        // wrapper. All command buffers allocated from the pool must
        // have finished execution; destroying the pool frees them.
        unsafe { parent.destroy_raw_command_pool(self.handle) };
    }
}
