//! Device-memory wrapper: [`DeviceMemory`].
//!
//! A raw `vkAllocateMemory` allocation. Binding it to buffers or
//! images, mapping it, and freeing it all go through the owning
//! [`LogicalDevice`]: [`bind_buffer_memory`], [`bind_image_memory`],
//! [`map_memory`]/[`unmap_memory`], and [`free_device_memory`].
//!
//! Mapped pointers are valid strictly between map and unmap; pairing
//! is the caller's discipline, mirroring the native layer.
//!
//! [`bind_buffer_memory`]: LogicalDevice::bind_buffer_memory
//! [`bind_image_memory`]: LogicalDevice::bind_image_memory
//! [`map_memory`]: LogicalDevice::map_memory
//! [`unmap_memory`]: LogicalDevice::unmap_memory
//! [`free_device_memory`]: LogicalDevice::free_device_memory

use std::sync::{Arc, Weak};

use ash::vk;

use crate::device::LogicalDevice;

/// An owned `VkDeviceMemory` allocation from the device that created
/// it.
pub struct DeviceMemory {
    parent: Weak<LogicalDevice>,
    handle: vk::DeviceMemory,
}

impl std::fmt::Debug for DeviceMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceMemory")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

impl DeviceMemory {
    pub(crate) fn new(
        parent: &Arc<LogicalDevice>,
        handle: vk::DeviceMemory,
    ) -> Self {
        Self {
            parent: Arc::downgrade(parent),
            handle,
        }
    }

    pub fn raw_memory(&self) -> vk::DeviceMemory {
        self.handle
    }

    pub fn parent(&self) -> Option<Arc<LogicalDevice>> {
        self.parent.upgrade()
    }

    pub(crate) fn is_parent(&self, device: &LogicalDevice) -> bool {
        std::ptr::eq(self.parent.as_ptr(), device)
    }

    pub(crate) fn take(&mut self) -> vk::DeviceMemory {
        std::mem::replace(&mut self.handle, vk::DeviceMemory::null())
    }
}

impl Drop for DeviceMemory {
    fn drop(&mut self) {
        if self.handle == vk::DeviceMemory::null() {
            return;
        }
        let Some(parent) = self.parent.upgrade() else {
            tracing::error!(
                "Device memory {:?} outlived its device; handle leaked",
                self.handle
            );
            return;
        };
        tracing::debug!("Dropping device memory {:?}", self.handle);
        // SAFETY: handle was allocated from parent and is owned by this
        // wrapper. The allocation must no longer be mapped or bound.
        unsafe { parent.free_raw_memory(self.handle) };
    }
}
