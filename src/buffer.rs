//! Buffer resource wrappers: [`Buffer`] and [`BufferView`].
//!
//! Both are move-only owners of a single raw handle, created through
//! the device's factory methods
//! ([`create_buffer`](LogicalDevice::create_buffer),
//! [`create_buffer_view`](LogicalDevice::create_buffer_view)) and
//! destroyed through its releaser
//! ([`release_buffer`](LogicalDevice::release_buffer),
//! [`release_buffer_view`](LogicalDevice::release_buffer_view)).
//!
//! A view must be released before the buffer it was created over, and
//! both before the device; the wrappers hold non-owning back-references
//! and cannot enforce either ordering themselves.

use std::sync::{Arc, Weak};

use ash::vk;

use crate::device::LogicalDevice;

/// An owned `VkBuffer` bound to the device that created it.
///
/// Move-only: moving transfers ownership and there is no way to copy
/// the handle out into a second owner. A wrapper in hand always holds a
/// live handle; the empty state only exists transiently inside the
/// releaser.
///
/// The back-reference to the device is non-owning. The device must
/// outlive this wrapper; a wrapper that is dropped after its device is
/// a caller error and leaks the handle (logged, never UB).
pub struct Buffer {
    parent: Weak<LogicalDevice>,
    handle: vk::Buffer,
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

impl Buffer {
    pub(crate) fn new(parent: &Arc<LogicalDevice>, handle: vk::Buffer) -> Self {
        Self {
            parent: Arc::downgrade(parent),
            handle,
        }
    }

    pub fn raw_buffer(&self) -> vk::Buffer {
        self.handle
    }

    /// Upgrade the back-reference to the creating device.
    ///
    /// `None` means the device was destroyed while this wrapper was
    /// still alive — a violation of the device-outlives-children
    /// precondition.
    pub fn parent(&self) -> Option<Arc<LogicalDevice>> {
        self.parent.upgrade()
    }

    pub(crate) fn is_parent(&self, device: &LogicalDevice) -> bool {
        std::ptr::eq(self.parent.as_ptr(), device)
    }

    pub(crate) fn take(&mut self) -> vk::Buffer {
        std::mem::replace(&mut self.handle, vk::Buffer::null())
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if self.handle == vk::Buffer::null() {
            return;
        }
        let Some(parent) = self.parent.upgrade() else {
            tracing::error!(
                "Buffer {:?} outlived its device; handle leaked",
                self.handle
            );
            return;
        };
        tracing::debug!("Dropping buffer {:?}", self.handle);
        // SAFETY: handle was created from parent and is owned by this
        // wrapper. No in-flight GPU work may still reference it (caller
        // precondition).
        unsafe { parent.destroy_raw_buffer(self.handle) };
    }
}

/// An owned `VkBufferView` over a buffer from the same device.
pub struct BufferView {
    parent: Weak<LogicalDevice>,
    handle: vk::BufferView,
}

impl std::fmt::Debug for BufferView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferView")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

impl BufferView {
    pub(crate) fn new(
        parent: &Arc<LogicalDevice>,
        handle: vk::BufferView,
    ) -> Self {
        Self {
            parent: Arc::downgrade(parent),
            handle,
        }
    }

    pub fn raw_buffer_view(&self) -> vk::BufferView {
        self.handle
    }

    pub fn parent(&self) -> Option<Arc<LogicalDevice>> {
        self.parent.upgrade()
    }

    pub(crate) fn is_parent(&self, device: &LogicalDevice) -> bool {
        std::ptr::eq(self.parent.as_ptr(), device)
    }

    pub(crate) fn take(&mut self) -> vk::BufferView {
        std::mem::replace(&mut self.handle, vk::BufferView::null())
    }
}

impl Drop for BufferView {
    fn drop(&mut self) {
        if self.handle == vk::BufferView::null() {
            return;
        }
        let Some(parent) = self.parent.upgrade() else {
            tracing::error!(
                "Buffer view {:?} outlived its device; handle leaked",
                self.handle
            );
            return;
        };
        tracing::debug!("Dropping buffer view {:?}", self.handle);
        // SAFETY: handle was created from parent and is owned by this
        // wrapper.
        unsafe { parent.destroy_raw_buffer_view(self.handle) };
    }
}
