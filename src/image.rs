//! Image resource wrappers: [`Image`] and [`ImageView`].
//!
//! Same ownership shape as the buffer wrappers: move-only handle
//! owners with a non-owning back-reference to the creating device,
//! released through
//! [`release_image`](LogicalDevice::release_image) /
//! [`release_image_view`](LogicalDevice::release_image_view).
//! Views must go before their image, images before the device.

use std::sync::{Arc, Weak};

use ash::vk;

use crate::device::LogicalDevice;

/// An owned `VkImage` bound to the device that created it.
pub struct Image {
    parent: Weak<LogicalDevice>,
    handle: vk::Image,
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

impl Image {
    pub(crate) fn new(parent: &Arc<LogicalDevice>, handle: vk::Image) -> Self {
        Self {
            parent: Arc::downgrade(parent),
            handle,
        }
    }

    pub fn raw_image(&self) -> vk::Image {
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

    pub(crate) fn take(&mut self) -> vk::Image {
        std::mem::replace(&mut self.handle, vk::Image::null())
    }
}

impl Drop for Image {
    fn drop(&mut self) {
        if self.handle == vk::Image::null() {
            return;
        }
        let Some(parent) = self.parent.upgrade() else {
            tracing::error!(
                "Image {:?} outlived its device; handle leaked",
                self.handle
            );
            return;
        };
        tracing::debug!("Dropping image {:?}", self.handle);
        // SAFETY: handle was created from parent and is owned by this
        // wrapper. All views of the image must already be gone.
        unsafe { parent.destroy_raw_image(self.handle) };
    }
}

/// An owned `VkImageView` over an image from the same device.
pub struct ImageView {
    parent: Weak<LogicalDevice>,
    handle: vk::ImageView,
}

impl std::fmt::Debug for ImageView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageView")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

impl ImageView {
    pub(crate) fn new(
        parent: &Arc<LogicalDevice>,
        handle: vk::ImageView,
    ) -> Self {
        Self {
            parent: Arc::downgrade(parent),
            handle,
        }
    }

    pub fn raw_image_view(&self) -> vk::ImageView {
        self.handle
    }

    pub fn parent(&self) -> Option<Arc<LogicalDevice>> {
        self.parent.upgrade()
    }

    pub(crate) fn is_parent(&self, device: &LogicalDevice) -> bool {
        std::ptr::eq(self.parent.as_ptr(), device)
    }

    pub(crate) fn take(&mut self) -> vk::ImageView {
        std::mem::replace(&mut self.handle, vk::ImageView::null())
    }
}

impl Drop for ImageView {
    fn drop(&mut self) {
        if self.handle == vk::ImageView::null() {
            return;
        }
        let Some(parent) = self.parent.upgrade() else {
            tracing::error!(
                "Image view {:?} outlived its device; handle leaked",
                self.handle
            );
            return;
        };
        tracing::debug!("Dropping image view {:?}", self.handle);
        // SAFETY: handle was created from parent and is owned by this
        // wrapper.
        unsafe { parent.destroy_raw_image_view(self.handle) };
    }
}
