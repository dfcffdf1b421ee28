//! Error taxonomy for device and resource lifetime operations.
//!
//! Every native status is checked at the call site and converted into one
//! of these types. The single deliberate exception is debug-utils object
//! naming, which is best-effort: naming failures are logged and never
//! escalated.

use ash::vk;
use thiserror::Error;

/// The closed set of resource kinds this crate creates and destroys.
///
/// Carried by [`ResourceCreationError`] and [`BindError`] so callers can
/// tell which native create or bind call failed without string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    CommandPool,
    CommandBuffer,
    Buffer,
    BufferView,
    Image,
    ImageView,
    Fence,
    DeviceMemory,
}

impl ResourceKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::CommandPool => "command pool",
            Self::CommandBuffer => "command buffer",
            Self::Buffer => "buffer",
            Self::BufferView => "buffer view",
            Self::Image => "image",
            Self::ImageView => "image view",
            Self::Fence => "fence",
            Self::DeviceMemory => "device memory",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Native device creation failed.
///
/// Fatal to the caller's initialization path; there is nothing this crate
/// can retry on the caller's behalf.
#[derive(Debug, Error)]
#[error("Vulkan error creating logical device: {0}")]
pub struct DeviceCreationError(pub vk::Result);

/// A native create call for a specific resource kind failed.
///
/// Often recoverable: the caller can retry with adjusted parameters or
/// treat statuses such as `ERROR_OUT_OF_DEVICE_MEMORY` as fatal. No retry
/// happens internally.
#[derive(Debug, Error)]
#[error("Vulkan error creating {kind}: {status}")]
pub struct ResourceCreationError {
    pub kind: ResourceKind,
    pub status: vk::Result,
}

/// Binding a memory allocation to a buffer or image failed.
#[derive(Debug, Error)]
#[error("Vulkan error binding {kind} memory: {status}")]
pub struct BindError {
    pub kind: ResourceKind,
    pub status: vk::Result,
}

/// Mapping a device-memory allocation into host address space failed.
#[derive(Debug, Error)]
#[error("Vulkan error mapping device memory: {0}")]
pub struct MapError(pub vk::Result);

/// A queue request did not match the layout in the creation descriptor.
#[derive(Debug, Error)]
pub enum GetQueueError {
    #[error("queue family {family} was not requested at device creation")]
    UnknownFamily { family: u32 },

    #[error(
        "queue index {index} out of range for family {family} \
         ({count} queues created)"
    )]
    OutOfRange { family: u32, index: u32, count: u32 },
}

/// Assigning a debug name to an object failed.
///
/// Only ever logged; naming is diagnostic and must not block functional
/// paths.
#[derive(Debug, Error)]
pub enum NameObjectError {
    #[error("Invalid Vulkan object name (contains interior NUL): {0}")]
    InvalidName(std::ffi::NulError),

    #[error("Vulkan error setting object name: {0}")]
    Vulkan(vk::Result),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_creation_error_names_the_kind() {
        let err = ResourceCreationError {
            kind: ResourceKind::BufferView,
            status: vk::Result::ERROR_OUT_OF_DEVICE_MEMORY,
        };
        let message = err.to_string();

        assert!(message.contains("buffer view"), "{message}");
        assert!(message.contains("ERROR_OUT_OF_DEVICE_MEMORY"), "{message}");
    }

    #[test]
    fn queue_errors_distinguish_family_from_index() {
        let unknown = GetQueueError::UnknownFamily { family: 3 };
        assert!(unknown.to_string().contains("family 3"));

        let out_of_range = GetQueueError::OutOfRange {
            family: 0,
            index: 5,
            count: 1,
        };
        let message = out_of_range.to_string();
        assert!(message.contains("index 5"), "{message}");
        assert!(message.contains("1 queues"), "{message}");
    }
}
