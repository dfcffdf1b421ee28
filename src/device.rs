//! Logical device wrapper ([`LogicalDevice`]).
//!
//! `LogicalDevice` owns exactly one `VkDevice` together with the host
//! allocation callbacks used for every create and destroy call on that
//! device, and an optional `VK_EXT_debug_utils` loader used for
//! best-effort object naming.
//!
//! The device is created behind an `Arc` ([`LogicalDevice::create`])
//! because several independent subsystems typically need it to stay
//! alive and none of them is a natural single owner. The native device
//! is destroyed when the last clone drops.
//!
//! All raw Vulkan operations on the device handle are surfaced as
//! `unsafe fn` methods prefixed with `raw_` (e.g. `create_raw_buffer`).
//! The resource wrappers in sibling modules and the safe surface below
//! call these rather than accessing `ash::Device` directly; every raw
//! call threads the stored host allocator through to the native layer.
//!
//! # Thread safety
//!
//! `LogicalDevice` is `Send + Sync` and its own bookkeeping needs no
//! external locking. The native layer still requires external
//! synchronization per *queue* and per *command pool*: two threads
//! submitting to the same queue or allocating from the same pool
//! concurrently is the caller's problem, and the operations concerned
//! document this as a precondition.

use std::ffi::{CStr, CString, c_void};
use std::ptr::NonNull;
use std::sync::Arc;

use ash::vk;

use crate::buffer::{Buffer, BufferView};
use crate::command::CommandPool;
use crate::error::{
    BindError, DeviceCreationError, GetQueueError, MapError, NameObjectError,
    ResourceCreationError, ResourceKind,
};
use crate::image::{Image, ImageView};
use crate::memory::DeviceMemory;
use crate::sync::{Fence, FenceStatus};

/// Host allocation callbacks handed to every create and destroy call on
/// a [`LogicalDevice`], including `vkDestroyDevice` itself.
///
/// `vk::AllocationCallbacks` carries raw pointers, so this wrapper is
/// what makes storing them inside a `Send + Sync` device sound: the
/// constructor's contract puts the thread-safety burden on the caller.
pub struct HostAllocator {
    callbacks: vk::AllocationCallbacks<'static>,
}

impl HostAllocator {
    /// Wrap a set of host allocation callbacks.
    ///
    /// # Safety
    /// - Every function pointer and the user-data pointer in `callbacks`
    ///   must remain valid for the lifetime of the device they are given
    ///   to.
    /// - The callbacks must be safe to invoke from any thread, since the
    ///   device may be used from several threads concurrently.
    pub unsafe fn new(callbacks: vk::AllocationCallbacks<'static>) -> Self {
        Self { callbacks }
    }

    pub fn callbacks(&self) -> &vk::AllocationCallbacks<'static> {
        &self.callbacks
    }
}

// SAFETY: HostAllocator::new's contract requires the wrapped callbacks
// to be callable from any thread and to outlive the device.
unsafe impl Send for HostAllocator {}
// SAFETY: as above; the wrapper exposes only shared access.
unsafe impl Sync for HostAllocator {}

impl std::fmt::Debug for HostAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostAllocator").finish_non_exhaustive()
    }
}

/// Queue-family layout captured from the device creation descriptor,
/// used to validate [`LogicalDevice::get_queue`] requests before they
/// reach the native layer.
#[derive(Debug, Clone)]
pub(crate) struct QueueFamilyTable {
    /// (family index, queues created) per entry in the creation
    /// descriptor. Vulkan forbids duplicate family entries.
    families: Vec<(u32, u32)>,
}

impl QueueFamilyTable {
    pub(crate) fn new(families: Vec<(u32, u32)>) -> Self {
        Self { families }
    }

    /// # Safety
    /// `create_info` must be a valid device creation descriptor:
    /// `p_queue_create_infos` must point to
    /// `queue_create_info_count` readable elements.
    pub(crate) unsafe fn from_create_info(
        create_info: &vk::DeviceCreateInfo<'_>,
    ) -> Self {
        let infos: &[vk::DeviceQueueCreateInfo<'_>] =
            if create_info.p_queue_create_infos.is_null() {
                &[]
            } else {
                // SAFETY: caller guarantees the array covers
                // queue_create_info_count elements.
                unsafe {
                    std::slice::from_raw_parts(
                        create_info.p_queue_create_infos,
                        create_info.queue_create_info_count as usize,
                    )
                }
            };

        Self::new(
            infos
                .iter()
                .map(|info| (info.queue_family_index, info.queue_count))
                .collect(),
        )
    }

    fn validate(&self, family: u32, index: u32) -> Result<(), GetQueueError> {
        match self.families.iter().find(|&&(f, _)| f == family) {
            None => Err(GetQueueError::UnknownFamily { family }),
            Some(&(_, count)) if index < count => Ok(()),
            Some(&(_, count)) => Err(GetQueueError::OutOfRange {
                family,
                index,
                count,
            }),
        }
    }
}

/// A logical Vulkan device and the root of the object lifetime tree.
///
/// Owns the `ash::Device`, the host allocation callbacks used for every
/// create/destroy on it, and (when debug markers were enabled at
/// creation) a `VK_EXT_debug_utils` loader for object naming.
///
/// Resource wrappers created by the factory methods hold a non-owning
/// back-reference to this device. The device does **not** track its
/// children: it must be kept alive until every wrapper and every queue
/// handle derived from it is no longer in use. That ordering is a
/// documented precondition, not an enforced one.
pub struct LogicalDevice {
    handle: ash::Device,
    host_allocator: Option<HostAllocator>,
    /// Present only when debug markers were requested at creation.
    debug_utils: Option<ash::ext::debug_utils::Device>,
    queue_families: QueueFamilyTable,
}

impl std::fmt::Debug for LogicalDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogicalDevice")
            .field("handle", &self.handle.handle())
            .finish_non_exhaustive()
    }
}

impl Drop for LogicalDevice {
    fn drop(&mut self) {
        tracing::debug!("Dropping device {:?}", self.handle.handle());
        // SAFETY: All objects derived from this device must be dropped
        // before this device is dropped, and no queued work may still be
        // executing (both are documented caller preconditions; draining
        // queues is not this object's job).
        unsafe { self.handle.destroy_device(self.allocation_callbacks()) };
    }
}

impl LogicalDevice {
    /// Create a logical device from a physical device and a creation
    /// descriptor.
    ///
    /// `host_allocator`, when present, is stored and passed to every
    /// allocation and deallocation on this device from here on,
    /// `vkDestroyDevice` included. `enable_debug_markers` controls
    /// whether factory methods tag objects with their debug names via
    /// `VK_EXT_debug_utils`; when enabled, the corresponding device
    /// extension must have been requested in `create_info`.
    ///
    /// The queue-family layout in `create_info` is captured so that
    /// [`get_queue`](Self::get_queue) can validate requests against it.
    ///
    /// # Safety
    /// `physical_device` must be a valid handle derived from `instance`.
    /// `create_info` must be a valid `VkDeviceCreateInfo`; any handles
    /// and pointers it references must be derived from `instance` and
    /// remain valid for the duration of the call.
    pub unsafe fn create(
        instance: &ash::Instance,
        physical_device: vk::PhysicalDevice,
        create_info: &vk::DeviceCreateInfo<'_>,
        host_allocator: Option<HostAllocator>,
        enable_debug_markers: bool,
    ) -> Result<Arc<Self>, DeviceCreationError> {
        // SAFETY: caller guarantees handle provenance and create_info
        // validity; the allocator contract is HostAllocator::new's.
        let handle = unsafe {
            instance.create_device(
                physical_device,
                create_info,
                host_allocator.as_ref().map(HostAllocator::callbacks),
            )
        }
        .map_err(DeviceCreationError)?;

        // SAFETY: create_info is valid for the duration of this call,
        // so its queue create-info array is readable.
        let queue_families =
            unsafe { QueueFamilyTable::from_create_info(create_info) };

        let debug_utils = enable_debug_markers
            .then(|| ash::ext::debug_utils::Device::new(instance, &handle));

        tracing::debug!("Created device {:?}", handle.handle());

        Ok(Arc::new(Self {
            handle,
            host_allocator,
            debug_utils,
            queue_families,
        }))
    }

    pub fn ash_device(&self) -> &ash::Device {
        &self.handle
    }

    pub fn raw_device(&self) -> vk::Device {
        self.handle.handle()
    }

    pub fn debug_markers_enabled(&self) -> bool {
        self.debug_utils.is_some()
    }

    fn allocation_callbacks(&self) -> Option<&vk::AllocationCallbacks<'static>> {
        self.host_allocator.as_ref().map(HostAllocator::callbacks)
    }

    /// Fetch a queue handle for `(queue_family_index, queue_index)`.
    ///
    /// Indices are validated against the creation descriptor before the
    /// native call is issued; out-of-range requests fail with
    /// [`GetQueueError`] instead of reaching native undefined behavior.
    ///
    /// The returned handle does not participate in this crate's
    /// ownership model. Submissions to the same queue from several
    /// threads require external synchronization.
    pub fn get_queue(
        &self,
        queue_family_index: u32,
        queue_index: u32,
    ) -> Result<vk::Queue, GetQueueError> {
        self.queue_families
            .validate(queue_family_index, queue_index)?;
        // SAFETY: the indices were validated against the layout the
        // device was created with.
        Ok(unsafe {
            self.handle.get_device_queue(queue_family_index, queue_index)
        })
    }

    /// Wait until all submitted work on this device has completed.
    ///
    /// This may block the calling thread and should generally be used
    /// for coarse-grained transitions (shutdown, suspend) rather than
    /// hot per-frame paths; its cost is proportional to all outstanding
    /// work.
    pub fn wait_idle(&self) -> Result<(), vk::Result> {
        let _span = tracing::debug_span!("device_wait_idle").entered();
        // SAFETY: `self.handle` is a valid logical device for the
        // lifetime of `self`, and this call has no additional pointer
        // preconditions.
        unsafe { self.handle.device_wait_idle() }
    }
}

// Debug naming functionality
impl LogicalDevice {
    /// Set a Vulkan debug name for an object owned by this device.
    ///
    /// A no-op when debug markers were not enabled at creation or when
    /// `name` is `None`.
    ///
    /// # Safety
    /// `object` must be a valid Vulkan handle created from this device
    /// and must remain valid for the duration of the call.
    pub unsafe fn set_object_name<H>(
        &self,
        object: H,
        name: Option<&CStr>,
    ) -> Result<(), NameObjectError>
    where
        H: vk::Handle,
    {
        let Some(debug_utils) = self.debug_utils.as_ref() else {
            return Ok(());
        };

        let Some(name) = name else {
            return Ok(());
        };

        let object_name_info = vk::DebugUtilsObjectNameInfoEXT::default()
            .object_handle(object)
            .object_name(name);

        // SAFETY: Caller guarantees object provenance and validity.
        unsafe { debug_utils.set_debug_utils_object_name(&object_name_info) }
            .map_err(NameObjectError::Vulkan)
    }

    /// Convenience helper to set a name from UTF-8 text.
    ///
    /// # Safety
    /// `object` must be a valid Vulkan handle created from this device
    /// and must remain valid for the duration of the call.
    pub unsafe fn set_object_name_str<H>(
        &self,
        object: H,
        name: Option<&str>,
    ) -> Result<(), NameObjectError>
    where
        H: vk::Handle,
    {
        let name = match name {
            Some(name) => {
                Some(CString::new(name).map_err(NameObjectError::InvalidName)?)
            }
            None => None,
        };

        // SAFETY: This method shares the same safety contract as
        // set_object_name.
        unsafe { self.set_object_name(object, name.as_deref()) }
    }

    /// Best-effort naming for a freshly created object. Failures are
    /// logged and swallowed; diagnostics never block functional paths.
    fn name_new_object<H>(&self, object: H, name: Option<&str>)
    where
        H: vk::Handle + Copy + std::fmt::Debug,
    {
        // SAFETY: object was just created from this device and has not
        // been handed out yet.
        let name_result = unsafe { self.set_object_name_str(object, name) };
        if let Err(e) = name_result {
            tracing::warn!("Failed to name object {:?}: {e}", object);
        }
    }
}

// Object factory: one create operation per resource kind, each
// returning a move-only wrapper bound to this device. `name` is an
// optional debug label applied when debug markers are enabled; naming
// failures are logged as warnings and do not cause the call to fail.
impl LogicalDevice {
    /// Create a command pool.
    ///
    /// # Safety
    /// `create_info` must have a valid `queue_family_index` for this
    /// device. All referenced pointers must remain valid for the
    /// duration of the call.
    pub unsafe fn create_command_pool(
        self: &Arc<Self>,
        create_info: &vk::CommandPoolCreateInfo<'_>,
        name: Option<&str>,
    ) -> Result<CommandPool, ResourceCreationError> {
        // SAFETY: Caller guarantees create_info validity and queue
        // family provenance.
        let handle = unsafe { self.create_raw_command_pool(create_info) }
            .map_err(|status| ResourceCreationError {
                kind: ResourceKind::CommandPool,
                status,
            })?;
        self.name_new_object(handle, name);
        Ok(CommandPool::new(self, handle))
    }

    /// Create a buffer.
    ///
    /// # Safety
    /// `create_info` must be valid and reference only objects derived
    /// from this device. All referenced pointers must remain valid for
    /// the duration of the call.
    pub unsafe fn create_buffer(
        self: &Arc<Self>,
        create_info: &vk::BufferCreateInfo<'_>,
        name: Option<&str>,
    ) -> Result<Buffer, ResourceCreationError> {
        // SAFETY: Caller guarantees create_info validity.
        let handle = unsafe { self.create_raw_buffer(create_info) }.map_err(
            |status| ResourceCreationError {
                kind: ResourceKind::Buffer,
                status,
            },
        )?;
        self.name_new_object(handle, name);
        Ok(Buffer::new(self, handle))
    }

    /// Create a buffer view.
    ///
    /// # Safety
    /// `create_info.buffer` must be a valid buffer created from this
    /// device and bound to memory. All referenced pointers must remain
    /// valid for the duration of the call.
    pub unsafe fn create_buffer_view(
        self: &Arc<Self>,
        create_info: &vk::BufferViewCreateInfo<'_>,
        name: Option<&str>,
    ) -> Result<BufferView, ResourceCreationError> {
        // SAFETY: Caller guarantees create_info validity and buffer
        // provenance.
        let handle = unsafe { self.create_raw_buffer_view(create_info) }
            .map_err(|status| ResourceCreationError {
                kind: ResourceKind::BufferView,
                status,
            })?;
        self.name_new_object(handle, name);
        Ok(BufferView::new(self, handle))
    }

    /// Create an image.
    ///
    /// # Safety
    /// `create_info` must be valid and reference only objects derived
    /// from this device. All referenced pointers must remain valid for
    /// the duration of the call.
    pub unsafe fn create_image(
        self: &Arc<Self>,
        create_info: &vk::ImageCreateInfo<'_>,
        name: Option<&str>,
    ) -> Result<Image, ResourceCreationError> {
        // SAFETY: Caller guarantees create_info validity.
        let handle = unsafe { self.create_raw_image(create_info) }.map_err(
            |status| ResourceCreationError {
                kind: ResourceKind::Image,
                status,
            },
        )?;
        self.name_new_object(handle, name);
        Ok(Image::new(self, handle))
    }

    /// Create an image view.
    ///
    /// # Safety
    /// `create_info.image` must be a valid image created from this
    /// device. All referenced pointers must remain valid for the
    /// duration of the call.
    pub unsafe fn create_image_view(
        self: &Arc<Self>,
        create_info: &vk::ImageViewCreateInfo<'_>,
        name: Option<&str>,
    ) -> Result<ImageView, ResourceCreationError> {
        // SAFETY: Caller guarantees create_info validity and image
        // provenance.
        let handle = unsafe { self.create_raw_image_view(create_info) }
            .map_err(|status| ResourceCreationError {
                kind: ResourceKind::ImageView,
                status,
            })?;
        self.name_new_object(handle, name);
        Ok(ImageView::new(self, handle))
    }

    /// Create a fence.
    ///
    /// # Safety
    /// `create_info` must be a valid fence create info. All referenced
    /// pointers must remain valid for the duration of the call.
    pub unsafe fn create_fence(
        self: &Arc<Self>,
        create_info: &vk::FenceCreateInfo<'_>,
        name: Option<&str>,
    ) -> Result<Fence, ResourceCreationError> {
        // SAFETY: Caller guarantees create_info validity.
        let handle = unsafe { self.create_raw_fence(create_info) }.map_err(
            |status| ResourceCreationError {
                kind: ResourceKind::Fence,
                status,
            },
        )?;
        self.name_new_object(handle, name);
        Ok(Fence::new(self, handle))
    }

    /// Allocate a block of device memory.
    ///
    /// # Safety
    /// `allocate_info` must be valid and describe a memory type index
    /// supported by this device.
    pub unsafe fn allocate_device_memory(
        self: &Arc<Self>,
        allocate_info: &vk::MemoryAllocateInfo<'_>,
        name: Option<&str>,
    ) -> Result<DeviceMemory, ResourceCreationError> {
        // SAFETY: Caller guarantees allocation info validity.
        let handle = unsafe { self.allocate_raw_memory(allocate_info) }
            .map_err(|status| ResourceCreationError {
                kind: ResourceKind::DeviceMemory,
                status,
            })?;
        self.name_new_object(handle, name);
        Ok(DeviceMemory::new(self, handle))
    }

    /// Allocate a single primary or secondary command buffer from
    /// `pool`.
    ///
    /// Returns the raw handle on purpose: command buffers are owned by
    /// the pool that allocated them, not by the device, and destroying
    /// the pool frees them. There is no `release_` counterpart here.
    ///
    /// The caller must externally synchronize access to `pool` (no
    /// other thread may be allocating from or resetting it
    /// concurrently).
    pub fn allocate_command_buffer(
        &self,
        pool: &CommandPool,
        level: vk::CommandBufferLevel,
        name: Option<&str>,
    ) -> Result<vk::CommandBuffer, ResourceCreationError> {
        debug_assert!(
            pool.is_parent(self),
            "command buffer allocated through a foreign device"
        );

        let allocate_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(pool.raw_command_pool())
            .level(level)
            .command_buffer_count(1);

        // SAFETY: the pool wrapper guarantees the pool was created from
        // this device; the count is non-zero; external synchronization
        // on the pool is the caller's documented responsibility.
        let buffers = unsafe { self.allocate_raw_command_buffers(&allocate_info) }
            .map_err(|status| ResourceCreationError {
                kind: ResourceKind::CommandBuffer,
                status,
            })?;
        debug_assert_eq!(buffers.len(), 1);
        let handle = buffers[0];

        self.name_new_object(handle, name);
        Ok(handle)
    }
}

// Object releaser: one destroy operation per resource kind. Each
// consumes its wrapper by value, empties it, and issues the native
// destroy through this device and its host allocator. An already-empty
// wrapper is a no-op; releasing the same live wrapper twice is
// impossible because the first call takes ownership.
//
// Callers must ensure no pending GPU work still references the object
// being released.
impl LogicalDevice {
    pub fn release_command_pool(&self, mut pool: CommandPool) {
        debug_assert!(
            pool.is_parent(self),
            "command pool released through a foreign device"
        );
        let handle = pool.take();
        if handle == vk::CommandPool::null() {
            return;
        }
        tracing::debug!("Destroying command pool {:?}", handle);
        // SAFETY: the wrapper guarantees the handle was created from
        // this device and has surrendered ownership. Destroying the
        // pool implicitly frees its command buffers.
        unsafe { self.destroy_raw_command_pool(handle) };
    }

    pub fn release_buffer(&self, mut buffer: Buffer) {
        debug_assert!(
            buffer.is_parent(self),
            "buffer released through a foreign device"
        );
        let handle = buffer.take();
        if handle == vk::Buffer::null() {
            return;
        }
        tracing::debug!("Destroying buffer {:?}", handle);
        // SAFETY: the wrapper guarantees the handle was created from
        // this device and has surrendered ownership.
        unsafe { self.destroy_raw_buffer(handle) };
    }

    pub fn release_buffer_view(&self, mut view: BufferView) {
        debug_assert!(
            view.is_parent(self),
            "buffer view released through a foreign device"
        );
        let handle = view.take();
        if handle == vk::BufferView::null() {
            return;
        }
        tracing::debug!("Destroying buffer view {:?}", handle);
        // SAFETY: the wrapper guarantees the handle was created from
        // this device and has surrendered ownership.
        unsafe { self.destroy_raw_buffer_view(handle) };
    }

    pub fn release_image(&self, mut image: Image) {
        debug_assert!(
            image.is_parent(self),
            "image released through a foreign device"
        );
        let handle = image.take();
        if handle == vk::Image::null() {
            return;
        }
        tracing::debug!("Destroying image {:?}", handle);
        // SAFETY: the wrapper guarantees the handle was created from
        // this device and has surrendered ownership.
        unsafe { self.destroy_raw_image(handle) };
    }

    pub fn release_image_view(&self, mut view: ImageView) {
        debug_assert!(
            view.is_parent(self),
            "image view released through a foreign device"
        );
        let handle = view.take();
        if handle == vk::ImageView::null() {
            return;
        }
        tracing::debug!("Destroying image view {:?}", handle);
        // SAFETY: the wrapper guarantees the handle was created from
        // this device and has surrendered ownership.
        unsafe { self.destroy_raw_image_view(handle) };
    }

    pub fn release_fence(&self, mut fence: Fence) {
        debug_assert!(
            fence.is_parent(self),
            "fence released through a foreign device"
        );
        let handle = fence.take();
        if handle == vk::Fence::null() {
            return;
        }
        tracing::debug!("Destroying fence {:?}", handle);
        // SAFETY: the wrapper guarantees the handle was created from
        // this device and has surrendered ownership.
        unsafe { self.destroy_raw_fence(handle) };
    }

    pub fn free_device_memory(&self, mut memory: DeviceMemory) {
        debug_assert!(
            memory.is_parent(self),
            "device memory freed through a foreign device"
        );
        let handle = memory.take();
        if handle == vk::DeviceMemory::null() {
            return;
        }
        tracing::debug!("Freeing device memory {:?}", handle);
        // SAFETY: the wrapper guarantees the handle was created from
        // this device and has surrendered ownership. Nothing may still
        // be bound to the allocation.
        unsafe { self.free_raw_memory(handle) };
    }
}

// Query/control surface: reads and narrowly-scoped mutations that do
// not change ownership.
impl LogicalDevice {
    /// Query size/alignment/memory-type requirements for a buffer.
    /// Pure query, no side effects.
    pub fn buffer_memory_requirements(
        &self,
        buffer: &Buffer,
    ) -> vk::MemoryRequirements {
        debug_assert!(
            buffer.is_parent(self),
            "buffer queried through a foreign device"
        );
        // SAFETY: the wrapper guarantees the handle was created from
        // this device and is still live.
        unsafe {
            self.get_raw_buffer_memory_requirements(buffer.raw_buffer())
        }
    }

    /// Query size/alignment/memory-type requirements for an image.
    /// Pure query, no side effects.
    pub fn image_memory_requirements(
        &self,
        image: &Image,
    ) -> vk::MemoryRequirements {
        debug_assert!(
            image.is_parent(self),
            "image queried through a foreign device"
        );
        // SAFETY: the wrapper guarantees the handle was created from
        // this device and is still live.
        unsafe { self.get_raw_image_memory_requirements(image.raw_image()) }
    }

    /// Bind a memory allocation to a buffer at `offset`.
    ///
    /// Binding is a one-time operation per buffer; an already-bound
    /// buffer, an incompatible memory type, or a range past the end of
    /// the allocation surface as a native error status.
    pub fn bind_buffer_memory(
        &self,
        buffer: &Buffer,
        memory: &DeviceMemory,
        offset: vk::DeviceSize,
    ) -> Result<(), BindError> {
        debug_assert!(
            buffer.is_parent(self) && memory.is_parent(self),
            "buffer memory bound through a foreign device"
        );
        // SAFETY: both wrappers guarantee their handles were created
        // from this device; offset constraints are reported by the
        // native layer.
        unsafe {
            self.bind_raw_buffer_memory(
                buffer.raw_buffer(),
                memory.raw_memory(),
                offset,
            )
        }
        .map_err(|status| BindError {
            kind: ResourceKind::Buffer,
            status,
        })
    }

    /// Bind a memory allocation to an image at `offset`.
    ///
    /// Binding is a one-time operation per image; see
    /// [`bind_buffer_memory`](Self::bind_buffer_memory).
    pub fn bind_image_memory(
        &self,
        image: &Image,
        memory: &DeviceMemory,
        offset: vk::DeviceSize,
    ) -> Result<(), BindError> {
        debug_assert!(
            image.is_parent(self) && memory.is_parent(self),
            "image memory bound through a foreign device"
        );
        // SAFETY: both wrappers guarantee their handles were created
        // from this device; offset constraints are reported by the
        // native layer.
        unsafe {
            self.bind_raw_image_memory(
                image.raw_image(),
                memory.raw_memory(),
                offset,
            )
        }
        .map_err(|status| BindError {
            kind: ResourceKind::Image,
            status,
        })
    }

    /// Map a range of a device-memory allocation into host address
    /// space.
    ///
    /// Fails with [`MapError`] when the memory is not host-visible or
    /// the requested range cannot be mapped. The returned pointer is
    /// valid only until [`unmap_memory`](Self::unmap_memory).
    ///
    /// # Safety
    /// `memory` must not already be mapped. Map and unmap must be
    /// paired; host access to the mapped range must follow Vulkan's
    /// host-synchronization rules.
    pub unsafe fn map_memory(
        &self,
        memory: &DeviceMemory,
        offset: vk::DeviceSize,
        size: vk::DeviceSize,
        flags: vk::MemoryMapFlags,
    ) -> Result<NonNull<c_void>, MapError> {
        debug_assert!(
            memory.is_parent(self),
            "device memory mapped through a foreign device"
        );
        // SAFETY: the wrapper guarantees provenance; the caller
        // guarantees the allocation is unmapped and the range obeys
        // host-access rules.
        let ptr = unsafe {
            self.map_raw_memory(memory.raw_memory(), offset, size, flags)
        }
        .map_err(MapError)?;

        // A successful map never yields a null pointer; treat one as a
        // mapping failure rather than handing it out.
        NonNull::new(ptr)
            .ok_or(MapError(vk::Result::ERROR_MEMORY_MAP_FAILED))
    }

    /// Release a mapping established by [`map_memory`](Self::map_memory).
    ///
    /// # Safety
    /// `memory` must currently be mapped. Pointers obtained from the
    /// mapping must not be used after this call.
    pub unsafe fn unmap_memory(&self, memory: &DeviceMemory) {
        debug_assert!(
            memory.is_parent(self),
            "device memory unmapped through a foreign device"
        );
        // SAFETY: the wrapper guarantees provenance; the caller
        // guarantees the allocation is currently mapped.
        unsafe { self.unmap_raw_memory(memory.raw_memory()) };
    }

    /// Query whether a fence is signaled, without blocking.
    ///
    /// Device-loss and similar native failures surface in the `Err`
    /// arm; the two healthy states map to [`FenceStatus`].
    pub fn fence_status(
        &self,
        fence: &Fence,
    ) -> Result<FenceStatus, vk::Result> {
        debug_assert!(
            fence.is_parent(self),
            "fence queried through a foreign device"
        );
        // SAFETY: the wrapper guarantees the handle was created from
        // this device and is still live.
        match unsafe { self.get_raw_fence_status(fence.raw_fence()) } {
            Ok(true) => Ok(FenceStatus::Signaled),
            Ok(false) => Ok(FenceStatus::Unsignaled),
            Err(e) => Err(e),
        }
    }

    /// Return a signaled fence to the unsignaled state.
    ///
    /// Resetting an already-unsignaled fence is a native no-op. The
    /// fence must not be pending on any queue submission.
    pub fn reset_fence(&self, fence: &Fence) -> Result<(), vk::Result> {
        debug_assert!(
            fence.is_parent(self),
            "fence reset through a foreign device"
        );
        // SAFETY: the wrapper guarantees the handle was created from
        // this device; non-pending state is the caller's documented
        // precondition.
        unsafe { self.reset_raw_fences(&[fence.raw_fence()]) }
    }
}

// Command pool functionality (raw layer)
impl LogicalDevice {
    /// # Safety
    /// `create_info` must have a valid `queue_family_index` for this
    /// device. All referenced pointers must remain valid for the
    /// duration of the call.
    pub unsafe fn create_raw_command_pool(
        &self,
        create_info: &vk::CommandPoolCreateInfo<'_>,
    ) -> Result<vk::CommandPool, vk::Result> {
        // SAFETY: Caller guarantees create_info validity and queue
        // family provenance.
        unsafe {
            self.handle
                .create_command_pool(create_info, self.allocation_callbacks())
        }
    }

    /// # Safety
    /// `pool` must be a valid handle created from this device and not
    /// yet destroyed. All command buffers allocated from it must have
    /// finished execution and must not be referenced by any pending GPU
    /// work.
    pub unsafe fn destroy_raw_command_pool(&self, pool: vk::CommandPool) {
        // SAFETY: Caller guarantees pool provenance and drop ordering.
        unsafe {
            self.handle
                .destroy_command_pool(pool, self.allocation_callbacks())
        };
    }

    /// # Safety
    /// `allocate_info.command_pool` must be a valid pool created from
    /// this device. `command_buffer_count` must be non-zero. The caller
    /// must externally synchronize access to the pool.
    pub unsafe fn allocate_raw_command_buffers(
        &self,
        allocate_info: &vk::CommandBufferAllocateInfo<'_>,
    ) -> Result<Vec<vk::CommandBuffer>, vk::Result> {
        // SAFETY: Caller guarantees allocate_info validity and pool
        // provenance.
        unsafe { self.handle.allocate_command_buffers(allocate_info) }
    }
}

// Buffer and memory functionality (raw layer)
impl LogicalDevice {
    /// # Safety
    /// `create_info` must be valid and reference only objects derived
    /// from this device. All referenced pointers must remain valid for
    /// the duration of the call.
    pub unsafe fn create_raw_buffer(
        &self,
        create_info: &vk::BufferCreateInfo<'_>,
    ) -> Result<vk::Buffer, vk::Result> {
        // SAFETY: Caller guarantees create_info validity.
        unsafe {
            self.handle
                .create_buffer(create_info, self.allocation_callbacks())
        }
    }

    /// # Safety
    /// `buffer` must be a valid handle created from this device and not
    /// yet destroyed. No in-flight GPU work may still reference
    /// `buffer`.
    pub unsafe fn destroy_raw_buffer(&self, buffer: vk::Buffer) {
        // SAFETY: Caller guarantees buffer provenance and drop ordering.
        unsafe {
            self.handle
                .destroy_buffer(buffer, self.allocation_callbacks())
        };
    }

    /// # Safety
    /// `create_info.buffer` must be a valid buffer created from this
    /// device and bound to memory.
    pub unsafe fn create_raw_buffer_view(
        &self,
        create_info: &vk::BufferViewCreateInfo<'_>,
    ) -> Result<vk::BufferView, vk::Result> {
        // SAFETY: Caller guarantees create_info validity and buffer
        // provenance.
        unsafe {
            self.handle
                .create_buffer_view(create_info, self.allocation_callbacks())
        }
    }

    /// # Safety
    /// `view` must be a valid handle created from this device and not
    /// yet destroyed. No in-flight GPU work may still reference it.
    pub unsafe fn destroy_raw_buffer_view(&self, view: vk::BufferView) {
        // SAFETY: Caller guarantees view provenance and drop ordering.
        unsafe {
            self.handle
                .destroy_buffer_view(view, self.allocation_callbacks())
        };
    }

    /// Query memory requirements for a buffer.
    ///
    /// # Safety
    /// `buffer` must be a valid handle created from this device.
    pub unsafe fn get_raw_buffer_memory_requirements(
        &self,
        buffer: vk::Buffer,
    ) -> vk::MemoryRequirements {
        // SAFETY: Caller guarantees buffer validity.
        unsafe { self.handle.get_buffer_memory_requirements(buffer) }
    }

    /// # Safety
    /// `allocate_info` must be valid and describe a memory type index
    /// supported by this device.
    pub unsafe fn allocate_raw_memory(
        &self,
        allocate_info: &vk::MemoryAllocateInfo<'_>,
    ) -> Result<vk::DeviceMemory, vk::Result> {
        // SAFETY: Caller guarantees allocation info validity.
        unsafe {
            self.handle
                .allocate_memory(allocate_info, self.allocation_callbacks())
        }
    }

    /// # Safety
    /// `memory` must be a valid handle created from this device and not
    /// yet freed. No object may still be bound to `memory` at free
    /// time.
    pub unsafe fn free_raw_memory(&self, memory: vk::DeviceMemory) {
        // SAFETY: Caller guarantees memory provenance and drop ordering.
        unsafe {
            self.handle
                .free_memory(memory, self.allocation_callbacks())
        };
    }

    /// # Safety
    /// `buffer` and `memory` must both be valid handles created from
    /// this device. `offset` must satisfy alignment/size requirements
    /// from `vkGetBufferMemoryRequirements`.
    pub unsafe fn bind_raw_buffer_memory(
        &self,
        buffer: vk::Buffer,
        memory: vk::DeviceMemory,
        offset: vk::DeviceSize,
    ) -> Result<(), vk::Result> {
        // SAFETY: Caller guarantees handle validity and offset
        // constraints.
        unsafe { self.handle.bind_buffer_memory(buffer, memory, offset) }
    }

    /// # Safety
    /// `memory` must be a valid allocation from this device. The mapped
    /// range (`offset`, `size`) must be within the allocation and obey
    /// host access synchronization requirements.
    pub unsafe fn map_raw_memory(
        &self,
        memory: vk::DeviceMemory,
        offset: vk::DeviceSize,
        size: vk::DeviceSize,
        flags: vk::MemoryMapFlags,
    ) -> Result<*mut c_void, vk::Result> {
        // SAFETY: Caller guarantees mapping preconditions.
        unsafe { self.handle.map_memory(memory, offset, size, flags) }
    }

    /// # Safety
    /// `memory` must currently be mapped on this device.
    pub unsafe fn unmap_raw_memory(&self, memory: vk::DeviceMemory) {
        // SAFETY: Caller guarantees memory is currently mapped.
        unsafe { self.handle.unmap_memory(memory) };
    }
}

// Image functionality (raw layer)
impl LogicalDevice {
    /// # Safety
    /// `create_info` must be valid and reference only objects derived
    /// from this device. All referenced pointers must remain valid for
    /// the duration of the call.
    pub unsafe fn create_raw_image(
        &self,
        create_info: &vk::ImageCreateInfo<'_>,
    ) -> Result<vk::Image, vk::Result> {
        // SAFETY: Caller guarantees create_info validity.
        unsafe {
            self.handle
                .create_image(create_info, self.allocation_callbacks())
        }
    }

    /// # Safety
    /// `image` must be a valid handle created from this device and not
    /// yet destroyed. All views of it must be destroyed first, and no
    /// in-flight GPU work may still reference it.
    pub unsafe fn destroy_raw_image(&self, image: vk::Image) {
        // SAFETY: Caller guarantees image provenance and drop ordering.
        unsafe {
            self.handle
                .destroy_image(image, self.allocation_callbacks())
        };
    }

    /// # Safety
    /// `create_info.image` must be a valid image created from this
    /// device. All referenced pointers must remain valid for the
    /// duration of the call.
    pub unsafe fn create_raw_image_view(
        &self,
        create_info: &vk::ImageViewCreateInfo<'_>,
    ) -> Result<vk::ImageView, vk::Result> {
        // SAFETY: Caller guarantees create_info validity and image
        // provenance.
        unsafe {
            self.handle
                .create_image_view(create_info, self.allocation_callbacks())
        }
    }

    /// # Safety
    /// `image_view` must be a valid handle created from this device,
    /// and all objects using it must be destroyed first. No in-flight
    /// GPU work may still reference the image view.
    pub unsafe fn destroy_raw_image_view(&self, image_view: vk::ImageView) {
        // SAFETY: Caller guarantees image_view provenance and drop
        // ordering.
        unsafe {
            self.handle
                .destroy_image_view(image_view, self.allocation_callbacks())
        };
    }

    /// Query memory requirements for an image.
    ///
    /// # Safety
    /// `image` must be a valid handle created from this device.
    pub unsafe fn get_raw_image_memory_requirements(
        &self,
        image: vk::Image,
    ) -> vk::MemoryRequirements {
        // SAFETY: Caller guarantees image validity.
        unsafe { self.handle.get_image_memory_requirements(image) }
    }

    /// # Safety
    /// `image` and `memory` must both be valid handles created from
    /// this device. `offset` must satisfy alignment/size requirements
    /// from `vkGetImageMemoryRequirements`.
    pub unsafe fn bind_raw_image_memory(
        &self,
        image: vk::Image,
        memory: vk::DeviceMemory,
        offset: vk::DeviceSize,
    ) -> Result<(), vk::Result> {
        // SAFETY: Caller guarantees handle validity and offset
        // constraints.
        unsafe { self.handle.bind_image_memory(image, memory, offset) }
    }
}

// Fence functionality (raw layer)
impl LogicalDevice {
    /// # Safety
    /// `create_info` must be a valid fence create info. All referenced
    /// pointers must remain valid for the duration of the call.
    pub unsafe fn create_raw_fence(
        &self,
        create_info: &vk::FenceCreateInfo<'_>,
    ) -> Result<vk::Fence, vk::Result> {
        // SAFETY: Caller guarantees create_info validity.
        unsafe {
            self.handle
                .create_fence(create_info, self.allocation_callbacks())
        }
    }

    /// # Safety
    /// `fence` must be a valid handle created from this device and not
    /// yet destroyed. No GPU work may reference this fence at time of
    /// destruction.
    pub unsafe fn destroy_raw_fence(&self, fence: vk::Fence) {
        // SAFETY: Caller guarantees fence provenance and drop ordering.
        unsafe {
            self.handle
                .destroy_fence(fence, self.allocation_callbacks())
        };
    }

    /// Query whether a fence is signaled.
    ///
    /// Returns `Ok(true)` if signaled, `Ok(false)` if not yet signaled.
    ///
    /// # Safety
    /// `fence` must be a valid handle created from this device and not
    /// yet destroyed.
    pub unsafe fn get_raw_fence_status(
        &self,
        fence: vk::Fence,
    ) -> Result<bool, vk::Result> {
        // SAFETY: Caller guarantees fence provenance and validity.
        unsafe { self.handle.get_fence_status(fence) }
    }

    /// # Safety
    /// All handles in `fences` must be valid fences created from this
    /// device and must not be currently pending on any queue
    /// submission.
    pub unsafe fn reset_raw_fences(
        &self,
        fences: &[vk::Fence],
    ) -> Result<(), vk::Result> {
        // SAFETY: Caller guarantees fence handle validity and
        // non-pending state.
        unsafe { self.handle.reset_fences(fences) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_table_accepts_in_range_indices() {
        let table = QueueFamilyTable::new(vec![(0, 2), (3, 1)]);

        assert!(table.validate(0, 0).is_ok());
        assert!(table.validate(0, 1).is_ok());
        assert!(table.validate(3, 0).is_ok());
    }

    #[test]
    fn queue_table_rejects_out_of_range_index() {
        let table = QueueFamilyTable::new(vec![(0, 1)]);

        match table.validate(0, 5) {
            Err(GetQueueError::OutOfRange {
                family,
                index,
                count,
            }) => {
                assert_eq!(family, 0);
                assert_eq!(index, 5);
                assert_eq!(count, 1);
            }
            other => panic!("expected OutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn queue_table_rejects_unknown_family() {
        let table = QueueFamilyTable::new(vec![(0, 1)]);

        assert!(matches!(
            table.validate(7, 0),
            Err(GetQueueError::UnknownFamily { family: 7 })
        ));
    }
}
