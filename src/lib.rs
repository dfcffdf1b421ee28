//! Lifetime management for a Vulkan logical device and the objects it
//! creates, built on [`ash`].
//!
//! > **Personal project.** This crate is not intended for general use
//! > and makes no API stability guarantees.
//!
//! # Object hierarchy
//!
//! ```text
//! LogicalDevice (shared via Arc)
//! ├── CommandPool ── raw vk::CommandBuffer (owned by the pool)
//! ├── Buffer
//! ├── BufferView
//! ├── Image
//! ├── ImageView
//! ├── Fence
//! └── DeviceMemory
//! ```
//!
//! The device is the one multiply-referenced object: [`LogicalDevice::create`]
//! returns an `Arc`, and the native device is destroyed when the last clone
//! drops. Every other object is a move-only wrapper holding its raw handle
//! plus a **non-owning** `Weak` back-reference to the device that created it.
//! Wrappers do not keep the device alive; the caller must ensure the device
//! outlives all of its children. Destruction goes through the device's
//! `release_*` methods (consume-by-value); dropping a live wrapper destroys
//! its handle through the parent as a backstop.
//!
//! Command buffers are the deliberate exception: allocation returns a raw
//! `vk::CommandBuffer` because the allocating [`CommandPool`](command::CommandPool)
//! owns its buffers, and destroying the pool frees them.
//!
//! # Naming conventions
//!
//! | prefix  | meaning                                   |
//! |---------|-------------------------------------------|
//! | `raw_*` | accepts or returns a raw `ash::vk` handle |
//! | `ash_*` | returns the `ash` wrapper object          |
//!
//! [`LogicalDevice::create`]: device::LogicalDevice::create

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::undocumented_unsafe_blocks)]

pub mod buffer;
pub mod command;
pub mod device;
pub mod error;
pub mod image;
pub mod memory;
pub mod sync;

pub use ash;
