//! Rift ref_vk - Vulkan reference renderer backend.
//!
//! This crate is the renderer half of the engine/renderer split: the host
//! owns the window and the frame cadence, this crate owns every Vulkan
//! object. There is no global state; `VkRenderer` is the single context,
//! created once, passed explicitly, and torn down by `Drop`.

pub mod buffer;
pub mod command;
pub mod core;
pub mod descriptor;
pub mod device;
pub mod dispatch;
pub mod format;
pub mod image;
pub mod memory;
pub mod renderer;
pub mod sampler;
pub mod shader;
pub mod speeds;
pub mod swapchain;
mod synchronization;
mod utility;

pub(crate) use paste::paste;

pub use ash::{Device, vk};
pub use buffer::{Buffer, BufferDesc, BufferError};
pub use command::{CommandPool, ImmediateCommands};
pub use crate::core::{PhysicalDevice, VkCore, select_physical_device};
pub use descriptor::{
    DescriptorArena, DescriptorError, MAX_DESC_SETS, SetIndex, SetTable,
};
pub use device::{DeviceError, RenderDevice};
pub use dispatch::{DeviceFns, ResolveError};
pub use format::{linear_format, texel_block_size};
pub use image::{Image, ImageDesc, ImageError};
pub use memory::{AllocError, AllocTracker, DeviceAllocation, MemoryAllocator};
pub use renderer::{RendererConfig, VkRenderer};
pub use sampler::{Sampler, SamplerConfig};
pub use shader::{ShaderError, ShaderModule};
pub use speeds::{
    MAX_SPEEDS_METRICS, MetricKind, MetricValue, SpeedsError, SpeedsRegistry,
};
pub use swapchain::{RenderPass, SurfaceWindow, Swapchain, SwapchainConfig};
pub use synchronization::{Fence, Semaphore};
