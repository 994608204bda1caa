//! Vulkan device - logical device, queue and dispatch table.

use ash::{Instance, vk};
use rift_core::log;

use crate::core::PhysicalDevice;
use crate::dispatch::{DeviceFns, ResolveError};

/// Get required device extensions.
fn get_required_device_extensions() -> Vec<*const std::ffi::c_char> {
    vec![ash::khr::swapchain::NAME.as_ptr()]
}

/// Logical device creation failure.
#[derive(Debug)]
pub enum DeviceError {
    Creation(vk::Result),
    Resolve(ResolveError),
}

impl std::fmt::Display for DeviceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceError::Creation(result) => {
                write!(f, "Logical device creation failed: {:?}", result)
            }
            DeviceError::Resolve(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for DeviceError {}

impl From<ResolveError> for DeviceError {
    fn from(err: ResolveError) -> Self {
        DeviceError::Resolve(err)
    }
}

/// Vulkan logical device with its single graphics+present queue and the
/// resolved entry-point table.
pub struct RenderDevice {
    physical_device: PhysicalDevice,
    device: ash::Device,
    fns: DeviceFns,
    queue: vk::Queue,
}

impl RenderDevice {
    /// Create a new logical device from a physical device and resolve the
    /// dispatch table against it.
    #[profiling::function]
    pub fn new(instance: &Instance, physical_device: &PhysicalDevice) -> Result<Self, DeviceError> {
        let queue_priority = 1.0f32;
        let queue_create_info = vk::DeviceQueueCreateInfo::default()
            .queue_family_index(physical_device.queue_family())
            .queue_priorities(std::slice::from_ref(&queue_priority));

        let extensions = get_required_device_extensions();
        let features = vk::PhysicalDeviceFeatures::default();

        let create_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(std::slice::from_ref(&queue_create_info))
            .enabled_extension_names(&extensions)
            .enabled_features(&features);

        let device = unsafe {
            instance
                .create_device(physical_device.handle(), &create_info, None)
                .map_err(DeviceError::Creation)?
        };

        // Resolve every required entry point now; a driver missing one fails
        // here instead of in the middle of a frame.
        let fns = DeviceFns::resolve(|name| unsafe {
            instance.get_device_proc_addr(device.handle(), name.as_ptr())
        })?;

        let queue = unsafe { device.get_device_queue(physical_device.queue_family(), 0) };

        Ok(Self {
            physical_device: physical_device.clone(),
            device,
            fns,
            queue,
        })
    }

    /// Get a reference to the logical device.
    #[inline]
    pub fn handle(&self) -> &ash::Device {
        &self.device
    }

    /// Resolved device entry points.
    #[inline]
    pub fn fns(&self) -> &DeviceFns {
        &self.fns
    }

    #[inline]
    pub fn queue(&self) -> vk::Queue {
        self.queue
    }

    #[inline]
    pub fn queue_family(&self) -> u32 {
        self.physical_device.queue_family()
    }

    pub fn physical_device(&self) -> &PhysicalDevice {
        &self.physical_device
    }

    pub fn properties(&self) -> &vk::PhysicalDeviceProperties {
        self.physical_device.properties()
    }

    pub fn memory_properties(&self) -> &vk::PhysicalDeviceMemoryProperties {
        self.physical_device.memory_properties()
    }

    /// Block until all submitted work on the queue has completed.
    pub fn wait_queue_idle(&self) -> Result<(), vk::Result> {
        unsafe { (self.fns.queue_wait_idle)(self.queue) }.result()
    }
}

impl Drop for RenderDevice {
    fn drop(&mut self) {
        if let Err(result) = self.wait_queue_idle() {
            log::warn!("Queue wait before device destruction failed: {:?}", result);
        }

        unsafe {
            self.device.destroy_device(None);
        }
    }
}
