use ash::vk;
use rift_core::log::trace;

use crate::RenderDevice;

/// Owning fence wrapper.
pub struct Fence {
    name: String,
    device: ash::Device,
    fence: vk::Fence,
}

impl Fence {
    pub fn new(name: &str, device: &RenderDevice, signaled: bool) -> Result<Self, vk::Result> {
        let flags = if signaled {
            vk::FenceCreateFlags::SIGNALED
        } else {
            vk::FenceCreateFlags::empty()
        };

        let fence = unsafe {
            device
                .handle()
                .create_fence(&vk::FenceCreateInfo::default().flags(flags), None)?
        };

        trace!("fence created: {name}");
        Ok(Self {
            name: name.to_owned(),
            device: device.handle().clone(),
            fence,
        })
    }

    pub fn handle(&self) -> vk::Fence {
        self.fence
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Block until the fence signals.
    pub fn wait(&self) -> Result<(), vk::Result> {
        unsafe {
            self.device
                .wait_for_fences(&[self.fence], true, u64::MAX)
        }
    }

    pub fn reset(&self) -> Result<(), vk::Result> {
        unsafe { self.device.reset_fences(&[self.fence]) }
    }
}

impl Drop for Fence {
    fn drop(&mut self) {
        trace!("fence destroyed: {}", self.name);
        unsafe {
            self.device.destroy_fence(self.fence, None);
        }
    }
}

/// Owning semaphore wrapper.
pub struct Semaphore {
    name: String,
    device: ash::Device,
    semaphore: vk::Semaphore,
}

impl Semaphore {
    pub fn new(name: &str, device: &RenderDevice) -> Result<Self, vk::Result> {
        let semaphore = unsafe {
            device
                .handle()
                .create_semaphore(&vk::SemaphoreCreateInfo::default(), None)?
        };

        trace!("semaphore created: {name}");
        Ok(Self {
            name: name.to_owned(),
            device: device.handle().clone(),
            semaphore,
        })
    }

    pub fn handle(&self) -> vk::Semaphore {
        self.semaphore
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for Semaphore {
    fn drop(&mut self) {
        trace!("semaphore destroyed: {}", self.name);
        unsafe {
            self.device.destroy_semaphore(self.semaphore, None);
        }
    }
}
