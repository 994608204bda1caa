//! Command buffer pool and immediate submission.

use std::cell::{Cell, RefCell};

use ash::vk;

use crate::RenderDevice;
use crate::synchronization::Fence;

/// Command buffer pool with monotonic buffer reuse.
///
/// Buffers allocated from the pool are handed out in order and recycled as a
/// whole by `reset`; individual buffers are never freed.
pub struct CommandPool {
    name: String,
    device: ash::Device,
    pool: vk::CommandPool,
    buffers: RefCell<Vec<vk::CommandBuffer>>,
    next_index: Cell<usize>,
}

impl CommandPool {
    pub fn new(
        name: &str,
        device: &RenderDevice,
        flags: vk::CommandPoolCreateFlags,
    ) -> Result<Self, vk::Result> {
        let create_info = vk::CommandPoolCreateInfo::default()
            .queue_family_index(device.queue_family())
            .flags(flags);

        let pool = unsafe { device.handle().create_command_pool(&create_info, None)? };

        Ok(Self {
            name: name.to_string(),
            device: device.handle().clone(),
            pool,
            buffers: RefCell::new(Vec::new()),
            next_index: Cell::new(0),
        })
    }

    /// Hand out the next primary command buffer, allocating on first use.
    pub fn allocate(&self) -> Result<vk::CommandBuffer, vk::Result> {
        let index = self.next_index.get();
        self.next_index.set(index + 1);

        if let Some(buffer) = self.buffers.borrow().get(index) {
            return Ok(*buffer);
        }

        let alloc_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(self.pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(1);

        let buffers = unsafe { self.device.allocate_command_buffers(&alloc_info)? };
        let cmd = buffers[0];

        self.buffers.borrow_mut().push(cmd);
        Ok(cmd)
    }

    /// Rewind the pool; previously handed out buffers become reusable.
    pub fn reset(&self) -> Result<(), vk::Result> {
        self.next_index.set(0);
        unsafe {
            self.device
                .reset_command_pool(self.pool, vk::CommandPoolResetFlags::empty())
        }
    }

    pub fn handle(&self) -> vk::CommandPool {
        self.pool
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for CommandPool {
    fn drop(&mut self) {
        unsafe {
            // Allocated buffers are freed with the pool.
            self.device.destroy_command_pool(self.pool, None);
        }
    }
}

/// Record-submit-wait helper for one-off work such as staging uploads.
pub struct ImmediateCommands {
    device: ash::Device,
    queue: vk::Queue,
    pool: CommandPool,
    fence: Fence,
}

impl ImmediateCommands {
    pub fn new(device: &RenderDevice) -> Result<Self, vk::Result> {
        let pool = CommandPool::new(
            "command_pool.immediate",
            device,
            vk::CommandPoolCreateFlags::empty(),
        )?;
        let fence = Fence::new("fence.immediate", device, false)?;

        Ok(Self {
            device: device.handle().clone(),
            queue: device.queue(),
            pool,
            fence,
        })
    }

    /// Record commands and submit immediately, blocking until the GPU
    /// finishes.
    pub fn submit_and_wait<F>(&self, record: F) -> Result<(), vk::Result>
    where
        F: FnOnce(&ash::Device, vk::CommandBuffer),
    {
        self.pool.reset()?;
        let cmd = self.pool.allocate()?;

        let begin_info = vk::CommandBufferBeginInfo::default()
            .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);

        unsafe {
            self.device.begin_command_buffer(cmd, &begin_info)?;
            record(&self.device, cmd);
            self.device.end_command_buffer(cmd)?;

            let submit_info =
                vk::SubmitInfo::default().command_buffers(std::slice::from_ref(&cmd));
            self.device
                .queue_submit(self.queue, &[submit_info], self.fence.handle())?;
        }

        self.fence.wait()?;
        self.fence.reset()?;

        Ok(())
    }
}
