//! Vulkan buffer - GPU buffer resource management.

use std::ptr::NonNull;

use ash::vk;
use rift_core::log;

use crate::memory::{AllocError, DeviceAllocation, MemoryAllocator};
use crate::RenderDevice;

/// Buffer descriptor for creating GPU buffers.
#[derive(Debug, Clone)]
pub struct BufferDesc {
    pub name: String,
    /// Size of the buffer in bytes.
    pub size: vk::DeviceSize,
    /// Buffer usage flags (e.g., VERTEX_BUFFER, TRANSFER_SRC).
    pub usage: vk::BufferUsageFlags,
    /// Memory property flags for allocation.
    pub memory_flags: vk::MemoryPropertyFlags,
}

impl Default for BufferDesc {
    fn default() -> Self {
        Self {
            name: "Unnamed buffer".to_string(),
            size: 0,
            usage: vk::BufferUsageFlags::empty(),
            memory_flags: vk::MemoryPropertyFlags::DEVICE_LOCAL,
        }
    }
}

impl BufferDesc {
    /// Create a vertex buffer descriptor.
    pub fn vertex(name: &str, size: vk::DeviceSize) -> Self {
        Self {
            name: name.to_owned(),
            size,
            usage: vk::BufferUsageFlags::VERTEX_BUFFER | vk::BufferUsageFlags::TRANSFER_DST,
            memory_flags: vk::MemoryPropertyFlags::DEVICE_LOCAL,
        }
    }

    /// Create an index buffer descriptor.
    pub fn index(name: &str, size: vk::DeviceSize) -> Self {
        Self {
            name: name.to_owned(),
            size,
            usage: vk::BufferUsageFlags::INDEX_BUFFER | vk::BufferUsageFlags::TRANSFER_DST,
            memory_flags: vk::MemoryPropertyFlags::DEVICE_LOCAL,
        }
    }

    /// Create a uniform buffer descriptor.
    pub fn uniform(name: &str, size: vk::DeviceSize) -> Self {
        Self {
            name: name.to_owned(),
            size,
            usage: vk::BufferUsageFlags::UNIFORM_BUFFER,
            memory_flags: vk::MemoryPropertyFlags::HOST_VISIBLE
                | vk::MemoryPropertyFlags::HOST_COHERENT,
        }
    }

    /// Create a staging buffer descriptor (CPU-visible copy source).
    pub fn staging(name: &str, size: vk::DeviceSize) -> Self {
        Self {
            name: name.to_owned(),
            size,
            usage: vk::BufferUsageFlags::TRANSFER_SRC,
            memory_flags: vk::MemoryPropertyFlags::HOST_VISIBLE
                | vk::MemoryPropertyFlags::HOST_COHERENT,
        }
    }

    /// Set the buffer usage flags.
    pub fn with_usage(mut self, usage: vk::BufferUsageFlags) -> Self {
        self.usage = usage;
        self
    }

    /// Set memory property flags.
    pub fn with_memory_flags(mut self, flags: vk::MemoryPropertyFlags) -> Self {
        self.memory_flags = flags;
        self
    }

    fn is_host_visible(&self) -> bool {
        self.memory_flags
            .contains(vk::MemoryPropertyFlags::HOST_VISIBLE)
    }
}

/// Buffer creation or access failure.
#[derive(Debug)]
pub enum BufferError {
    Creation(vk::Result),
    Allocation(AllocError),
    Bind(vk::Result),
    /// Host write outside the buffer, or into a GPU-only buffer.
    NotHostVisible,
    OutOfBounds {
        offset: vk::DeviceSize,
        len: usize,
        size: vk::DeviceSize,
    },
}

impl std::fmt::Display for BufferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferError::Creation(result) => write!(f, "Buffer creation failed: {:?}", result),
            BufferError::Allocation(err) => write!(f, "{}", err),
            BufferError::Bind(result) => write!(f, "Buffer memory bind failed: {:?}", result),
            BufferError::NotHostVisible => write!(f, "Buffer is not host-visible"),
            BufferError::OutOfBounds { offset, len, size } => write!(
                f,
                "Write of {} bytes at offset {} exceeds buffer size {}",
                len, offset, size
            ),
        }
    }
}

impl std::error::Error for BufferError {}

impl From<AllocError> for BufferError {
    fn from(err: AllocError) -> Self {
        BufferError::Allocation(err)
    }
}

/// GPU buffer backed by its own device memory allocation.
///
/// Host-visible buffers stay mapped for their whole lifetime; `mapped` is
/// `None` for device-local buffers and must never be read there.
pub struct Buffer {
    device: ash::Device,
    allocator: MemoryAllocator,
    buffer: vk::Buffer,
    allocation: Option<DeviceAllocation>,
    mapped: Option<NonNull<u8>>,
    desc: BufferDesc,
}

impl Buffer {
    /// Create a new buffer from a descriptor.
    pub fn new(
        device: &RenderDevice,
        allocator: &MemoryAllocator,
        desc: &BufferDesc,
    ) -> Result<Self, BufferError> {
        let buffer_info = vk::BufferCreateInfo::default()
            .size(desc.size)
            .usage(desc.usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        let buffer = unsafe {
            device
                .handle()
                .create_buffer(&buffer_info, None)
                .map_err(BufferError::Creation)?
        };

        let requirements = unsafe { device.handle().get_buffer_memory_requirements(buffer) };

        let allocation = match allocator.allocate(requirements, desc.memory_flags) {
            Ok(allocation) => allocation,
            Err(err) => {
                unsafe { device.handle().destroy_buffer(buffer, None) };
                return Err(err.into());
            }
        };

        if let Err(result) = unsafe {
            device
                .handle()
                .bind_buffer_memory(buffer, allocation.memory(), allocation.offset())
        } {
            unsafe { device.handle().destroy_buffer(buffer, None) };
            allocator.free(allocation);
            return Err(BufferError::Bind(result));
        }

        // Staging-style buffers stay mapped until destruction.
        let mapped = if desc.is_host_visible() {
            match allocator.map(&allocation) {
                Ok(ptr) => Some(ptr),
                Err(err) => {
                    unsafe { device.handle().destroy_buffer(buffer, None) };
                    allocator.free(allocation);
                    return Err(err.into());
                }
            }
        } else {
            None
        };

        log::trace!("buffer created: {} ({} bytes)", desc.name, desc.size);

        Ok(Self {
            device: device.handle().clone(),
            allocator: allocator.clone(),
            buffer,
            allocation: Some(allocation),
            mapped,
            desc: desc.clone(),
        })
    }

    /// Get the raw Vulkan buffer handle.
    pub fn handle(&self) -> vk::Buffer {
        self.buffer
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.desc.name
    }

    #[inline]
    pub fn desc(&self) -> &BufferDesc {
        &self.desc
    }

    #[inline]
    pub fn size(&self) -> vk::DeviceSize {
        self.desc.size
    }

    /// Host pointer to the mapped contents; `None` for GPU-only buffers.
    #[inline]
    pub fn mapped(&self) -> Option<NonNull<u8>> {
        self.mapped
    }

    /// Copy `data` into the mapped contents at `offset`.
    pub fn write_at(&self, offset: vk::DeviceSize, data: &[u8]) -> Result<(), BufferError> {
        let mapped = self.mapped.ok_or(BufferError::NotHostVisible)?;

        if data.is_empty() {
            return Ok(());
        }
        let in_bounds = offset
            .checked_add(data.len() as vk::DeviceSize)
            .is_some_and(|end| end <= self.desc.size);
        if !in_bounds {
            return Err(BufferError::OutOfBounds {
                offset,
                len: data.len(),
                size: self.desc.size,
            });
        }

        // SAFETY: the range was checked against the buffer size, and the
        // mapping lives as long as the buffer.
        unsafe {
            std::ptr::copy_nonoverlapping(
                data.as_ptr(),
                mapped.as_ptr().add(offset as usize),
                data.len(),
            );
        }

        Ok(())
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if let Some(allocation) = self.allocation.take() {
            if self.mapped.take().is_some() {
                self.allocator.unmap(&allocation);
            }

            unsafe {
                self.device.destroy_buffer(self.buffer, None);
            }
            self.allocator.free(allocation);
        }

        log::trace!("buffer destroyed: {}", self.desc.name);
    }
}
