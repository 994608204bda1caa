//! Device memory allocation bookkeeping.
//!
//! Every allocation request currently gets its own dedicated memory block
//! (offset 0); `DeviceAllocation` carries the offset so resources never
//! assume block exclusivity, which keeps the door open for an arena
//! allocator behind the same interface. Not safe for concurrent use; the
//! render thread owns the allocator.

use std::ptr::NonNull;

use ash::vk;

use crate::dispatch::DeviceFns;
use crate::speeds::{MetricKind, MetricValue, SpeedsError, SpeedsRegistry};
use crate::utility::find_memory_type;

/// Memory allocation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// No memory type satisfies both the resource requirements and the
    /// requested property flags.
    NoSuitableMemoryType {
        type_bits: u32,
        flags: vk::MemoryPropertyFlags,
    },
    /// The driver rejected the allocation.
    DeviceAllocation(vk::Result),
    /// Mapping a host-visible block failed.
    MapFailed(vk::Result),
}

impl std::fmt::Display for AllocError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AllocError::NoSuitableMemoryType { type_bits, flags } => write!(
                f,
                "No memory type matches requirement bits {:#b} with properties {:?}",
                type_bits, flags
            ),
            AllocError::DeviceAllocation(result) => {
                write!(f, "Device memory allocation failed: {:?}", result)
            }
            AllocError::MapFailed(result) => {
                write!(f, "Mapping device memory failed: {:?}", result)
            }
        }
    }
}

impl std::error::Error for AllocError {}

/// One allocated region of device memory: backing block, offset and size.
#[derive(Debug)]
pub struct DeviceAllocation {
    memory: vk::DeviceMemory,
    offset: vk::DeviceSize,
    size: vk::DeviceSize,
    memory_type: u32,
}

impl DeviceAllocation {
    pub fn memory(&self) -> vk::DeviceMemory {
        self.memory
    }

    pub fn offset(&self) -> vk::DeviceSize {
        self.offset
    }

    pub fn size(&self) -> vk::DeviceSize {
        self.size
    }

    pub fn memory_type(&self) -> u32 {
        self.memory_type
    }
}

/// Live-allocation counters, published to the metrics overlay.
///
/// This is the pure half of the allocator: it never touches the device, so
/// balance properties hold in a plain harness.
#[derive(Clone)]
pub struct AllocTracker {
    live_allocations: MetricValue,
    live_bytes: MetricValue,
}

impl AllocTracker {
    pub fn new(speeds: &mut SpeedsRegistry) -> Result<Self, SpeedsError> {
        Ok(Self {
            live_allocations: crate::speeds_metric!(
                speeds,
                live_allocations,
                MetricKind::Count
            )?,
            live_bytes: crate::speeds_metric!(speeds, live_bytes, MetricKind::Bytes)?,
        })
    }

    pub fn on_alloc(&self, size: vk::DeviceSize) {
        self.live_allocations.add(1);
        self.live_bytes.add(size as i64);
    }

    pub fn on_free(&self, size: vk::DeviceSize) {
        self.live_allocations.add(-1);
        self.live_bytes.add(-(size as i64));
    }

    pub fn live_allocations(&self) -> i64 {
        self.live_allocations.get()
    }

    pub fn live_bytes(&self) -> i64 {
        self.live_bytes.get()
    }
}

/// Device memory allocator.
///
/// Clones share the same device, dispatch table and counters, so resources
/// can carry one and release their allocation from `Drop`.
#[derive(Clone)]
pub struct MemoryAllocator {
    device: vk::Device,
    fns: DeviceFns,
    memory_properties: vk::PhysicalDeviceMemoryProperties,
    tracker: AllocTracker,
}

impl MemoryAllocator {
    pub fn new(
        device: vk::Device,
        fns: DeviceFns,
        memory_properties: vk::PhysicalDeviceMemoryProperties,
        speeds: &mut SpeedsRegistry,
    ) -> Result<Self, SpeedsError> {
        Ok(Self {
            device,
            fns,
            memory_properties,
            tracker: AllocTracker::new(speeds)?,
        })
    }

    /// Reserve a region satisfying `requirements` with the given property
    /// flags.
    pub fn allocate(
        &self,
        requirements: vk::MemoryRequirements,
        flags: vk::MemoryPropertyFlags,
    ) -> Result<DeviceAllocation, AllocError> {
        let memory_type = find_memory_type(
            &self.memory_properties,
            requirements.memory_type_bits,
            flags,
        )
        .ok_or(AllocError::NoSuitableMemoryType {
            type_bits: requirements.memory_type_bits,
            flags,
        })?;

        let info = vk::MemoryAllocateInfo::default()
            .allocation_size(requirements.size)
            .memory_type_index(memory_type);

        let mut memory = vk::DeviceMemory::null();
        unsafe { (self.fns.allocate_memory)(self.device, &info, std::ptr::null(), &mut memory) }
            .result()
            .map_err(AllocError::DeviceAllocation)?;

        self.tracker.on_alloc(requirements.size);

        Ok(DeviceAllocation {
            memory,
            offset: 0,
            size: requirements.size,
            memory_type,
        })
    }

    /// Release a region and revert the bookkeeping.
    pub fn free(&self, allocation: DeviceAllocation) {
        unsafe { (self.fns.free_memory)(self.device, allocation.memory, std::ptr::null()) };
        self.tracker.on_free(allocation.size);
    }

    /// Map a host-visible allocation. Valid until [`Self::unmap`]; callers
    /// must bracket access accordingly.
    pub fn map(&self, allocation: &DeviceAllocation) -> Result<NonNull<u8>, AllocError> {
        let mut ptr = std::ptr::null_mut();
        unsafe {
            (self.fns.map_memory)(
                self.device,
                allocation.memory,
                allocation.offset,
                allocation.size,
                vk::MemoryMapFlags::empty(),
                &mut ptr,
            )
        }
        .result()
        .map_err(AllocError::MapFailed)?;

        NonNull::new(ptr.cast()).ok_or(AllocError::MapFailed(vk::Result::ERROR_MEMORY_MAP_FAILED))
    }

    pub fn unmap(&self, allocation: &DeviceAllocation) {
        unsafe { (self.fns.unmap_memory)(self.device, allocation.memory) };
    }

    pub fn tracker(&self) -> &AllocTracker {
        &self.tracker
    }

    pub fn memory_properties(&self) -> &vk::PhysicalDeviceMemoryProperties {
        &self.memory_properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_balances_alloc_and_free() {
        let mut speeds = SpeedsRegistry::new();
        let tracker = AllocTracker::new(&mut speeds).unwrap();

        assert_eq!(tracker.live_allocations(), 0);
        assert_eq!(tracker.live_bytes(), 0);

        tracker.on_alloc(4096);
        tracker.on_alloc(256);
        assert_eq!(tracker.live_allocations(), 2);
        assert_eq!(tracker.live_bytes(), 4352);

        tracker.on_free(256);
        tracker.on_free(4096);
        assert_eq!(tracker.live_allocations(), 0);
        assert_eq!(tracker.live_bytes(), 0);
    }

    #[test]
    fn tracker_publishes_metrics() {
        let mut speeds = SpeedsRegistry::new();
        let tracker = AllocTracker::new(&mut speeds).unwrap();
        tracker.on_alloc(1024);

        let mut out = [0u8; 128];
        assert!(speeds.message(&mut out));
        let end = out.iter().position(|&b| b == 0).unwrap();
        let text = std::str::from_utf8(&out[..end]).unwrap();
        assert!(text.contains("live_allocations: 1"), "{text}");
        assert!(text.contains("live_bytes: 1.00KiB"), "{text}");
    }
}
