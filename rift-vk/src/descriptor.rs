//! Descriptor set arena.
//!
//! Descriptor sets are consumed monotonically out of one fixed-capacity
//! pool for the lifetime of the context; there is no per-set recycling, and
//! the pool never grows. Exhaustion is a typed error the caller sees before
//! any driver call is made.

use ash::vk;
use rift_core::log;

use crate::RenderDevice;
use crate::speeds::{MetricKind, MetricValue, SpeedsRegistry};

/// Upper bound on descriptor sets per context.
pub const MAX_DESC_SETS: usize = 4096;

/// Stable handle to a set in the arena; valid for the arena's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SetIndex(u32);

impl SetIndex {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Descriptor allocation failure.
#[derive(Debug)]
pub enum DescriptorError {
    /// Every slot in the fixed-capacity table has been handed out.
    Exhausted { capacity: usize },
    /// Pool or layout creation failed.
    Creation(vk::Result),
    /// The driver rejected the set allocation.
    Allocation(vk::Result),
}

impl std::fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DescriptorError::Exhausted { capacity } => {
                write!(f, "Descriptor set table exhausted ({} sets)", capacity)
            }
            DescriptorError::Creation(result) => {
                write!(f, "Descriptor pool creation failed: {:?}", result)
            }
            DescriptorError::Allocation(result) => {
                write!(f, "Descriptor set allocation failed: {:?}", result)
            }
        }
    }
}

impl std::error::Error for DescriptorError {}

/// Fixed-capacity table of issued descriptor-set handles.
///
/// Pure bookkeeping: the cursor advances only on success, and a rejected
/// insert leaves the table untouched.
pub struct SetTable {
    sets: Vec<vk::DescriptorSet>,
    capacity: usize,
}

impl SetTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sets: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Index the next successful insert will occupy.
    #[inline]
    pub fn next_free(&self) -> usize {
        self.sets.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.sets.len() >= self.capacity
    }

    /// Record a freshly allocated set and return its stable index.
    pub fn insert(&mut self, set: vk::DescriptorSet) -> Result<SetIndex, DescriptorError> {
        if self.is_full() {
            return Err(DescriptorError::Exhausted {
                capacity: self.capacity,
            });
        }

        let index = SetIndex(self.sets.len() as u32);
        self.sets.push(set);
        Ok(index)
    }

    #[inline]
    pub fn get(&self, index: SetIndex) -> vk::DescriptorSet {
        self.sets[index.index()]
    }
}

/// Descriptor pool plus the shared single-texture set layout.
pub struct DescriptorArena {
    device: ash::Device,
    pool: vk::DescriptorPool,
    one_texture_layout: vk::DescriptorSetLayout,
    table: SetTable,
    live_sets: MetricValue,
}

impl DescriptorArena {
    pub fn new(
        device: &RenderDevice,
        speeds: &mut SpeedsRegistry,
    ) -> Result<Self, anyhow::Error> {
        let live_sets = crate::speeds_metric!(speeds, live_sets, MetricKind::Count)?;

        let pool_sizes = [vk::DescriptorPoolSize {
            ty: vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
            descriptor_count: MAX_DESC_SETS as u32,
        }];
        let pool_info = vk::DescriptorPoolCreateInfo::default()
            .max_sets(MAX_DESC_SETS as u32)
            .pool_sizes(&pool_sizes);

        let pool = unsafe {
            device
                .handle()
                .create_descriptor_pool(&pool_info, None)
                .map_err(DescriptorError::Creation)?
        };

        // One combined image sampler at binding 0: the layout every textured
        // surface draws with.
        let bindings = [vk::DescriptorSetLayoutBinding::default()
            .binding(0)
            .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
            .descriptor_count(1)
            .stage_flags(vk::ShaderStageFlags::FRAGMENT)];
        let layout_info = vk::DescriptorSetLayoutCreateInfo::default().bindings(&bindings);

        let one_texture_layout = match unsafe {
            device.handle().create_descriptor_set_layout(&layout_info, None)
        } {
            Ok(layout) => layout,
            Err(result) => {
                unsafe { device.handle().destroy_descriptor_pool(pool, None) };
                return Err(DescriptorError::Creation(result).into());
            }
        };

        Ok(Self {
            device: device.handle().clone(),
            pool,
            one_texture_layout,
            table: SetTable::with_capacity(MAX_DESC_SETS),
            live_sets,
        })
    }

    /// Draw the next unused set with the single-texture layout.
    pub fn allocate_set(&mut self) -> Result<SetIndex, DescriptorError> {
        if self.table.is_full() {
            return Err(DescriptorError::Exhausted {
                capacity: self.table.capacity(),
            });
        }

        let layouts = [self.one_texture_layout];
        let alloc_info = vk::DescriptorSetAllocateInfo::default()
            .descriptor_pool(self.pool)
            .set_layouts(&layouts);

        let sets = unsafe {
            self.device
                .allocate_descriptor_sets(&alloc_info)
                .map_err(DescriptorError::Allocation)?
        };

        let index = self.table.insert(sets[0])?;
        self.live_sets.add(1);
        Ok(index)
    }

    /// Point a set at a texture view and sampler.
    pub fn write_texture(&self, index: SetIndex, view: vk::ImageView, sampler: vk::Sampler) {
        let image_info = vk::DescriptorImageInfo::default()
            .image_layout(vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL)
            .image_view(view)
            .sampler(sampler);

        let write = vk::WriteDescriptorSet::default()
            .dst_set(self.table.get(index))
            .dst_binding(0)
            .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
            .image_info(std::slice::from_ref(&image_info));

        unsafe {
            self.device
                .update_descriptor_sets(std::slice::from_ref(&write), &[]);
        }
    }

    #[inline]
    pub fn set(&self, index: SetIndex) -> vk::DescriptorSet {
        self.table.get(index)
    }

    #[inline]
    pub fn one_texture_layout(&self) -> vk::DescriptorSetLayout {
        self.one_texture_layout
    }

    #[inline]
    pub fn allocated(&self) -> usize {
        self.table.next_free()
    }
}

impl Drop for DescriptorArena {
    fn drop(&mut self) {
        log::trace!(
            "descriptor arena destroyed ({} sets issued)",
            self.table.next_free()
        );
        unsafe {
            self.device
                .destroy_descriptor_set_layout(self.one_texture_layout, None);
            // Destroying the pool releases every set the table issued.
            self.device.destroy_descriptor_pool(self.pool, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ash::vk::Handle;
    use rift_core::collections::hashset::HashSet;

    fn fake_set(n: u64) -> vk::DescriptorSet {
        vk::DescriptorSet::from_raw(n)
    }

    #[test]
    fn cursor_tracks_successful_inserts() {
        let mut table = SetTable::with_capacity(8);
        assert_eq!(table.next_free(), 0);

        for i in 0..5 {
            let index = table.insert(fake_set(i + 1)).unwrap();
            assert_eq!(index.index(), i as usize);
        }
        assert_eq!(table.next_free(), 5);
        assert!(!table.is_full());
    }

    #[test]
    fn handles_are_stable_and_unique() {
        let mut table = SetTable::with_capacity(64);
        let mut indices = Vec::new();
        for i in 0..64 {
            indices.push(table.insert(fake_set(i + 100)).unwrap());
        }

        let unique: HashSet<u64> = indices.iter().map(|&i| table.get(i).as_raw()).collect();
        assert_eq!(unique.len(), 64);
        assert_eq!(table.get(indices[7]), fake_set(107));
    }

    #[test]
    fn insert_past_capacity_is_rejected() {
        let mut table = SetTable::with_capacity(2);
        table.insert(fake_set(1)).unwrap();
        table.insert(fake_set(2)).unwrap();
        assert!(table.is_full());

        let err = table.insert(fake_set(3)).unwrap_err();
        assert!(matches!(err, DescriptorError::Exhausted { capacity: 2 }));

        // The failed insert must not advance the cursor.
        assert_eq!(table.next_free(), 2);
        assert_eq!(table.get(SetIndex(1)), fake_set(2));
    }
}
