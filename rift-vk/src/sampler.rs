//! Vulkan sampler - texture sampling configuration.

use ash::vk;

use crate::RenderDevice;

/// Sampler configuration.
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    pub mag_filter: vk::Filter,
    pub min_filter: vk::Filter,
    pub mipmap_mode: vk::SamplerMipmapMode,
    pub address_mode: vk::SamplerAddressMode,
    pub anisotropy_enable: bool,
    pub max_anisotropy: f32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            mag_filter: vk::Filter::LINEAR,
            min_filter: vk::Filter::LINEAR,
            mipmap_mode: vk::SamplerMipmapMode::LINEAR,
            address_mode: vk::SamplerAddressMode::REPEAT,
            anisotropy_enable: false,
            max_anisotropy: 1.0,
        }
    }
}

impl SamplerConfig {
    /// Linear filtering (the context's default sampler).
    pub fn linear() -> Self {
        Self::default()
    }

    /// Nearest (point) filtering, for unfiltered pixel art surfaces.
    pub fn nearest() -> Self {
        Self {
            mag_filter: vk::Filter::NEAREST,
            min_filter: vk::Filter::NEAREST,
            mipmap_mode: vk::SamplerMipmapMode::NEAREST,
            ..Default::default()
        }
    }

    pub fn with_address_mode(mut self, mode: vk::SamplerAddressMode) -> Self {
        self.address_mode = mode;
        self
    }
}

/// Owning sampler wrapper.
pub struct Sampler {
    name: String,
    device: ash::Device,
    sampler: vk::Sampler,
}

impl Sampler {
    pub fn new(
        name: &str,
        device: &RenderDevice,
        config: &SamplerConfig,
    ) -> Result<Self, vk::Result> {
        let create_info = vk::SamplerCreateInfo::default()
            .mag_filter(config.mag_filter)
            .min_filter(config.min_filter)
            .mipmap_mode(config.mipmap_mode)
            .address_mode_u(config.address_mode)
            .address_mode_v(config.address_mode)
            .address_mode_w(config.address_mode)
            .anisotropy_enable(config.anisotropy_enable)
            .max_anisotropy(config.max_anisotropy)
            .min_lod(0.0)
            .max_lod(vk::LOD_CLAMP_NONE);

        let sampler = unsafe { device.handle().create_sampler(&create_info, None)? };

        Ok(Self {
            name: name.to_owned(),
            device: device.handle().clone(),
            sampler,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the raw Vulkan sampler handle.
    pub fn handle(&self) -> vk::Sampler {
        self.sampler
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_sampler(self.sampler, None);
        }
    }
}
