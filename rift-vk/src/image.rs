//! Vulkan image - allocator-backed image resources.

use ash::vk;
use rift_core::log;

use crate::RenderDevice;
use crate::buffer::Buffer;
use crate::command::ImmediateCommands;
use crate::format::{linear_format, texel_block_size};
use crate::memory::{AllocError, DeviceAllocation, MemoryAllocator};

/// Image descriptor.
#[derive(Debug, Clone)]
pub struct ImageDesc {
    pub name: String,
    pub format: vk::Format,
    pub extent: vk::Extent2D,
    pub usage: vk::ImageUsageFlags,
}

impl ImageDesc {
    /// A sampled 2D texture that will be filled from a staging buffer.
    pub fn sampled_2d(name: &str, width: u32, height: u32, format: vk::Format) -> Self {
        Self {
            name: name.to_owned(),
            format,
            extent: vk::Extent2D { width, height },
            usage: vk::ImageUsageFlags::SAMPLED | vk::ImageUsageFlags::TRANSFER_DST,
        }
    }

    pub fn with_usage(mut self, usage: vk::ImageUsageFlags) -> Self {
        self.usage = usage;
        self
    }
}

/// Image creation or upload failure.
#[derive(Debug)]
pub enum ImageError {
    Creation(vk::Result),
    Allocation(AllocError),
    Bind(vk::Result),
    ViewCreation(vk::Result),
    /// Upload data does not match the image's tightly packed size.
    SizeMismatch { expected: usize, actual: usize },
    /// Upload is larger than the staging buffer.
    StagingTooSmall {
        staging: vk::DeviceSize,
        needed: usize,
    },
    Staging(crate::buffer::BufferError),
    Upload(vk::Result),
}

impl std::fmt::Display for ImageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageError::Creation(result) => write!(f, "Image creation failed: {:?}", result),
            ImageError::Allocation(err) => write!(f, "{}", err),
            ImageError::Bind(result) => write!(f, "Image memory bind failed: {:?}", result),
            ImageError::ViewCreation(result) => {
                write!(f, "Image view creation failed: {:?}", result)
            }
            ImageError::SizeMismatch { expected, actual } => write!(
                f,
                "Upload of {} bytes does not match image size {}",
                actual, expected
            ),
            ImageError::StagingTooSmall { staging, needed } => write!(
                f,
                "Staging buffer of {} bytes cannot hold {} byte upload",
                staging, needed
            ),
            ImageError::Staging(err) => write!(f, "{}", err),
            ImageError::Upload(result) => write!(f, "Image upload failed: {:?}", result),
        }
    }
}

impl std::error::Error for ImageError {}

impl From<AllocError> for ImageError {
    fn from(err: AllocError) -> Self {
        ImageError::Allocation(err)
    }
}

/// Image aspect implied by the format.
pub fn aspect_mask(format: vk::Format) -> vk::ImageAspectFlags {
    match format {
        vk::Format::D16_UNORM | vk::Format::X8_D24_UNORM_PACK32 | vk::Format::D32_SFLOAT => {
            vk::ImageAspectFlags::DEPTH
        }
        vk::Format::S8_UINT => vk::ImageAspectFlags::STENCIL,
        vk::Format::D16_UNORM_S8_UINT
        | vk::Format::D24_UNORM_S8_UINT
        | vk::Format::D32_SFLOAT_S8_UINT => {
            vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
        }
        _ => vk::ImageAspectFlags::COLOR,
    }
}

/// GPU image with its allocation, sampled view, and (for sRGB formats) a
/// linear view of the same bits.
pub struct Image {
    device: ash::Device,
    allocator: MemoryAllocator,
    image: vk::Image,
    view: vk::ImageView,
    linear_view: Option<vk::ImageView>,
    allocation: Option<DeviceAllocation>,
    desc: ImageDesc,
}

impl Image {
    pub fn new(
        device: &RenderDevice,
        allocator: &MemoryAllocator,
        desc: &ImageDesc,
    ) -> Result<Self, ImageError> {
        // sRGB images additionally get a non-color-managed view, which needs
        // the mutable-format bit at creation.
        let linear = linear_format(desc.format);
        let wants_linear_view = linear != vk::Format::UNDEFINED && linear != desc.format;
        let flags = if wants_linear_view {
            vk::ImageCreateFlags::MUTABLE_FORMAT
        } else {
            vk::ImageCreateFlags::empty()
        };

        let image_info = vk::ImageCreateInfo::default()
            .flags(flags)
            .image_type(vk::ImageType::TYPE_2D)
            .format(desc.format)
            .extent(vk::Extent3D {
                width: desc.extent.width,
                height: desc.extent.height,
                depth: 1,
            })
            .mip_levels(1)
            .array_layers(1)
            .samples(vk::SampleCountFlags::TYPE_1)
            .tiling(vk::ImageTiling::OPTIMAL)
            .usage(desc.usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .initial_layout(vk::ImageLayout::UNDEFINED);

        let image = unsafe {
            device
                .handle()
                .create_image(&image_info, None)
                .map_err(ImageError::Creation)?
        };

        let requirements = unsafe { device.handle().get_image_memory_requirements(image) };

        let allocation =
            match allocator.allocate(requirements, vk::MemoryPropertyFlags::DEVICE_LOCAL) {
                Ok(allocation) => allocation,
                Err(err) => {
                    unsafe { device.handle().destroy_image(image, None) };
                    return Err(err.into());
                }
            };

        if let Err(result) = unsafe {
            device
                .handle()
                .bind_image_memory(image, allocation.memory(), allocation.offset())
        } {
            unsafe { device.handle().destroy_image(image, None) };
            allocator.free(allocation);
            return Err(ImageError::Bind(result));
        }

        let view = match create_view(device.handle(), image, desc.format) {
            Ok(view) => view,
            Err(result) => {
                unsafe { device.handle().destroy_image(image, None) };
                allocator.free(allocation);
                return Err(ImageError::ViewCreation(result));
            }
        };

        let linear_view = if wants_linear_view {
            match create_view(device.handle(), image, linear) {
                Ok(view) => Some(view),
                Err(result) => {
                    unsafe {
                        device.handle().destroy_image_view(view, None);
                        device.handle().destroy_image(image, None);
                    }
                    allocator.free(allocation);
                    return Err(ImageError::ViewCreation(result));
                }
            }
        } else {
            None
        };

        log::trace!(
            "image created: {} ({}x{} {:?})",
            desc.name,
            desc.extent.width,
            desc.extent.height,
            desc.format
        );

        Ok(Self {
            device: device.handle().clone(),
            allocator: allocator.clone(),
            image,
            view,
            linear_view,
            allocation: Some(allocation),
            desc: desc.clone(),
        })
    }

    /// Tightly packed byte size of the whole image.
    ///
    /// Valid for formats whose texel block covers a single pixel; compressed
    /// uploads are not supported by this path.
    pub fn upload_size(&self) -> usize {
        self.desc.extent.width as usize
            * self.desc.extent.height as usize
            * texel_block_size(self.desc.format) as usize
    }

    /// Fill the image from `data` through the staging buffer, leaving it in
    /// `SHADER_READ_ONLY_OPTIMAL`.
    ///
    /// Blocks until the copy completes on the GPU.
    pub fn upload(
        &self,
        staging: &Buffer,
        immediate: &ImmediateCommands,
        data: &[u8],
    ) -> Result<(), ImageError> {
        let expected = self.upload_size();
        if data.len() != expected {
            return Err(ImageError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        if data.len() as vk::DeviceSize > staging.size() {
            return Err(ImageError::StagingTooSmall {
                staging: staging.size(),
                needed: data.len(),
            });
        }

        staging.write_at(0, data).map_err(ImageError::Staging)?;

        let aspect = aspect_mask(self.desc.format);
        let subresource_range = vk::ImageSubresourceRange::default()
            .aspect_mask(aspect)
            .base_mip_level(0)
            .level_count(1)
            .base_array_layer(0)
            .layer_count(1);

        let image = self.image;
        let extent = self.desc.extent;
        let staging_handle = staging.handle();

        immediate
            .submit_and_wait(|device, cmd| {
                let to_transfer = vk::ImageMemoryBarrier::default()
                    .src_access_mask(vk::AccessFlags::empty())
                    .dst_access_mask(vk::AccessFlags::TRANSFER_WRITE)
                    .old_layout(vk::ImageLayout::UNDEFINED)
                    .new_layout(vk::ImageLayout::TRANSFER_DST_OPTIMAL)
                    .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                    .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                    .image(image)
                    .subresource_range(subresource_range);

                let region = vk::BufferImageCopy::default()
                    .buffer_offset(0)
                    .image_subresource(
                        vk::ImageSubresourceLayers::default()
                            .aspect_mask(aspect)
                            .mip_level(0)
                            .base_array_layer(0)
                            .layer_count(1),
                    )
                    .image_extent(vk::Extent3D {
                        width: extent.width,
                        height: extent.height,
                        depth: 1,
                    });

                let to_sampled = vk::ImageMemoryBarrier::default()
                    .src_access_mask(vk::AccessFlags::TRANSFER_WRITE)
                    .dst_access_mask(vk::AccessFlags::SHADER_READ)
                    .old_layout(vk::ImageLayout::TRANSFER_DST_OPTIMAL)
                    .new_layout(vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL)
                    .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                    .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                    .image(image)
                    .subresource_range(subresource_range);

                unsafe {
                    device.cmd_pipeline_barrier(
                        cmd,
                        vk::PipelineStageFlags::TOP_OF_PIPE,
                        vk::PipelineStageFlags::TRANSFER,
                        vk::DependencyFlags::empty(),
                        &[],
                        &[],
                        std::slice::from_ref(&to_transfer),
                    );
                    device.cmd_copy_buffer_to_image(
                        cmd,
                        staging_handle,
                        image,
                        vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                        std::slice::from_ref(&region),
                    );
                    device.cmd_pipeline_barrier(
                        cmd,
                        vk::PipelineStageFlags::TRANSFER,
                        vk::PipelineStageFlags::FRAGMENT_SHADER,
                        vk::DependencyFlags::empty(),
                        &[],
                        &[],
                        std::slice::from_ref(&to_sampled),
                    );
                }
            })
            .map_err(ImageError::Upload)
    }

    pub fn handle(&self) -> vk::Image {
        self.image
    }

    /// The sampled view in the image's own format.
    pub fn view(&self) -> vk::ImageView {
        self.view
    }

    /// Non-color-managed view of the same bits; present only for sRGB
    /// formats.
    pub fn linear_view(&self) -> Option<vk::ImageView> {
        self.linear_view
    }

    pub fn format(&self) -> vk::Format {
        self.desc.format
    }

    pub fn extent(&self) -> vk::Extent2D {
        self.desc.extent
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.desc.name
    }
}

impl Drop for Image {
    fn drop(&mut self) {
        if let Some(allocation) = self.allocation.take() {
            unsafe {
                if let Some(linear_view) = self.linear_view.take() {
                    self.device.destroy_image_view(linear_view, None);
                }
                self.device.destroy_image_view(self.view, None);
                self.device.destroy_image(self.image, None);
            }
            self.allocator.free(allocation);
        }

        log::trace!("image destroyed: {}", self.desc.name);
    }
}

fn create_view(
    device: &ash::Device,
    image: vk::Image,
    format: vk::Format,
) -> Result<vk::ImageView, vk::Result> {
    let view_info = vk::ImageViewCreateInfo::default()
        .image(image)
        .view_type(vk::ImageViewType::TYPE_2D)
        .format(format)
        .subresource_range(
            vk::ImageSubresourceRange::default()
                .aspect_mask(aspect_mask(format))
                .base_mip_level(0)
                .level_count(1)
                .base_array_layer(0)
                .layer_count(1),
        );

    unsafe { device.create_image_view(&view_info, None) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_follows_format() {
        assert_eq!(
            aspect_mask(vk::Format::R8G8B8A8_SRGB),
            vk::ImageAspectFlags::COLOR
        );
        assert_eq!(aspect_mask(vk::Format::D32_SFLOAT), vk::ImageAspectFlags::DEPTH);
        assert_eq!(aspect_mask(vk::Format::S8_UINT), vk::ImageAspectFlags::STENCIL);
        assert_eq!(
            aspect_mask(vk::Format::D24_UNORM_S8_UINT),
            vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
        );
    }
}
