//! Vulkan swapchain - surface, presentable images and their framebuffers.

use std::sync::{Arc, Weak};

use ash::vk;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use rift_core::log::{info, warn};
use winit::window::Window;

use crate::core::VkCore;
use crate::device::RenderDevice;

/// Surface plus the loader that owns it.
pub struct SurfaceWindow {
    window: Weak<Window>,
    surface_loader: ash::khr::surface::Instance,
    surface: vk::SurfaceKHR,
}

impl Drop for SurfaceWindow {
    fn drop(&mut self) {
        unsafe {
            self.surface_loader.destroy_surface(self.surface, None);
        }
    }
}

impl SurfaceWindow {
    pub fn new(window: &Arc<Window>, core: &VkCore) -> Result<Self, anyhow::Error> {
        let display_handle = window.display_handle()?.as_raw();
        let window_handle = window.window_handle()?.as_raw();

        let surface_loader = ash::khr::surface::Instance::new(core.entry(), core.instance());
        let surface = unsafe {
            ash_window::create_surface(
                core.entry(),
                core.instance(),
                display_handle,
                window_handle,
                None,
            )?
        };

        Ok(Self {
            window: Arc::downgrade(window),
            surface_loader,
            surface,
        })
    }

    pub fn window(&self) -> &Weak<Window> {
        &self.window
    }

    pub fn surface_loader(&self) -> &ash::khr::surface::Instance {
        &self.surface_loader
    }

    pub fn surface(&self) -> vk::SurfaceKHR {
        self.surface
    }
}

/// Swapchain configuration parameters.
#[derive(Debug, Clone)]
pub struct SwapchainConfig {
    pub preferred_format: vk::Format,
    pub preferred_color_space: vk::ColorSpaceKHR,
    pub preferred_present_mode: vk::PresentModeKHR,
    pub num_images: u32,
}

impl Default for SwapchainConfig {
    fn default() -> Self {
        Self {
            preferred_format: vk::Format::B8G8R8A8_SRGB,
            preferred_color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            preferred_present_mode: vk::PresentModeKHR::FIFO,
            num_images: 3,
        }
    }
}

/// The context's single forward pass: one color attachment, cleared on load
/// and presented on store.
pub struct RenderPass {
    device: ash::Device,
    render_pass: vk::RenderPass,
}

impl RenderPass {
    pub fn new(device: &RenderDevice, color_format: vk::Format) -> Result<Self, vk::Result> {
        let attachment = vk::AttachmentDescription::default()
            .format(color_format)
            .samples(vk::SampleCountFlags::TYPE_1)
            .load_op(vk::AttachmentLoadOp::CLEAR)
            .store_op(vk::AttachmentStoreOp::STORE)
            .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
            .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .final_layout(vk::ImageLayout::PRESENT_SRC_KHR);

        let color_ref = vk::AttachmentReference::default()
            .attachment(0)
            .layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);

        let subpass = vk::SubpassDescription::default()
            .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
            .color_attachments(std::slice::from_ref(&color_ref));

        // The acquire semaphore only guarantees availability at color
        // output; gate the clear on it.
        let dependency = vk::SubpassDependency::default()
            .src_subpass(vk::SUBPASS_EXTERNAL)
            .dst_subpass(0)
            .src_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
            .src_access_mask(vk::AccessFlags::empty())
            .dst_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
            .dst_access_mask(vk::AccessFlags::COLOR_ATTACHMENT_WRITE);

        let create_info = vk::RenderPassCreateInfo::default()
            .attachments(std::slice::from_ref(&attachment))
            .subpasses(std::slice::from_ref(&subpass))
            .dependencies(std::slice::from_ref(&dependency));

        let render_pass = unsafe { device.handle().create_render_pass(&create_info, None)? };

        Ok(Self {
            device: device.handle().clone(),
            render_pass,
        })
    }

    pub fn handle(&self) -> vk::RenderPass {
        self.render_pass
    }
}

impl Drop for RenderPass {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_render_pass(self.render_pass, None);
        }
    }
}

/// Vulkan swapchain with per-image views and framebuffers.
pub struct Swapchain {
    device: ash::Device,
    physical_device: vk::PhysicalDevice,

    swapchain_loader: ash::khr::swapchain::Device,
    swapchain: vk::SwapchainKHR,

    images: Vec<vk::Image>,
    views: Vec<vk::ImageView>,
    framebuffers: Vec<vk::Framebuffer>,

    format: vk::SurfaceFormatKHR,
    extent: vk::Extent2D,
    present_mode: vk::PresentModeKHR,
    num_images: u32,
}

impl Swapchain {
    #[profiling::function]
    pub fn new(
        core: &VkCore,
        device: &RenderDevice,
        window: &SurfaceWindow,
        config: &SwapchainConfig,
    ) -> Result<Self, anyhow::Error> {
        let physical_device = device.physical_device().handle();
        let capabilities = unsafe {
            window
                .surface_loader
                .get_physical_device_surface_capabilities(physical_device, window.surface)?
        };
        let formats = unsafe {
            window
                .surface_loader
                .get_physical_device_surface_formats(physical_device, window.surface)?
        };
        let format = choose_surface_format(&formats, config);

        let present_modes = unsafe {
            window
                .surface_loader
                .get_physical_device_surface_present_modes(physical_device, window.surface)?
        };
        let present_mode = choose_present_mode(&present_modes, config);

        let os_window = window
            .window
            .upgrade()
            .ok_or_else(|| anyhow::anyhow!("Window died before swapchain creation"))?;
        let extent = vk::Extent2D {
            width: os_window.inner_size().width,
            height: os_window.inner_size().height,
        };
        let extent = get_swapchain_extent(&capabilities, extent);

        let swapchain_loader = ash::khr::swapchain::Device::new(core.instance(), device.handle());
        let swapchain = create_or_recreate(
            &swapchain_loader,
            window.surface,
            capabilities,
            format,
            present_mode,
            config.num_images,
            extent,
            vk::SwapchainKHR::null(),
        )?;

        let images = unsafe { swapchain_loader.get_swapchain_images(swapchain)? };
        let views = create_views(device.handle(), &images, format.format)?;

        Ok(Self {
            device: device.handle().clone(),
            physical_device,
            swapchain_loader,
            swapchain,
            images,
            views,
            framebuffers: Vec::new(),
            format,
            extent,
            present_mode,
            num_images: config.num_images,
        })
    }

    /// Build one framebuffer per swapchain image for `render_pass`.
    ///
    /// Must run once after creation and again after every resize.
    pub fn create_framebuffers(&mut self, render_pass: &RenderPass) -> Result<(), vk::Result> {
        self.destroy_framebuffers();

        for view in &self.views {
            let create_info = vk::FramebufferCreateInfo::default()
                .render_pass(render_pass.handle())
                .attachments(std::slice::from_ref(view))
                .width(self.extent.width)
                .height(self.extent.height)
                .layers(1);

            let framebuffer = unsafe { self.device.create_framebuffer(&create_info, None)? };
            self.framebuffers.push(framebuffer);
        }

        Ok(())
    }

    /// Acquire the next presentable image.
    ///
    /// Returns the image index and whether the swapchain is suboptimal.
    pub fn acquire_next_image(
        &self,
        image_available: vk::Semaphore,
    ) -> Result<(u32, bool), vk::Result> {
        unsafe {
            self.swapchain_loader.acquire_next_image(
                self.swapchain,
                u64::MAX,
                image_available,
                vk::Fence::null(),
            )
        }
    }

    /// Present a rendered image. Returns whether the swapchain is
    /// suboptimal and should be recreated.
    pub fn present(
        &self,
        queue: vk::Queue,
        image_index: u32,
        render_finished: vk::Semaphore,
    ) -> Result<bool, vk::Result> {
        let swapchains = [self.swapchain];
        let image_indices = [image_index];
        let wait_semaphores = [render_finished];

        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        let result = unsafe { self.swapchain_loader.queue_present(queue, &present_info) };

        match result {
            Ok(suboptimal) => Ok(suboptimal),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(true),
            Err(e) => Err(e),
        }
    }

    /// Recreate the swapchain and its views for a new extent.
    pub fn resize(
        &mut self,
        device: &RenderDevice,
        window: &SurfaceWindow,
        render_pass: &RenderPass,
        extent: vk::Extent2D,
    ) -> Result<(), anyhow::Error> {
        device.wait_queue_idle()?;

        // Surface capabilities may have changed with the window.
        let capabilities = unsafe {
            window
                .surface_loader
                .get_physical_device_surface_capabilities(self.physical_device, window.surface)?
        };
        let extent = get_swapchain_extent(&capabilities, extent);

        let swapchain = create_or_recreate(
            &self.swapchain_loader,
            window.surface,
            capabilities,
            self.format,
            self.present_mode,
            self.num_images,
            extent,
            self.swapchain,
        )?;

        self.destroy_framebuffers();
        for view in self.views.drain(..) {
            unsafe { self.device.destroy_image_view(view, None) };
        }

        self.swapchain = swapchain;
        self.extent = extent;
        self.images = unsafe { self.swapchain_loader.get_swapchain_images(swapchain)? };
        self.views = create_views(&self.device, &self.images, self.format.format)?;
        self.create_framebuffers(render_pass)?;

        Ok(())
    }

    pub fn handle(&self) -> vk::SwapchainKHR {
        self.swapchain
    }

    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    pub fn format(&self) -> vk::Format {
        self.format.format
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn framebuffer(&self, image_index: u32) -> vk::Framebuffer {
        self.framebuffers[image_index as usize]
    }

    fn destroy_framebuffers(&mut self) {
        for framebuffer in self.framebuffers.drain(..) {
            unsafe { self.device.destroy_framebuffer(framebuffer, None) };
        }
    }
}

impl Drop for Swapchain {
    fn drop(&mut self) {
        if let Err(result) = unsafe { self.device.device_wait_idle() } {
            warn!("Device wait before swapchain destruction failed: {:?}", result);
        }

        // Framebuffers and views go before the swapchain that owns the
        // images they reference.
        self.destroy_framebuffers();
        for view in self.views.drain(..) {
            unsafe { self.device.destroy_image_view(view, None) };
        }

        unsafe {
            self.swapchain_loader.destroy_swapchain(self.swapchain, None);
        }
    }
}

#[allow(clippy::too_many_arguments)]
#[profiling::function]
fn create_or_recreate(
    swapchain_loader: &ash::khr::swapchain::Device,
    surface: vk::SurfaceKHR,
    capabilities: vk::SurfaceCapabilitiesKHR,
    format: vk::SurfaceFormatKHR,
    present_mode: vk::PresentModeKHR,
    num_images: u32,
    extent: vk::Extent2D,
    old_swapchain: vk::SwapchainKHR,
) -> Result<vk::SwapchainKHR, vk::Result> {
    let mut image_count = num_images.max(capabilities.min_image_count);
    if capabilities.max_image_count > 0 {
        image_count = image_count.min(capabilities.max_image_count);
    }

    info!(
        "Creating new swapchain: {:?} {:?}, {}x{}, {} images, {:?}",
        format.format, format.color_space, extent.width, extent.height, image_count, present_mode
    );

    let create_info = vk::SwapchainCreateInfoKHR::default()
        .surface(surface)
        .min_image_count(image_count)
        .image_format(format.format)
        .image_color_space(format.color_space)
        .image_extent(extent)
        .image_array_layers(1)
        .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
        .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
        .pre_transform(capabilities.current_transform)
        .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
        .present_mode(present_mode)
        .clipped(true)
        .old_swapchain(old_swapchain);

    let swapchain = unsafe { swapchain_loader.create_swapchain(&create_info, None)? };

    if old_swapchain != vk::SwapchainKHR::null() {
        unsafe {
            swapchain_loader.destroy_swapchain(old_swapchain, None);
        }
    }

    Ok(swapchain)
}

fn create_views(
    device: &ash::Device,
    images: &[vk::Image],
    format: vk::Format,
) -> Result<Vec<vk::ImageView>, vk::Result> {
    let mut views = Vec::with_capacity(images.len());
    for image in images {
        let create_info = vk::ImageViewCreateInfo::default()
            .image(*image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(format)
            .subresource_range(
                vk::ImageSubresourceRange::default()
                    .aspect_mask(vk::ImageAspectFlags::COLOR)
                    .base_mip_level(0)
                    .level_count(1)
                    .base_array_layer(0)
                    .layer_count(1),
            );

        match unsafe { device.create_image_view(&create_info, None) } {
            Ok(view) => views.push(view),
            Err(result) => {
                for view in views {
                    unsafe { device.destroy_image_view(view, None) };
                }
                return Err(result);
            }
        }
    }
    Ok(views)
}

fn choose_surface_format(
    formats: &[vk::SurfaceFormatKHR],
    config: &SwapchainConfig,
) -> vk::SurfaceFormatKHR {
    formats
        .iter()
        .find(|f| {
            f.format == config.preferred_format && f.color_space == config.preferred_color_space
        })
        .copied()
        .unwrap_or(formats[0])
}

fn choose_present_mode(
    modes: &[vk::PresentModeKHR],
    config: &SwapchainConfig,
) -> vk::PresentModeKHR {
    // Prefer the requested mode, fall back to mailbox, then FIFO (always
    // available).
    if modes.contains(&config.preferred_present_mode) {
        config.preferred_present_mode
    } else if modes.contains(&vk::PresentModeKHR::MAILBOX) {
        vk::PresentModeKHR::MAILBOX
    } else {
        vk::PresentModeKHR::FIFO
    }
}

fn get_swapchain_extent(
    capabilities: &vk::SurfaceCapabilitiesKHR,
    window_extent: vk::Extent2D,
) -> vk::Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        capabilities.current_extent
    } else {
        vk::Extent2D {
            width: window_extent.width.clamp(
                capabilities.min_image_extent.width,
                capabilities.max_image_extent.width,
            ),
            height: window_extent.height.clamp(
                capabilities.min_image_extent.height,
                capabilities.max_image_extent.height,
            ),
        }
    }
}
