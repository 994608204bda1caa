//! Renderer context: initialization, per-frame loop and teardown.

use std::sync::Arc;
use std::time::Instant;

use ash::vk;
use rift_core::log::{info, warn};
use winit::window::Window;

use crate::buffer::{Buffer, BufferDesc};
use crate::command::{CommandPool, ImmediateCommands};
use crate::core::{VkCore, select_physical_device};
use crate::descriptor::{DescriptorArena, SetIndex};
use crate::device::RenderDevice;
use crate::image::{Image, ImageDesc};
use crate::memory::MemoryAllocator;
use crate::sampler::{Sampler, SamplerConfig};
use crate::speeds::{MetricKind, MetricValue, SpeedsRegistry};
use crate::swapchain::{RenderPass, SurfaceWindow, Swapchain, SwapchainConfig};
use crate::synchronization::{Fence, Semaphore};

/// Renderer configuration supplied by the host.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub app_name: String,
    /// Size of the context's staging buffer for resource uploads.
    pub staging_size: vk::DeviceSize,
    pub swapchain: SwapchainConfig,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            app_name: "rift".to_owned(),
            staging_size: 16 * 1024 * 1024,
            swapchain: SwapchainConfig::default(),
        }
    }
}

const CLEAR_COLOR: [f32; 4] = [0.05, 0.05, 0.08, 1.0];

/// The renderer context.
///
/// Owns every Vulkan object the backend creates. Construction is the only
/// way in, `Drop` the only way out; field order encodes the reverse
/// dependency order teardown requires (resources before swapchain, swapchain
/// before device, device before surface and instance). One thread owns the
/// context for its whole lifetime.
pub struct VkRenderer {
    window: Arc<Window>,

    speeds: SpeedsRegistry,
    frame_time_us: MetricValue,
    frames_drawn: MetricValue,

    default_texture: Image,
    default_texture_set: SetIndex,
    staging: Buffer,
    default_sampler: Sampler,
    descriptor_arena: DescriptorArena,

    image_available: Semaphore,
    render_finished: Semaphore,
    frame_fence: Fence,

    immediate: ImmediateCommands,
    command_pool: CommandPool,

    swapchain: Swapchain,
    render_pass: RenderPass,

    allocator: MemoryAllocator,
    device: RenderDevice,
    surface: SurfaceWindow,
    core: VkCore,
}

impl VkRenderer {
    /// Bring up the whole context: instance, device, swapchain, default
    /// resources.
    #[profiling::function]
    pub fn new(window: Arc<Window>, config: RendererConfig) -> Result<Self, anyhow::Error> {
        let mut speeds = SpeedsRegistry::new();
        let frame_time_us =
            crate::speeds_metric!(speeds, frame_time_us, MetricKind::Microseconds)?;
        let frames_drawn = crate::speeds_metric!(speeds, frames_drawn, MetricKind::Count)?;

        let core = VkCore::new(&window, &config)?;
        let surface = SurfaceWindow::new(&window, &core)?;
        let physical_device = select_physical_device(core.instance(), &surface)?;
        let device = RenderDevice::new(core.instance(), &physical_device)?;

        let allocator = MemoryAllocator::new(
            device.handle().handle(),
            *device.fns(),
            *device.memory_properties(),
            &mut speeds,
        )?;

        let mut swapchain = Swapchain::new(&core, &device, &surface, &config.swapchain)?;
        let render_pass = RenderPass::new(&device, swapchain.format())?;
        swapchain.create_framebuffers(&render_pass)?;

        let command_pool = CommandPool::new(
            "command_pool.frame",
            &device,
            vk::CommandPoolCreateFlags::empty(),
        )?;
        let immediate = ImmediateCommands::new(&device)?;

        let image_available = Semaphore::new("semaphore.image_available", &device)?;
        let render_finished = Semaphore::new("semaphore.render_finished", &device)?;
        let frame_fence = Fence::new("fence.frame", &device, true)?;

        let staging = Buffer::new(
            &device,
            &allocator,
            &BufferDesc::staging("buffer.staging", config.staging_size),
        )?;

        let default_sampler = Sampler::new("sampler.default", &device, &SamplerConfig::linear())?;
        let mut descriptor_arena = DescriptorArena::new(&device, &mut speeds)?;

        // Surfaces with missing textures sample this instead of crashing.
        let default_texture = Image::new(
            &device,
            &allocator,
            &ImageDesc::sampled_2d("texture.default", 4, 4, vk::Format::R8G8B8A8_SRGB),
        )?;
        let white = vec![0xffu8; default_texture.upload_size()];
        default_texture.upload(&staging, &immediate, &white)?;

        let default_texture_set = descriptor_arena.allocate_set()?;
        descriptor_arena.write_texture(
            default_texture_set,
            default_texture.view(),
            default_sampler.handle(),
        );

        info!(
            "Renderer initialized: {} swapchain images, {} descriptor sets reserved",
            swapchain.image_count(),
            descriptor_arena.allocated(),
        );

        Ok(Self {
            window,
            speeds,
            frame_time_us,
            frames_drawn,
            default_texture,
            default_texture_set,
            staging,
            default_sampler,
            descriptor_arena,
            image_available,
            render_finished,
            frame_fence,
            immediate,
            command_pool,
            swapchain,
            render_pass,
            allocator,
            device,
            surface,
            core,
        })
    }

    /// Record and submit one frame, then present it.
    #[profiling::function]
    pub fn draw_frame(&mut self) -> Result<(), anyhow::Error> {
        let frame_start = Instant::now();

        let extent = self.swapchain.extent();
        if extent.width == 0 || extent.height == 0 {
            return Ok(());
        }

        self.frame_fence.wait()?;

        let (image_index, suboptimal) =
            match self.swapchain.acquire_next_image(self.image_available.handle()) {
                Ok(acquired) => acquired,
                Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                    self.recreate_swapchain()?;
                    return Ok(());
                }
                Err(result) => return Err(result.into()),
            };

        self.frame_fence.reset()?;

        self.command_pool.reset()?;
        let cmd = self.command_pool.allocate()?;
        self.record_frame(cmd, image_index)?;

        let wait_semaphores = [self.image_available.handle()];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let signal_semaphores = [self.render_finished.handle()];

        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(std::slice::from_ref(&cmd))
            .signal_semaphores(&signal_semaphores);

        unsafe {
            self.device.handle().queue_submit(
                self.device.queue(),
                &[submit_info],
                self.frame_fence.handle(),
            )?;
        }

        let present_suboptimal = self.swapchain.present(
            self.device.queue(),
            image_index,
            self.render_finished.handle(),
        )?;

        if suboptimal || present_suboptimal {
            self.recreate_swapchain()?;
        }

        self.frame_time_us
            .set(frame_start.elapsed().as_micros() as i64);
        self.frames_drawn.add(1);

        Ok(())
    }

    fn record_frame(&self, cmd: vk::CommandBuffer, image_index: u32) -> Result<(), vk::Result> {
        let device = self.device.handle();

        let begin_info = vk::CommandBufferBeginInfo::default()
            .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);

        let clear_value = vk::ClearValue {
            color: vk::ClearColorValue {
                float32: CLEAR_COLOR,
            },
        };
        let render_pass_begin = vk::RenderPassBeginInfo::default()
            .render_pass(self.render_pass.handle())
            .framebuffer(self.swapchain.framebuffer(image_index))
            .render_area(vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent: self.swapchain.extent(),
            })
            .clear_values(std::slice::from_ref(&clear_value));

        unsafe {
            device.begin_command_buffer(cmd, &begin_info)?;
            device.cmd_begin_render_pass(cmd, &render_pass_begin, vk::SubpassContents::INLINE);
            // Brush and entity submission hooks in here once the scene
            // modules land; the pass currently just clears.
            device.cmd_end_render_pass(cmd);
            device.end_command_buffer(cmd)?;
        }

        Ok(())
    }

    /// React to a window size change.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), anyhow::Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.swapchain.resize(
            &self.device,
            &self.surface,
            &self.render_pass,
            vk::Extent2D { width, height },
        )
    }

    fn recreate_swapchain(&mut self) -> Result<(), anyhow::Error> {
        let size = self.window.inner_size();
        self.resize(size.width, size.height)
    }

    /// Fill `out` with the current performance overlay.
    ///
    /// The buffer is always NUL-terminated; returns whether every metric
    /// fit.
    pub fn speeds_message(&self, out: &mut [u8]) -> bool {
        self.speeds.message(out)
    }

    pub fn core(&self) -> &VkCore {
        &self.core
    }

    pub fn device(&self) -> &RenderDevice {
        &self.device
    }

    pub fn allocator(&self) -> &MemoryAllocator {
        &self.allocator
    }

    pub fn descriptor_arena(&self) -> &DescriptorArena {
        &self.descriptor_arena
    }

    pub fn descriptor_arena_mut(&mut self) -> &mut DescriptorArena {
        &mut self.descriptor_arena
    }

    pub fn staging(&self) -> &Buffer {
        &self.staging
    }

    pub fn immediate(&self) -> &ImmediateCommands {
        &self.immediate
    }

    pub fn default_sampler(&self) -> &Sampler {
        &self.default_sampler
    }

    /// Descriptor set sampling the built-in fallback texture.
    pub fn default_texture_set(&self) -> SetIndex {
        self.default_texture_set
    }

    pub fn default_texture(&self) -> &Image {
        &self.default_texture
    }
}

impl Drop for VkRenderer {
    fn drop(&mut self) {
        // Let in-flight work finish before field drops start releasing
        // resources in reverse declaration order.
        if let Err(result) = self.device.wait_queue_idle() {
            warn!("Queue wait at renderer shutdown failed: {:?}", result);
        }
        info!(
            "Renderer shut down ({} live allocations at exit)",
            self.allocator.tracker().live_allocations(),
        );
    }
}
