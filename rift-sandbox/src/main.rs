//! Minimal host: owns the window and the frame cadence, drives the renderer
//! the way the engine's ref loading path would.

use std::sync::Arc;

use log::{error, info};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use rift_vk::{RendererConfig, VkRenderer};

/// How often the performance overlay is logged.
const SPEEDS_LOG_INTERVAL: u64 = 240;

struct HostLoop {
    renderer: Option<VkRenderer>,
    window: Option<Arc<Window>>,

    frame_count: u64,
    speeds_buffer: [u8; 1024],
}

impl HostLoop {
    fn new() -> Self {
        Self {
            renderer: None,
            window: None,
            frame_count: 0,
            speeds_buffer: [0; 1024],
        }
    }

    fn log_speeds(&mut self) {
        let Some(renderer) = &self.renderer else {
            return;
        };

        let complete = renderer.speeds_message(&mut self.speeds_buffer);
        let end = self
            .speeds_buffer
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.speeds_buffer.len());
        if let Ok(text) = std::str::from_utf8(&self.speeds_buffer[..end]) {
            info!(
                "speeds{}:\n{}",
                if complete { "" } else { " (truncated)" },
                text
            );
        }
    }
}

impl ApplicationHandler for HostLoop {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let window_attributes = Window::default_attributes()
            .with_title("rift sandbox")
            .with_min_inner_size(LogicalSize::new(32, 32))
            .with_inner_size(LogicalSize::new(1280, 720));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                error!("Window creation failed: {err}");
                event_loop.exit();
                return;
            }
        };

        match VkRenderer::new(window.clone(), RendererConfig::default()) {
            Ok(renderer) => {
                self.renderer = Some(renderer);
                self.window = Some(window.clone());
                window.request_redraw();
            }
            Err(err) => {
                error!("Renderer initialization failed: {err:#}");
                event_loop.exit();
            }
        }
    }

    #[profiling::function]
    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    if let Err(err) = renderer.resize(size.width, size.height) {
                        error!("Swapchain resize failed: {err:#}");
                        event_loop.exit();
                    }
                }
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                let Some(renderer) = &mut self.renderer else {
                    return;
                };

                if let Err(err) = renderer.draw_frame() {
                    // The host owns the decision to terminate; the renderer
                    // only reports.
                    error!("Frame failed: {err:#}");
                    event_loop.exit();
                    return;
                }

                self.frame_count += 1;
                if self.frame_count % SPEEDS_LOG_INTERVAL == 0 {
                    self.log_speeds();
                }

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
                profiling::finish_frame!();
            }
            _ => {}
        }
    }
}

fn main() -> Result<(), anyhow::Error> {
    rift_core::log::initialize(rift_core::log::LevelFilter::Info)?;
    let _profile_server = rift_core::profile::initialize()?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut host = HostLoop::new();
    event_loop.run_app(&mut host)?;

    Ok(())
}
